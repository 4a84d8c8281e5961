//! Shared state for the API layer.

use std::sync::Arc;

use crate::roster::PatientStore;
use crate::summary::SummaryEngine;

/// Shared context for all API routes.
#[derive(Clone)]
pub struct ApiContext {
    pub store: Arc<PatientStore>,
    pub engine: Arc<SummaryEngine>,
    /// Whether a live completion provider is configured. The plain chat
    /// endpoint degrades to a local stub answer when false.
    pub llm_live: bool,
}

impl ApiContext {
    pub fn new(store: Arc<PatientStore>, engine: Arc<SummaryEngine>, llm_live: bool) -> Self {
        Self {
            store,
            engine,
            llm_live,
        }
    }
}
