use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use jornada::api::{self, ApiContext};
use jornada::config::{self, Config};
use jornada::roster::{ingest, PatientStore};
use jornada::summary::{self, SummaryEngine};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("jornada starting v{}", config::APP_VERSION);

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    // A half-loaded or absent roster must never be served.
    let patients = match ingest::load_roster(&config.roster_path) {
        Ok(patients) => patients,
        Err(e) => {
            tracing::error!(error = %e, path = %config.roster_path.display(), "roster ingestion failed");
            std::process::exit(1);
        }
    };
    tracing::info!(patients = patients.len(), "roster loaded");

    let store = Arc::new(PatientStore::new());
    if let Err(e) = store.replace_all(patients) {
        tracing::error!(error = %e, "failed to initialize patient store");
        std::process::exit(1);
    }

    let llm_live = config.llm.api_key.is_some();
    // Built before the runtime starts: the blocking HTTP client must not
    // be created on an async worker thread.
    let engine = Arc::new(SummaryEngine::new(summary::client_from_config(&config.llm)));
    let ctx = ApiContext::new(store, engine, llm_live);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to build tokio runtime");

    if let Err(e) = runtime.block_on(api::server::serve(ctx, config.addr)) {
        tracing::error!(error = %e, "server error");
        std::process::exit(1);
    }
}
