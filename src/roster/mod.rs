//! In-memory patient roster.
//!
//! The whole roster is replaced atomically at load time and then served
//! behind a `RwLock`: reads are concurrent, patches serialize against
//! each other and against reads of the same record. Records are never
//! deleted at runtime and never created outside a bulk load.

pub mod delay;
pub mod ingest;
pub mod model;

use std::collections::HashMap;
use std::sync::RwLock;

pub use model::{
    CancerInfo, CarePatch, CareInfo, DelayFlags, OncologyDates, OncologyPatch, Patient,
    PatientPatch,
};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("patient `{0}` not found")]
    NotFound(String),
    #[error("roster lock poisoned")]
    LockPoisoned,
}

/// Name/type/status filter with simple slicing, for the list endpoints.
#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    /// Name contains, case-insensitive.
    pub q: Option<String>,
    /// Cancer type equals, case-insensitive.
    pub cancer_type: Option<String>,
    /// Journey status equals, case-insensitive.
    pub status: Option<String>,
    /// Keep only patients with the open-journey delay flag.
    pub only_delayed: bool,
    pub limit: usize,
    pub offset: usize,
}

/// Roster-wide delay counters for the dashboard.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DelayStats {
    pub total_patients: usize,
    pub delayed_patients: usize,
    pub delayed_pct: f64,
}

#[derive(Default)]
struct Inner {
    /// Insertion (row) order.
    patients: Vec<Patient>,
    /// id → index into `patients`.
    index: HashMap<String, usize>,
}

/// Shared, lock-protected roster. Cheap to clone records out; the
/// backing structures are never exposed to callers.
#[derive(Default)]
pub struct PatientStore {
    inner: RwLock<Inner>,
}

impl PatientStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap in a freshly loaded roster wholesale.
    pub fn replace_all(&self, patients: Vec<Patient>) -> Result<(), StoreError> {
        let index = patients
            .iter()
            .enumerate()
            .map(|(i, p)| (p.id.clone(), i))
            .collect();
        let mut inner = self.inner.write().map_err(|_| StoreError::LockPoisoned)?;
        *inner = Inner { patients, index };
        Ok(())
    }

    pub fn get(&self, id: &str) -> Result<Option<Patient>, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(inner.index.get(id).map(|&i| inner.patients[i].clone()))
    }

    /// All records in insertion order.
    pub fn list(&self) -> Result<Vec<Patient>, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(inner.patients.clone())
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(inner.patients.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    /// Apply a field-level patch to one record.
    ///
    /// Only `oncology.*` and `care.*` are patchable; delay flags keep the
    /// values computed at load time (a restart re-derives them).
    pub fn patch(&self, id: &str, patch: &PatientPatch) -> Result<Patient, StoreError> {
        let mut inner = self.inner.write().map_err(|_| StoreError::LockPoisoned)?;
        let i = inner
            .index
            .get(id)
            .copied()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let patient = &mut inner.patients[i];
        patch.apply(patient);
        Ok(patient.clone())
    }

    /// Filtered listing with `limit`/`offset` slicing.
    pub fn search(&self, filter: &SearchFilter) -> Result<Vec<Patient>, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        let q = filter.q.as_deref().map(str::to_lowercase);
        let cancer_type = filter.cancer_type.as_deref().map(str::to_lowercase);
        let status = filter.status.as_deref().map(str::to_lowercase);

        let matches = inner.patients.iter().filter(|p| {
            if let Some(q) = &q {
                if !p.name.to_lowercase().contains(q) {
                    return false;
                }
            }
            if let Some(wanted) = &cancer_type {
                match &p.cancer.cancer_type {
                    Some(t) if t.to_lowercase() == *wanted => {}
                    _ => return false,
                }
            }
            if let Some(wanted) = &status {
                match &p.care.status {
                    Some(s) if s.to_lowercase() == *wanted => {}
                    _ => return false,
                }
            }
            if filter.only_delayed && !p.flags.delay_staging_to_treatment {
                return false;
            }
            true
        });

        Ok(matches
            .skip(filter.offset)
            .take(filter.limit)
            .cloned()
            .collect())
    }

    /// Distinct cancer types, case-insensitively sorted.
    pub fn cancer_types(&self) -> Result<Vec<String>, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        let mut types: Vec<String> = inner
            .patients
            .iter()
            .filter_map(|p| p.cancer.cancer_type.as_deref())
            .map(|t| t.trim().to_string())
            .collect();
        types.sort_by_key(|t| t.to_lowercase());
        types.dedup_by(|a, b| a.to_lowercase() == b.to_lowercase());
        Ok(types)
    }

    /// Roster-wide delay counters.
    pub fn delay_stats(&self) -> Result<DelayStats, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        let total = inner.patients.len();
        let delayed = inner
            .patients
            .iter()
            .filter(|p| p.flags.delay_staging_to_treatment)
            .count();
        let pct = if total == 0 {
            0.0
        } else {
            (delayed as f64 / total as f64 * 10_000.0).round() / 100.0
        };
        Ok(DelayStats {
            total_patients: total,
            delayed_patients: delayed,
            delayed_pct: pct,
        })
    }
}
