//! Patient record types — one `Patient` per roster row.
//!
//! Every clinical field is `Option`-typed: the source snapshot is allowed
//! to have holes, and absence is modeled explicitly rather than with
//! sentinel defaults.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Journey milestone dates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OncologyDates {
    pub diagnosis_date: Option<NaiveDate>,
    /// Never populated by the current source — kept for richer sources.
    pub staging_date: Option<NaiveDate>,
    /// Earliest of surgery / chemo-start / radio-start, absent if none.
    pub treatment_start_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CancerInfo {
    #[serde(rename = "type")]
    pub cancer_type: Option<String>,
    pub stage: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CareInfo {
    pub last_visit: Option<NaiveDate>,
    pub next_visit: Option<NaiveDate>,
    /// Free-form journey status label, e.g. "em tratamento".
    pub status: Option<String>,
}

/// Journey-delay flags computed from the milestone dates.
///
/// Day counts are populated only when the matching flag is raised —
/// an unknown journey yields all-false flags with no counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DelayFlags {
    pub delay_diagnosis_to_staging: bool,
    pub delay_staging_to_treatment: bool,
    pub days_diagnosis_to_staging: Option<i64>,
    pub days_staging_to_treatment: Option<i64>,
}

/// One roster row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: String,
    pub name: String,
    pub sex: Option<String>,
    pub age: Option<u32>,
    pub oncology: OncologyDates,
    pub cancer: CancerInfo,
    pub care: CareInfo,
    pub flags: DelayFlags,
    pub notes: Option<String>,
    /// Provenance bag: `source`, `ingested_at`, `load_id`.
    #[serde(default)]
    pub meta: BTreeMap<String, String>,
}

// ── Patch types ─────────────────────────────────────────────
//
// Only the `oncology.*` and `care.*` sub-structures are patchable.
// Unknown fields are rejected (`deny_unknown_fields`), and absent/null
// fields are left untouched — a patch can set values, not clear them.

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OncologyPatch {
    pub diagnosis_date: Option<NaiveDate>,
    pub staging_date: Option<NaiveDate>,
    pub treatment_start_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CarePatch {
    pub last_visit: Option<NaiveDate>,
    pub next_visit: Option<NaiveDate>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatientPatch {
    pub oncology: Option<OncologyPatch>,
    pub care: Option<CarePatch>,
}

impl PatientPatch {
    /// Overwrite the named fields of `patient` in place.
    pub fn apply(&self, patient: &mut Patient) {
        if let Some(onc) = &self.oncology {
            if let Some(d) = onc.diagnosis_date {
                patient.oncology.diagnosis_date = Some(d);
            }
            if let Some(d) = onc.staging_date {
                patient.oncology.staging_date = Some(d);
            }
            if let Some(d) = onc.treatment_start_date {
                patient.oncology.treatment_start_date = Some(d);
            }
        }
        if let Some(care) = &self.care {
            if let Some(d) = care.last_visit {
                patient.care.last_visit = Some(d);
            }
            if let Some(d) = care.next_visit {
                patient.care.next_visit = Some(d);
            }
            if let Some(s) = &care.status {
                patient.care.status = Some(s.clone());
            }
        }
    }
}
