//! Journey-delay computation.
//!
//! The implemented rule is the "open journey" one: a patient is flagged
//! when more than [`DELAY_THRESHOLD_DAYS`] have passed since diagnosis
//! and no treatment start is on record. A patient whose treatment began
//! late is NOT flagged — the alert tracks journeys that are still open.
//!
//! `today` is an explicit parameter so both functions stay pure; callers
//! pass `Utc::now().date_naive()`.

use chrono::NaiveDate;

use super::model::{DelayFlags, Patient};

/// Milestone transition threshold, in days.
pub const DELAY_THRESHOLD_DAYS: i64 = 7;

/// Sentinel alert when the diagnosis date is missing or unparseable.
pub const INCOMPLETE_DIAGNOSIS_ALERT: &str = "Dados de diagnóstico incompletos.";

/// Compute delay flags from the raw milestone dates.
///
/// With no diagnosis date the journey is unknown: all flags stay false
/// and no day counts are fabricated. The diagnosis→staging flag is kept
/// in the output but is never raised by this source (no staging dates).
pub fn compute_flags(
    diagnosis: Option<NaiveDate>,
    treatment_start: Option<NaiveDate>,
    today: NaiveDate,
) -> DelayFlags {
    let Some(diagnosis) = diagnosis else {
        return DelayFlags::default();
    };

    let days = match treatment_start {
        Some(start) => (start - diagnosis).num_days(),
        None => (today - diagnosis).num_days(),
    };

    let open_and_late = treatment_start.is_none() && days > DELAY_THRESHOLD_DAYS;

    DelayFlags {
        delay_diagnosis_to_staging: false,
        delay_staging_to_treatment: open_and_late,
        days_diagnosis_to_staging: None,
        days_staging_to_treatment: open_and_late.then_some(days),
    }
}

/// Re-derive the open-journey condition as clinician-readable alerts.
///
/// A missing diagnosis date short-circuits into the single
/// [`INCOMPLETE_DIAGNOSIS_ALERT`] sentinel.
pub fn clinical_alerts(patient: &Patient, today: NaiveDate) -> Vec<String> {
    let Some(diagnosis) = patient.oncology.diagnosis_date else {
        return vec![INCOMPLETE_DIAGNOSIS_ALERT.to_string()];
    };

    let mut alerts = Vec::new();
    if patient.oncology.treatment_start_date.is_none() {
        let days = (today - diagnosis).num_days();
        if days > DELAY_THRESHOLD_DAYS {
            alerts.push(format!(
                "Atenção: paciente diagnosticado há {days} dias sem data de início de tratamento registrada."
            ));
        }
    }
    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::model::{CancerInfo, CareInfo, OncologyDates};
    use std::collections::BTreeMap;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn patient_with_dates(
        diagnosis: Option<NaiveDate>,
        treatment_start: Option<NaiveDate>,
    ) -> Patient {
        Patient {
            id: "P1".into(),
            name: "Teste".into(),
            sex: None,
            age: None,
            oncology: OncologyDates {
                diagnosis_date: diagnosis,
                staging_date: None,
                treatment_start_date: treatment_start,
            },
            cancer: CancerInfo::default(),
            care: CareInfo::default(),
            flags: DelayFlags::default(),
            notes: None,
            meta: BTreeMap::new(),
        }
    }

    #[test]
    fn no_diagnosis_yields_no_flags() {
        let flags = compute_flags(None, None, d(2024, 6, 1));
        assert!(!flags.delay_staging_to_treatment);
        assert!(!flags.delay_diagnosis_to_staging);
        assert_eq!(flags.days_staging_to_treatment, None);
        assert_eq!(flags.days_diagnosis_to_staging, None);

        let flags = compute_flags(None, Some(d(2024, 5, 1)), d(2024, 6, 1));
        assert!(!flags.delay_staging_to_treatment);
    }

    #[test]
    fn open_journey_past_threshold_is_flagged_with_day_count() {
        // Diagnosed 2024-01-01, queried 2024-01-15, no treatment: 14 days.
        let flags = compute_flags(Some(d(2024, 1, 1)), None, d(2024, 1, 15));
        assert!(flags.delay_staging_to_treatment);
        assert_eq!(flags.days_staging_to_treatment, Some(14));
    }

    #[test]
    fn open_journey_within_threshold_is_not_flagged() {
        // Exactly 7 days is still within the threshold (rule is strictly >).
        let flags = compute_flags(Some(d(2024, 1, 1)), None, d(2024, 1, 8));
        assert!(!flags.delay_staging_to_treatment);
        assert_eq!(flags.days_staging_to_treatment, None);
    }

    #[test]
    fn started_treatment_is_never_flagged() {
        // Treatment 30 days after diagnosis: late, but the journey closed.
        let flags = compute_flags(Some(d(2024, 1, 1)), Some(d(2024, 1, 31)), d(2024, 6, 1));
        assert!(!flags.delay_staging_to_treatment);
        assert_eq!(flags.days_staging_to_treatment, None);
    }

    #[test]
    fn alerts_sentinel_on_missing_diagnosis() {
        let patient = patient_with_dates(None, None);
        let alerts = clinical_alerts(&patient, d(2024, 6, 1));
        assert_eq!(alerts, vec![INCOMPLETE_DIAGNOSIS_ALERT.to_string()]);
    }

    #[test]
    fn alerts_name_the_elapsed_days() {
        let patient = patient_with_dates(Some(d(2024, 1, 1)), None);
        let alerts = clinical_alerts(&patient, d(2024, 1, 15));
        assert_eq!(alerts.len(), 1);
        assert!(alerts[0].contains("14 dias"));
    }

    #[test]
    fn alerts_empty_when_treatment_started() {
        let patient = patient_with_dates(Some(d(2024, 1, 1)), Some(d(2024, 1, 20)));
        assert!(clinical_alerts(&patient, d(2024, 6, 1)).is_empty());
    }

    #[test]
    fn alerts_empty_within_threshold() {
        let patient = patient_with_dates(Some(d(2024, 1, 1)), None);
        assert!(clinical_alerts(&patient, d(2024, 1, 5)).is_empty());
    }
}
