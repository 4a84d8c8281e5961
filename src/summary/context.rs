//! Compact patient context for prompt injection.
//!
//! One pipe-delimited line bounds how much patient data reaches the
//! model — a cost and privacy control. The string is write-only; nothing
//! ever parses it back.

use chrono::NaiveDate;

use crate::roster::Patient;

const PLACEHOLDER: &str = "-";

/// Render a fixed-order, single-line summary of the record.
/// Absent fields render as `-`; never fails.
pub fn format_context(patient: &Patient) -> String {
    format!(
        "Paciente: {} | Sexo: {} | Idade: {} | Câncer: {} | Estágio: {} | \
         Diagnóstico: {} | Início tratamento: {} | Última consulta: {} | \
         Próxima consulta: {} | Status: {}",
        non_blank(&patient.name),
        opt(patient.sex.as_deref()),
        num(patient.age),
        opt(patient.cancer.cancer_type.as_deref()),
        opt(patient.cancer.stage.as_deref()),
        date(patient.oncology.diagnosis_date),
        date(patient.oncology.treatment_start_date),
        date(patient.care.last_visit),
        date(patient.care.next_visit),
        opt(patient.care.status.as_deref()),
    )
}

fn non_blank(s: &str) -> &str {
    if s.trim().is_empty() {
        PLACEHOLDER
    } else {
        s
    }
}

fn opt(v: Option<&str>) -> &str {
    v.map(non_blank).unwrap_or(PLACEHOLDER)
}

fn num(v: Option<u32>) -> String {
    v.map(|n| n.to_string())
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

fn date(v: Option<NaiveDate>) -> String {
    v.map(|d| d.to_string())
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}
