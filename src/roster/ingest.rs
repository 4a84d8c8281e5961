//! Roster CSV ingestion.
//!
//! Reads the snapshot the journey dashboard exports: UTF-8 with optional
//! BOM, delimiter auto-detected among `,` `;` and tab, RFC-4180 style
//! quoting, dates in `%Y-%m-%d`. Unparseable date cells degrade to
//! absent; a missing patient id fails the whole load — serving a roster
//! with unidentifiable rows is worse than not serving at all.

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use super::delay::compute_flags;
use super::model::{CancerInfo, CareInfo, OncologyDates, Patient};

/// Columns the snapshot must carry. Order in the file is free.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "patient_id",
    "nome_paciente",
    "sexo",
    "idade",
    "tipo_cancer",
    "estadiamento",
    "diagnostico_data",
    "cirurgia_data",
    "quimioterapia_inicio",
    "radioterapia_inicio",
    "ultima_consulta",
    "proxima_consulta",
    "status_jornada",
    "notas_clinicas",
];

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to read roster file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("roster file has no header line")]
    Empty,
    #[error("roster is missing required column `{0}`")]
    MissingColumn(&'static str),
    #[error("roster line {line}: missing patient id")]
    MissingId { line: usize },
    #[error("roster line {line}: duplicate patient id `{id}`")]
    DuplicateId { line: usize, id: String },
}

/// Load and parse the roster snapshot, stamping provenance metadata.
pub fn load_roster(path: &Path) -> Result<Vec<Patient>, IngestError> {
    let text = std::fs::read_to_string(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut patients = parse_roster(&text, Utc::now().date_naive())?;

    let load_id = Uuid::new_v4().to_string();
    let ingested_at = Utc::now().to_rfc3339();
    for patient in &mut patients {
        patient.meta.insert("source".into(), "csv".into());
        patient.meta.insert("ingested_at".into(), ingested_at.clone());
        patient.meta.insert("load_id".into(), load_id.clone());
    }

    tracing::info!(
        patients = patients.len(),
        %load_id,
        path = %path.display(),
        "roster snapshot parsed"
    );
    Ok(patients)
}

/// Parse roster text into patients, computing delay flags against `today`.
pub fn parse_roster(text: &str, today: NaiveDate) -> Result<Vec<Patient>, IngestError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut lines = text.lines().enumerate();

    let (_, header_line) = lines.next().ok_or(IngestError::Empty)?;
    let delimiter = detect_delimiter(header_line);
    let header: Vec<String> = split_line(header_line, delimiter)
        .into_iter()
        .map(|c| c.trim().to_string())
        .collect();

    let mut columns = Vec::with_capacity(REQUIRED_COLUMNS.len());
    for name in REQUIRED_COLUMNS {
        let idx = header
            .iter()
            .position(|h| h == name)
            .ok_or(IngestError::MissingColumn(name))?;
        columns.push(idx);
    }
    let col = |cells: &[String], required: usize| -> String {
        cells.get(columns[required]).cloned().unwrap_or_default()
    };

    let mut patients = Vec::new();
    let mut seen = std::collections::HashSet::new();

    for (idx, raw_line) in lines {
        if raw_line.trim().is_empty() {
            continue;
        }
        let line = idx + 1; // 1-based, matches editor views
        let cells = split_line(raw_line, delimiter);

        let id = col(&cells, 0).trim().to_string();
        if id.is_empty() {
            return Err(IngestError::MissingId { line });
        }
        if !seen.insert(id.clone()) {
            return Err(IngestError::DuplicateId { line, id });
        }

        let diagnosis_date = parse_date(&col(&cells, 6));
        let surgery = parse_date(&col(&cells, 7));
        let chemo_start = parse_date(&col(&cells, 8));
        let radio_start = parse_date(&col(&cells, 9));
        let treatment_start_date = [surgery, chemo_start, radio_start]
            .into_iter()
            .flatten()
            .min();

        patients.push(Patient {
            id,
            name: col(&cells, 1).trim().to_string(),
            sex: opt_string(&col(&cells, 2)),
            age: col(&cells, 3).trim().parse::<u32>().ok(),
            oncology: OncologyDates {
                diagnosis_date,
                staging_date: None,
                treatment_start_date,
            },
            cancer: CancerInfo {
                cancer_type: opt_string(&col(&cells, 4)),
                stage: opt_string(&col(&cells, 5)),
            },
            care: CareInfo {
                last_visit: parse_date(&col(&cells, 10)),
                next_visit: parse_date(&col(&cells, 11)),
                status: opt_string(&col(&cells, 12)),
            },
            flags: compute_flags(diagnosis_date, treatment_start_date, today),
            notes: opt_string(&col(&cells, 13)),
            meta: Default::default(),
        });
    }

    Ok(patients)
}

/// Pick the candidate delimiter that occurs most often in the header.
fn detect_delimiter(header: &str) -> char {
    [';', ',', '\t']
        .into_iter()
        .map(|c| (header.matches(c).count(), c))
        .max_by_key(|(count, _)| *count)
        .filter(|(count, _)| *count > 0)
        .map(|(_, c)| c)
        .unwrap_or(',')
}

/// Split one CSV line, honoring double-quoted cells and `""` escapes.
fn split_line(line: &str, delimiter: char) -> Vec<String> {
    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    cell.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' if cell.is_empty() => in_quotes = true,
            c if c == delimiter && !in_quotes => {
                cells.push(std::mem::take(&mut cell));
            }
            c => cell.push(c),
        }
    }
    cells.push(cell);
    cells
}

fn parse_date(cell: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(cell.trim(), DATE_FORMAT).ok()
}

fn opt_string(cell: &str) -> Option<String> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
