//! Jornada — oncology patient-journey backend.
//!
//! Loads a patient roster from a CSV snapshot into an in-memory store,
//! exposes it over an axum HTTP API, computes journey-delay flags and
//! forwards free-text patient messages to an LLM for structured clinical
//! triage (symptoms, relevant points, suggested questions, urgency).

pub mod api;
pub mod config;
pub mod roster;
pub mod summary;
