//! # cardiorisk
//!
//! Deterministic cardiovascular risk scoring.
//!
//! This crate provides:
//! - An additive, threshold-based rule engine that turns clinical measurements
//!   into a capped risk score, a risk band and an ordered contribution trace
//! - Rule tables as data, with two named presets and JSON loading
//! - Presentation series for dashboards (age curve, blood pressure categories)
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Pure scoring types and logic (PatientInput, RiskScorer, rules)
//! - `ports`: Trait definitions for external operations
//! - `adapters`: Concrete implementations (presets, JSON files, log redaction)
//! - `application`: Use cases orchestrating validation, scoring and logging
//! - `config`: Environment-driven configuration

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

pub use domain::{PatientInput, RiskAssessment, RiskBand, RiskScorer};

/// Result type for cardiorisk operations
pub type Result<T> = std::result::Result<T, CardioriskError>;

/// Main error type for cardiorisk
#[derive(Debug, thiserror::Error)]
pub enum CardioriskError {
    #[error("Invalid patient input: {}", join_violations(.0))]
    InvalidInput(Vec<domain::DomainViolation>),

    #[error("Value out of range: {0}")]
    Domain(#[from] domain::DomainViolation),

    #[error("Risk model error: {0}")]
    Model(#[from] domain::ModelError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn join_violations(violations: &[domain::DomainViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
