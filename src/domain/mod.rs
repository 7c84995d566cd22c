//! Domain layer: Core scoring types and logic.
//!
//! Everything here is a pure function of its arguments. No logging, no I/O,
//! no ambient state.

mod assessment;
mod charts;
mod patient;
mod rules;
mod scorer;

pub use assessment::{Contribution, RiskAssessment, RiskBand, GAUGE_SPAN};
pub use charts::{AgeCurve, AgeRiskPoint, BloodPressureCategory};
pub use patient::{ChestPainType, DomainViolation, PatientInput, Sex, Thalassemia};
pub use rules::{
    Comparison, Factor, Measure, MeasureKind, ModelError, ModelPreset, RiskFactorModel, Rule,
    Weight,
};
pub use scorer::{RiskScorer, SCORE_CAP};
