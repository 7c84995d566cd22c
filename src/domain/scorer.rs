//! Rule-table interpreter.

use std::ops::Range;
use std::sync::Arc;

use super::assessment::{Contribution, RiskAssessment, RiskBand};
use super::charts::{AgeCurve, AgeRiskPoint, BloodPressureCategory};
use super::patient::{DomainViolation, PatientInput};
use super::rules::{RiskFactorModel, Weight};

/// Highest score an assessment can report.
pub const SCORE_CAP: Weight = Weight::from_bps(9500);

/// Scores patients against one rule table.
///
/// Holds no mutable state; clones share the table and can be used from any
/// number of threads at once.
#[derive(Debug, Clone)]
pub struct RiskScorer {
    model: Arc<RiskFactorModel>,
    age_curve: AgeCurve,
}

impl RiskScorer {
    #[must_use]
    pub fn new(model: RiskFactorModel) -> Self {
        Self {
            model: Arc::new(model),
            age_curve: AgeCurve::default(),
        }
    }

    /// Replace the presentation curve parameters.
    #[must_use]
    pub fn with_age_curve(mut self, age_curve: AgeCurve) -> Self {
        self.age_curve = age_curve;
        self
    }

    #[must_use]
    pub fn model(&self) -> &RiskFactorModel {
        &self.model
    }

    /// Score a patient.
    ///
    /// Every rule is tried in table order; fired rules are summed and the
    /// total is capped at [`SCORE_CAP`]. The input must already satisfy
    /// [`PatientInput::validate`].
    #[must_use]
    pub fn evaluate(&self, input: &PatientInput) -> RiskAssessment {
        let contributions: Vec<Contribution> = self
            .model
            .rules
            .iter()
            .filter(|rule| rule.applies(input))
            .map(|rule| Contribution {
                factor: rule.factor,
                weight: rule.weight,
            })
            .collect();

        let total = contributions
            .iter()
            .fold(0u32, |acc, c| acc.saturating_add(c.weight.bps()));
        let score = Weight::from_bps(total.min(SCORE_CAP.bps())).as_f64();

        RiskAssessment {
            score,
            band: RiskBand::from_score(score),
            contributions,
        }
    }

    /// Sample the age curve for charting.
    ///
    /// # Errors
    /// Returns a `DomainViolation` for a zero step or ages outside [20, 100].
    pub fn age_risk_curve(
        &self,
        ages: Range<u8>,
        step: u8,
    ) -> Result<Vec<AgeRiskPoint>, DomainViolation> {
        self.age_curve.sample(ages, step)
    }

    /// Category of a systolic reading.
    ///
    /// # Errors
    /// Returns a `DomainViolation` outside [90, 200].
    pub fn blood_pressure_category(&self, bp: u16) -> Result<BloodPressureCategory, DomainViolation> {
        BloodPressureCategory::from_systolic(bp)
    }
}
