//! Assessment service: Orchestrates validated risk scoring.
//!
//! This service coordinates:
//! - Rule table loading
//! - Input validation
//! - Scoring
//! - Record assembly for the presentation layer

use std::ops::Range;

use crate::config::Config;
use crate::domain::{AgeCurve, AgeRiskPoint, PatientInput, RiskScorer};
use crate::ports::ModelSource;
use crate::{CardioriskError, Result};

use super::AssessmentRecord;

/// Service for running risk assessments.
///
/// Cheap to clone; clones share the loaded rule table.
#[derive(Debug, Clone)]
pub struct AssessmentService {
    scorer: RiskScorer,
    fingerprint: String,
}

impl AssessmentService {
    /// Create a service around an already-built scorer.
    #[must_use]
    pub fn new(scorer: RiskScorer) -> Self {
        let fingerprint = scorer.model().fingerprint();
        Self {
            scorer,
            fingerprint,
        }
    }

    /// Load a rule table from `source` and build a service for it.
    ///
    /// # Errors
    /// Returns error if the rule table cannot be loaded.
    pub fn from_source<M>(source: &M, age_curve: AgeCurve) -> Result<Self>
    where
        M: ModelSource + ?Sized,
    {
        tracing::info!("Loading risk model from {}", source.describe());
        let model = source.load()?;
        let service = Self::new(RiskScorer::new(model).with_age_curve(age_curve));

        tracing::info!(
            "Risk model ready: name={}, rules={}, fingerprint={}",
            service.scorer.model().name,
            service.scorer.model().rules.len(),
            service.fingerprint
        );
        Ok(service)
    }

    /// Build a service from configuration.
    ///
    /// # Errors
    /// Returns error if no rule table is configured or it cannot be loaded.
    pub fn from_config(config: &Config) -> Result<Self> {
        let source = config.model_source()?;
        Self::from_source(source.as_ref(), config.age_curve)
    }

    #[must_use]
    pub fn scorer(&self) -> &RiskScorer {
        &self.scorer
    }

    #[must_use]
    pub fn model_fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Validate and score one patient.
    ///
    /// # Errors
    /// Returns `CardioriskError::InvalidInput` listing every out-of-range field.
    pub fn assess(&self, input: PatientInput) -> Result<AssessmentRecord> {
        if let Err(violations) = input.validate() {
            tracing::warn!(
                "Rejected patient input: {} field(s) out of range",
                violations.len()
            );
            return Err(CardioriskError::InvalidInput(violations));
        }

        let assessment = self.scorer.evaluate(&input);
        let record = AssessmentRecord::new(
            input,
            assessment,
            self.scorer.model().name.clone(),
            self.fingerprint.clone(),
        );

        tracing::debug!("Assessment {} recorded", record.id);
        tracing::info!(
            "Assessment complete: score={:.2}, band={}, contributions={}",
            record.assessment.score,
            record.assessment.band,
            record.assessment.contributions.len()
        );

        Ok(record)
    }

    /// Age curve samples for charting.
    ///
    /// # Errors
    /// Returns `CardioriskError::Domain` for a zero step or ages outside [20, 100].
    pub fn age_risk_curve(&self, ages: Range<u8>, step: u8) -> Result<Vec<AgeRiskPoint>> {
        Ok(self.scorer.age_risk_curve(ages, step)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::PresetSource;
    use crate::config::ModelSelection;
    use crate::domain::{
        BloodPressureCategory, ChestPainType, ModelPreset, RiskBand, Sex, Thalassemia,
    };

    fn create_test_service(preset: ModelPreset) -> AssessmentService {
        AssessmentService::from_source(&PresetSource::new(preset), AgeCurve::default())
            .expect("preset should load")
    }

    fn patient() -> PatientInput {
        PatientInput {
            age: 58,
            sex: Sex::Male,
            resting_blood_pressure: 142,
            cholesterol: 230,
            max_heart_rate: 150,
            chest_pain_type: ChestPainType::Typical,
            fasting_blood_sugar_high: false,
            exercise_induced_angina: true,
            st_depression: 0.5,
            major_vessels: 0,
            thalassemia: Thalassemia::Normal,
        }
    }

    #[test]
    fn test_assessment_pipeline() {
        let service = create_test_service(ModelPreset::Dashboard);
        let record = service.assess(patient()).expect("should assess");

        // 0.20 age + 0.15 bp + 0.10 cholesterol + 0.10 angina
        assert_eq!(record.assessment.score, 0.55);
        assert_eq!(record.band(), RiskBand::Moderate);
        assert_eq!(
            record.blood_pressure_category,
            Some(BloodPressureCategory::HypertensionStage2)
        );
        assert_eq!(record.model_name, "dashboard");
        assert_eq!(record.model_fingerprint, service.model_fingerprint());
        assert_eq!(
            record.recommendation(),
            "Consider lifestyle changes and regular health checkups."
        );
    }

    #[test]
    fn test_presets_disagree_on_older_patients() {
        let dashboard = create_test_service(ModelPreset::Dashboard)
            .assess(patient())
            .expect("should assess");
        let adjusted = create_test_service(ModelPreset::HeartRateAdjusted)
            .assess(patient())
            .expect("should assess");

        assert_eq!(adjusted.assessment.score, 0.5);
        assert!(dashboard.assessment.score > adjusted.assessment.score);
        assert_ne!(dashboard.model_fingerprint, adjusted.model_fingerprint);
    }

    #[test]
    fn test_invalid_input_is_rejected() {
        let service = create_test_service(ModelPreset::Dashboard);
        let err = service
            .assess(PatientInput {
                age: 15,
                cholesterol: 700,
                ..patient()
            })
            .expect_err("should reject");

        match err {
            CardioriskError::InvalidInput(violations) => {
                assert_eq!(violations.len(), 2);
                assert_eq!(violations[0].field, "age");
                assert_eq!(violations[1].field, "cholesterol");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_low_bp_has_no_chart_category() {
        let service = create_test_service(ModelPreset::Dashboard);
        let record = service
            .assess(PatientInput {
                resting_blood_pressure: 85,
                ..patient()
            })
            .expect("85 mmHg is a valid reading");
        assert_eq!(record.blood_pressure_category, None);
    }

    #[test]
    fn test_records_get_distinct_ids() {
        let service = create_test_service(ModelPreset::Dashboard);
        let first = service.assess(patient()).expect("should assess");
        let second = service.assess(patient()).expect("should assess");

        assert_ne!(first.id, second.id);
        assert_eq!(first.assessment, second.assessment);
    }

    #[test]
    fn test_from_config_requires_model() {
        let config = Config::from_lookup(|_| None).expect("defaults");
        assert!(matches!(
            AssessmentService::from_config(&config),
            Err(CardioriskError::Config(_))
        ));

        let config = config.with_model(ModelSelection::Preset(ModelPreset::HeartRateAdjusted));
        let service = AssessmentService::from_config(&config).expect("should build");
        assert_eq!(service.scorer().model().name, "heart-rate-adjusted");
    }

    #[test]
    fn test_age_curve_errors_surface_as_domain_errors() {
        let service = create_test_service(ModelPreset::Dashboard);
        assert_eq!(service.age_risk_curve(20..80, 5).map(|p| p.len()).ok(), Some(12));
        assert!(matches!(
            service.age_risk_curve(20..80, 0),
            Err(CardioriskError::Domain(_))
        ));
    }
}
