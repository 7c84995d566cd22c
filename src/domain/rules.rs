//! Risk factor rule tables.
//!
//! A [`RiskFactorModel`] is plain data: an ordered list of tagged rules
//! (factor, comparison, weight) that a single interpreter evaluates. The two
//! rule sets used by the dashboard are available as named presets and ship as
//! JSON under `models/`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::patient::{ChestPainType, PatientInput, Thalassemia};

/// Basis points per unit weight.
const BPS_PER_UNIT: u32 = 10_000;

/// Errors raised while building or loading a rule table.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error("Invalid weight {0}: must be finite and within [0, 1]")]
    InvalidWeight(f64),

    #[error("Rule table has no name")]
    MissingName,

    #[error("Rule table '{0}' has no rules")]
    EmptyModel(String),

    #[error("Rule {index} ({factor}): {reason}")]
    InvalidRule {
        index: usize,
        factor: Factor,
        reason: String,
    },

    #[error("Unknown model preset '{0}' (expected one of: dashboard, heart-rate-adjusted)")]
    UnknownPreset(String),

    #[error("Failed to read rule table: {0}")]
    Io(String),

    #[error("Invalid rule table format: {0}")]
    Format(String),
}

/// A rule weight, held as integer basis points so that sums and band
/// boundaries are exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Weight(u32);

impl Weight {
    pub const ZERO: Self = Self(0);

    #[must_use]
    pub const fn from_bps(bps: u32) -> Self {
        Self(bps)
    }

    #[must_use]
    pub const fn bps(self) -> u32 {
        self.0
    }

    #[must_use]
    pub fn as_f64(self) -> f64 {
        f64::from(self.0) / f64::from(BPS_PER_UNIT)
    }
}

impl TryFrom<f64> for Weight {
    type Error = ModelError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(ModelError::InvalidWeight(value));
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let bps = (value * f64::from(BPS_PER_UNIT)).round() as u32;
        Ok(Self(bps))
    }
}

impl From<Weight> for f64 {
    fn from(weight: Weight) -> Self {
        weight.as_f64()
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.as_f64())
    }
}

/// Clinical factor a rule reads from [`PatientInput`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Factor {
    Age,
    Sex,
    BloodPressure,
    Cholesterol,
    ChestPainType,
    FastingBloodSugarHigh,
    ExerciseInducedAngina,
    StDepression,
    MajorVessels,
    Thalassemia,
    MaxHeartRate,
}

/// Shape of the value a factor yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasureKind {
    Numeric,
    /// Categorical with ordinals `0..cardinality`
    Ordinal { cardinality: u8 },
    Flag,
}

/// Value read from a patient for one factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Measure {
    Numeric(f64),
    Ordinal(u8),
    Flag(bool),
}

impl Factor {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Age => "age",
            Self::Sex => "sex",
            Self::BloodPressure => "bloodPressure",
            Self::Cholesterol => "cholesterol",
            Self::ChestPainType => "chestPainType",
            Self::FastingBloodSugarHigh => "fastingBloodSugarHigh",
            Self::ExerciseInducedAngina => "exerciseInducedAngina",
            Self::StDepression => "stDepression",
            Self::MajorVessels => "majorVessels",
            Self::Thalassemia => "thalassemia",
            Self::MaxHeartRate => "maxHeartRate",
        }
    }

    #[must_use]
    pub fn kind(self) -> MeasureKind {
        match self {
            Self::Age
            | Self::BloodPressure
            | Self::Cholesterol
            | Self::StDepression
            | Self::MajorVessels
            | Self::MaxHeartRate => MeasureKind::Numeric,
            Self::Sex => MeasureKind::Ordinal { cardinality: 2 },
            Self::ChestPainType => MeasureKind::Ordinal {
                cardinality: ChestPainType::COUNT,
            },
            Self::Thalassemia => MeasureKind::Ordinal {
                cardinality: Thalassemia::COUNT,
            },
            Self::FastingBloodSugarHigh | Self::ExerciseInducedAngina => MeasureKind::Flag,
        }
    }

    /// Read this factor from a patient.
    #[must_use]
    pub fn measure(self, input: &PatientInput) -> Measure {
        match self {
            Self::Age => Measure::Numeric(f64::from(input.age)),
            Self::Sex => Measure::Ordinal(input.sex.ordinal()),
            Self::BloodPressure => Measure::Numeric(f64::from(input.resting_blood_pressure)),
            Self::Cholesterol => Measure::Numeric(f64::from(input.cholesterol)),
            Self::ChestPainType => Measure::Ordinal(input.chest_pain_type.ordinal()),
            Self::FastingBloodSugarHigh => Measure::Flag(input.fasting_blood_sugar_high),
            Self::ExerciseInducedAngina => Measure::Flag(input.exercise_induced_angina),
            Self::StDepression => Measure::Numeric(input.st_depression),
            Self::MajorVessels => Measure::Numeric(f64::from(input.major_vessels)),
            Self::Thalassemia => Measure::Ordinal(input.thalassemia.ordinal()),
            Self::MaxHeartRate => Measure::Numeric(f64::from(input.max_heart_rate)),
        }
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Condition under which a rule fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Comparison {
    /// value > threshold
    Above(f64),
    /// value < threshold
    Below(f64),
    /// above < value <= at_most
    Within {
        above: f64,
        #[serde(rename = "atMost")]
        at_most: f64,
    },
    /// ordinal is one of the listed codes
    AnyOf(Vec<u8>),
    /// flag is set
    Flagged,
}

impl Comparison {
    /// Evaluate against a measured value. A kind mismatch never fires.
    #[must_use]
    pub fn matches(&self, measure: Measure) -> bool {
        match (self, measure) {
            (Self::Above(t), Measure::Numeric(v)) => v > *t,
            (Self::Below(t), Measure::Numeric(v)) => v < *t,
            (Self::Within { above, at_most }, Measure::Numeric(v)) => v > *above && v <= *at_most,
            (Self::AnyOf(codes), Measure::Ordinal(o)) => codes.contains(&o),
            (Self::Flagged, Measure::Flag(set)) => set,
            _ => false,
        }
    }

    fn check_against(&self, kind: MeasureKind) -> Result<(), String> {
        match (self, kind) {
            (Self::Above(t) | Self::Below(t), MeasureKind::Numeric) => {
                if t.is_finite() {
                    Ok(())
                } else {
                    Err(format!("threshold {t} is not finite"))
                }
            }
            (Self::Within { above, at_most }, MeasureKind::Numeric) => {
                if !above.is_finite() || !at_most.is_finite() {
                    Err("bounds must be finite".to_string())
                } else if above >= at_most {
                    Err(format!("empty interval ({above}, {at_most}]"))
                } else {
                    Ok(())
                }
            }
            (Self::AnyOf(codes), MeasureKind::Ordinal { cardinality }) => {
                if codes.is_empty() {
                    Err("anyOf needs at least one code".to_string())
                } else if let Some(bad) = codes.iter().find(|&&c| c >= cardinality) {
                    Err(format!("code {bad} outside 0..{cardinality}"))
                } else {
                    Ok(())
                }
            }
            (Self::Flagged, MeasureKind::Flag) => Ok(()),
            (_, kind) => Err(format!("comparison {self:?} does not apply to {kind:?} values")),
        }
    }
}

/// One entry of a rule table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub factor: Factor,
    pub when: Comparison,
    pub weight: Weight,
}

impl Rule {
    #[must_use]
    pub fn new(factor: Factor, when: Comparison, weight: Weight) -> Self {
        Self {
            factor,
            when,
            weight,
        }
    }

    /// Whether this rule fires for the patient.
    #[must_use]
    pub fn applies(&self, input: &PatientInput) -> bool {
        self.when.matches(self.factor.measure(input))
    }
}

/// Built-in rule sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelPreset {
    /// Age > 55 weighs 0.20; heart rate is not scored.
    Dashboard,
    /// Age > 55 weighs 0.15; low and very high max heart rate are scored.
    HeartRateAdjusted,
}

impl ModelPreset {
    pub const ALL: [Self; 2] = [Self::Dashboard, Self::HeartRateAdjusted];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::HeartRateAdjusted => "heart-rate-adjusted",
        }
    }
}

impl fmt::Display for ModelPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModelPreset {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ModelError::UnknownPreset(s.to_string()))
    }
}

/// An ordered, named rule table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactorModel {
    pub name: String,
    pub rules: Vec<Rule>,
}

impl RiskFactorModel {
    /// Build and validate a rule table.
    ///
    /// # Errors
    /// Returns `ModelError` if the table is empty or a rule is malformed.
    pub fn new(name: impl Into<String>, rules: Vec<Rule>) -> Result<Self, ModelError> {
        let model = Self {
            name: name.into(),
            rules,
        };
        model.validate()?;
        Ok(model)
    }

    /// Instantiate a built-in preset.
    #[must_use]
    pub fn preset(preset: ModelPreset) -> Self {
        use Comparison::{Above, AnyOf, Below, Flagged, Within};

        let w = Weight::from_bps;
        let older_age_weight = match preset {
            ModelPreset::Dashboard => w(2000),
            ModelPreset::HeartRateAdjusted => w(1500),
        };

        let mut rules = vec![
            Rule::new(Factor::Age, Above(55.0), older_age_weight),
            Rule::new(Factor::Age, Within { above: 45.0, at_most: 55.0 }, w(1000)),
            Rule::new(Factor::BloodPressure, Above(140.0), w(1500)),
            Rule::new(Factor::BloodPressure, Within { above: 130.0, at_most: 140.0 }, w(1000)),
            Rule::new(Factor::Cholesterol, Above(240.0), w(1500)),
            Rule::new(Factor::Cholesterol, Within { above: 200.0, at_most: 240.0 }, w(1000)),
            Rule::new(
                Factor::ChestPainType,
                AnyOf(vec![
                    ChestPainType::Atypical.ordinal(),
                    ChestPainType::NonAnginal.ordinal(),
                ]),
                w(1000),
            ),
            Rule::new(Factor::FastingBloodSugarHigh, Flagged, w(1000)),
            Rule::new(Factor::ExerciseInducedAngina, Flagged, w(1000)),
            Rule::new(Factor::StDepression, Above(1.0), w(1000)),
            Rule::new(Factor::MajorVessels, Above(0.0), w(1000)),
            Rule::new(
                Factor::Thalassemia,
                AnyOf(vec![
                    Thalassemia::FixedDefect.ordinal(),
                    Thalassemia::ReversibleDefect.ordinal(),
                ]),
                w(1000),
            ),
        ];

        if preset == ModelPreset::HeartRateAdjusted {
            rules.push(Rule::new(Factor::MaxHeartRate, Below(120.0), w(1000)));
            rules.push(Rule::new(Factor::MaxHeartRate, Above(180.0), w(500)));
        }

        Self {
            name: preset.name().to_string(),
            rules,
        }
    }

    /// Check structural soundness of the table.
    ///
    /// # Errors
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.name.trim().is_empty() {
            return Err(ModelError::MissingName);
        }
        if self.rules.is_empty() {
            return Err(ModelError::EmptyModel(self.name.clone()));
        }
        for (index, rule) in self.rules.iter().enumerate() {
            if rule.weight.bps() > BPS_PER_UNIT {
                return Err(ModelError::InvalidWeight(rule.weight.as_f64()));
            }
            rule.when
                .check_against(rule.factor.kind())
                .map_err(|reason| ModelError::InvalidRule {
                    index,
                    factor: rule.factor,
                    reason,
                })?;
        }
        Ok(())
    }

    /// Parse and validate a JSON rule table.
    ///
    /// # Errors
    /// Returns `ModelError::Format` for malformed JSON, or a validation error.
    pub fn from_json(bytes: &[u8]) -> Result<Self, ModelError> {
        let model: Self =
            serde_json::from_slice(bytes).map_err(|e| ModelError::Format(e.to_string()))?;
        model.validate()?;
        Ok(model)
    }

    /// SHA-256 over the canonical JSON encoding, hex encoded.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        // Serializing plain data with string keys cannot fail.
        let canonical = serde_json::to_vec(self).unwrap_or_default();
        Sha256::digest(&canonical)
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect()
    }

    /// Check the table against a pinned fingerprint (hex, case-insensitive).
    ///
    /// # Errors
    /// Returns `ModelError::Format` on mismatch.
    pub fn verify_fingerprint(&self, expected: &str) -> Result<(), ModelError> {
        let expected = expected.trim().to_ascii_lowercase();
        let actual = self.fingerprint();
        if expected != actual {
            return Err(ModelError::Format(format!(
                "fingerprint mismatch: expected {expected}, got {actual}"
            )));
        }
        Ok(())
    }
}
