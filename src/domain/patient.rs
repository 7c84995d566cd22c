//! Patient input types for cardiovascular risk scoring.
//!
//! Field names and ordinal encodings follow the dashboard intake form
//! (chest pain 0-3, thalassemia 0-2).

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single field outside its declared domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{field} = {value} out of range [{expected}]")]
pub struct DomainViolation {
    /// Field name as it appears in the intake form
    pub field: &'static str,
    /// Offending value, rendered for display
    pub value: String,
    /// Human-readable description of the valid domain
    pub expected: &'static str,
}

impl DomainViolation {
    #[must_use]
    pub fn new(field: &'static str, value: impl fmt::Display, expected: &'static str) -> Self {
        Self {
            field,
            value: value.to_string(),
            expected,
        }
    }
}

/// Biological sex as collected by the intake form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    /// Form encoding: male = 1, female = 0.
    #[must_use]
    pub fn ordinal(self) -> u8 {
        match self {
            Self::Male => 1,
            Self::Female => 0,
        }
    }

    /// Decode the form ordinal.
    ///
    /// # Errors
    /// Returns a `DomainViolation` for codes other than 0 and 1.
    pub fn from_ordinal(code: u8) -> Result<Self, DomainViolation> {
        match code {
            0 => Ok(Self::Female),
            1 => Ok(Self::Male),
            _ => Err(DomainViolation::new("sex", code, "0, 1")),
        }
    }
}

/// Chest pain classification, ordinal 0-3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChestPainType {
    /// Typical angina (0)
    Typical,
    /// Atypical angina (1)
    Atypical,
    /// Non-anginal pain (2)
    NonAnginal,
    /// Asymptomatic (3)
    Asymptomatic,
}

impl ChestPainType {
    pub const COUNT: u8 = 4;

    #[must_use]
    pub fn ordinal(self) -> u8 {
        match self {
            Self::Typical => 0,
            Self::Atypical => 1,
            Self::NonAnginal => 2,
            Self::Asymptomatic => 3,
        }
    }

    /// Decode the form ordinal.
    ///
    /// # Errors
    /// Returns a `DomainViolation` for codes above 3.
    pub fn from_ordinal(code: u8) -> Result<Self, DomainViolation> {
        match code {
            0 => Ok(Self::Typical),
            1 => Ok(Self::Atypical),
            2 => Ok(Self::NonAnginal),
            3 => Ok(Self::Asymptomatic),
            _ => Err(DomainViolation::new("chestPainType", code, "0, 3")),
        }
    }
}

/// Thalassemia result, ordinal 0-2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Thalassemia {
    Normal,
    FixedDefect,
    ReversibleDefect,
}

impl Thalassemia {
    pub const COUNT: u8 = 3;

    #[must_use]
    pub fn ordinal(self) -> u8 {
        match self {
            Self::Normal => 0,
            Self::FixedDefect => 1,
            Self::ReversibleDefect => 2,
        }
    }

    /// Decode the form ordinal.
    ///
    /// # Errors
    /// Returns a `DomainViolation` for codes above 2.
    pub fn from_ordinal(code: u8) -> Result<Self, DomainViolation> {
        match code {
            0 => Ok(Self::Normal),
            1 => Ok(Self::FixedDefect),
            2 => Ok(Self::ReversibleDefect),
            _ => Err(DomainViolation::new("thalassemia", code, "0, 2")),
        }
    }
}

/// Clinical measurements for one assessment.
///
/// Constructed once per request and never mutated. The scoring engine assumes
/// [`PatientInput::validate`] has passed; it does not clamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientInput {
    /// Age in years, [20, 100]
    pub age: u8,

    pub sex: Sex,

    /// Resting systolic blood pressure in mmHg, [80, 200]
    pub resting_blood_pressure: u16,

    /// Serum cholesterol in mg/dl, [100, 600]
    pub cholesterol: u16,

    /// Maximum heart rate achieved in bpm, [60, 220]
    pub max_heart_rate: u16,

    pub chest_pain_type: ChestPainType,

    /// Fasting blood sugar above 120 mg/dl
    pub fasting_blood_sugar_high: bool,

    pub exercise_induced_angina: bool,

    /// Exercise-induced ST depression in mm, [0.0, 6.0]
    pub st_depression: f64,

    /// Major vessels colored by fluoroscopy, [0, 3]
    pub major_vessels: u8,

    pub thalassemia: Thalassemia,
}

pub const AGE_RANGE: (u8, u8) = (20, 100);
pub const BLOOD_PRESSURE_RANGE: (u16, u16) = (80, 200);
pub const CHOLESTEROL_RANGE: (u16, u16) = (100, 600);
pub const MAX_HEART_RATE_RANGE: (u16, u16) = (60, 220);
pub const ST_DEPRESSION_RANGE: (f64, f64) = (0.0, 6.0);
pub const MAJOR_VESSELS_MAX: u8 = 3;

impl PatientInput {
    /// Check every field against its domain.
    ///
    /// All violations are collected so the intake layer can report them at once.
    ///
    /// # Errors
    /// Returns the list of violating fields.
    pub fn validate(&self) -> Result<(), Vec<DomainViolation>> {
        let mut errors = Vec::new();

        if !(AGE_RANGE.0..=AGE_RANGE.1).contains(&self.age) {
            errors.push(DomainViolation::new("age", self.age, "20, 100"));
        }
        if !(BLOOD_PRESSURE_RANGE.0..=BLOOD_PRESSURE_RANGE.1)
            .contains(&self.resting_blood_pressure)
        {
            errors.push(DomainViolation::new(
                "restingBloodPressure",
                self.resting_blood_pressure,
                "80, 200",
            ));
        }
        if !(CHOLESTEROL_RANGE.0..=CHOLESTEROL_RANGE.1).contains(&self.cholesterol) {
            errors.push(DomainViolation::new(
                "cholesterol",
                self.cholesterol,
                "100, 600",
            ));
        }
        if !(MAX_HEART_RATE_RANGE.0..=MAX_HEART_RATE_RANGE.1).contains(&self.max_heart_rate) {
            errors.push(DomainViolation::new(
                "maxHeartRate",
                self.max_heart_rate,
                "60, 220",
            ));
        }
        // NaN fails `contains`, which is what we want.
        if !(ST_DEPRESSION_RANGE.0..=ST_DEPRESSION_RANGE.1).contains(&self.st_depression) {
            errors.push(DomainViolation::new(
                "stDepression",
                self.st_depression,
                "0.0, 6.0",
            ));
        }
        if self.major_vessels > MAJOR_VESSELS_MAX {
            errors.push(DomainViolation::new(
                "majorVessels",
                self.major_vessels,
                "0, 3",
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
