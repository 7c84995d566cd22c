//! Presentation series derived for the dashboard charts.
//!
//! These constants are display aids, not clinical weights; they never feed
//! into the rule table.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use super::patient::{DomainViolation, AGE_RANGE};

/// Blood pressure category bands (systolic, mmHg).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BloodPressureCategory {
    Normal,
    Elevated,
    HypertensionStage1,
    HypertensionStage2,
    Crisis,
}

impl BloodPressureCategory {
    pub const ALL: [Self; 5] = [
        Self::Normal,
        Self::Elevated,
        Self::HypertensionStage1,
        Self::HypertensionStage2,
        Self::Crisis,
    ];

    /// `[low, high)` bar extent; the crisis band also includes its upper bound.
    #[must_use]
    pub fn bounds(self) -> (u16, u16) {
        match self {
            Self::Normal => (90, 120),
            Self::Elevated => (120, 130),
            Self::HypertensionStage1 => (130, 140),
            Self::HypertensionStage2 => (140, 180),
            Self::Crisis => (180, 200),
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Elevated => "Elevated",
            Self::HypertensionStage1 => "High Stage 1",
            Self::HypertensionStage2 => "High Stage 2",
            Self::Crisis => "Crisis",
        }
    }

    /// Bar color (RGB).
    #[must_use]
    pub fn color(self) -> (u8, u8, u8) {
        match self {
            Self::Normal => (0, 128, 0),
            Self::Elevated => (255, 255, 0),
            Self::HypertensionStage1 => (255, 165, 0),
            Self::HypertensionStage2 => (255, 0, 0),
            Self::Crisis => (139, 0, 0),
        }
    }

    /// Look up the category of a systolic reading.
    ///
    /// # Errors
    /// Returns a `DomainViolation` outside [90, 200].
    pub fn from_systolic(bp: u16) -> Result<Self, DomainViolation> {
        let (floor, _) = Self::Normal.bounds();
        let (_, ceiling) = Self::Crisis.bounds();
        if bp == ceiling {
            return Ok(Self::Crisis);
        }
        if bp < floor || bp > ceiling {
            return Err(DomainViolation::new("bloodPressure", bp, "90, 200"));
        }
        Self::ALL
            .into_iter()
            .find(|c| {
                let (low, high) = c.bounds();
                (low..high).contains(&bp)
            })
            .ok_or_else(|| DomainViolation::new("bloodPressure", bp, "90, 200"))
    }
}

impl std::fmt::Display for BloodPressureCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One sample of the age curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeRiskPoint {
    pub age: u8,
    pub relative_risk: f64,
}

/// Parameters of the illustrative age-vs-risk curve:
/// `min(cap, (age - 20) / 60 * scale_factor)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeCurve {
    pub cap: f64,
    pub scale_factor: f64,
}

impl Default for AgeCurve {
    fn default() -> Self {
        Self {
            cap: 0.9,
            scale_factor: 0.7,
        }
    }
}

impl AgeCurve {
    const ORIGIN_AGE: f64 = 20.0;
    const SPAN_YEARS: f64 = 60.0;

    #[must_use]
    pub fn relative_risk(&self, age: u8) -> f64 {
        ((f64::from(age) - Self::ORIGIN_AGE) / Self::SPAN_YEARS * self.scale_factor).min(self.cap)
    }

    /// Sample the curve over `ages` (end exclusive) every `step` years.
    ///
    /// # Errors
    /// Returns a `DomainViolation` for a zero step or ages outside [20, 100].
    pub fn sample(&self, ages: Range<u8>, step: u8) -> Result<Vec<AgeRiskPoint>, DomainViolation> {
        if step == 0 {
            return Err(DomainViolation::new("step", step, "1, 255"));
        }
        if ages.start < AGE_RANGE.0 {
            return Err(DomainViolation::new("ageRange.start", ages.start, "20, 100"));
        }
        if ages.end > AGE_RANGE.1 + 1 {
            return Err(DomainViolation::new("ageRange.end", ages.end, "20, 101"));
        }

        Ok(ages
            .step_by(usize::from(step))
            .map(|age| AgeRiskPoint {
                age,
                relative_risk: self.relative_risk(age),
            })
            .collect())
    }
}
