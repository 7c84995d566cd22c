//! Risk assessment result types.
//!
//! Represents the output of one rule-table evaluation.

use serde::{Deserialize, Serialize};

use super::rules::{Factor, Weight};

/// Upper bound of the gauge axis the dashboard draws the score on.
pub const GAUGE_SPAN: f64 = 0.9;

/// Risk band classification for heart disease.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RiskBand {
    /// Score at or below 0.3
    Low,
    /// Score above 0.3, at or below 0.7
    Moderate,
    /// Score above 0.7
    High,
}

impl RiskBand {
    pub const MODERATE_ABOVE: f64 = 0.3;
    pub const HIGH_ABOVE: f64 = 0.7;

    /// Classify a score. Both boundaries are exclusive.
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score > Self::HIGH_ABOVE {
            Self::High
        } else if score > Self::MODERATE_ABOVE {
            Self::Moderate
        } else {
            Self::Low
        }
    }

    /// Short explanation of the band for the result card.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Low => "Few weighted risk factors present",
            Self::Moderate => "Several weighted risk factors present",
            Self::High => "Many weighted risk factors present, score near the cap",
        }
    }

    /// Canned guidance shown next to the result.
    #[must_use]
    pub fn recommendation(&self) -> &'static str {
        match self {
            Self::Low => "Maintain your healthy lifestyle!",
            Self::Moderate => "Consider lifestyle changes and regular health checkups.",
            Self::High => "Please consult with a healthcare professional immediately.",
        }
    }

    /// Display color (RGB).
    #[must_use]
    pub fn color(&self) -> (u8, u8, u8) {
        match self {
            Self::Low => (16, 185, 129),      // Emerald (#10B981)
            Self::Moderate => (251, 191, 36), // Amber (#FBBF24)
            Self::High => (244, 63, 94),      // Rose (#F43F5E)
        }
    }
}

impl std::fmt::Display for RiskBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Moderate => write!(f, "MODERATE"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

/// Weight one fired rule added to the total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contribution {
    pub factor: Factor,
    pub weight: Weight,
}

/// Result of scoring one patient.
///
/// Never mutated after construction. `contributions` lists fired rules in
/// rule-table order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Capped score in [0.0, 0.95]
    pub score: f64,

    pub band: RiskBand,

    pub contributions: Vec<Contribution>,
}

impl RiskAssessment {
    /// Sum of all contributions before the cap.
    #[must_use]
    pub fn uncapped_total(&self) -> Weight {
        Weight::from_bps(self.contributions.iter().map(|c| c.weight.bps()).sum())
    }

    /// Score as a percentage.
    #[must_use]
    pub fn percent(&self) -> f64 {
        self.score * 100.0
    }

    /// Marker position on the gauge axis.
    #[must_use]
    pub fn gauge_position(&self) -> f64 {
        self.score * GAUGE_SPAN
    }

    /// One-line summary, e.g. `HIGH RISK: 95.0% probability of heart disease`.
    #[must_use]
    pub fn headline(&self) -> String {
        format!(
            "{} RISK: {:.1}% probability of heart disease",
            self.band,
            self.percent()
        )
    }

    /// Weight contributed by `factor`, zero if none of its rules fired.
    #[must_use]
    pub fn contribution_of(&self, factor: Factor) -> Weight {
        Weight::from_bps(
            self.contributions
                .iter()
                .filter(|c| c.factor == factor)
                .map(|c| c.weight.bps())
                .sum(),
        )
    }
}
