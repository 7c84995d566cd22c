//! Assessment record: a scored assessment plus audit metadata.

use serde::{Deserialize, Serialize};

use crate::domain::{BloodPressureCategory, PatientInput, RiskAssessment, RiskBand};

/// Complete assessment record including metadata.
///
/// The embedded [`RiskAssessment`] is the pure engine output; everything else
/// here (id, timestamp) is what makes two records of the same patient differ.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentRecord {
    /// Unique identifier
    pub id: String,

    /// Snapshot of the validated input
    pub input: PatientInput,

    pub assessment: RiskAssessment,

    /// Result card headline, e.g. `LOW RISK: 10.0% probability of heart disease`
    pub headline: String,

    /// Band description shown under the headline
    pub summary: String,

    /// Category of the patient's resting blood pressure, if it falls on the chart
    pub blood_pressure_category: Option<BloodPressureCategory>,

    /// Name of the rule table used
    pub model_name: String,

    /// SHA-256 fingerprint of the rule table used
    pub model_fingerprint: String,

    /// Timestamp of assessment
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl AssessmentRecord {
    #[must_use]
    pub fn new(
        input: PatientInput,
        assessment: RiskAssessment,
        model_name: impl Into<String>,
        model_fingerprint: impl Into<String>,
    ) -> Self {
        let blood_pressure_category =
            BloodPressureCategory::from_systolic(input.resting_blood_pressure).ok();
        let headline = assessment.headline();
        let summary = assessment.band.description().to_string();
        Self {
            id: uuid_v4(),
            input,
            assessment,
            headline,
            summary,
            blood_pressure_category,
            model_name: model_name.into(),
            model_fingerprint: model_fingerprint.into(),
            created_at: chrono::Utc::now(),
        }
    }

    #[must_use]
    pub fn band(&self) -> RiskBand {
        self.assessment.band
    }

    #[must_use]
    pub fn recommendation(&self) -> &'static str {
        self.assessment.band.recommendation()
    }
}

/// Generate a random UUID v4 string.
///
/// Seeded from OS entropy so record ids cannot be predicted from one another.
fn uuid_v4() -> String {
    use rand::Rng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    let mut rng = ChaCha20Rng::from_entropy();
    let bytes: [u8; 16] = rng.gen();

    format!(
        "{:02x}{:02x}{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
        bytes[0], bytes[1], bytes[2], bytes[3],
        bytes[4], bytes[5],
        (bytes[6] & 0x0f) | 0x40, bytes[7],
        (bytes[8] & 0x3f) | 0x80, bytes[9],
        bytes[10], bytes[11], bytes[12], bytes[13], bytes[14], bytes[15]
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChestPainType, Sex, Thalassemia};

    #[test]
    fn test_uuid_generation() {
        let id1 = uuid_v4();
        let id2 = uuid_v4();
        assert_ne!(id1, id2);
        assert_eq!(id1.len(), 36);
        assert_eq!(&id1[14..15], "4");
    }

    #[test]
    fn test_record_carries_result_card_text() {
        let input = PatientInput {
            age: 70,
            sex: Sex::Male,
            resting_blood_pressure: 150,
            cholesterol: 280,
            max_heart_rate: 110,
            chest_pain_type: ChestPainType::Atypical,
            fasting_blood_sugar_high: true,
            exercise_induced_angina: true,
            st_depression: 2.5,
            major_vessels: 2,
            thalassemia: Thalassemia::ReversibleDefect,
        };
        let assessment = RiskAssessment {
            score: 0.8,
            band: RiskBand::High,
            contributions: Vec::new(),
        };
        let record = AssessmentRecord::new(input, assessment, "dashboard", "abc");

        assert_eq!(record.headline, "HIGH RISK: 80.0% probability of heart disease");
        assert_eq!(record.summary, RiskBand::High.description());
        assert_eq!(record.recommendation(), RiskBand::High.recommendation());
    }
}
