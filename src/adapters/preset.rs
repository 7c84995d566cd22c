//! Built-in preset adapter.

use crate::domain::{ModelError, ModelPreset, RiskFactorModel};
use crate::ports::ModelSource;

/// Serves one of the compiled-in rule tables.
#[derive(Debug, Clone)]
pub struct PresetSource {
    preset: ModelPreset,
    expected_fingerprint: Option<String>,
}

impl PresetSource {
    #[must_use]
    pub fn new(preset: ModelPreset) -> Self {
        Self {
            preset,
            expected_fingerprint: None,
        }
    }

    /// Require the preset to hash to `fingerprint` (hex SHA-256).
    #[must_use]
    pub fn with_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.expected_fingerprint = Some(fingerprint.into());
        self
    }
}

impl ModelSource for PresetSource {
    fn describe(&self) -> String {
        format!("preset:{}", self.preset)
    }

    fn load(&self) -> Result<RiskFactorModel, ModelError> {
        let model = RiskFactorModel::preset(self.preset);
        model.validate()?;
        if let Some(expected) = &self.expected_fingerprint {
            if let Err(e) = model.verify_fingerprint(expected) {
                tracing::error!("Preset {} refused: {}", self.preset, e);
                return Err(e);
            }
        }
        Ok(model)
    }
}
