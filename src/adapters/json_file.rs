//! JSON rule table adapter.
//!
//! Loads a `RiskFactorModel` from disk. An expected SHA-256 fingerprint can be
//! pinned so that a modified table is refused instead of silently scoring
//! patients with different weights.

use std::path::{Path, PathBuf};

use crate::domain::{ModelError, RiskFactorModel};
use crate::ports::ModelSource;

/// Rule tables are small; anything larger is not a rule table.
const MAX_MODEL_BYTES: u64 = 256 * 1024;

/// Rule table stored as a JSON file.
#[derive(Debug, Clone)]
pub struct JsonModelFile {
    path: PathBuf,
    expected_fingerprint: Option<String>,
}

impl JsonModelFile {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            expected_fingerprint: None,
        }
    }

    /// Require the loaded table to hash to `fingerprint` (hex SHA-256).
    #[must_use]
    pub fn with_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.expected_fingerprint = Some(fingerprint.into());
        self
    }

    /// Write a rule table as pretty JSON.
    ///
    /// # Errors
    /// Returns `ModelError::Io` if the file cannot be written.
    pub fn write(path: &Path, model: &RiskFactorModel) -> Result<(), ModelError> {
        let bytes = serde_json::to_vec_pretty(model)
            .map_err(|e| ModelError::Format(format!("Failed to serialize rule table: {e}")))?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| ModelError::Io(format!("{}: {e}", parent.display())))?;
            }
        }
        std::fs::write(path, bytes).map_err(|e| ModelError::Io(format!("{}: {e}", path.display())))
    }
}

impl ModelSource for JsonModelFile {
    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }

    fn load(&self) -> Result<RiskFactorModel, ModelError> {
        let io_err = |e: std::io::Error| ModelError::Io(format!("{}: {e}", self.path.display()));

        let size = std::fs::metadata(&self.path).map_err(io_err)?.len();
        if size > MAX_MODEL_BYTES {
            return Err(ModelError::Format(format!(
                "{} is {size} bytes, limit is {MAX_MODEL_BYTES}",
                self.path.display()
            )));
        }

        let bytes = std::fs::read(&self.path).map_err(io_err)?;
        let model = RiskFactorModel::from_json(&bytes)?;

        if let Some(expected) = &self.expected_fingerprint {
            if let Err(e) = model.verify_fingerprint(expected) {
                tracing::error!("Rule table {} refused: {}", self.path.display(), e);
                return Err(e);
            }
        }

        tracing::info!(
            "Loaded rule table '{}' ({} rules) from {}",
            model.name,
            model.rules.len(),
            self.path.display()
        );
        Ok(model)
    }
}
