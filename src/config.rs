//! Environment-driven configuration.
//!
//! | variable | meaning |
//! |---|---|
//! | `CARDIORISK_MODEL_PRESET` | `dashboard` or `heart-rate-adjusted` |
//! | `CARDIORISK_MODEL_FILE` | JSON rule table; wins over the preset |
//! | `CARDIORISK_MODEL_SHA256` | expected fingerprint of the selected rule table |
//! | `CARDIORISK_AGE_CURVE_CAP` | age curve cap (default 0.9) |
//! | `CARDIORISK_AGE_CURVE_SCALE` | age curve scale factor (default 0.7) |
//! | `CARDIORISK_LOG_MODE` | `stderr` (default) or `file` |
//! | `CARDIORISK_LOG_FILE` | log path in file mode |
//!
//! No rule table is selected unless one of the model variables (or a command
//! line flag) names it. A pinned fingerprint applies to whichever table is
//! finally selected, preset or file.

use std::path::PathBuf;

use crate::adapters::{JsonModelFile, PresetSource};
use crate::domain::{AgeCurve, ModelPreset};
use crate::ports::ModelSource;
use crate::{CardioriskError, Result};

pub const MODEL_PRESET_ENV: &str = "CARDIORISK_MODEL_PRESET";
pub const MODEL_FILE_ENV: &str = "CARDIORISK_MODEL_FILE";
pub const MODEL_SHA256_ENV: &str = "CARDIORISK_MODEL_SHA256";
pub const AGE_CURVE_CAP_ENV: &str = "CARDIORISK_AGE_CURVE_CAP";
pub const AGE_CURVE_SCALE_ENV: &str = "CARDIORISK_AGE_CURVE_SCALE";
pub const LOG_MODE_ENV: &str = "CARDIORISK_LOG_MODE";
pub const LOG_FILE_ENV: &str = "CARDIORISK_LOG_FILE";

const DEFAULT_LOG_FILE: &str = "cardiorisk.log";

/// Which rule table to score with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSelection {
    Preset(ModelPreset),
    File(PathBuf),
}

/// Where log output goes. stdout is reserved for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMode {
    Stderr,
    File,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub model: Option<ModelSelection>,
    /// Expected SHA-256 of the selected table, independent of how it was selected
    pub pinned_fingerprint: Option<String>,
    pub age_curve: AgeCurve,
    pub log_mode: LogMode,
    pub log_file: PathBuf,
}

impl Config {
    /// Read configuration from the process environment.
    ///
    /// # Errors
    /// Returns `CardioriskError::Config` for unparsable values.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, which maps a variable name to its value.
    ///
    /// # Errors
    /// Returns `CardioriskError::Config` for unparsable values.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let model = if let Some(path) = get(MODEL_FILE_ENV) {
            Some(ModelSelection::File(PathBuf::from(path)))
        } else if let Some(name) = get(MODEL_PRESET_ENV) {
            Some(ModelSelection::Preset(name.parse()?))
        } else {
            None
        };

        let defaults = AgeCurve::default();
        let age_curve = AgeCurve {
            cap: parse_f64(AGE_CURVE_CAP_ENV, get(AGE_CURVE_CAP_ENV))?.unwrap_or(defaults.cap),
            scale_factor: parse_f64(AGE_CURVE_SCALE_ENV, get(AGE_CURVE_SCALE_ENV))?
                .unwrap_or(defaults.scale_factor),
        };

        let log_mode = match get(LOG_MODE_ENV).as_deref().map(str::trim) {
            None | Some("stderr") => LogMode::Stderr,
            Some("file") => LogMode::File,
            Some(other) => {
                return Err(CardioriskError::Config(format!(
                    "{LOG_MODE_ENV}={other} (expected stderr or file)"
                )))
            }
        };

        let log_file = get(LOG_FILE_ENV).map_or_else(|| PathBuf::from(DEFAULT_LOG_FILE), PathBuf::from);

        Ok(Self {
            model,
            pinned_fingerprint: get(MODEL_SHA256_ENV),
            age_curve,
            log_mode,
            log_file,
        })
    }

    /// Override the rule table selection (command line flags). The pinned
    /// fingerprint is kept.
    #[must_use]
    pub fn with_model(mut self, model: ModelSelection) -> Self {
        self.model = Some(model);
        self
    }

    /// Build the configured rule table source.
    ///
    /// # Errors
    /// Returns `CardioriskError::Config` if no rule table was selected.
    pub fn model_source(&self) -> Result<Box<dyn ModelSource>> {
        let pin = self.pinned_fingerprint.as_deref();
        match &self.model {
            Some(ModelSelection::Preset(preset)) => {
                let source = PresetSource::new(*preset);
                Ok(Box::new(match pin {
                    Some(pin) => source.with_fingerprint(pin),
                    None => source,
                }))
            }
            Some(ModelSelection::File(path)) => {
                let source = JsonModelFile::new(path);
                Ok(Box::new(match pin {
                    Some(pin) => source.with_fingerprint(pin),
                    None => source,
                }))
            }
            None => Err(CardioriskError::Config(format!(
                "no risk model selected: set {MODEL_PRESET_ENV} (dashboard | heart-rate-adjusted) or {MODEL_FILE_ENV}"
            ))),
        }
    }
}

fn parse_f64(key: &str, value: Option<String>) -> Result<Option<f64>> {
    value
        .map(|v| {
            v.trim()
                .parse::<f64>()
                .ok()
                .filter(|x| x.is_finite() && *x >= 0.0)
                .ok_or_else(|| CardioriskError::Config(format!("{key}={v} is not a non-negative number")))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_empty_environment_selects_no_model() {
        let config = config_from(&[]).expect("defaults");
        assert_eq!(config.model, None);
        assert_eq!(config.log_mode, LogMode::Stderr);
        assert_eq!(config.age_curve, AgeCurve::default());
        assert!(matches!(config.model_source(), Err(CardioriskError::Config(_))));
    }

    #[test]
    fn test_preset_selection() {
        let config = config_from(&[(MODEL_PRESET_ENV, "heart-rate-adjusted")]).expect("valid");
        assert_eq!(
            config.model,
            Some(ModelSelection::Preset(ModelPreset::HeartRateAdjusted))
        );
        let source = config.model_source().expect("source");
        assert_eq!(source.describe(), "preset:heart-rate-adjusted");
    }

    #[test]
    fn test_file_wins_over_preset() {
        let config = config_from(&[
            (MODEL_PRESET_ENV, "dashboard"),
            (MODEL_FILE_ENV, "models/custom.json"),
            (MODEL_SHA256_ENV, "abc123"),
        ])
        .expect("valid");
        assert_eq!(
            config.model,
            Some(ModelSelection::File(PathBuf::from("models/custom.json")))
        );
        assert_eq!(config.pinned_fingerprint.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(config_from(&[(MODEL_PRESET_ENV, "legacy")]).is_err());
        assert!(config_from(&[(LOG_MODE_ENV, "syslog")]).is_err());
        assert!(config_from(&[(AGE_CURVE_CAP_ENV, "-1")]).is_err());
        assert!(config_from(&[(AGE_CURVE_SCALE_ENV, "lots")]).is_err());
    }

    #[test]
    fn test_age_curve_and_logging_overrides() {
        let config = config_from(&[
            (AGE_CURVE_CAP_ENV, "0.8"),
            (LOG_MODE_ENV, "file"),
            (LOG_FILE_ENV, "/tmp/cardiorisk-test.log"),
        ])
        .expect("valid");
        assert!((config.age_curve.cap - 0.8).abs() < f64::EPSILON);
        assert!((config.age_curve.scale_factor - 0.7).abs() < f64::EPSILON);
        assert_eq!(config.log_mode, LogMode::File);
        assert_eq!(config.log_file, PathBuf::from("/tmp/cardiorisk-test.log"));
    }

    #[test]
    fn test_cli_override() {
        let config = config_from(&[])
            .expect("defaults")
            .with_model(ModelSelection::Preset(ModelPreset::Dashboard));
        assert!(config.model_source().is_ok());
    }

    #[test]
    fn test_cli_model_file_keeps_env_pin() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("dashboard.json");
        let model = crate::domain::RiskFactorModel::preset(ModelPreset::Dashboard);
        crate::adapters::JsonModelFile::write(&path, &model).expect("write");

        let config = config_from(&[(MODEL_SHA256_ENV, "deadbeef")])
            .expect("valid")
            .with_model(ModelSelection::File(path));
        assert_eq!(config.pinned_fingerprint.as_deref(), Some("deadbeef"));

        let source = config.model_source().expect("source");
        assert!(source.load().is_err());
    }

    #[test]
    fn test_pin_applies_to_presets() {
        let config = config_from(&[
            (MODEL_PRESET_ENV, "dashboard"),
            (MODEL_SHA256_ENV, "deadbeef"),
        ])
        .expect("valid");
        assert!(config.model_source().expect("source").load().is_err());

        let pin = crate::domain::RiskFactorModel::preset(ModelPreset::Dashboard).fingerprint();
        let config = config_from(&[
            (MODEL_PRESET_ENV, "dashboard"),
            (MODEL_SHA256_ENV, pin.as_str()),
        ])
        .expect("valid");
        assert!(config.model_source().expect("source").load().is_ok());
    }
}
