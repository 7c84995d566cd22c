//! Model source port: Trait for obtaining a rule table.
//!
//! Abstracts where a `RiskFactorModel` comes from (built-in preset, JSON file)
//! from the application logic.

use crate::domain::{ModelError, RiskFactorModel};

/// Trait for loading a risk factor rule table.
pub trait ModelSource: Send + Sync {
    /// Short description of the source for logs (preset name, file path).
    fn describe(&self) -> String;

    /// Load and validate the rule table.
    ///
    /// # Errors
    /// Returns `ModelError` if the table cannot be read or fails validation.
    fn load(&self) -> Result<RiskFactorModel, ModelError>;
}
