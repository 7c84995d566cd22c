//! Application layer: Use cases and services.
//!
//! This module is the validation boundary: input is checked here before the
//! pure scoring engine ever sees it.

mod assessment;
mod record;

pub use assessment::AssessmentService;
pub use record::AssessmentRecord;
