//! Adapters layer: Concrete implementations of ports.
//!
//! - `preset`: built-in rule tables
//! - `json_file`: rule tables externalized as JSON files
//! - `redact`: PII filtering for logs

pub mod json_file;
pub mod preset;
pub mod redact;

pub use json_file::JsonModelFile;
pub use preset::PresetSource;
