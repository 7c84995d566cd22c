//! Ports layer: Trait definitions for external operations.
//!
//! Following Hexagonal Architecture, these traits define the boundaries
//! between the application and the places rule tables come from.

mod model_source;

pub use model_source::ModelSource;
