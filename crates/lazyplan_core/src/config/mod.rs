//! Explicit configuration values passed into every layout call.
//!
//! # Invariants
//! - No ambient/global zoom or view state; callers pass these values in.

pub mod grid;
pub mod settings;
