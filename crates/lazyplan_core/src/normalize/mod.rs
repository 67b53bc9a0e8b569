//! Task tree normalization.
//!
//! # Responsibility
//! - Turn the host's nested task snapshot into flat, classified lists.
//! - Provide an id-indexed arena for hierarchy-aware UI above the engine.

pub mod index;
pub mod normalizer;
