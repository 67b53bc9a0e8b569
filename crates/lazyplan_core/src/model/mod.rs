//! Domain model for the temporal layout engine.
//!
//! # Responsibility
//! - Define the task snapshot consumed by layout.
//! - Define the block records produced by layout.
//!
//! # Invariants
//! - Input tasks are read-only for the duration of a pass.
//! - Output blocks are plain values with no links back into the snapshot.

pub mod block;
pub mod task;
