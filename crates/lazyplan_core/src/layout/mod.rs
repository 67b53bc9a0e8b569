//! Layout stages.
//!
//! # Responsibility
//! - Turn normalized tasks into packed, segmented, pixel-placed blocks.
//! - Keep every stage a pure function of its inputs.
//!
//! # See also
//! - `pipeline::build_pass` for the stage order.

pub mod geometry;
pub mod overlap;
pub mod pipeline;
pub mod query;
pub mod segment;
pub mod zoom;
