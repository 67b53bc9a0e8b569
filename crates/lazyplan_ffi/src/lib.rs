//! Flutter-facing FFI surface for LazyPlan core.

pub mod api;
