//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate normalization, layout and zoom into host-level APIs.
//! - Keep UI/FFI layers decoupled from stage internals.

pub mod layout_service;
