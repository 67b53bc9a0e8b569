//! Core temporal layout engine for LazyPlan.
//! This crate is the single source of truth for layout invariants.

pub mod config;
pub mod layout;
pub mod logging;
pub mod model;
pub mod normalize;
pub mod service;

pub use config::grid::{GridConfigError, GridConfiguration};
pub use config::settings::{LayoutSettings, SettingsError};
pub use layout::geometry::{GeometryMapper, Orientation, Placement};
pub use layout::overlap::{ColumnSlot, OverlapGroup, OverlapPacker, Packable, PackedWindow};
pub use layout::pipeline::{build_pass, LayoutPass, PeriodLayout, ViewSpec};
pub use layout::query::{count_unscheduled, hit_test, task_overlaps_day, tasks_on_day};
pub use layout::segment::{
    parent_id_from_segment_key, segment_key, PeriodUnit, VisibleRange, WeekSegmenter,
};
pub use layout::zoom::{FocusRequest, ZoomController, ZoomError, ZoomLevel, ZoomTransition};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::block::{BlockGeometry, DisplayVariant, SegmentInfo, TaskBlock};
pub use model::task::{Task, TaskId, TimeInterval};
pub use normalize::index::{ExpansionState, TaskIndex};
pub use normalize::normalizer::{
    CategoryColorResolver, FlatTask, NoCategoryColors, NormalizedTasks, ScheduledTask,
    TaskNormalizer,
};
pub use service::layout_service::{LayoutError, LayoutResult, LayoutService};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
