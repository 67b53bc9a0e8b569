//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level layout functions to Dart via FRB.
//! - Keep error semantics simple: envelopes with `ok` and `message`.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Instants cross the boundary as epoch milliseconds read as wall-clock
//!   time; hosts shift by their local offset before calling.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use lazyplan_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    DisplayVariant, GridConfiguration, LayoutError, LayoutService, LayoutSettings,
    NoCategoryColors, Task, TaskBlock, VisibleRange,
};
use log::warn;
use uuid::Uuid;

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// One task as sent by the Dart task store (flat, with back-references).
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutTaskInput {
    /// Stable task UUID in string form.
    pub id: String,
    pub parent_id: Option<String>,
    pub start_epoch_ms: Option<i64>,
    pub end_epoch_ms: Option<i64>,
    pub color: Option<String>,
    pub completed: bool,
}

/// Pixel units for the requested grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridInput {
    pub day_width: f64,
    pub hour_width: f64,
    pub minute_width: f64,
    pub row_height: f64,
}

/// One placed block for the day view.
#[derive(Debug, Clone, PartialEq)]
pub struct DayBlockItem {
    pub task_id: String,
    /// Stable render key: `{id}_day_{n}` for split tasks, the bare id otherwise.
    pub key: String,
    pub column_index: u32,
    pub column_count: u32,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub z_index: i32,
    /// `dot|line|block`.
    pub display: String,
    pub color: String,
    pub is_last_segment: bool,
}

/// Response envelope for day layout.
#[derive(Debug, Clone, PartialEq)]
pub struct DayLayoutResponse {
    pub ok: bool,
    pub blocks: Vec<DayBlockItem>,
    /// Tasks without both instants (badge counter).
    pub unscheduled_count: u32,
    /// Human-readable response message for diagnostics.
    pub message: String,
}

impl DayLayoutResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            blocks: Vec::new(),
            unscheduled_count: 0,
            message: message.into(),
        }
    }
}

/// Lays out one calendar day into packed columns.
///
/// # FFI contract
/// - Sync call, pure computation.
/// - Never panics.
/// - Invalid ids, instants or grid units return `ok = false` with a message.
#[flutter_rust_bridge::frb(sync)]
pub fn layout_day_columns(
    tasks: Vec<LayoutTaskInput>,
    day_epoch_ms: i64,
    grid: GridInput,
) -> DayLayoutResponse {
    match layout_day_inner(&tasks, day_epoch_ms, grid) {
        Ok(response) => response,
        Err(message) => {
            warn!("event=layout_day_columns module=ffi status=error tasks={}", tasks.len());
            DayLayoutResponse::failure(format!("layout_day_columns failed: {message}"))
        }
    }
}

fn layout_day_inner(
    tasks: &[LayoutTaskInput],
    day_epoch_ms: i64,
    grid: GridInput,
) -> Result<DayLayoutResponse, String> {
    let grid = GridConfiguration::new(
        grid.day_width,
        grid.hour_width,
        grid.minute_width,
        grid.row_height,
    )
    .map_err(|err| LayoutError::from(err).to_string())?;
    let day = epoch_ms_to_naive(day_epoch_ms)?.date();
    let range = VisibleRange::single_day(day);
    if range.checked_window().is_none() {
        return Err(format!(
            "day {} is past the last supported calendar day",
            format_day(day)
        ));
    }
    let roots = tasks
        .iter()
        .map(to_core_task)
        .collect::<Result<Vec<_>, _>>()?;

    let service = LayoutService::new(NoCategoryColors, LayoutSettings::default())
        .map_err(|err| err.to_string())?;
    let pass = service.calendar_pass(&roots, range, grid);
    let blocks: Vec<DayBlockItem> = pass.blocks().map(to_day_block_item).collect();
    let message = format!("Placed {} block(s) on {}.", blocks.len(), format_day(day));
    Ok(DayLayoutResponse {
        ok: true,
        unscheduled_count: u32::try_from(pass.unscheduled.len()).unwrap_or(u32::MAX),
        blocks,
        message,
    })
}

fn to_core_task(input: &LayoutTaskInput) -> Result<Task, String> {
    let id = parse_id(&input.id)?;
    let mut task = Task::new(id, String::new());
    task.parent_id = input.parent_id.as_deref().map(parse_id).transpose()?;
    task.start_time = input.start_epoch_ms.map(epoch_ms_to_naive).transpose()?;
    task.end_time = input.end_epoch_ms.map(epoch_ms_to_naive).transpose()?;
    task.color = input.color.clone();
    task.completed = input.completed;
    Ok(task)
}

fn parse_id(raw: &str) -> Result<Uuid, String> {
    Uuid::parse_str(raw.trim()).map_err(|err| format!("invalid task id `{raw}`: {err}"))
}

fn epoch_ms_to_naive(epoch_ms: i64) -> Result<NaiveDateTime, String> {
    DateTime::from_timestamp_millis(epoch_ms)
        .map(|value| value.naive_utc())
        .ok_or_else(|| format!("epoch ms out of range: {epoch_ms}"))
}

fn format_day(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

fn to_day_block_item(block: &TaskBlock) -> DayBlockItem {
    DayBlockItem {
        task_id: block.task_id.to_string(),
        key: block.key(),
        column_index: u32::try_from(block.column_index).unwrap_or(u32::MAX),
        column_count: u32::try_from(block.column_count).unwrap_or(u32::MAX),
        left: block.geometry.left,
        top: block.geometry.top,
        width: block.geometry.width,
        height: block.geometry.height,
        z_index: block.geometry.z_index,
        display: display_label(block.display).to_string(),
        color: block.effective_color.clone(),
        is_last_segment: block.is_last_week_segment(),
    }
}

fn display_label(display: DisplayVariant) -> &'static str {
    match display {
        DisplayVariant::Dot => "dot",
        DisplayVariant::Line => "line",
        DisplayVariant::Block => "block",
    }
}
