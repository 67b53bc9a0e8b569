//! Binary zoom between the compact and expanded timeline grids.
//!
//! # Responsibility
//! - Swap grid configurations and re-map an existing pass.
//! - Compute the scroll offset that centers a focused (day, hour).
//!
//! # Invariants
//! - Zoom never re-packs or re-segments; only geometry changes.
//! - Scroll offsets are clamped to `[0, content_width - viewport_width]`.
//! - The controller is a plain value; transitions return a new one.

use crate::config::grid::GridConfiguration;
use crate::config::settings::LayoutSettings;
use crate::layout::pipeline::LayoutPass;
use log::info;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Current zoom state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoomLevel {
    /// Hour granularity.
    Compact,
    /// Minute granularity.
    Expanded,
}

impl ZoomLevel {
    pub fn toggled(self) -> Self {
        match self {
            Self::Compact => Self::Expanded,
            Self::Expanded => Self::Compact,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Expanded => "expanded",
        }
    }
}

/// Host request to zoom around one wall-clock point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusRequest {
    /// 0-based day inside the pass's visible range.
    pub day_index: usize,
    /// Hour of day, `0..24`.
    pub hour: u32,
}

/// Zoom state plus the two grids it switches between.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomController {
    level: ZoomLevel,
    compact: GridConfiguration,
    expanded: GridConfiguration,
    viewport_width: f64,
}

/// Result of one zoom step.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoomTransition {
    pub controller: ZoomController,
    pub pass: LayoutPass,
    pub scroll_offset: f64,
}

impl ZoomController {
    /// Starts in `Compact`.
    ///
    /// # Errors
    /// - Returns `ZoomError::InvalidViewport` for a non-finite or
    ///   non-positive viewport width.
    pub fn new(
        compact: GridConfiguration,
        expanded: GridConfiguration,
        viewport_width: f64,
    ) -> Result<Self, ZoomError> {
        if !viewport_width.is_finite() || viewport_width <= 0.0 {
            return Err(ZoomError::InvalidViewport(viewport_width));
        }
        Ok(Self {
            level: ZoomLevel::Compact,
            compact,
            expanded,
            viewport_width,
        })
    }

    /// Uses the `compact()` and `expanded()` grid presets.
    pub fn with_defaults(viewport_width: f64) -> Result<Self, ZoomError> {
        Self::new(
            GridConfiguration::compact(),
            GridConfiguration::expanded(),
            viewport_width,
        )
    }

    pub fn level(&self) -> ZoomLevel {
        self.level
    }

    pub fn viewport_width(&self) -> f64 {
        self.viewport_width
    }

    /// Grid for the current level.
    pub fn grid(&self) -> GridConfiguration {
        self.grid_for(self.level)
    }

    pub fn grid_for(&self, level: ZoomLevel) -> GridConfiguration {
        match level {
            ZoomLevel::Compact => self.compact,
            ZoomLevel::Expanded => self.expanded,
        }
    }

    /// Toggles the level and centers `request` in the viewport.
    ///
    /// # Errors
    /// - `ZoomError::HourOutOfRange` when `hour >= 24`.
    /// - `ZoomError::DayOutOfRange` when the day is outside the pass range.
    pub fn focus(
        &self,
        request: FocusRequest,
        pass: &LayoutPass,
        settings: &LayoutSettings,
    ) -> Result<ZoomTransition, ZoomError> {
        if request.hour >= 24 {
            return Err(ZoomError::HourOutOfRange(request.hour));
        }
        let day_count = pass.view.range().day_count();
        if request.day_index >= day_count as usize {
            return Err(ZoomError::DayOutOfRange {
                day_index: request.day_index,
                day_count,
            });
        }

        let level = self.level.toggled();
        let grid = self.grid_for(level);
        let focus_x = request.day_index as f64 * grid.day_width()
            + grid.time_offset(f64::from(request.hour) * 60.0);
        let transition = self.transition_to(level, focus_x, pass, settings);
        info!(
            "event=zoom_focus module=zoom status=ok level={} day_index={} hour={} scroll={}",
            level.as_str(),
            request.day_index,
            request.hour,
            transition.scroll_offset
        );
        Ok(transition)
    }

    /// Switches to `level`, keeping the instant under the viewport center.
    ///
    /// `current_scroll` is the host's scroll offset for the current grid.
    pub fn set_level(
        &self,
        level: ZoomLevel,
        current_scroll: f64,
        pass: &LayoutPass,
        settings: &LayoutSettings,
    ) -> ZoomTransition {
        let center = current_scroll.max(0.0) + self.viewport_width / 2.0;
        let (day, minutes) = instant_at(&self.grid(), center);
        let grid = self.grid_for(level);
        let focus_x = day * grid.day_width() + grid.time_offset(minutes);
        let transition = self.transition_to(level, focus_x, pass, settings);
        info!(
            "event=zoom_set_level module=zoom status=ok level={} scroll={}",
            level.as_str(),
            transition.scroll_offset
        );
        transition
    }

    fn transition_to(
        &self,
        level: ZoomLevel,
        focus_x: f64,
        pass: &LayoutPass,
        settings: &LayoutSettings,
    ) -> ZoomTransition {
        let grid = self.grid_for(level);
        let pass = pass.remapped(grid, settings);
        let max_scroll = (pass.content_width() - self.viewport_width).max(0.0);
        let scroll_offset = (focus_x - self.viewport_width / 2.0).clamp(0.0, max_scroll);
        ZoomTransition {
            controller: Self { level, ..*self },
            pass,
            scroll_offset,
        }
    }
}

/// Inverse of the time axis: `(day, minutes from day start)` under `x`.
fn instant_at(grid: &GridConfiguration, x: f64) -> (f64, f64) {
    let day = (x / grid.day_width()).floor().max(0.0);
    let in_day = (x - day * grid.day_width()).max(0.0);
    let hours = (in_day / grid.hour_width()).floor().clamp(0.0, 23.0);
    let minutes = ((in_day - hours * grid.hour_width()) / grid.minute_width()).clamp(0.0, 60.0);
    (day, hours * 60.0 + minutes)
}

/// Zoom request contract violations.
#[derive(Debug, Clone, PartialEq)]
pub enum ZoomError {
    InvalidViewport(f64),
    HourOutOfRange(u32),
    DayOutOfRange { day_index: usize, day_count: u32 },
}

impl Display for ZoomError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidViewport(width) => {
                write!(f, "viewport width must be finite and > 0, got {width}")
            }
            Self::HourOutOfRange(hour) => write!(f, "focus hour must be < 24, got {hour}"),
            Self::DayOutOfRange {
                day_index,
                day_count,
            } => write!(
                f,
                "focus day_index {day_index} outside visible range of {day_count} days"
            ),
        }
    }
}

impl Error for ZoomError {}
