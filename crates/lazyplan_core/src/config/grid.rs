//! Grid configuration (pixel-per-unit constants for one zoom level).
//!
//! # Invariants
//! - Every field is finite and strictly positive.
//! - Sixty minutes never span more than one hour (`60 * minute_width <=
//!   hour_width`), so time offsets grow monotonically.
//! - A `GridConfiguration` value cannot exist with an invalid field, so
//!   geometry code never sees degenerate units.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Explicit, immutable pixel units for one zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGridConfiguration")]
pub struct GridConfiguration {
    day_width: f64,
    hour_width: f64,
    minute_width: f64,
    row_height: f64,
}

/// Unvalidated wire shape used by deserialization.
#[derive(Debug, Clone, Copy, Deserialize)]
struct RawGridConfiguration {
    day_width: f64,
    hour_width: f64,
    minute_width: f64,
    row_height: f64,
}

impl TryFrom<RawGridConfiguration> for GridConfiguration {
    type Error = GridConfigError;

    fn try_from(value: RawGridConfiguration) -> Result<Self, Self::Error> {
        Self::new(
            value.day_width,
            value.hour_width,
            value.minute_width,
            value.row_height,
        )
    }
}

impl GridConfiguration {
    /// Validates and builds a grid configuration.
    ///
    /// # Errors
    /// - Returns `GridConfigError::NonPositive` for zero or negative fields.
    /// - Returns `GridConfigError::NonFinite` for NaN or infinite fields.
    /// - Returns `GridConfigError::MinuteExceedsHour` when sixty minutes are
    ///   wider than one hour.
    pub fn new(
        day_width: f64,
        hour_width: f64,
        minute_width: f64,
        row_height: f64,
    ) -> Result<Self, GridConfigError> {
        check_unit("day_width", day_width)?;
        check_unit("hour_width", hour_width)?;
        check_unit("minute_width", minute_width)?;
        check_unit("row_height", row_height)?;
        if minute_width * 60.0 > hour_width * (1.0 + f64::EPSILON) {
            return Err(GridConfigError::MinuteExceedsHour {
                minute_width,
                hour_width,
            });
        }
        Ok(Self {
            day_width,
            hour_width,
            minute_width,
            row_height,
        })
    }

    /// Hour-granularity timeline grid.
    pub fn compact() -> Self {
        Self {
            day_width: 24.0 * 60.0,
            hour_width: 60.0,
            minute_width: 1.0,
            row_height: 28.0,
        }
    }

    /// Minute-granularity timeline grid, six times wider than `compact`.
    pub fn expanded() -> Self {
        Self {
            day_width: 24.0 * 360.0,
            hour_width: 360.0,
            minute_width: 6.0,
            row_height: 28.0,
        }
    }

    pub fn day_width(&self) -> f64 {
        self.day_width
    }

    pub fn hour_width(&self) -> f64 {
        self.hour_width
    }

    pub fn minute_width(&self) -> f64 {
        self.minute_width
    }

    pub fn row_height(&self) -> f64 {
        self.row_height
    }

    /// Distance from day start for a minute offset.
    ///
    /// Whole hours advance by `hour_width`, the remainder by `minute_width`.
    pub fn time_offset(&self, minutes_from_day_start: f64) -> f64 {
        let hours = (minutes_from_day_start / 60.0).floor();
        let remainder = minutes_from_day_start - hours * 60.0;
        hours * self.hour_width + remainder * self.minute_width
    }
}

fn check_unit(field: &'static str, value: f64) -> Result<(), GridConfigError> {
    if !value.is_finite() {
        return Err(GridConfigError::NonFinite { field });
    }
    if value <= 0.0 {
        return Err(GridConfigError::NonPositive { field, value });
    }
    Ok(())
}

/// Host contract violations for grid units.
#[derive(Debug, Clone, PartialEq)]
pub enum GridConfigError {
    NonPositive { field: &'static str, value: f64 },
    NonFinite { field: &'static str },
    MinuteExceedsHour {
        minute_width: f64,
        hour_width: f64,
    },
}

impl Display for GridConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonPositive { field, value } => {
                write!(f, "grid {field} must be > 0, got {value}")
            }
            Self::NonFinite { field } => write!(f, "grid {field} must be finite"),
            Self::MinuteExceedsHour {
                minute_width,
                hour_width,
            } => write!(
                f,
                "grid minute_width {minute_width} x 60 exceeds hour_width {hour_width}"
            ),
        }
    }
}

impl Error for GridConfigError {}
