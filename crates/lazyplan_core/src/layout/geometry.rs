//! Pixel geometry for packed blocks.
//!
//! # Responsibility
//! - Map (day index, interval, column slot) to a rectangle for one grid.
//! - Support the vertical calendar axis and the horizontal timeline axis
//!   behind the same inputs.
//!
//! # Invariants
//! - Time-axis size is floored at `minimum_visible_size`.
//! - `z_index` grows with `column_index`.
//! - Output depends only on inputs; same inputs, same bits.

use crate::config::grid::GridConfiguration;
use crate::config::settings::LayoutSettings;
use crate::model::block::{BlockGeometry, DisplayVariant, TaskBlock};
use crate::model::task::TimeInterval;
use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Direction of the time axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Calendar day/week: time runs down, days run across.
    Vertical,
    /// Timeline: time runs across, overlap lanes stack down.
    Horizontal,
}

/// Layout-independent inputs for one rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub day_index: usize,
    pub interval: TimeInterval,
    pub column_index: usize,
    pub column_count: usize,
}

impl Placement {
    pub fn of_block(block: &TaskBlock) -> Self {
        Self {
            day_index: block.day_index,
            interval: block.interval,
            column_index: block.column_index,
            column_count: block.column_count,
        }
    }
}

/// Maps placements to pixels for one grid and orientation.
#[derive(Debug, Clone, Copy)]
pub struct GeometryMapper<'a> {
    grid: GridConfiguration,
    orientation: Orientation,
    settings: &'a LayoutSettings,
}

impl<'a> GeometryMapper<'a> {
    pub fn new(
        grid: GridConfiguration,
        orientation: Orientation,
        settings: &'a LayoutSettings,
    ) -> Self {
        Self {
            grid,
            orientation,
            settings,
        }
    }

    pub fn grid(&self) -> GridConfiguration {
        self.grid
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn map(&self, placement: &Placement) -> BlockGeometry {
        let column_count = placement.column_count.max(1);
        let z_index = i32::try_from(placement.column_index)
            .unwrap_or(i32::MAX - 1)
            .saturating_add(1);

        match self.orientation {
            Orientation::Vertical => {
                let day_start = day_start_of(placement.interval.start());
                let top = self
                    .grid
                    .time_offset(minutes_between(day_start, placement.interval.start()));
                let bottom = self
                    .grid
                    .time_offset(minutes_between(day_start, placement.interval.end()));
                let lane = self.grid.day_width() / column_count as f64;
                BlockGeometry {
                    left: placement.day_index as f64 * self.grid.day_width()
                        + placement.column_index as f64 * lane,
                    top,
                    width: self.cross_size(lane),
                    height: self.time_size(top, bottom),
                    z_index,
                }
            }
            Orientation::Horizontal => {
                let left = self.timeline_x(
                    placement.day_index,
                    placement.interval.start(),
                    placement.interval.start(),
                );
                let right = self.timeline_x(
                    placement.day_index,
                    placement.interval.start(),
                    placement.interval.end(),
                );
                let row = self.grid.row_height();
                BlockGeometry {
                    left,
                    top: placement.column_index as f64 * row,
                    width: self.time_size(left, right),
                    height: self.cross_size(row),
                    z_index,
                }
            }
        }
    }

    /// Recomputes geometry of an existing block against this mapper's grid.
    pub fn remap(&self, block: &TaskBlock) -> TaskBlock {
        let mut next = block.clone();
        next.geometry = self.map(&Placement::of_block(block));
        next
    }

    /// Dot/line/block policy for one visible interval.
    pub fn display_variant(interval: &TimeInterval) -> DisplayVariant {
        DisplayVariant::for_duration_minutes(interval.duration_minutes())
    }

    /// Timeline x of `at`, where `anchor` sits on day `anchor_day_index`.
    ///
    /// In-day offsets are capped at `day_width` so a narrow day never
    /// overlaps the next one.
    fn timeline_x(
        &self,
        anchor_day_index: usize,
        anchor: NaiveDateTime,
        at: NaiveDateTime,
    ) -> f64 {
        let day_shift = (at.date() - anchor.date()).num_days();
        let day_index = anchor_day_index as f64 + day_shift as f64;
        let offset = self
            .grid
            .time_offset(minutes_between(day_start_of(at), at))
            .min(self.grid.day_width());
        day_index * self.grid.day_width() + offset
    }

    fn time_size(&self, start_px: f64, end_px: f64) -> f64 {
        debug_assert!(
            end_px >= start_px,
            "time axis end {end_px} precedes start {start_px}"
        );
        (end_px - start_px)
            .max(0.0)
            .max(self.settings.minimum_visible_size)
    }

    fn cross_size(&self, lane: f64) -> f64 {
        let gutter = self.settings.column_gutter;
        if lane > gutter * 2.0 {
            lane - gutter
        } else {
            lane
        }
    }
}

fn day_start_of(at: NaiveDateTime) -> NaiveDateTime {
    at.date().and_time(NaiveTime::MIN)
}

fn minutes_between(from: NaiveDateTime, to: NaiveDateTime) -> f64 {
    (to - from).num_seconds() as f64 / 60.0
}

#[cfg(test)]
mod tests {
    use super::{GeometryMapper, Orientation, Placement};
    use crate::config::grid::GridConfiguration;
    use crate::config::settings::LayoutSettings;
    use crate::model::block::DisplayVariant;
    use crate::model::task::TimeInterval;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, day)
            .and_then(|date| date.and_hms_opt(hour, minute, 0))
            .expect("valid fixture time")
    }

    fn placement(
        day_index: usize,
        start: NaiveDateTime,
        end: NaiveDateTime,
        column_index: usize,
        column_count: usize,
    ) -> Placement {
        Placement {
            day_index,
            interval: TimeInterval::clamped(start, end),
            column_index,
            column_count,
        }
    }

    fn calendar_grid() -> GridConfiguration {
        GridConfiguration::new(120.0, 48.0, 0.8, 24.0).expect("valid grid")
    }

    #[test]
    fn vertical_places_time_down_and_columns_across() {
        let settings = LayoutSettings::default();
        let mapper = GeometryMapper::new(calendar_grid(), Orientation::Vertical, &settings);
        let geometry = mapper.map(&placement(2, at(12, 9, 30), at(12, 11, 0), 1, 2));

        assert_eq!(geometry.top, 9.0 * 48.0 + 30.0 * 0.8);
        assert_eq!(geometry.height, 11.0 * 48.0 - (9.0 * 48.0 + 30.0 * 0.8));
        assert_eq!(geometry.left, 2.0 * 120.0 + 60.0);
        assert_eq!(geometry.width, 60.0 - settings.column_gutter);
        assert_eq!(geometry.z_index, 2);
    }

    #[test]
    fn vertical_day_clipped_end_reaches_grid_bottom() {
        let settings = LayoutSettings::default();
        let mapper = GeometryMapper::new(calendar_grid(), Orientation::Vertical, &settings);
        let geometry = mapper.map(&placement(0, at(12, 22, 0), at(13, 0, 0), 0, 1));
        assert_eq!(geometry.top + geometry.height, 24.0 * 48.0);
    }

    #[test]
    fn minimum_visible_size_applies_to_instants() {
        let settings = LayoutSettings::default();
        let mapper = GeometryMapper::new(calendar_grid(), Orientation::Vertical, &settings);
        let geometry = mapper.map(&placement(0, at(12, 14, 0), at(12, 14, 0), 0, 1));
        assert_eq!(geometry.height, settings.minimum_visible_size);
    }

    #[test]
    fn horizontal_spans_days_and_stacks_lanes() {
        let settings = LayoutSettings::default();
        let grid = GridConfiguration::compact();
        let mapper = GeometryMapper::new(grid, Orientation::Horizontal, &settings);
        // Monday 22:00 to Wednesday 02:00 drawn from day index 1.
        let geometry = mapper.map(&placement(1, at(12, 22, 0), at(14, 2, 0), 2, 3));

        assert_eq!(geometry.left, 1440.0 + 22.0 * 60.0);
        assert_eq!(geometry.width, 28.0 * 60.0);
        assert_eq!(geometry.top, 2.0 * grid.row_height());
        assert_eq!(geometry.height, grid.row_height() - settings.column_gutter);
        assert_eq!(geometry.z_index, 3);
    }

    #[test]
    fn gutter_is_skipped_for_narrow_lanes() {
        let settings = LayoutSettings::default();
        let grid = GridConfiguration::new(6.0, 48.0, 0.8, 24.0).expect("valid grid");
        let mapper = GeometryMapper::new(grid, Orientation::Vertical, &settings);
        let geometry = mapper.map(&placement(0, at(12, 9, 0), at(12, 10, 0), 0, 3));
        assert_eq!(geometry.width, 2.0);
    }

    #[test]
    fn display_variant_uses_visible_duration() {
        let dot = TimeInterval::instant(at(12, 14, 0));
        let line = TimeInterval::clamped(at(12, 9, 0), at(12, 9, 45));
        let block = TimeInterval::clamped(at(12, 9, 0), at(12, 10, 30));
        assert_eq!(GeometryMapper::display_variant(&dot), DisplayVariant::Dot);
        assert_eq!(GeometryMapper::display_variant(&line), DisplayVariant::Line);
        assert_eq!(GeometryMapper::display_variant(&block), DisplayVariant::Block);
    }
}
