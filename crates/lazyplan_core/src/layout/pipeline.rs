//! One full layout pass: segment, pack per period, map to pixels.
//!
//! # Responsibility
//! - Drive `WeekSegmenter`, `OverlapPacker` and `GeometryMapper` in order.
//! - Group output per period so hosts can render one day/week at a time.
//!
//! # Invariants
//! - Every scheduled task that touches the range yields at least one block.
//! - Blocks inside a period keep source pre-order.
//! - A pass is a pure function of (tasks, view, grid, settings).

use crate::config::grid::GridConfiguration;
use crate::config::settings::LayoutSettings;
use crate::layout::geometry::{GeometryMapper, Orientation, Placement};
use crate::layout::overlap::{ColumnSlot, OverlapGroup, OverlapPacker};
use crate::layout::segment::{PeriodUnit, Segment, VisibleRange, WeekSegmenter};
use crate::model::block::TaskBlock;
use crate::model::task::{TaskId, TimeInterval};
use crate::normalize::normalizer::{FlatTask, ScheduledTask};
use log::{debug, warn};
use serde::Serialize;

/// Which axis, period unit and day range a pass lays out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ViewSpec {
    orientation: Orientation,
    unit: PeriodUnit,
    range: VisibleRange,
}

impl ViewSpec {
    /// Day/week calendar: vertical time axis, one period per day.
    pub fn calendar(range: VisibleRange) -> Self {
        Self {
            orientation: Orientation::Vertical,
            unit: PeriodUnit::Day,
            range,
        }
    }

    /// Horizontal timeline cut along `unit` boundaries.
    pub fn timeline(range: VisibleRange, unit: PeriodUnit) -> Self {
        Self {
            orientation: Orientation::Horizontal,
            unit,
            range,
        }
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn unit(&self) -> PeriodUnit {
        self.unit
    }

    pub fn range(&self) -> VisibleRange {
        self.range
    }
}

/// Blocks and overlap groups of one period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodLayout {
    pub index: usize,
    pub window: TimeInterval,
    pub blocks: Vec<TaskBlock>,
    /// Member indices point into `blocks`.
    pub groups: Vec<OverlapGroup>,
    /// Widest group in the period; timeline rows needed to draw it.
    pub lane_count: usize,
}

/// Output of one layout pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutPass {
    pub view: ViewSpec,
    pub grid: GridConfiguration,
    pub periods: Vec<PeriodLayout>,
    pub unscheduled: Vec<FlatTask>,
}

impl LayoutPass {
    pub fn blocks(&self) -> impl Iterator<Item = &TaskBlock> {
        self.periods.iter().flat_map(|period| period.blocks.iter())
    }

    pub fn block_count(&self) -> usize {
        self.periods.iter().map(|period| period.blocks.len()).sum()
    }

    /// Every block (segment) of one task in period order.
    pub fn blocks_for_task(&self, task_id: TaskId) -> Vec<&TaskBlock> {
        self.blocks()
            .filter(|block| block.task_id == task_id)
            .collect()
    }

    /// Full length of the time axis for this pass's grid.
    pub fn content_width(&self) -> f64 {
        f64::from(self.view.range.day_count()) * self.grid.day_width()
    }

    /// Same pass with geometry recomputed for `grid`.
    ///
    /// Packing and segmentation do not depend on the grid, so only
    /// rectangles change.
    pub fn remapped(&self, grid: GridConfiguration, settings: &LayoutSettings) -> LayoutPass {
        let mapper = GeometryMapper::new(grid, self.view.orientation, settings);
        let periods = self
            .periods
            .iter()
            .map(|period| PeriodLayout {
                index: period.index,
                window: period.window,
                blocks: period.blocks.iter().map(|block| mapper.remap(block)).collect(),
                groups: period.groups.clone(),
                lane_count: period.lane_count,
            })
            .collect();
        LayoutPass {
            view: self.view,
            grid,
            periods,
            unscheduled: self.unscheduled.clone(),
        }
    }
}

/// Runs segmentation, packing and geometry for one view.
pub fn build_pass(
    scheduled: &[ScheduledTask],
    unscheduled: &[FlatTask],
    view: ViewSpec,
    grid: GridConfiguration,
    settings: &LayoutSettings,
) -> LayoutPass {
    let segmenter = WeekSegmenter::new(view.unit, view.range);
    let mapper = GeometryMapper::new(grid, view.orientation, settings);

    let periods = segmenter.periods();
    let mut buckets: Vec<Vec<Segment<'_>>> = periods.iter().map(|_| Vec::new()).collect();
    for segment in segmenter.segment(scheduled) {
        debug_assert!(
            segment.period_index < periods.len(),
            "segment period {} out of range",
            segment.period_index
        );
        match buckets.get_mut(segment.period_index) {
            Some(bucket) => bucket.push(segment),
            None => {
                warn!(
                    "event=segment_out_of_range module=pipeline status=skipped task_id={} period_index={}",
                    segment.task.id(),
                    segment.period_index
                );
            }
        }
    }

    let periods: Vec<PeriodLayout> = periods
        .into_iter()
        .zip(buckets)
        .map(|(period, segments)| {
            let packed = OverlapPacker::new(period.window).pack(&segments);
            let blocks = segments
                .iter()
                .zip(packed.slots.iter())
                .map(|(segment, slot)| block_for(segment, *slot, view.range, &mapper))
                .collect();
            let lane_count = packed
                .groups
                .iter()
                .map(|group| group.column_count)
                .max()
                .unwrap_or(0);
            PeriodLayout {
                index: period.index,
                window: period.window,
                blocks,
                groups: packed.groups,
                lane_count,
            }
        })
        .collect();

    let pass = LayoutPass {
        view,
        grid,
        periods,
        unscheduled: unscheduled.to_vec(),
    };
    debug!(
        "event=layout_pass module=pipeline status=ok orientation={:?} periods={} blocks={} unscheduled={}",
        view.orientation,
        pass.periods.len(),
        pass.block_count(),
        pass.unscheduled.len()
    );
    pass
}

fn block_for(
    segment: &Segment<'_>,
    slot: ColumnSlot,
    range: VisibleRange,
    mapper: &GeometryMapper<'_>,
) -> TaskBlock {
    let task = &segment.task.task;
    // Segments are clipped to the range, so their start always has a day.
    let day_index = range.day_index_of(segment.interval.start()).unwrap_or(0);
    let placement = Placement {
        day_index,
        interval: segment.interval,
        column_index: slot.column_index,
        column_count: slot.column_count,
    };
    TaskBlock {
        task_id: task.id,
        parent_id: task.parent_id,
        depth: task.depth,
        effective_color: task.effective_color.clone(),
        completed: task.completed,
        interval: segment.interval,
        day_index,
        column_index: slot.column_index,
        column_count: slot.column_count,
        group_index: slot.group_index,
        geometry: mapper.map(&placement),
        display: GeometryMapper::display_variant(&segment.interval),
        segment: Some(segment.info()),
    }
}

#[cfg(test)]
mod tests {
    use super::{build_pass, ViewSpec};
    use crate::config::grid::GridConfiguration;
    use crate::config::settings::LayoutSettings;
    use crate::layout::segment::{PeriodUnit, VisibleRange};
    use crate::model::block::DisplayVariant;
    use crate::model::task::Task;
    use crate::normalize::normalizer::{NoCategoryColors, TaskNormalizer};
    use chrono::{NaiveDate, NaiveDateTime, Weekday};
    use uuid::Uuid;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).expect("valid date")
    }

    fn at(d: u32, hour: u32, minute: u32) -> NaiveDateTime {
        day(d).and_hms_opt(hour, minute, 0).expect("valid time")
    }

    fn id(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    #[test]
    fn calendar_pass_splits_overnight_task_per_day() {
        let tree = vec![
            Task::scheduled(id(1), "overnight", at(12, 22, 0), at(14, 2, 0)),
            Task::new(id(2), "someday"),
        ];
        let settings = LayoutSettings::default();
        let normalized = TaskNormalizer::new(&NoCategoryColors, &settings).normalize(&tree);
        let view = ViewSpec::calendar(VisibleRange::week_containing(day(12), Weekday::Sun));
        let pass = build_pass(
            &normalized.scheduled,
            &normalized.unscheduled,
            view,
            GridConfiguration::compact(),
            &settings,
        );

        assert_eq!(pass.periods.len(), 7);
        let day_indices: Vec<_> = pass.blocks().map(|block| block.day_index).collect();
        assert_eq!(day_indices, vec![1, 2, 3]);
        assert_eq!(
            pass.blocks().filter(|block| block.is_last_week_segment()).count(),
            1
        );
        assert_eq!(pass.unscheduled.len(), 1);
        assert_eq!(pass.periods[1].lane_count, 1);
        assert_eq!(pass.periods[0].lane_count, 0);
    }

    #[test]
    fn timeline_lanes_follow_packing() {
        let tree = vec![
            Task::scheduled(id(1), "a", at(12, 9, 0), at(12, 10, 0)),
            Task::scheduled(id(2), "b", at(12, 9, 30), at(12, 9, 45)),
            Task::scheduled(id(3), "c", at(13, 14, 0), at(13, 14, 0)),
        ];
        let settings = LayoutSettings::default();
        let normalized = TaskNormalizer::new(&NoCategoryColors, &settings).normalize(&tree);
        let view = ViewSpec::timeline(
            VisibleRange::new(day(11), 7),
            PeriodUnit::Week {
                starts_on: Weekday::Sun,
            },
        );
        let grid = GridConfiguration::compact();
        let pass = build_pass(
            &normalized.scheduled,
            &normalized.unscheduled,
            view,
            grid,
            &settings,
        );

        assert_eq!(pass.periods.len(), 1);
        assert_eq!(pass.periods[0].lane_count, 2);
        let b = &pass.blocks_for_task(id(2))[0];
        assert_eq!(b.column_index, 1);
        assert_eq!(b.geometry.top, grid.row_height());
        assert_eq!(b.display, DisplayVariant::Dot);
        let c = &pass.blocks_for_task(id(3))[0];
        assert_eq!(c.day_index, 2);
        assert_eq!(c.column_count, 1);
        assert_eq!(pass.content_width(), 7.0 * grid.day_width());
    }

    #[test]
    fn remapped_changes_geometry_only() {
        let tree = vec![Task::scheduled(id(1), "a", at(12, 9, 0), at(12, 11, 0))];
        let settings = LayoutSettings::default();
        let normalized = TaskNormalizer::new(&NoCategoryColors, &settings).normalize(&tree);
        let view = ViewSpec::timeline(VisibleRange::single_day(day(12)), PeriodUnit::Day);
        let compact = build_pass(
            &normalized.scheduled,
            &normalized.unscheduled,
            view,
            GridConfiguration::compact(),
            &settings,
        );
        let expanded = compact.remapped(GridConfiguration::expanded(), &settings);

        let before = &compact.periods[0].blocks[0];
        let after = &expanded.periods[0].blocks[0];
        assert_eq!(before.column_index, after.column_index);
        assert_eq!(before.interval, after.interval);
        assert_eq!(after.geometry.width, before.geometry.width * 6.0);
        assert_eq!(expanded.grid, GridConfiguration::expanded());
    }
}
