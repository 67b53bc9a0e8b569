//! Layout output records.
//!
//! # Responsibility
//! - Define the ephemeral block shape handed to renderers.
//! - Own the fixed dot/line/block display thresholds.
//!
//! # Invariants
//! - Blocks are recomputed every pass and never persisted.
//! - `column_index < column_count` for every block.
//! - Geometry is only meaningful for the grid configuration that produced it.

use crate::model::task::{TaskId, TimeInterval};
use serde::{Deserialize, Serialize};

/// Visible durations strictly below this render as a dot.
pub const DOT_MAX_MINUTES: i64 = 30;
/// Visible durations up to and including this render as a line.
pub const LINE_MAX_MINUTES: i64 = 60;

/// Compact representation chosen from visible duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayVariant {
    /// Under 30 minutes.
    Dot,
    /// 30 to 60 minutes.
    Line,
    /// Over 60 minutes.
    Block,
}

impl DisplayVariant {
    pub fn for_duration_minutes(minutes: i64) -> Self {
        if minutes < DOT_MAX_MINUTES {
            Self::Dot
        } else if minutes <= LINE_MAX_MINUTES {
            Self::Line
        } else {
            Self::Block
        }
    }
}

/// Pixel rectangle plus stacking order.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BlockGeometry {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    /// Grows with `column_index` so later-packed blocks stay clickable.
    pub z_index: i32,
}

impl BlockGeometry {
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Inclusive on the leading edges, exclusive on the trailing ones.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.left && x < self.right() && y >= self.top && y < self.bottom()
    }
}

/// Period segment metadata attached to blocks cut by the segmenter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentInfo {
    /// Stable render key, e.g. `{task_id}_week_{period_index}`.
    pub key: String,
    /// Period position inside the visible range.
    pub period_index: usize,
    /// 0-based position among this task's segments.
    pub ordinal: usize,
    /// Exactly one segment per task carries `true`.
    pub is_last: bool,
}

/// One placed block of one task inside one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskBlock {
    pub task_id: TaskId,
    pub parent_id: Option<TaskId>,
    pub depth: usize,
    pub effective_color: String,
    pub completed: bool,
    /// Visible part of the task interval after period/range clipping.
    pub interval: TimeInterval,
    /// Day of `interval.start()` within the visible range.
    pub day_index: usize,
    pub column_index: usize,
    pub column_count: usize,
    /// Overlap group position inside the owning period.
    pub group_index: usize,
    pub geometry: BlockGeometry,
    pub display: DisplayVariant,
    pub segment: Option<SegmentInfo>,
}

impl TaskBlock {
    /// True when the segmenter cut the task into more than one block.
    ///
    /// Every pass attaches `segment`; a task that fits one period still
    /// reports `false` here.
    pub fn is_week_segment(&self) -> bool {
        self.segment
            .as_ref()
            .is_some_and(|segment| segment.ordinal > 0 || !segment.is_last)
    }

    pub fn is_last_week_segment(&self) -> bool {
        self.is_week_segment() && self.segment.as_ref().is_some_and(|segment| segment.is_last)
    }

    /// Render key: the segment key for split tasks, otherwise the task id.
    pub fn key(&self) -> String {
        match &self.segment {
            Some(segment) if self.is_week_segment() => segment.key.clone(),
            _ => self.task_id.to_string(),
        }
    }
}
