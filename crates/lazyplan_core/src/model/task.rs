//! Task snapshot model consumed by the layout engine.
//!
//! # Responsibility
//! - Define the read-only task tree shape handed over by the task store.
//! - Provide interval arithmetic shared by every layout stage.
//!
//! # Invariants
//! - `TimeInterval::end` is never earlier than `TimeInterval::start`.
//! - Intervals are half-open; a zero-length interval is an instant marker.
//! - Layout code never mutates a `Task`.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable task identifier, unique within one task tree.
///
/// `Uuid` is totally ordered, which layout uses as the final tie-break.
pub type TaskId = Uuid;

/// One task as stored by the task store.
///
/// Wire names follow the host snapshot schema (`startTime`, `subTasks`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Local wall-clock start. Scheduled only when `end_time` is also set.
    #[serde(default)]
    pub start_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub end_time: Option<NaiveDateTime>,
    /// Weak back-reference used for lookup only.
    #[serde(default)]
    pub parent_id: Option<TaskId>,
    #[serde(default)]
    pub sub_tasks: Vec<Task>,
    /// Optional `#RRGGBB` or `#RRGGBBAA` display color.
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub completed: bool,
}

impl Task {
    /// Creates an unscheduled task with no children.
    pub fn new(id: TaskId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: None,
            start_time: None,
            end_time: None,
            parent_id: None,
            sub_tasks: Vec::new(),
            color: None,
            category_id: None,
            completed: false,
        }
    }

    /// Creates a task scheduled over `[start, end]`.
    ///
    /// No validation happens here; reversed windows are clamped later by
    /// normalization.
    pub fn scheduled(
        id: TaskId,
        title: impl Into<String>,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Self {
        let mut task = Self::new(id, title);
        task.start_time = Some(start);
        task.end_time = Some(end);
        task
    }

    /// Appends one child and records the back-reference on it.
    pub fn with_sub_task(mut self, mut child: Task) -> Self {
        child.parent_id = Some(self.id);
        self.sub_tasks.push(child);
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_category(mut self, category_id: impl Into<String>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }

    /// Returns whether both instants are present.
    pub fn is_scheduled(&self) -> bool {
        self.start_time.is_some() && self.end_time.is_some()
    }

    /// Returns the normalized interval for scheduled tasks.
    ///
    /// A reversed window collapses to an instant at `start_time`.
    pub fn interval(&self) -> Option<TimeInterval> {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => Some(TimeInterval::clamped(start, end)),
            _ => None,
        }
    }

    /// Counts this task and every descendant.
    pub fn subtree_len(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(task) = stack.pop() {
            count += 1;
            stack.extend(task.sub_tasks.iter());
        }
        count
    }
}

/// Half-open time window `[start, end)`; `start == end` marks an instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeInterval {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl TimeInterval {
    /// Builds an interval, collapsing `end < start` to an instant at `start`.
    pub fn clamped(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    /// Builds an instant marker.
    pub fn instant(at: NaiveDateTime) -> Self {
        Self { start: at, end: at }
    }

    /// Covers one calendar day, local midnight to midnight.
    ///
    /// The last representable day ends at `NaiveDateTime::MAX`.
    pub fn day(date: NaiveDate) -> Self {
        let start = date.and_time(NaiveTime::MIN);
        Self {
            start,
            end: start
                .checked_add_signed(Duration::days(1))
                .unwrap_or(NaiveDateTime::MAX),
        }
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Whole minutes covered, rounded down.
    pub fn duration_minutes(&self) -> i64 {
        self.duration().num_minutes()
    }

    pub fn is_instant(&self) -> bool {
        self.start == self.end
    }

    /// Returns whether `at` falls inside this interval.
    ///
    /// An instant contains only its own point.
    pub fn contains_instant(&self, at: NaiveDateTime) -> bool {
        if self.is_instant() {
            at == self.start
        } else {
            self.start <= at && at < self.end
        }
    }

    /// Overlap test used by packing and day predicates.
    ///
    /// Instants overlap any interval containing their point, including other
    /// instants at the same point. Touching positive intervals do not overlap.
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        if self.is_instant() {
            other.contains_instant(self.start)
        } else if other.is_instant() {
            self.contains_instant(other.start)
        } else {
            self.start < other.end && other.start < self.end
        }
    }

    /// Clamps this interval into `window`.
    ///
    /// Always returns a valid interval; a disjoint input collapses to the
    /// nearest window edge.
    pub fn clip_to(&self, window: &TimeInterval) -> TimeInterval {
        let start = self.start.clamp(window.start, window.end);
        let end = self.end.clamp(start, window.end);
        TimeInterval { start, end }
    }
}

#[cfg(test)]
mod tests {
    use super::{Task, TimeInterval};
    use chrono::{NaiveDate, NaiveDateTime};
    use uuid::Uuid;

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, day)
            .and_then(|date| date.and_hms_opt(hour, minute, 0))
            .expect("valid fixture time")
    }

    #[test]
    fn clamped_collapses_reversed_window() {
        let interval = TimeInterval::clamped(at(12, 10, 0), at(12, 9, 0));
        assert!(interval.is_instant());
        assert_eq!(interval.start(), at(12, 10, 0));
    }

    #[test]
    fn touching_intervals_do_not_overlap() {
        let a = TimeInterval::clamped(at(12, 9, 0), at(12, 10, 0));
        let b = TimeInterval::clamped(at(12, 10, 0), at(12, 11, 0));
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn instant_overlaps_containing_interval_and_same_instant() {
        let block = TimeInterval::clamped(at(12, 14, 0), at(12, 15, 0));
        let marker = TimeInterval::instant(at(12, 14, 0));
        let twin = TimeInterval::instant(at(12, 14, 0));
        let end_marker = TimeInterval::instant(at(12, 15, 0));

        assert!(marker.overlaps(&block));
        assert!(block.overlaps(&marker));
        assert!(marker.overlaps(&twin));
        assert!(!end_marker.overlaps(&block));
    }

    #[test]
    fn clip_to_handles_disjoint_and_straddling_inputs() {
        let day = TimeInterval::day(NaiveDate::from_ymd_opt(2026, 10, 12).expect("date"));
        let straddle = TimeInterval::clamped(at(11, 22, 0), at(12, 2, 0));
        let clipped = straddle.clip_to(&day);
        assert_eq!(clipped.start(), at(12, 0, 0));
        assert_eq!(clipped.end(), at(12, 2, 0));

        let later = TimeInterval::clamped(at(14, 9, 0), at(14, 10, 0));
        let collapsed = later.clip_to(&day);
        assert!(collapsed.is_instant());
        assert_eq!(collapsed.start(), day.end());
    }

    #[test]
    fn last_representable_day_ends_at_max() {
        let last = TimeInterval::day(NaiveDate::MAX);
        assert_eq!(last.end(), NaiveDateTime::MAX);
        assert!(last.contains_instant(NaiveDate::MAX.and_hms_opt(23, 0, 0).expect("time")));
    }

    #[test]
    fn subtree_len_counts_nested_children() {
        let root = Task::new(Uuid::from_u128(1), "root").with_sub_task(
            Task::new(Uuid::from_u128(2), "child")
                .with_sub_task(Task::new(Uuid::from_u128(3), "grandchild")),
        );
        assert_eq!(root.subtree_len(), 3);
        assert_eq!(root.sub_tasks[0].parent_id, Some(Uuid::from_u128(1)));
    }

    #[test]
    fn snapshot_uses_camel_case_wire_names() {
        let task = Task::scheduled(Uuid::from_u128(7), "standup", at(12, 9, 0), at(12, 9, 15));
        let json = serde_json::to_value(&task).expect("serialize task");
        assert_eq!(json["startTime"], "2026-10-12T09:00:00");
        assert_eq!(json["endTime"], "2026-10-12T09:15:00");
        assert!(json["subTasks"].as_array().expect("array").is_empty());
    }
}
