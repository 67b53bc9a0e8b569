//! Period segmentation for multi-day and multi-week tasks.
//!
//! # Responsibility
//! - Cut each scheduled task into one segment per touched period.
//! - Keep a stable, reversible segment key per (task, period).
//!
//! # Invariants
//! - Segments of one task are contiguous, non-overlapping, in period order,
//!   and their union equals the task interval clipped to the visible range.
//! - Exactly one segment per emitted task has `is_last = true`.
//! - Instants emit exactly one segment; no empty trailing segment is emitted
//!   for intervals ending on a boundary.

use crate::layout::overlap::Packable;
use crate::model::block::SegmentInfo;
use crate::model::task::{TaskId, TimeInterval};
use crate::normalize::normalizer::ScheduledTask;
use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use log::debug;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Period granularity and the boundary function it implies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodUnit {
    Day,
    Week { starts_on: Weekday },
}

impl PeriodUnit {
    /// Start of the period containing `at`.
    pub fn floor(&self, at: NaiveDateTime) -> NaiveDateTime {
        let date = at.date();
        match self {
            Self::Day => date.and_time(NaiveTime::MIN),
            Self::Week { starts_on } => {
                let back = (date.weekday().num_days_from_monday() + 7
                    - starts_on.num_days_from_monday())
                    % 7;
                date.checked_sub_signed(Duration::days(i64::from(back)))
                    .unwrap_or(NaiveDate::MIN)
                    .and_time(NaiveTime::MIN)
            }
        }
    }

    /// First boundary strictly after `at`, saturating at `NaiveDateTime::MAX`.
    pub fn next_boundary(&self, at: NaiveDateTime) -> NaiveDateTime {
        self.floor(at)
            .checked_add_signed(self.length())
            .unwrap_or(NaiveDateTime::MAX)
    }

    pub fn length(&self) -> Duration {
        match self {
            Self::Day => Duration::days(1),
            Self::Week { .. } => Duration::weeks(1),
        }
    }

    fn key_label(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week { .. } => "week",
        }
    }
}

/// Contiguous visible days, starting at local midnight of `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibleRange {
    start: NaiveDate,
    day_count: u32,
}

impl VisibleRange {
    pub fn new(start: NaiveDate, day_count: u32) -> Self {
        Self { start, day_count }
    }

    pub fn single_day(date: NaiveDate) -> Self {
        Self::new(date, 1)
    }

    /// The seven days of the week containing `date`.
    pub fn week_containing(date: NaiveDate, starts_on: Weekday) -> Self {
        let first = PeriodUnit::Week { starts_on }
            .floor(date.and_time(NaiveTime::MIN))
            .date();
        Self::new(first, 7)
    }

    /// Every day of the calendar month containing `date`.
    pub fn month_containing(date: NaiveDate) -> Self {
        let first = date.with_day(1).unwrap_or(date);
        let day_count = first
            .checked_add_months(Months::new(1))
            .map(|next| (next - first).num_days())
            .unwrap_or_else(|| (NaiveDate::MAX - first).num_days() + 1);
        Self::new(first, u32::try_from(day_count).unwrap_or(0))
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn day_count(&self) -> u32 {
        self.day_count
    }

    pub fn is_empty(&self) -> bool {
        self.day_count == 0
    }

    /// Range window, or `None` when its end falls past the last
    /// representable instant.
    pub fn checked_window(&self) -> Option<TimeInterval> {
        let start = self.start.and_time(NaiveTime::MIN);
        start
            .checked_add_signed(Duration::days(i64::from(self.day_count)))
            .map(|end| TimeInterval::clamped(start, end))
    }

    /// Range window, cut at `NaiveDateTime::MAX` near the end of the calendar.
    pub fn window(&self) -> TimeInterval {
        self.checked_window().unwrap_or_else(|| {
            TimeInterval::clamped(self.start.and_time(NaiveTime::MIN), NaiveDateTime::MAX)
        })
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        (0..self.day_count)
            .map_while(|offset| {
                self.start
                    .checked_add_signed(Duration::days(i64::from(offset)))
            })
            .collect()
    }

    /// 0-based day position, or `None` outside the range.
    pub fn day_index_of(&self, at: NaiveDateTime) -> Option<usize> {
        if self.is_empty() || !self.window().contains_instant(at) {
            return None;
        }
        usize::try_from((at.date() - self.start).num_days()).ok()
    }
}

/// One period of the visible range, clipped to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub index: usize,
    pub window: TimeInterval,
}

/// One per-period slice of a scheduled task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment<'a> {
    pub task: &'a ScheduledTask,
    pub interval: TimeInterval,
    pub period_index: usize,
    pub ordinal: usize,
    pub is_last: bool,
    pub key: String,
}

impl Segment<'_> {
    pub fn info(&self) -> SegmentInfo {
        SegmentInfo {
            key: self.key.clone(),
            period_index: self.period_index,
            ordinal: self.ordinal,
            is_last: self.is_last,
        }
    }
}

impl Packable for Segment<'_> {
    fn pack_id(&self) -> TaskId {
        self.task.id()
    }

    fn pack_interval(&self) -> TimeInterval {
        self.interval
    }
}

/// Builds `{task_id}_{unit}_{period_index}`.
pub fn segment_key(task_id: TaskId, unit: PeriodUnit, period_index: usize) -> String {
    format!("{task_id}_{}_{period_index}", unit.key_label())
}

/// Recovers the parent task id from a segment key (or a bare id).
pub fn parent_id_from_segment_key(key: &str) -> Option<TaskId> {
    let Some((head, suffix)) = key.split_once('_') else {
        return Uuid::parse_str(key).ok();
    };
    let (label, index) = suffix.split_once('_')?;
    if !matches!(label, "day" | "week") || index.parse::<usize>().is_err() {
        return None;
    }
    Uuid::parse_str(head).ok()
}

/// Splits tasks along period boundaries inside one visible range.
#[derive(Debug, Clone, Copy)]
pub struct WeekSegmenter {
    unit: PeriodUnit,
    range: VisibleRange,
}

impl WeekSegmenter {
    pub fn new(unit: PeriodUnit, range: VisibleRange) -> Self {
        Self { unit, range }
    }

    pub fn unit(&self) -> PeriodUnit {
        self.unit
    }

    pub fn range(&self) -> VisibleRange {
        self.range
    }

    /// Periods covering the range; the first and last may be partial.
    pub fn periods(&self) -> Vec<Period> {
        let window = self.range.window();
        let mut periods = Vec::new();
        let mut cursor = window.start();
        while cursor < window.end() {
            let end = self.unit.next_boundary(cursor).min(window.end());
            periods.push(Period {
                index: periods.len(),
                window: TimeInterval::clamped(cursor, end),
            });
            cursor = end;
        }
        periods
    }

    /// Period position of `at`, counted from the period holding the range start.
    pub fn period_index_of(&self, at: NaiveDateTime) -> usize {
        let origin = self.unit.floor(self.range.window().start());
        let elapsed = self.unit.floor(at) - origin;
        let steps = elapsed.num_days() / self.unit.length().num_days();
        usize::try_from(steps).unwrap_or(0)
    }

    /// Segments every task, keeping task order then period order.
    pub fn segment<'a>(&self, tasks: &'a [ScheduledTask]) -> Vec<Segment<'a>> {
        let segments: Vec<Segment<'a>> = tasks
            .iter()
            .flat_map(|task| self.segment_task(task))
            .collect();
        debug!(
            "event=segment_done module=segment status=ok unit={} tasks={} segments={}",
            self.unit.key_label(),
            tasks.len(),
            segments.len()
        );
        segments
    }

    /// Segments one task; empty when it does not touch the range.
    pub fn segment_task<'a>(&self, task: &'a ScheduledTask) -> Vec<Segment<'a>> {
        if self.range.is_empty() {
            return Vec::new();
        }
        let window = self.range.window();
        if !task.interval.overlaps(&window) {
            return Vec::new();
        }

        let clipped = task.interval.clip_to(&window);
        let mut segments = Vec::new();
        let mut cursor = clipped.start();
        let mut period_index = self.period_index_of(cursor);

        loop {
            let boundary = self.unit.next_boundary(cursor).min(window.end());
            let segment_end = clipped.end().min(boundary);
            debug_assert!(
                segment_end >= cursor,
                "segment end {segment_end} precedes start {cursor}"
            );
            let segment_end = segment_end.max(cursor);

            segments.push(Segment {
                task,
                interval: TimeInterval::clamped(cursor, segment_end),
                period_index,
                ordinal: segments.len(),
                is_last: false,
                key: segment_key(task.id(), self.unit, period_index),
            });

            if segment_end >= clipped.end() {
                break;
            }
            cursor = segment_end;
            period_index += 1;
        }

        if let Some(last) = segments.last_mut() {
            last.is_last = true;
        }
        segments
    }
}
