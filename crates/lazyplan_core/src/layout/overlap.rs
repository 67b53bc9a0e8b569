//! Overlap grouping and column packing for one day or period window.
//!
//! # Responsibility
//! - Partition items into overlap groups (connected components).
//! - Assign each item the lowest free column and its group's column count.
//!
//! # Invariants
//! - Sweep order is `(start, end, id)` after clipping, so output does not
//!   depend on input order.
//! - Overlapping items never share a column.
//! - `column_count` is the group's peak simultaneous overlap.
//! - Output slots are aligned with input order.

use crate::model::task::{TaskId, TimeInterval};
use crate::normalize::normalizer::ScheduledTask;
use chrono::{NaiveDate, NaiveDateTime};
use log::debug;
use serde::Serialize;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// Anything the packer can place: an id for tie-breaks and an interval.
pub trait Packable {
    fn pack_id(&self) -> TaskId;
    fn pack_interval(&self) -> TimeInterval;
}

impl Packable for ScheduledTask {
    fn pack_id(&self) -> TaskId {
        self.task.id
    }

    fn pack_interval(&self) -> TimeInterval {
        self.interval
    }
}

impl Packable for (TaskId, TimeInterval) {
    fn pack_id(&self) -> TaskId {
        self.0
    }

    fn pack_interval(&self) -> TimeInterval {
        self.1
    }
}

/// Column assignment for one input item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColumnSlot {
    pub column_index: usize,
    pub column_count: usize,
    pub group_index: usize,
}

/// Maximal set of transitively overlapping items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverlapGroup {
    /// Input indices in sweep order.
    pub members: Vec<usize>,
    pub column_count: usize,
    /// From the first member's start to the latest member end.
    pub span: TimeInterval,
}

/// Packing result for one window.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackedWindow {
    pub slots: Vec<ColumnSlot>,
    pub groups: Vec<OverlapGroup>,
}

/// Packs items that intersect one window (usually one calendar day).
#[derive(Debug, Clone, Copy)]
pub struct OverlapPacker {
    window: TimeInterval,
}

/// Active-set heap key: earliest end first; at equal ends positive
/// intervals leave before instants, which still overlap a start at their
/// own point.
type ActiveKey = Reverse<(NaiveDateTime, bool, usize)>;

impl OverlapPacker {
    pub fn new(window: TimeInterval) -> Self {
        Self { window }
    }

    /// Local midnight to midnight.
    pub fn for_day(date: NaiveDate) -> Self {
        Self::new(TimeInterval::day(date))
    }

    pub fn window(&self) -> TimeInterval {
        self.window
    }

    /// Assigns columns in O(n log n).
    pub fn pack<T: Packable>(&self, items: &[T]) -> PackedWindow {
        if items.is_empty() {
            return PackedWindow::default();
        }

        let clipped: Vec<(TimeInterval, TaskId)> = items
            .iter()
            .map(|item| (item.pack_interval().clip_to(&self.window), item.pack_id()))
            .collect();

        let mut order: Vec<usize> = (0..clipped.len()).collect();
        order.sort_by(|&a, &b| sweep_order(&clipped, a, b));

        let mut slots = vec![ColumnSlot::default(); clipped.len()];
        let mut groups: Vec<OverlapGroup> = Vec::new();
        let mut active: BinaryHeap<ActiveKey> = BinaryHeap::new();
        let mut free_columns: BinaryHeap<Reverse<usize>> = BinaryHeap::new();
        let mut next_column = 0usize;

        for &item in &order {
            let interval = clipped[item].0;

            while let Some(Reverse((_, _, other))) = active.peek().copied() {
                if clipped[other].0.overlaps(&interval) {
                    break;
                }
                active.pop();
                free_columns.push(Reverse(slots[other].column_index));
            }

            if active.is_empty() {
                free_columns.clear();
                next_column = 0;
                groups.push(OverlapGroup {
                    members: Vec::new(),
                    column_count: 0,
                    span: interval,
                });
            }

            let column = match free_columns.pop() {
                Some(Reverse(column)) => column,
                None => {
                    next_column += 1;
                    next_column - 1
                }
            };

            active.push(Reverse((interval.end(), interval.is_instant(), item)));

            let group_index = groups.len() - 1;
            let group = &mut groups[group_index];
            group.members.push(item);
            group.span =
                TimeInterval::clamped(group.span.start(), group.span.end().max(interval.end()));
            group.column_count = group.column_count.max(active.len()).max(column + 1);

            slots[item] = ColumnSlot {
                column_index: column,
                column_count: 0,
                group_index,
            };
        }

        for group in &groups {
            for &member in &group.members {
                slots[member].column_count = group.column_count;
            }
        }

        debug!(
            "event=pack_done module=overlap status=ok items={} groups={} max_columns={}",
            slots.len(),
            groups.len(),
            groups.iter().map(|group| group.column_count).max().unwrap_or(0)
        );

        PackedWindow { slots, groups }
    }
}

fn sweep_order(clipped: &[(TimeInterval, TaskId)], a: usize, b: usize) -> Ordering {
    let (left, left_id) = clipped[a];
    let (right, right_id) = clipped[b];
    left.start()
        .cmp(&right.start())
        .then(left.end().cmp(&right.end()))
        .then(left_id.cmp(&right_id))
        .then(a.cmp(&b))
}

#[cfg(test)]
mod tests {
    use super::{ColumnSlot, OverlapPacker};
    use crate::model::task::{TaskId, TimeInterval};
    use chrono::{NaiveDate, NaiveDateTime};
    use uuid::Uuid;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 12).expect("valid date")
    }

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        date().and_hms_opt(hour, minute, 0).expect("valid time")
    }

    fn item(n: u128, start: (u32, u32), end: (u32, u32)) -> (TaskId, TimeInterval) {
        (
            Uuid::from_u128(n),
            TimeInterval::clamped(at(start.0, start.1), at(end.0, end.1)),
        )
    }

    fn columns(slots: &[ColumnSlot]) -> Vec<(usize, usize)> {
        slots
            .iter()
            .map(|slot| (slot.column_index, slot.column_count))
            .collect()
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let packed = OverlapPacker::for_day(date()).pack::<(TaskId, TimeInterval)>(&[]);
        assert!(packed.slots.is_empty());
        assert!(packed.groups.is_empty());
    }

    #[test]
    fn single_item_gets_one_column() {
        let packed = OverlapPacker::for_day(date()).pack(&[item(1, (9, 0), (10, 0))]);
        assert_eq!(columns(&packed.slots), vec![(0, 1)]);
    }

    #[test]
    fn tail_overlap_reuses_freed_column() {
        // A 09:00-10:00, B 09:30-09:45, C 09:50-10:30.
        let items = [
            item(1, (9, 0), (10, 0)),
            item(2, (9, 30), (9, 45)),
            item(3, (9, 50), (10, 30)),
        ];
        let packed = OverlapPacker::for_day(date()).pack(&items);
        assert_eq!(columns(&packed.slots), vec![(0, 2), (1, 2), (1, 2)]);
        assert_eq!(packed.groups.len(), 1);
    }

    #[test]
    fn column_count_is_peak_not_group_size() {
        let items = [
            item(1, (8, 0), (12, 0)),
            item(2, (8, 0), (9, 0)),
            item(3, (9, 0), (10, 0)),
            item(4, (10, 0), (11, 0)),
            item(5, (11, 0), (12, 0)),
        ];
        let packed = OverlapPacker::for_day(date()).pack(&items);
        assert_eq!(packed.groups.len(), 1);
        assert_eq!(packed.groups[0].members.len(), 5);
        assert!(packed.slots.iter().all(|slot| slot.column_count == 2));
        // The short 08:00 item sorts first; the long one takes column 1.
        assert_eq!(packed.slots[0].column_index, 1);
        assert!(packed.slots[1..].iter().all(|slot| slot.column_index == 0));
    }

    #[test]
    fn touching_items_form_separate_groups() {
        let items = [item(1, (9, 0), (10, 0)), item(2, (10, 0), (11, 0))];
        let packed = OverlapPacker::for_day(date()).pack(&items);
        assert_eq!(columns(&packed.slots), vec![(0, 1), (0, 1)]);
        assert_eq!(packed.groups.len(), 2);
        assert_ne!(packed.slots[0].group_index, packed.slots[1].group_index);
    }

    #[test]
    fn zero_duration_twins_break_ties_by_id() {
        let items = [item(9, (14, 0), (14, 0)), item(3, (14, 0), (14, 0))];
        let packed = OverlapPacker::for_day(date()).pack(&items);
        assert_eq!(columns(&packed.slots), vec![(1, 2), (0, 2)]);
    }

    #[test]
    fn zero_duration_overlaps_interval_starting_at_its_instant() {
        let items = [item(1, (14, 0), (15, 0)), item(2, (14, 0), (14, 0))];
        let packed = OverlapPacker::for_day(date()).pack(&items);
        // The instant sorts first (earlier end) and keeps column 0.
        assert_eq!(columns(&packed.slots), vec![(1, 2), (0, 2)]);
    }

    #[test]
    fn zero_duration_at_interval_end_does_not_overlap() {
        let items = [item(1, (13, 0), (14, 0)), item(2, (14, 0), (14, 0))];
        let packed = OverlapPacker::for_day(date()).pack(&items);
        assert_eq!(columns(&packed.slots), vec![(0, 1), (0, 1)]);
    }

    #[test]
    fn clips_to_window_before_packing() {
        let previous_evening = (
            Uuid::from_u128(1),
            TimeInterval::clamped(at(0, 0) - chrono::Duration::hours(3), at(1, 0)),
        );
        let items = [previous_evening, item(2, (1, 0), (2, 0))];
        let packed = OverlapPacker::for_day(date()).pack(&items);
        assert_eq!(columns(&packed.slots), vec![(0, 1), (0, 1)]);
        assert_eq!(packed.groups[0].span.start(), at(0, 0));
    }

    #[test]
    fn assignment_is_independent_of_input_order() {
        let forward = [
            item(1, (9, 0), (11, 0)),
            item(2, (9, 0), (11, 0)),
            item(3, (10, 0), (12, 0)),
            item(4, (13, 0), (13, 30)),
        ];
        let mut reversed = forward;
        reversed.reverse();

        let packer = OverlapPacker::for_day(date());
        let a = packer.pack(&forward);
        let b = packer.pack(&reversed);
        for (index, slot) in a.slots.iter().enumerate() {
            let mirror = b.slots[forward.len() - 1 - index];
            assert_eq!(slot.column_index, mirror.column_index);
            assert_eq!(slot.column_count, mirror.column_count);
        }
    }
}
