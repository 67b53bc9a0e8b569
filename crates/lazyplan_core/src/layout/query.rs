//! Read-only helpers for UI badges and click routing.

use crate::model::block::TaskBlock;
use crate::model::task::{Task, TimeInterval};
use crate::normalize::normalizer::ScheduledTask;
use chrono::NaiveDate;

/// Returns whether a scheduled task intersects `date` (midnight to midnight).
///
/// Unscheduled tasks never overlap a day.
pub fn task_overlaps_day(task: &Task, date: NaiveDate) -> bool {
    task.interval()
        .is_some_and(|interval| interval.overlaps(&TimeInterval::day(date)))
}

/// Counts unscheduled tasks across the whole tree, nested ones included.
pub fn count_unscheduled(roots: &[Task]) -> usize {
    let mut count = 0;
    let mut stack: Vec<&Task> = roots.iter().collect();
    while let Some(task) = stack.pop() {
        if !task.is_scheduled() {
            count += 1;
        }
        stack.extend(task.sub_tasks.iter());
    }
    count
}

/// Scheduled tasks touching `date`, in input order.
pub fn tasks_on_day(scheduled: &[ScheduledTask], date: NaiveDate) -> Vec<&ScheduledTask> {
    let window = TimeInterval::day(date);
    scheduled
        .iter()
        .filter(|item| item.interval.overlaps(&window))
        .collect()
}

/// Topmost block under `(x, y)`.
///
/// Highest `z_index` wins; on ties the block that comes later wins, matching
/// paint order.
pub fn hit_test<'a, I>(blocks: I, x: f64, y: f64) -> Option<&'a TaskBlock>
where
    I: IntoIterator<Item = &'a TaskBlock>,
{
    blocks
        .into_iter()
        .filter(|block| block.geometry.contains_point(x, y))
        .max_by_key(|block| block.geometry.z_index)
}
