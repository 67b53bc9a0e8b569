//! Task tree flattening and classification.
//!
//! # Responsibility
//! - Flatten an arbitrarily deep task tree into scheduled/unscheduled lists.
//! - Derive depth, effective color and duration for later layout stages.
//!
//! # Invariants
//! - Traversal is depth-first pre-order and stable.
//! - Every task lands in exactly one list; none is dropped.
//! - Reversed windows are clamped to an instant at `start_time`, never raised.
//! - The input tree is never mutated.

use crate::config::settings::{is_valid_hex_color, LayoutSettings};
use crate::model::task::{Task, TaskId, TimeInterval};
use log::{debug, warn};
use serde::Serialize;
use std::collections::HashMap;

/// Read-only category color lookup owned by the host.
pub trait CategoryColorResolver {
    /// Returns the display color for one category, if any.
    fn category_color(&self, category_id: &str) -> Option<String>;
}

/// Resolver for hosts without category colors.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCategoryColors;

impl CategoryColorResolver for NoCategoryColors {
    fn category_color(&self, _category_id: &str) -> Option<String> {
        None
    }
}

impl CategoryColorResolver for HashMap<String, String> {
    fn category_color(&self, category_id: &str) -> Option<String> {
        self.get(category_id).cloned()
    }
}

/// One task pulled to top level with derived fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlatTask {
    pub id: TaskId,
    /// Structural parent when nested, otherwise the task's own back-reference.
    pub parent_id: Option<TaskId>,
    /// Roots are depth 0.
    pub depth: usize,
    /// Depth-first pre-order position in the source tree.
    pub position: usize,
    pub child_count: usize,
    pub title: String,
    pub description: Option<String>,
    pub category_id: Option<String>,
    pub completed: bool,
    pub effective_color: String,
    pub start_time: Option<chrono::NaiveDateTime>,
    pub end_time: Option<chrono::NaiveDateTime>,
}

/// A flattened task with a guaranteed (clamped) interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledTask {
    pub task: FlatTask,
    pub interval: TimeInterval,
    /// `true` when the source window was reversed and got clamped.
    pub clamped: bool,
}

impl ScheduledTask {
    pub fn id(&self) -> TaskId {
        self.task.id
    }

    pub fn duration_minutes(&self) -> i64 {
        self.interval.duration_minutes()
    }
}

/// Classification output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedTasks {
    pub scheduled: Vec<ScheduledTask>,
    pub unscheduled: Vec<FlatTask>,
}

impl NormalizedTasks {
    pub fn len(&self) -> usize {
        self.scheduled.len() + self.unscheduled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scheduled.is_empty() && self.unscheduled.is_empty()
    }

    /// Returns every flattened task in source pre-order.
    pub fn flat_in_order(&self) -> Vec<&FlatTask> {
        let mut all: Vec<&FlatTask> = self
            .scheduled
            .iter()
            .map(|item| &item.task)
            .chain(self.unscheduled.iter())
            .collect();
        all.sort_by_key(|task| task.position);
        all
    }
}

/// Flattens task trees against one resolver and settings value.
pub struct TaskNormalizer<'a, R: CategoryColorResolver + ?Sized> {
    resolver: &'a R,
    settings: &'a LayoutSettings,
}

struct Frame<'t> {
    task: &'t Task,
    depth: usize,
    structural_parent: Option<TaskId>,
    inherited_color: Option<String>,
}

impl<'a, R: CategoryColorResolver + ?Sized> TaskNormalizer<'a, R> {
    pub fn new(resolver: &'a R, settings: &'a LayoutSettings) -> Self {
        Self { resolver, settings }
    }

    /// Flattens and classifies the tree rooted at `roots`.
    ///
    /// Uses an explicit stack so nesting depth is bounded only by memory.
    pub fn normalize(&self, roots: &[Task]) -> NormalizedTasks {
        let mut output = NormalizedTasks::default();
        let mut stack: Vec<Frame<'_>> = roots
            .iter()
            .rev()
            .map(|task| Frame {
                task,
                depth: 0,
                structural_parent: None,
                inherited_color: None,
            })
            .collect();
        let mut position = 0usize;
        let mut clamped_count = 0usize;

        while let Some(frame) = stack.pop() {
            let task = frame.task;
            let effective_color = self.effective_color(task, frame.inherited_color.as_deref());

            for child in task.sub_tasks.iter().rev() {
                stack.push(Frame {
                    task: child,
                    depth: frame.depth + 1,
                    structural_parent: Some(task.id),
                    inherited_color: Some(effective_color.clone()),
                });
            }

            let flat = FlatTask {
                id: task.id,
                parent_id: frame.structural_parent.or(task.parent_id),
                depth: frame.depth,
                position,
                child_count: task.sub_tasks.len(),
                title: task.title.clone(),
                description: task.description.clone(),
                category_id: task.category_id.clone(),
                completed: task.completed,
                effective_color,
                start_time: task.start_time,
                end_time: task.end_time,
            };
            position += 1;

            match (task.start_time, task.end_time) {
                (Some(start), Some(end)) => {
                    let clamped = end < start;
                    if clamped {
                        clamped_count += 1;
                        warn!(
                            "event=interval_clamped module=normalize status=clamped task_id={} depth={}",
                            task.id, frame.depth
                        );
                    }
                    output.scheduled.push(ScheduledTask {
                        task: flat,
                        interval: TimeInterval::clamped(start, end),
                        clamped,
                    });
                }
                _ => output.unscheduled.push(flat),
            }
        }

        debug!(
            "event=normalize_done module=normalize status=ok scheduled={} unscheduled={} clamped={}",
            output.scheduled.len(),
            output.unscheduled.len(),
            clamped_count
        );
        output
    }

    fn effective_color(&self, task: &Task, inherited: Option<&str>) -> String {
        if let Some(color) = task.color.as_deref() {
            if is_valid_hex_color(color) {
                return color.trim().to_string();
            }
        }
        if let Some(category_id) = task.category_id.as_deref() {
            if let Some(color) = self.resolver.category_color(category_id) {
                if is_valid_hex_color(&color) {
                    return color.trim().to_string();
                }
            }
        }
        match inherited {
            Some(color) => color.to_string(),
            None => self.settings.default_color.clone(),
        }
    }
}
