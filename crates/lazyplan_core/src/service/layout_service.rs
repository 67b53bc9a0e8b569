//! Layout use-case service.
//!
//! # Responsibility
//! - Provide stable day/week/month calendar and timeline entry points for
//!   FFI and CLI callers.
//! - Bind one category resolver and one validated settings value.
//!
//! # Invariants
//! - Settings are validated once at construction.
//! - Every call is a pure function of its arguments and the bound state.
//! - Input task trees are never mutated.

use crate::config::grid::{GridConfigError, GridConfiguration};
use crate::config::settings::{LayoutSettings, SettingsError};
use crate::layout::pipeline::{build_pass, LayoutPass, ViewSpec};
use crate::layout::query::hit_test;
use crate::layout::segment::{PeriodUnit, VisibleRange};
use crate::layout::zoom::{FocusRequest, ZoomController, ZoomError, ZoomLevel, ZoomTransition};
use crate::model::task::{Task, TaskId};
use crate::normalize::index::{ExpansionState, TaskIndex};
use crate::normalize::normalizer::{CategoryColorResolver, NormalizedTasks, TaskNormalizer};
use chrono::NaiveDate;
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors surfaced by layout entry points.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutError {
    Grid(GridConfigError),
    Settings(SettingsError),
    Zoom(ZoomError),
}

pub type LayoutResult<T> = Result<T, LayoutError>;

impl Display for LayoutError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Grid(err) => write!(f, "{err}"),
            Self::Settings(err) => write!(f, "{err}"),
            Self::Zoom(err) => write!(f, "{err}"),
        }
    }
}

impl Error for LayoutError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Grid(err) => Some(err),
            Self::Settings(err) => Some(err),
            Self::Zoom(err) => Some(err),
        }
    }
}

impl From<GridConfigError> for LayoutError {
    fn from(value: GridConfigError) -> Self {
        Self::Grid(value)
    }
}

impl From<SettingsError> for LayoutError {
    fn from(value: SettingsError) -> Self {
        Self::Settings(value)
    }
}

impl From<ZoomError> for LayoutError {
    fn from(value: ZoomError) -> Self {
        Self::Zoom(value)
    }
}

/// Use-case service wrapper around the layout stages.
pub struct LayoutService<R: CategoryColorResolver> {
    resolver: R,
    settings: LayoutSettings,
}

impl<R: CategoryColorResolver> LayoutService<R> {
    /// Creates a service after validating `settings`.
    pub fn new(resolver: R, settings: LayoutSettings) -> LayoutResult<Self> {
        settings.validate()?;
        Ok(Self { resolver, settings })
    }

    pub fn settings(&self) -> &LayoutSettings {
        &self.settings
    }

    /// Week periods starting on the configured weekday.
    pub fn week_unit(&self) -> PeriodUnit {
        PeriodUnit::Week {
            starts_on: self.settings.week_starts_on,
        }
    }

    /// Flattens and classifies one snapshot.
    pub fn normalize(&self, roots: &[Task]) -> NormalizedTasks {
        TaskNormalizer::new(&self.resolver, &self.settings).normalize(roots)
    }

    /// Builds the hierarchy arena for expand/collapse views.
    pub fn index(&self, roots: &[Task]) -> TaskIndex {
        TaskIndex::build(&self.normalize(roots))
    }

    /// Vertical day/week calendar over `range`.
    pub fn calendar_pass(
        &self,
        roots: &[Task],
        range: VisibleRange,
        grid: GridConfiguration,
    ) -> LayoutPass {
        let normalized = self.normalize(roots);
        build_pass(
            &normalized.scheduled,
            &normalized.unscheduled,
            ViewSpec::calendar(range),
            grid,
            &self.settings,
        )
    }

    /// Calendar for the configured week that contains `date`.
    pub fn week_calendar_pass(
        &self,
        roots: &[Task],
        date: NaiveDate,
        grid: GridConfiguration,
    ) -> LayoutPass {
        let range = VisibleRange::week_containing(date, self.settings.week_starts_on);
        self.calendar_pass(roots, range, grid)
    }

    /// Day-period calendar over the month that contains `date`.
    pub fn month_calendar_pass(
        &self,
        roots: &[Task],
        date: NaiveDate,
        grid: GridConfiguration,
    ) -> LayoutPass {
        self.calendar_pass(roots, VisibleRange::month_containing(date), grid)
    }

    /// Horizontal timeline over `range`.
    ///
    /// With `expansion`, tasks hidden under a collapsed ancestor are left
    /// out of the pass; unscheduled rows follow the same rule.
    pub fn timeline_pass(
        &self,
        roots: &[Task],
        range: VisibleRange,
        unit: PeriodUnit,
        grid: GridConfiguration,
        expansion: Option<&ExpansionState>,
    ) -> LayoutPass {
        let mut normalized = self.normalize(roots);
        if let Some(expansion) = expansion {
            let index = TaskIndex::build(&normalized);
            let before = normalized.len();
            normalized
                .scheduled
                .retain(|item| index.is_visible(item.id(), expansion));
            normalized
                .unscheduled
                .retain(|task| index.is_visible(task.id, expansion));
            debug!(
                "event=timeline_filter module=service status=ok total={} visible={}",
                before,
                normalized.len()
            );
        }
        build_pass(
            &normalized.scheduled,
            &normalized.unscheduled,
            ViewSpec::timeline(range, unit),
            grid,
            &self.settings,
        )
    }

    /// Toggles zoom around `request` and re-maps `pass`.
    pub fn focus(
        &self,
        controller: &ZoomController,
        request: FocusRequest,
        pass: &LayoutPass,
    ) -> LayoutResult<ZoomTransition> {
        Ok(controller.focus(request, pass, &self.settings)?)
    }

    /// Switches zoom level keeping the viewport center.
    pub fn set_zoom_level(
        &self,
        controller: &ZoomController,
        level: ZoomLevel,
        current_scroll: f64,
        pass: &LayoutPass,
    ) -> ZoomTransition {
        controller.set_level(level, current_scroll, pass, &self.settings)
    }

    /// Task id of the topmost block under a click, if any.
    pub fn task_at(&self, pass: &LayoutPass, x: f64, y: f64) -> Option<TaskId> {
        hit_test(pass.blocks(), x, y).map(|block| block.task_id)
    }
}
