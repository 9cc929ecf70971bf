use serde::{Deserialize, Serialize};

use crate::pto::{LocationSet, PtoRequest};
use crate::schedule::slots::{is_closer_role, is_opener_role, slot_hours};
use crate::schedule::{ScheduleWeek, Slot};
use crate::settings::WorkflowSettings;

pub const DEFAULT_WEEKS_AHEAD: usize = 4;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationResult {
    pub ok: bool,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WeekReadinessChecks {
    pub pending_requests: usize,
    pub unsubmitted_exceptions: usize,
    pub unassigned_positions: usize,
    pub invalid_coverage_days: usize,
    pub pto_conflicts: usize,
}

impl WeekReadinessChecks {
    pub fn is_ready(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentGapRow {
    pub week_label: String,
    pub unassigned: usize,
    pub days_with_gaps: usize,
}

fn plural(count: u32) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

/// Opener coverage is checked before closer coverage; the first shortfall wins.
pub fn day_validation(slots: &[Slot], workflow: &WorkflowSettings) -> ValidationResult {
    let openers: u64 = slots
        .iter()
        .filter(|slot| is_opener_role(&slot.role))
        .map(|slot| u64::from(slot.effective_headcount()))
        .sum();
    let closers: u64 = slots
        .iter()
        .filter(|slot| is_closer_role(&slot.role))
        .map(|slot| u64::from(slot.effective_headcount()))
        .sum();

    if openers < u64::from(workflow.min_openers) {
        return ValidationResult {
            ok: false,
            message: format!(
                "Need at least {} opener shift{}.",
                workflow.min_openers,
                plural(workflow.min_openers)
            ),
        };
    }
    if closers < u64::from(workflow.min_closers) {
        return ValidationResult {
            ok: false,
            message: format!(
                "Need at least {} closing position{}.",
                workflow.min_closers,
                plural(workflow.min_closers)
            ),
        };
    }
    ValidationResult {
        ok: true,
        message: "Coverage rules satisfied.".to_string(),
    }
}

pub fn week_labor_hours(week: &ScheduleWeek) -> f64 {
    week.days
        .iter()
        .flat_map(|day| day.slots.iter())
        .map(|slot| slot_hours(slot) * f64::from(slot.effective_headcount()))
        .sum()
}

pub fn next_week_checks(
    week: Option<&ScheduleWeek>,
    location: &str,
    pto_requests: &[PtoRequest],
    workflow: &WorkflowSettings,
) -> WeekReadinessChecks {
    next_week_checks_with(
        week,
        location,
        pto_requests,
        workflow,
        &LocationSet::default(),
    )
}

/// Readiness counters for a week, with PTO scoped through `locations`.
/// A missing week reports all zeros.
pub fn next_week_checks_with(
    week: Option<&ScheduleWeek>,
    location: &str,
    pto_requests: &[PtoRequest],
    workflow: &WorkflowSettings,
    locations: &LocationSet,
) -> WeekReadinessChecks {
    let Some(week) = week else {
        return WeekReadinessChecks::default();
    };

    let mut checks = WeekReadinessChecks::default();
    for day in &week.days {
        if day.pending_request_id.is_some() {
            checks.pending_requests += 1;
        }
        if day.has_exception {
            checks.unsubmitted_exceptions += 1;
        }
        if !day_validation(&day.slots, workflow).ok {
            checks.invalid_coverage_days += 1;
        }
        checks.pto_conflicts += locations
            .summary_for_day(pto_requests, location, day)
            .conflicts
            .len();
        checks.unassigned_positions += day.slots.iter().map(Slot::unfilled_positions).sum::<usize>();
    }
    checks
}

/// Rows only for weeks that still have unfilled positions, looking at most
/// `weeks_ahead` weeks into `weeks`.
pub fn assignment_gap_summary(weeks: &[ScheduleWeek], weeks_ahead: usize) -> Vec<AssignmentGapRow> {
    weeks
        .iter()
        .take(weeks_ahead)
        .filter_map(|week| {
            let per_day: Vec<usize> = week
                .days
                .iter()
                .map(|day| day.slots.iter().map(Slot::unfilled_positions).sum())
                .collect();
            let unassigned: usize = per_day.iter().sum();
            (unassigned > 0).then(|| AssignmentGapRow {
                week_label: format!("Week of {}", week.week_start.format("%Y-%m-%d")),
                unassigned,
                days_with_gaps: per_day.iter().filter(|gaps| **gaps > 0).count(),
            })
        })
        .collect()
}
