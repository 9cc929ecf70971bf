use tracing::debug;

use crate::financial::{DayExpectedProfile, FinancialViability, Tone};
use crate::parse::finite_or_zero;
use crate::schedule::slots::estimated_labor_for_day;
use crate::schedule::Slot;
use crate::settings::TenantSettings;

const RISK_SUMMARY: &str =
    "Planned labor is high vs expected demand. Reduce support hours or tighten overlap.";
const WATCH_SUMMARY: &str =
    "Schedule is near your labor watch threshold. Monitor weather and demand early.";
const GOOD_SUMMARY: &str = "Schedule is within target labor band for expected demand.";

/// Scores the planned cost of `slots` against the expected day. A missing
/// baseline is reported as `pending`, never as `risk`.
pub fn day_financial_viability(
    expected: Option<&DayExpectedProfile>,
    slots: &[Slot],
    settings: &TenantSettings,
) -> FinancialViability {
    let Some(expected) = expected else {
        debug!("no expected profile for day; viability pending");
        return FinancialViability {
            tone: Tone::Pending,
            label: "No Baseline".to_string(),
            summary: "Missing baseline for this day.".to_string(),
            expected_revenue: 0.0,
            expected_labor: 0.0,
            expected_labor_pct: 0.0,
            planned_labor: 0.0,
            planned_labor_pct: 0.0,
            expected_gp: 0.0,
        };
    };

    let planned_labor = estimated_labor_for_day(slots, &settings.pay_rates);
    let expected_revenue = finite_or_zero(expected.revenue);
    let planned_labor_pct = if expected_revenue > 0.0 {
        planned_labor / expected_revenue * 100.0
    } else {
        0.0
    };
    let expected_gp = expected_revenue * settings.gp_margin_factor - planned_labor;
    let target = &settings.target_profile;

    let (tone, label, summary) =
        if expected_gp < 0.0 || planned_labor_pct > target.labor_watch_pct {
            (Tone::Risk, "Likely Unprofitable", RISK_SUMMARY)
        } else if planned_labor_pct > target.labor_target_pct {
            (Tone::Watch, "Watch Labor Ratio", WATCH_SUMMARY)
        } else {
            (Tone::Good, "Likely Healthy", GOOD_SUMMARY)
        };

    FinancialViability {
        tone,
        label: label.to_string(),
        summary: summary.to_string(),
        expected_revenue,
        expected_labor: finite_or_zero(expected.labor),
        expected_labor_pct: finite_or_zero(expected.labor_pct),
        planned_labor,
        planned_labor_pct,
        expected_gp,
    }
}
