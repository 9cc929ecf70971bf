use crate::financial::{
    CalendarMonth, DeliveryMode, MonthlyDataRow, MonthlyMetrics, PlanOptions,
    SharedManagerImpact, WeekdayProfile, WeeklyMetrics,
};
use crate::parse::finite_or_zero;
use crate::schedule::Weekday;
use crate::settings::TenantSettings;

/// Weekly hours a shared manager is budgeted for.
pub const SHARED_MANAGER_WEEKLY_HOURS: f64 = 40.0;

/// A shared manager is split across exactly this many stores.
const SHARED_MANAGER_STORES: f64 = 2.0;

/// Not clamped: a negative result is the unprofitability signal.
pub fn gross_profit(revenue: f64, labor: f64, gp_margin_factor: f64) -> f64 {
    revenue * gp_margin_factor - labor
}

pub fn labor_percent(labor: f64, revenue: f64) -> f64 {
    if revenue > 0.0 {
        labor / revenue * 100.0
    } else {
        0.0
    }
}

pub fn revenue_with_mode(base: f64, doordash_component: f64, mode: DeliveryMode) -> f64 {
    let base = finite_or_zero(base);
    let doordash = finite_or_zero(doordash_component);
    match mode {
        DeliveryMode::Include => base,
        DeliveryMode::Exclude => base - doordash,
        DeliveryMode::DoordashOnly => doordash,
    }
}

pub fn tuesday_baseline_for_month(profile: &WeekdayProfile, mode: DeliveryMode) -> f64 {
    profile
        .get(&Weekday::Tue)
        .map(|tue| revenue_with_mode(tue.avg_revenue, tue.avg_doordash_net, mode))
        .unwrap_or(0.0)
}

/// Cost of one manager shared between two stores. Floor hours are credited
/// back at `replacement_rate` since they displace a cheaper role.
pub fn shared_manager_weekly_impact(
    active: bool,
    hourly_rate: f64,
    weekly_hours: f64,
    mgmt_share: f64,
    replacement_rate: f64,
) -> SharedManagerImpact {
    if !active {
        return SharedManagerImpact::default();
    }

    let share = finite_or_zero(mgmt_share).clamp(0.0, 1.0);
    let mgmt_hours = weekly_hours * share;
    let floor_hours = weekly_hours - mgmt_hours;
    let gross_cost = weekly_hours * hourly_rate;
    let replacement_credit = floor_hours * replacement_rate;
    let total_labor = gross_cost - replacement_credit;

    SharedManagerImpact {
        total_labor,
        per_store_labor: total_labor / SHARED_MANAGER_STORES,
        total_mgmt_hours: mgmt_hours,
        per_store_mgmt_hours: mgmt_hours / SHARED_MANAGER_STORES,
        total_floor_hours: floor_hours,
        per_store_floor_hours: floor_hours / SHARED_MANAGER_STORES,
        replacement_credit,
    }
}

fn shared_manager_for(options: &PlanOptions, settings: &TenantSettings) -> SharedManagerImpact {
    shared_manager_weekly_impact(
        options.manager_active,
        settings.pay_rates.manager,
        SHARED_MANAGER_WEEKLY_HOURS,
        options.manager_mgmt_share,
        settings.pay_rates.scooper,
    )
}

fn monday_revenue_per_day(
    profile: &WeekdayProfile,
    options: &PlanOptions,
    settings: &TenantSettings,
) -> f64 {
    tuesday_baseline_for_month(profile, options.mode)
        * options.monday_scenario.factor(&settings.monday_scenarios)
}

/// One week at a location: Tue-Sun from the weekday profile, plus Monday
/// and the shared manager when the plan calls for them.
pub fn weekly_metrics_for_location_at_month(
    profile: &WeekdayProfile,
    options: &PlanOptions,
    settings: &TenantSettings,
) -> WeeklyMetrics {
    let mut revenue = 0.0;
    let mut labor = 0.0;
    for day in Weekday::OPERATING_DAYS_6 {
        if let Some(data) = profile.get(&day) {
            revenue += revenue_with_mode(data.avg_revenue, data.avg_doordash_net, options.mode);
            labor += finite_or_zero(data.avg_labor);
        }
    }

    let mut metrics = WeeklyMetrics::default();
    if options.plan_key.includes_monday() {
        metrics.monday_revenue = monday_revenue_per_day(profile, options, settings);
        metrics.monday_labor = finite_or_zero(options.monday_labor);
        revenue += metrics.monday_revenue;
        labor += metrics.monday_labor;
    }

    if options.manager_active {
        let shared = shared_manager_for(options, settings);
        metrics.manager_added_labor = shared.per_store_labor;
        metrics.manager_floor_hours = shared.per_store_floor_hours;
        metrics.manager_mgmt_hours = shared.per_store_mgmt_hours;
        labor += shared.per_store_labor;
    }

    metrics.revenue = revenue;
    metrics.labor = labor;
    metrics.gp = gross_profit(revenue, labor, settings.gp_margin_factor);
    metrics.labor_pct = labor_percent(labor, revenue);
    metrics
}

/// One calendar month at a location. Monday scales by the month's Monday
/// count, the shared manager by operating days / 7.
pub fn monthly_metrics_for_location_at_month(
    row: &MonthlyDataRow,
    profile: &WeekdayProfile,
    calendar: CalendarMonth,
    options: &PlanOptions,
    settings: &TenantSettings,
) -> MonthlyMetrics {
    let mut revenue = revenue_with_mode(row.revenue, row.doordash_net_component, options.mode);
    let mut labor = finite_or_zero(row.store_labor);
    let mondays = f64::from(calendar.mondays);

    let mut metrics = MonthlyMetrics::default();
    if options.plan_key.includes_monday() {
        metrics.monday_revenue = monday_revenue_per_day(profile, options, settings) * mondays;
        metrics.monday_labor = finite_or_zero(options.monday_labor) * mondays;
        revenue += metrics.monday_revenue;
        labor += metrics.monday_labor;
    }

    if options.manager_active {
        let operating_days = if options.plan_key.includes_monday() {
            calendar.operating_days_6 + calendar.mondays
        } else {
            calendar.operating_days_6
        };
        let week_factor = f64::from(operating_days) / 7.0;
        metrics.manager_added_labor = shared_manager_for(options, settings).per_store_labor * week_factor;
        labor += metrics.manager_added_labor;
    }

    metrics.revenue = revenue;
    metrics.labor = labor;
    metrics.gp = gross_profit(revenue, labor, settings.gp_margin_factor);
    metrics.labor_pct = labor_percent(labor, revenue);
    metrics
}

/// Trailing average; the window narrows at the start of the series.
pub fn rolling_average(values: &[f64], window_size: usize) -> Vec<f64> {
    let window = window_size.max(1);
    (0..values.len())
        .map(|idx| {
            let start = (idx + 1).saturating_sub(window);
            let slice = &values[start..=idx];
            slice.iter().copied().map(finite_or_zero).sum::<f64>() / slice.len() as f64
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::financial::{MondayScenario, PlanKey, WeekdayProfileDay};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    fn profile() -> WeekdayProfile {
        [
            (Weekday::Tue, 500.0, 80.0, 50.0),
            (Weekday::Wed, 450.0, 75.0, 40.0),
            (Weekday::Thu, 480.0, 78.0, 45.0),
            (Weekday::Fri, 600.0, 90.0, 60.0),
            (Weekday::Sat, 700.0, 100.0, 70.0),
            (Weekday::Sun, 650.0, 95.0, 65.0),
        ]
        .into_iter()
        .map(|(day, revenue, labor, doordash)| {
            (
                day,
                WeekdayProfileDay {
                    avg_revenue: revenue,
                    avg_labor: labor,
                    avg_doordash_net: doordash,
                },
            )
        })
        .collect()
    }

    #[test]
    fn gross_profit_is_not_clamped() {
        assert!(close(gross_profit(1000.0, 200.0, 0.72), 520.0));
        assert!(close(gross_profit(100.0, 500.0, 0.72), -428.0));
        assert!(close(gross_profit(1000.0, 200.0, 0.5), 300.0));
    }

    #[test]
    fn labor_percent_zero_revenue() {
        assert_eq!(labor_percent(200.0, 0.0), 0.0);
        assert!(close(labor_percent(200.0, 1000.0), 20.0));
    }

    #[test]
    fn delivery_modes() {
        assert_eq!(revenue_with_mode(1000.0, 200.0, DeliveryMode::Include), 1000.0);
        assert_eq!(revenue_with_mode(1000.0, 200.0, DeliveryMode::Exclude), 800.0);
        assert_eq!(revenue_with_mode(1000.0, 200.0, DeliveryMode::DoordashOnly), 200.0);
        assert_eq!(DeliveryMode::from("bogus".to_string()), DeliveryMode::Include);
    }

    #[test]
    fn tuesday_baseline_missing_is_zero() {
        assert_eq!(tuesday_baseline_for_month(&profile(), DeliveryMode::Exclude), 450.0);
        assert_eq!(tuesday_baseline_for_month(&WeekdayProfile::new(), DeliveryMode::Include), 0.0);
    }

    #[test]
    fn shared_manager_split() {
        let off = shared_manager_weekly_impact(false, 28.0, 40.0, 0.25, 15.0);
        assert_eq!(off, SharedManagerImpact::default());

        let on = shared_manager_weekly_impact(true, 28.0, 40.0, 0.25, 15.0);
        assert!(close(on.total_labor, 670.0));
        assert!(close(on.per_store_labor, 335.0));
        assert!(close(on.total_mgmt_hours, 10.0));
        assert!(close(on.total_floor_hours, 30.0));
        assert!(close(on.replacement_credit, 450.0));

        let clamped = shared_manager_weekly_impact(true, 28.0, 40.0, 3.0, 15.0);
        assert!(close(clamped.total_floor_hours, 0.0));
    }

    #[test]
    fn six_day_week() {
        let metrics =
            weekly_metrics_for_location_at_month(&profile(), &PlanOptions::default(), &TenantSettings::default());
        assert!(close(metrics.revenue, 3380.0));
        assert!(close(metrics.labor, 518.0));
        assert!(close(metrics.gp, 1916.6));
        assert!((metrics.labor_pct - 15.325).abs() < 0.01);
        assert_eq!(metrics.monday_revenue, 0.0);
    }

    #[test]
    fn seven_day_week_with_manager() {
        let options = PlanOptions {
            plan_key: PlanKey::Open7Day,
            monday_scenario: MondayScenario::High,
            monday_labor: 60.0,
            manager_active: true,
            manager_mgmt_share: 0.25,
            mode: DeliveryMode::Include,
        };
        let metrics =
            weekly_metrics_for_location_at_month(&profile(), &options, &TenantSettings::default());
        assert!(close(metrics.monday_revenue, 375.0));
        assert_eq!(metrics.monday_labor, 60.0);
        assert!(close(metrics.manager_added_labor, 335.0));
        assert!(close(metrics.labor, 518.0 + 60.0 + 335.0));
        assert!(close(metrics.gp, 3755.0 * 0.72 - 913.0));
    }

    #[test]
    fn monthly_scales_monday_and_manager() {
        let row = MonthlyDataRow {
            revenue: 14000.0,
            store_labor: 2100.0,
            doordash_net_component: 1000.0,
        };
        let calendar = CalendarMonth {
            mondays: 4,
            operating_days_6: 26,
        };
        let options = PlanOptions {
            plan_key: PlanKey::Open7Day,
            monday_labor: 60.0,
            manager_active: true,
            manager_mgmt_share: 0.25,
            mode: DeliveryMode::Exclude,
            ..PlanOptions::default()
        };
        let metrics = monthly_metrics_for_location_at_month(
            &row,
            &profile(),
            calendar,
            &options,
            &TenantSettings::default(),
        );
        // (500 - 50) * 0.65 * 4
        assert!(close(metrics.monday_revenue, 1170.0));
        assert!(close(metrics.monday_labor, 240.0));
        assert!(close(metrics.manager_added_labor, 335.0 * 30.0 / 7.0));
        assert!(close(metrics.revenue, 13000.0 + 1170.0));
    }

    #[test]
    fn rolling_average_narrows_at_start() {
        let out = rolling_average(&[2.0, 4.0, 6.0, 8.0], 3);
        assert_eq!(out, vec![2.0, 3.0, 4.0, 6.0]);
        assert!(rolling_average(&[], 3).is_empty());
    }
}
