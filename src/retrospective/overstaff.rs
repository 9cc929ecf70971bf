use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::financial::{labor_percent, DayExpectedProfile};
use crate::parse::finite_or_zero;
use crate::settings::TenantSettings;
use crate::weather::{WeatherImpact, WeatherSignal};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OverstaffAssessment {
    pub expected_revenue: f64,
    pub expected_labor: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_gross_profit: Option<f64>,
    pub expected_labor_pct: f64,
    pub actual_labor_pct: f64,
    pub overstaffed: bool,
    pub recommendation: String,
    pub weather_signal: WeatherSignal,
}

fn plural(count: u32, word: &str) -> String {
    if count == 1 {
        format!("{count} {word}")
    } else {
        format!("{count} {word}s")
    }
}

/// Looks back at a finished day. Overstaffed means revenue missed the
/// baseline and labor ran hot at the same time.
pub fn overstaff_assessment(
    expected: Option<&DayExpectedProfile>,
    actual_revenue: f64,
    actual_labor: f64,
    weather_signal: &WeatherSignal,
    settings: &TenantSettings,
) -> OverstaffAssessment {
    let actual_revenue = finite_or_zero(actual_revenue);
    let actual_labor_pct = labor_percent(finite_or_zero(actual_labor), actual_revenue);
    let labor_target = settings.target_profile.labor_target_pct;

    let Some(expected) = expected else {
        debug!("no expected profile; skipping overstaff check");
        return OverstaffAssessment {
            expected_revenue: 0.0,
            expected_labor: 0.0,
            expected_gross_profit: None,
            expected_labor_pct: labor_target,
            actual_labor_pct,
            overstaffed: false,
            recommendation: "No month baseline available for this date.".to_string(),
            weather_signal: weather_signal.clone(),
        };
    };

    let revenue_miss = actual_revenue < expected.revenue * settings.revenue_miss_threshold;
    let labor_pressure = actual_labor_pct > expected.labor_pct + settings.labor_pressure_delta
        || actual_labor_pct > labor_target;
    let overstaffed = revenue_miss && labor_pressure;

    let floor = format!(
        "keep {} + {}",
        plural(settings.workflow.min_openers, "opener"),
        plural(settings.workflow.min_closers, "closer")
    );
    let threshold = settings.weather_threshold_f;
    let recommendation = match (overstaffed, weather_signal.impact) {
        (true, WeatherImpact::Down) => format!(
            "Demand looked weather-suppressed ({threshold}F+ below expected). Next similar day, trim 1 peak/support slot; {floor}."
        ),
        (true, _) => format!(
            "Revenue underperformed vs baseline. Trim 1 non-closing support slot next similar day; {floor}."
        ),
        (false, WeatherImpact::Up) => format!(
            "Demand-lift weather ({threshold}F+ above expected). Consider pre-adding 1 peak/support slot for similar upcoming days."
        ),
        (false, _) => "Within expected staffing range.".to_string(),
    };

    OverstaffAssessment {
        expected_revenue: expected.revenue,
        expected_labor: expected.labor,
        expected_gross_profit: Some(finite_or_zero(expected.gross_profit)),
        expected_labor_pct: expected.labor_pct,
        actual_labor_pct,
        overstaffed,
        recommendation,
        weather_signal: weather_signal.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expected() -> DayExpectedProfile {
        DayExpectedProfile {
            revenue: 1000.0,
            labor: 200.0,
            gross_profit: 520.0,
            labor_pct: 20.0,
        }
    }

    fn signal(impact: WeatherImpact) -> WeatherSignal {
        WeatherSignal {
            impact,
            ..WeatherSignal::neutral("Test", "Test signal.")
        }
    }

    #[test]
    fn on_target_day_is_fine() {
        let result = overstaff_assessment(
            Some(&expected()),
            1000.0,
            200.0,
            &signal(WeatherImpact::Neutral),
            &TenantSettings::default(),
        );
        assert!(!result.overstaffed);
        assert_eq!(result.recommendation, "Within expected staffing range.");
        assert_eq!(result.expected_gross_profit, Some(520.0));
    }

    #[test]
    fn revenue_miss_with_labor_pressure() {
        let result = overstaff_assessment(
            Some(&expected()),
            700.0,
            200.0,
            &signal(WeatherImpact::Neutral),
            &TenantSettings::default(),
        );
        assert!(result.overstaffed);
        assert_eq!(
            result.recommendation,
            "Revenue underperformed vs baseline. Trim 1 non-closing support slot next similar day; keep 1 opener + 2 closers."
        );
    }

    #[test]
    fn weather_suppressed_message() {
        let result = overstaff_assessment(
            Some(&expected()),
            700.0,
            200.0,
            &signal(WeatherImpact::Down),
            &TenantSettings::default(),
        );
        assert!(result.recommendation.starts_with("Demand looked weather-suppressed (10F+ below"));
    }

    #[test]
    fn demand_lift_message_when_not_overstaffed() {
        let result = overstaff_assessment(
            Some(&expected()),
            1200.0,
            200.0,
            &signal(WeatherImpact::Up),
            &TenantSettings::default(),
        );
        assert!(!result.overstaffed);
        assert!(result.recommendation.starts_with("Demand-lift weather (10F+ above"));
    }

    #[test]
    fn missing_baseline_uses_target() {
        let result = overstaff_assessment(
            None,
            0.0,
            200.0,
            &signal(WeatherImpact::Down),
            &TenantSettings::default(),
        );
        assert!(!result.overstaffed);
        assert_eq!(result.actual_labor_pct, 0.0);
        assert_eq!(result.expected_labor_pct, 24.0);
    }

    #[test]
    fn thresholds_come_from_settings() {
        let lenient = TenantSettings {
            revenue_miss_threshold: 0.5,
            ..TenantSettings::default()
        };
        let result = overstaff_assessment(
            Some(&expected()),
            700.0,
            200.0,
            &signal(WeatherImpact::Neutral),
            &lenient,
        );
        assert!(!result.overstaffed);
    }
}
