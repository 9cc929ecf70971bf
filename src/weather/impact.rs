use chrono::NaiveDate;
use tracing::debug;

use crate::parse::finite_opt;
use crate::weather::{
    HourlyWeatherRow, PrecipSignal, SignalWindow, TemperatureDelta, WeatherImpact, WeatherNormals,
    WeatherRow, WeatherSignal,
};

const EVENING_HOURS: std::ops::RangeInclusive<i64> = 20..=23;

/// Half-up rounding, so -10.5 reads as -10.
fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

fn format_signed_degrees(value: Option<f64>) -> String {
    match finite_opt(value) {
        Some(v) => {
            let rounded = round_half_up(v);
            let sign = if rounded > 0.0 { "+" } else { "" };
            format!("{sign}{rounded}F")
        }
        None => "N/A".to_string(),
    }
}

/// 12-hour label such as "8pm" or "12am".
fn format_hour_label(hour: i64) -> String {
    let normalized = hour.rem_euclid(24);
    let meridiem = if normalized >= 12 { "pm" } else { "am" };
    let twelve_hour = match normalized % 12 {
        0 => 12,
        h => h,
    };
    format!("{twelve_hour}{meridiem}")
}

pub fn weather_code_label(code: i64) -> &'static str {
    match code {
        0 => "Clear",
        1 | 2 => "Partly Cloudy",
        3 => "Overcast",
        45 | 48 => "Fog",
        51 | 53 | 55 | 56 | 57 => "Drizzle",
        61 | 63 | 65 | 66 | 67 => "Rain",
        71 | 73 | 75 | 77 => "Snow",
        80..=82 => "Rain Showers",
        85 | 86 => "Snow Showers",
        95 | 96 | 99 => "Thunderstorm",
        _ => "Mixed",
    }
}

pub fn expected_temp_for_date(normals: &WeatherNormals, date: NaiveDate) -> Option<f64> {
    let key = date.format("%m-%d").to_string();
    finite_opt(normals.get(&key).copied())
}

pub fn temperature_delta_for_date(
    normals: &WeatherNormals,
    date: NaiveDate,
    row: &WeatherRow,
) -> TemperatureDelta {
    let expected = expected_temp_for_date(normals, date);
    match (finite_opt(row.temp_max), expected) {
        (Some(actual), Some(expected)) => TemperatureDelta {
            available: true,
            actual: Some(actual),
            expected: Some(expected),
            delta: Some(actual - expected),
        },
        _ => TemperatureDelta {
            available: false,
            actual: None,
            expected,
            delta: None,
        },
    }
}

/// First evening hour with heavy rain, else first with moderate rain.
pub fn timed_precip_signal(hourly: &[HourlyWeatherRow]) -> Option<PrecipSignal> {
    let evening: Vec<&HourlyWeatherRow> = hourly
        .iter()
        .filter(|row| EVENING_HOURS.contains(&row.hour))
        .collect();
    if evening.is_empty() {
        return None;
    }

    let prob = |row: &HourlyWeatherRow| finite_opt(row.precip_prob).unwrap_or(0.0);
    let mm = |row: &HourlyWeatherRow| finite_opt(row.precip_mm).unwrap_or(0.0);

    if let Some(heavy) = evening.iter().find(|row| prob(row) >= 75.0 || mm(row) >= 2.0) {
        return Some(PrecipSignal {
            impact: WeatherImpact::Down,
            label: "Evening Rain Risk".to_string(),
            window: SignalWindow::Evening,
            event_hour: heavy.hour,
            reason: format!(
                "Heavy precipitation likely after {} ({}% rain chance).",
                format_hour_label(heavy.hour),
                round_half_up(prob(heavy))
            ),
        });
    }

    evening
        .iter()
        .find(|row| prob(row) >= 60.0 || mm(row) >= 1.0)
        .map(|moderate| PrecipSignal {
            impact: WeatherImpact::Down,
            label: "Late Rain Risk".to_string(),
            window: SignalWindow::Evening,
            event_hour: moderate.hour,
            reason: format!(
                "Rain risk increases around {} ({}% rain chance).",
                format_hour_label(moderate.hour),
                round_half_up(prob(moderate))
            ),
        })
}

/// Directional demand signal for one date. A timed precipitation signal
/// overrides the temperature comparison entirely.
pub fn weather_impact_signal(
    normals: &WeatherNormals,
    date: NaiveDate,
    row: Option<&WeatherRow>,
    hourly: &[HourlyWeatherRow],
    threshold_f: f64,
) -> WeatherSignal {
    let Some(row) = row else {
        return WeatherSignal::neutral("No weather signal", "Weather data unavailable.");
    };

    if let Some(precip) = timed_precip_signal(hourly) {
        return WeatherSignal {
            impact: precip.impact,
            label: precip.label,
            reason: precip.reason,
            delta: None,
            expected: None,
            actual: finite_opt(row.temp_max),
            window: Some(precip.window),
            event_hour: Some(precip.event_hour),
        };
    }

    let info = temperature_delta_for_date(normals, date, row);
    let (Some(delta), Some(expected)) = (info.delta, info.expected) else {
        debug!("no temperature baseline for {date}");
        return WeatherSignal {
            expected: info.expected,
            actual: info.actual,
            ..WeatherSignal::neutral(
                "No baseline",
                "Expected temperature baseline unavailable for this date.",
            )
        };
    };

    let threshold = threshold_f.abs();
    let (impact, label) = if delta >= threshold {
        (WeatherImpact::Up, "Demand Lift")
    } else if delta <= -threshold {
        (WeatherImpact::Down, "Demand Risk")
    } else {
        (WeatherImpact::Neutral, "Near Expected")
    };

    WeatherSignal {
        impact,
        label: label.to_string(),
        reason: format!(
            "High is {} vs expected {}F.",
            format_signed_degrees(Some(delta)),
            round_half_up(expected)
        ),
        delta: Some(delta),
        expected: Some(expected),
        actual: info.actual,
        window: None,
        event_hour: None,
    }
}

fn plural(count: u32) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

/// Human-readable instruction for the signal, naming the coverage floor
/// that must be kept.
pub fn staffing_weather_action(signal: &WeatherSignal, min_openers: u32, min_closers: u32) -> String {
    let floor = format!(
        "{min_openers} opener{} and {min_closers} closer{}",
        plural(min_openers),
        plural(min_closers)
    );
    match signal.impact {
        WeatherImpact::Up => format!(
            "Weather recommendation: add +1 peak/support position ({} vs expected). Keep minimum {floor}.",
            format_signed_degrees(signal.delta)
        ),
        WeatherImpact::Down if signal.window == Some(SignalWindow::Evening) => {
            let hour_text = signal
                .event_hour
                .map(|hour| format!(" around {}", format_hour_label(hour)))
                .unwrap_or_default();
            format!(
                "Weather recommendation: trim 1 evening peak/support position{hour_text}. Never below {floor}."
            )
        }
        WeatherImpact::Down => format!(
            "Weather recommendation: trim 1 peak/support position ({} vs expected). Never below {floor}.",
            format_signed_degrees(signal.delta)
        ),
        WeatherImpact::Neutral => {
            "Weather recommendation: keep baseline staffing (temperature within expected range)."
                .to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::DEFAULT_WEATHER_THRESHOLD_F;

    fn july_fourth() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 4).expect("valid date")
    }

    fn normals() -> WeatherNormals {
        WeatherNormals::from([("07-04".to_string(), 85.0)])
    }

    fn row(temp_max: f64) -> WeatherRow {
        WeatherRow {
            temp_max: Some(temp_max),
            ..WeatherRow::default()
        }
    }

    fn hour(hour: i64, prob: f64, mm: f64) -> HourlyWeatherRow {
        HourlyWeatherRow {
            hour,
            precip_prob: Some(prob),
            precip_mm: Some(mm),
        }
    }

    #[test]
    fn code_labels() {
        assert_eq!(weather_code_label(0), "Clear");
        assert_eq!(weather_code_label(63), "Rain");
        assert_eq!(weather_code_label(81), "Rain Showers");
        assert_eq!(weather_code_label(42), "Mixed");
    }

    #[test]
    fn hour_labels() {
        assert_eq!(format_hour_label(20), "8pm");
        assert_eq!(format_hour_label(0), "12am");
        assert_eq!(format_hour_label(12), "12pm");
        assert_eq!(format_hour_label(-1), "11pm");
    }

    #[test]
    fn delta_requires_both_values() {
        let missing = temperature_delta_for_date(&normals(), july_fourth(), &WeatherRow::default());
        assert!(!missing.available);
        assert_eq!(missing.expected, Some(85.0));

        let present = temperature_delta_for_date(&normals(), july_fourth(), &row(90.0));
        assert_eq!(present.delta, Some(5.0));
    }

    #[test]
    fn demand_lift_above_threshold() {
        let signal = weather_impact_signal(
            &normals(),
            july_fourth(),
            Some(&row(96.0)),
            &[],
            DEFAULT_WEATHER_THRESHOLD_F,
        );
        assert_eq!(signal.impact, WeatherImpact::Up);
        assert_eq!(signal.delta, Some(11.0));
        assert_eq!(signal.label, "Demand Lift");
        assert_eq!(signal.reason, "High is +11F vs expected 85F.");
    }

    #[test]
    fn threshold_is_symmetric_and_configurable() {
        let down = weather_impact_signal(&normals(), july_fourth(), Some(&row(74.0)), &[], 10.0);
        assert_eq!(down.impact, WeatherImpact::Down);
        assert_eq!(down.reason, "High is -11F vs expected 85F.");

        let near = weather_impact_signal(&normals(), july_fourth(), Some(&row(90.0)), &[], 10.0);
        assert_eq!(near.impact, WeatherImpact::Neutral);
        assert_eq!(near.label, "Near Expected");

        let custom = weather_impact_signal(&normals(), july_fourth(), Some(&row(90.0)), &[], 5.0);
        assert_eq!(custom.impact, WeatherImpact::Up);
    }

    #[test]
    fn missing_row_and_missing_baseline_are_neutral() {
        let no_row = weather_impact_signal(&normals(), july_fourth(), None, &[], 10.0);
        assert_eq!(no_row.label, "No weather signal");

        let other_day = NaiveDate::from_ymd_opt(2025, 7, 5).expect("valid date");
        let no_baseline = weather_impact_signal(&normals(), other_day, Some(&row(96.0)), &[], 10.0);
        assert_eq!(no_baseline.impact, WeatherImpact::Neutral);
        assert_eq!(no_baseline.label, "No baseline");
        assert_eq!(no_baseline.actual, Some(96.0));
    }

    #[test]
    fn evening_precip_overrides_temperature() {
        let hourly = vec![hour(18, 95.0, 5.0), hour(21, 65.0, 0.0), hour(22, 80.0, 0.0)];
        let signal = weather_impact_signal(&normals(), july_fourth(), Some(&row(96.0)), &hourly, 10.0);
        assert_eq!(signal.impact, WeatherImpact::Down);
        assert_eq!(signal.label, "Evening Rain Risk");
        assert_eq!(signal.event_hour, Some(22));
        assert_eq!(signal.window, Some(SignalWindow::Evening));
        assert_eq!(signal.reason, "Heavy precipitation likely after 10pm (80% rain chance).");
    }

    #[test]
    fn precip_tiers() {
        assert!(timed_precip_signal(&[]).is_none());
        assert!(timed_precip_signal(&[hour(15, 100.0, 9.0)]).is_none());
        assert!(timed_precip_signal(&[hour(20, 30.0, 0.2)]).is_none());

        let moderate = timed_precip_signal(&[hour(20, 10.0, 0.0), hour(21, 10.0, 1.2)])
            .expect("moderate signal");
        assert_eq!(moderate.label, "Late Rain Risk");
        assert_eq!(moderate.event_hour, 21);
    }

    #[test]
    fn action_text_names_floor() {
        let mut signal = weather_impact_signal(&normals(), july_fourth(), Some(&row(96.0)), &[], 10.0);
        assert_eq!(
            staffing_weather_action(&signal, 1, 2),
            "Weather recommendation: add +1 peak/support position (+11F vs expected). Keep minimum 1 opener and 2 closers."
        );

        signal.impact = WeatherImpact::Down;
        signal.window = Some(SignalWindow::Evening);
        signal.event_hour = Some(20);
        assert_eq!(
            staffing_weather_action(&signal, 2, 1),
            "Weather recommendation: trim 1 evening peak/support position around 8pm. Never below 2 openers and 1 closer."
        );
    }
}
