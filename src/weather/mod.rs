pub mod impact;
pub mod recommendations;

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

pub use impact::{
    expected_temp_for_date, staffing_weather_action, temperature_delta_for_date,
    timed_precip_signal, weather_code_label, weather_impact_signal,
};
pub use recommendations::{apply_recommendation_to_day, day_recommendation};

pub const DEFAULT_WEATHER_THRESHOLD_F: f64 = 10.0;

/// Daily observation or forecast for one date.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeatherRow {
    #[serde(default)]
    pub temp_max: Option<f64>,
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub precip_prob: Option<f64>,
    #[serde(default)]
    pub precip_mm: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HourlyWeatherRow {
    pub hour: i64,
    #[serde(default)]
    pub precip_prob: Option<f64>,
    #[serde(default)]
    pub precip_mm: Option<f64>,
}

/// Historical expected high per "MM-DD".
pub type WeatherNormals = BTreeMap<String, f64>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TemperatureDelta {
    pub available: bool,
    pub actual: Option<f64>,
    pub expected: Option<f64>,
    pub delta: Option<f64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WeatherImpact {
    Up,
    Down,
    Neutral,
}

impl WeatherImpact {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Neutral => "neutral",
        }
    }
}

impl Display for WeatherImpact {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SignalWindow {
    Evening,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSignal {
    pub impact: WeatherImpact,
    pub label: String,
    pub reason: String,
    #[serde(default)]
    pub delta: Option<f64>,
    #[serde(default)]
    pub expected: Option<f64>,
    #[serde(default)]
    pub actual: Option<f64>,
    #[serde(default)]
    pub window: Option<SignalWindow>,
    #[serde(default)]
    pub event_hour: Option<i64>,
}

impl WeatherSignal {
    pub(crate) fn neutral(label: &str, reason: &str) -> Self {
        Self {
            impact: WeatherImpact::Neutral,
            label: label.to_string(),
            reason: reason.to_string(),
            delta: None,
            expected: None,
            actual: None,
            window: None,
            event_hour: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PrecipSignal {
    pub impact: WeatherImpact,
    pub label: String,
    pub window: SignalWindow,
    pub event_hour: i64,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationAction {
    IncreaseSupport,
    DecreaseSupport,
}

impl RecommendationAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IncreaseSupport => "increase_support",
            Self::DecreaseSupport => "decrease_support",
        }
    }
}

impl Display for RecommendationAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single-step staffing change for one day. `key` is `"{date}:{action}"`
/// and is empty when there is no action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StaffingRecommendation {
    pub action: Option<RecommendationAction>,
    pub signal: WeatherSignal,
    pub message: String,
    pub can_apply: bool,
    pub button_label: String,
    pub key: String,
    #[serde(default)]
    pub already_applied: bool,
}
