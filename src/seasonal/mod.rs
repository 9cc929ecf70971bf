pub mod profiles;
pub mod triggers;

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::schedule::Season;

pub use profiles::{
    build_trigger_rules_for_profile, builtin_target_profiles, default_trigger_rules,
    profile_threshold_from_default, rules_for_location,
};
pub use triggers::{
    closest_rule, closest_trigger_gap, condition_gap, condition_met, scale_action_for_rule,
    season_for_date, season_from_month, trigger_timing_for_location,
};

/// A seasonal staffing transition.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKey {
    UpSpring,
    UpSummer,
    DownFall,
    DownWinter,
}

impl TransitionKey {
    /// Evaluation and reporting order.
    pub const ALL: [TransitionKey; 4] = [
        TransitionKey::UpSpring,
        TransitionKey::UpSummer,
        TransitionKey::DownFall,
        TransitionKey::DownWinter,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UpSpring => "up_spring",
            Self::UpSummer => "up_summer",
            Self::DownFall => "down_fall",
            Self::DownWinter => "down_winter",
        }
    }

    /// The transition that leads into `season`.
    pub fn for_season(season: Season) -> Self {
        match season {
            Season::Winter => Self::DownWinter,
            Season::Spring => Self::UpSpring,
            Season::Summer => Self::UpSummer,
            Season::Fall => Self::DownFall,
        }
    }
}

impl Display for TransitionKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown transition: {0}")]
pub struct TransitionParseError(pub String);

impl FromStr for TransitionKey {
    type Err = TransitionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "up_spring" => Ok(Self::UpSpring),
            "up_summer" => Ok(Self::UpSummer),
            "down_fall" => Ok(Self::DownFall),
            "down_winter" => Ok(Self::DownWinter),
            _ => Err(TransitionParseError(s.to_string())),
        }
    }
}

/// Threshold comparison. Unknown operators read as `>=`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum ComparisonOperator {
    #[default]
    Ge,
    Le,
    Gt,
    Lt,
    Eq,
}

impl ComparisonOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ge => ">=",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Eq => "==",
        }
    }
}

impl From<String> for ComparisonOperator {
    fn from(value: String) -> Self {
        match value.trim() {
            "<=" => Self::Le,
            ">" => Self::Gt,
            "<" => Self::Lt,
            "==" => Self::Eq,
            _ => Self::Ge,
        }
    }
}

impl From<ComparisonOperator> for String {
    fn from(value: ComparisonOperator) -> Self {
        value.as_str().to_string()
    }
}

impl Display for ComparisonOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(from = "String", into = "String")]
pub enum PlaybookMetric {
    AvgDailyRevenue,
    WeekendShare,
    PeakShare,
    Custom(String),
}

impl PlaybookMetric {
    /// Revenue thresholds scale by a factor; share thresholds shift by points.
    pub fn is_revenue(&self) -> bool {
        matches!(self, Self::AvgDailyRevenue)
    }
}

impl Display for PlaybookMetric {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AvgDailyRevenue => write!(f, "avgDailyRevenue"),
            Self::WeekendShare => write!(f, "weekendShare"),
            Self::PeakShare => write!(f, "peakShare"),
            Self::Custom(name) => write!(f, "{name}"),
        }
    }
}

impl From<String> for PlaybookMetric {
    fn from(value: String) -> Self {
        match value.trim() {
            "avgDailyRevenue" | "avg_daily_revenue" => Self::AvgDailyRevenue,
            "weekendShare" | "weekend_share" => Self::WeekendShare,
            "peakShare" | "peak_share" => Self::PeakShare,
            other => Self::Custom(other.to_string()),
        }
    }
}

impl From<PlaybookMetric> for String {
    fn from(value: PlaybookMetric) -> Self {
        value.to_string()
    }
}

/// Month-level metrics the trigger rules are evaluated against.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlaybookMetrics {
    #[serde(default)]
    pub avg_daily_revenue: f64,
    #[serde(default)]
    pub weekend_share: f64,
    #[serde(default)]
    pub peak_share: f64,
    /// Any other month fields. Non-numeric entries read as 0.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl PlaybookMetrics {
    /// Unknown metric names read as 0.
    pub fn value(&self, metric: &PlaybookMetric) -> f64 {
        let raw = match metric {
            PlaybookMetric::AvgDailyRevenue => self.avg_daily_revenue,
            PlaybookMetric::WeekendShare => self.weekend_share,
            PlaybookMetric::PeakShare => self.peak_share,
            PlaybookMetric::Custom(name) => self
                .extra
                .get(name)
                .and_then(serde_json::Value::as_f64)
                .unwrap_or(0.0),
        };
        crate::parse::finite_or_zero(raw)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TriggerCondition {
    pub metric: PlaybookMetric,
    #[serde(default)]
    pub operator: ComparisonOperator,
    pub threshold: f64,
}

/// Conditions are ANDed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TriggerRule {
    pub label: String,
    #[serde(default)]
    pub detail: String,
    #[serde(default)]
    pub conditions: Vec<TriggerCondition>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocationTriggerRules {
    pub up_spring: TriggerRule,
    pub up_summer: TriggerRule,
    pub down_fall: TriggerRule,
    pub down_winter: TriggerRule,
}

impl LocationTriggerRules {
    pub fn get(&self, key: TransitionKey) -> &TriggerRule {
        match key {
            TransitionKey::UpSpring => &self.up_spring,
            TransitionKey::UpSummer => &self.up_summer,
            TransitionKey::DownFall => &self.down_fall,
            TransitionKey::DownWinter => &self.down_winter,
        }
    }

    pub fn map_rules(&self, mut f: impl FnMut(&TriggerRule) -> TriggerRule) -> Self {
        Self {
            up_spring: f(&self.up_spring),
            up_summer: f(&self.up_summer),
            down_fall: f(&self.down_fall),
            down_winter: f(&self.down_winter),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TriggerTiming {
    pub rule_key: TransitionKey,
    pub label: String,
    pub detail: String,
    pub first_hit: String,
    pub last_hit: String,
    pub hit_rate: f64,
    pub current_met: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TriggerGapCondition {
    pub metric: PlaybookMetric,
    pub operator: ComparisonOperator,
    pub threshold: f64,
    pub delta: f64,
    pub unmet: bool,
    pub norm_gap: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TriggerGapEvaluation {
    pub rule_key: TransitionKey,
    pub label: String,
    pub detail: String,
    pub unmet: Vec<TriggerGapCondition>,
    /// Sum of normalized gaps over unmet conditions; zero when the rule fires.
    pub max_norm_gap: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TargetProfile {
    pub label: String,
    pub summary: String,
    pub revenue_factor: f64,
    pub share_delta: f64,
}
