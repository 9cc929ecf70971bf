pub mod benchmarks;
pub mod metrics;
pub mod viability;

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::schedule::Weekday;
use crate::settings::MondayScenarios;

pub use benchmarks::{benchmark_tone, health_signal, BenchmarkBand, BenchmarkTone, HealthSignal};
pub use metrics::{
    gross_profit, labor_percent, monthly_metrics_for_location_at_month, revenue_with_mode,
    rolling_average, shared_manager_weekly_impact, tuesday_baseline_for_month,
    weekly_metrics_for_location_at_month,
};
pub use viability::day_financial_viability;

/// Historical averages for one weekday. Wire names follow the upstream
/// data export, which is snake_case.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WeekdayProfileDay {
    #[serde(default)]
    pub avg_revenue: f64,
    #[serde(default)]
    pub avg_labor: f64,
    #[serde(default)]
    pub avg_doordash_net: f64,
}

/// Partial by design: an absent weekday contributes nothing.
pub type WeekdayProfile = BTreeMap<Weekday, WeekdayProfileDay>;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MonthlyDataRow {
    #[serde(default)]
    pub revenue: f64,
    #[serde(default)]
    pub store_labor: f64,
    #[serde(default)]
    pub doordash_net_component: f64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CalendarMonth {
    #[serde(default)]
    pub mondays: u32,
    #[serde(default)]
    pub operating_days_6: u32,
}

/// Reporting view of third-party delivery revenue.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum DeliveryMode {
    #[default]
    Include,
    Exclude,
    DoordashOnly,
}

impl DeliveryMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Include => "include",
            Self::Exclude => "exclude",
            Self::DoordashOnly => "doordash_only",
        }
    }
}

impl From<String> for DeliveryMode {
    fn from(value: String) -> Self {
        match value.trim() {
            "exclude" => Self::Exclude,
            "doordash_only" => Self::DoordashOnly,
            _ => Self::Include,
        }
    }
}

impl From<DeliveryMode> for String {
    fn from(value: DeliveryMode) -> Self {
        value.as_str().to_string()
    }
}

impl Display for DeliveryMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Operating plan. Only `open_7_day` adds Monday back; any other key is
/// the six-day base week.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum PlanKey {
    #[default]
    Current6Day,
    Open7Day,
}

impl PlanKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Current6Day => "current_6_day",
            Self::Open7Day => "open_7_day",
        }
    }

    pub fn includes_monday(&self) -> bool {
        matches!(self, Self::Open7Day)
    }
}

impl From<String> for PlanKey {
    fn from(value: String) -> Self {
        if value.trim() == "open_7_day" {
            Self::Open7Day
        } else {
            Self::Current6Day
        }
    }
}

impl From<PlanKey> for String {
    fn from(value: PlanKey) -> Self {
        value.as_str().to_string()
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum MondayScenario {
    Low,
    #[default]
    Base,
    High,
}

impl MondayScenario {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Base => "base",
            Self::High => "high",
        }
    }

    pub fn factor(&self, scenarios: &MondayScenarios) -> f64 {
        match self {
            Self::Low => scenarios.low,
            Self::Base => scenarios.base,
            Self::High => scenarios.high,
        }
    }
}

impl From<String> for MondayScenario {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Self::Low,
            "high" => Self::High,
            _ => Self::Base,
        }
    }
}

impl From<MondayScenario> for String {
    fn from(value: MondayScenario) -> Self {
        value.as_str().to_string()
    }
}

/// The plan-level knobs shared by weekly and monthly projections.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlanOptions {
    #[serde(default)]
    pub plan_key: PlanKey,
    #[serde(default)]
    pub monday_scenario: MondayScenario,
    /// Fixed labor cost of one Monday when the plan includes it.
    #[serde(default)]
    pub monday_labor: f64,
    #[serde(default)]
    pub manager_active: bool,
    #[serde(default)]
    pub manager_mgmt_share: f64,
    #[serde(default)]
    pub mode: DeliveryMode,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SharedManagerImpact {
    pub total_labor: f64,
    pub per_store_labor: f64,
    pub total_mgmt_hours: f64,
    pub per_store_mgmt_hours: f64,
    pub total_floor_hours: f64,
    pub per_store_floor_hours: f64,
    pub replacement_credit: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyMetrics {
    pub revenue: f64,
    pub labor: f64,
    pub gp: f64,
    pub labor_pct: f64,
    pub monday_revenue: f64,
    pub monday_labor: f64,
    pub manager_added_labor: f64,
    pub manager_floor_hours: f64,
    pub manager_mgmt_hours: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyMetrics {
    pub revenue: f64,
    pub labor: f64,
    pub gp: f64,
    pub labor_pct: f64,
    pub monday_revenue: f64,
    pub monday_labor: f64,
    pub manager_added_labor: f64,
}

/// Expected revenue and labor for one calendar day.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DayExpectedProfile {
    #[serde(default)]
    pub revenue: f64,
    #[serde(default)]
    pub labor: f64,
    #[serde(default)]
    pub gross_profit: f64,
    #[serde(default)]
    pub labor_pct: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Good,
    Watch,
    Risk,
    Pending,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Watch => "watch",
            Self::Risk => "risk",
            Self::Pending => "pending",
        }
    }
}

impl Display for Tone {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FinancialViability {
    pub tone: Tone,
    pub label: String,
    pub summary: String,
    pub expected_revenue: f64,
    pub expected_labor: f64,
    pub expected_labor_pct: f64,
    pub planned_labor: f64,
    pub planned_labor_pct: f64,
    pub expected_gp: f64,
}
