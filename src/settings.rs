use serde::{Deserialize, Serialize};

/// Per-tenant configuration consumed read-only by every engine function.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TenantSettings {
    #[serde(default = "default_gp_margin_factor")]
    pub gp_margin_factor: f64,
    #[serde(default)]
    pub monday_scenarios: MondayScenarios,
    #[serde(default)]
    pub pay_rates: PayRates,
    #[serde(default)]
    pub target_profile: TargetProfileSettings,
    #[serde(default)]
    pub workflow: WorkflowSettings,
    #[serde(default)]
    pub season_hours: SeasonHours,
    #[serde(default = "default_weather_threshold_f")]
    pub weather_threshold_f: f64,
    #[serde(default = "default_revenue_miss_threshold")]
    pub revenue_miss_threshold: f64,
    #[serde(default = "default_labor_pressure_delta")]
    pub labor_pressure_delta: f64,
    #[serde(default = "default_repeat_assignment_weeks")]
    pub repeat_assignment_weeks: u32,
    #[serde(default = "default_weather_normals_years")]
    pub weather_normals_years: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MondayScenarios {
    #[serde(default = "default_monday_low")]
    pub low: f64,
    #[serde(default = "default_monday_base")]
    pub base: f64,
    #[serde(default = "default_monday_high")]
    pub high: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PayRates {
    #[serde(default = "default_manager_rate")]
    pub manager: f64,
    #[serde(default = "default_key_lead_rate")]
    pub key_lead: f64,
    #[serde(default = "default_scooper_rate")]
    pub scooper: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TargetProfileSettings {
    #[serde(default = "default_labor_target_pct")]
    pub labor_target_pct: f64,
    #[serde(default = "default_labor_watch_pct")]
    pub labor_watch_pct: f64,
    #[serde(default = "default_profit_floor_pct")]
    pub profit_floor_pct: f64,
    #[serde(default = "default_profit_base_pct")]
    pub profit_base_pct: f64,
    #[serde(default = "default_profit_stretch_pct")]
    pub profit_stretch_pct: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSettings {
    #[serde(default = "default_min_openers")]
    pub min_openers: u32,
    #[serde(default = "default_min_closers")]
    pub min_closers: u32,
    #[serde(default = "default_true")]
    pub require_policy_approval: bool,
    #[serde(default = "default_true", rename = "requireGMApproval")]
    pub require_gm_approval: bool,
}

/// Opening and closing times per season, as "HH:MM".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SeasonHours {
    #[serde(default = "default_open")]
    pub winter_open: String,
    #[serde(default = "default_close")]
    pub winter_close: String,
    #[serde(default = "default_open")]
    pub spring_open: String,
    #[serde(default = "default_close")]
    pub spring_close: String,
    #[serde(default = "default_open")]
    pub summer_open: String,
    #[serde(default = "default_summer_close")]
    pub summer_close: String,
    #[serde(default = "default_open")]
    pub fall_open: String,
    #[serde(default = "default_close")]
    pub fall_close: String,
}

impl Default for TenantSettings {
    fn default() -> Self {
        Self {
            gp_margin_factor: default_gp_margin_factor(),
            monday_scenarios: MondayScenarios::default(),
            pay_rates: PayRates::default(),
            target_profile: TargetProfileSettings::default(),
            workflow: WorkflowSettings::default(),
            season_hours: SeasonHours::default(),
            weather_threshold_f: default_weather_threshold_f(),
            revenue_miss_threshold: default_revenue_miss_threshold(),
            labor_pressure_delta: default_labor_pressure_delta(),
            repeat_assignment_weeks: default_repeat_assignment_weeks(),
            weather_normals_years: default_weather_normals_years(),
        }
    }
}

impl Default for MondayScenarios {
    fn default() -> Self {
        Self {
            low: default_monday_low(),
            base: default_monday_base(),
            high: default_monday_high(),
        }
    }
}

impl Default for PayRates {
    fn default() -> Self {
        Self {
            manager: default_manager_rate(),
            key_lead: default_key_lead_rate(),
            scooper: default_scooper_rate(),
        }
    }
}

impl Default for TargetProfileSettings {
    fn default() -> Self {
        Self {
            labor_target_pct: default_labor_target_pct(),
            labor_watch_pct: default_labor_watch_pct(),
            profit_floor_pct: default_profit_floor_pct(),
            profit_base_pct: default_profit_base_pct(),
            profit_stretch_pct: default_profit_stretch_pct(),
        }
    }
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            min_openers: default_min_openers(),
            min_closers: default_min_closers(),
            require_policy_approval: true,
            require_gm_approval: true,
        }
    }
}

impl Default for SeasonHours {
    fn default() -> Self {
        Self {
            winter_open: default_open(),
            winter_close: default_close(),
            spring_open: default_open(),
            spring_close: default_close(),
            summer_open: default_open(),
            summer_close: default_summer_close(),
            fall_open: default_open(),
            fall_close: default_close(),
        }
    }
}

fn default_gp_margin_factor() -> f64 {
    0.72
}

fn default_monday_low() -> f64 {
    0.55
}

fn default_monday_base() -> f64 {
    0.65
}

fn default_monday_high() -> f64 {
    0.75
}

fn default_manager_rate() -> f64 {
    28.0
}

fn default_key_lead_rate() -> f64 {
    17.0
}

fn default_scooper_rate() -> f64 {
    15.0
}

fn default_labor_target_pct() -> f64 {
    24.0
}

fn default_labor_watch_pct() -> f64 {
    27.0
}

fn default_profit_floor_pct() -> f64 {
    11.0
}

fn default_profit_base_pct() -> f64 {
    15.0
}

fn default_profit_stretch_pct() -> f64 {
    17.0
}

fn default_min_openers() -> u32 {
    1
}

fn default_min_closers() -> u32 {
    2
}

fn default_open() -> String {
    "12:00".to_string()
}

fn default_close() -> String {
    "22:00".to_string()
}

fn default_summer_close() -> String {
    "23:00".to_string()
}

fn default_weather_threshold_f() -> f64 {
    10.0
}

fn default_revenue_miss_threshold() -> f64 {
    0.9
}

fn default_labor_pressure_delta() -> f64 {
    3.0
}

fn default_repeat_assignment_weeks() -> u32 {
    12
}

fn default_weather_normals_years() -> u32 {
    6
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_fills_defaults() {
        let parsed: TenantSettings =
            serde_json::from_str(r#"{"gpMarginFactor":0.7,"payRates":{"scooper":16}}"#)
                .expect("settings should parse");
        assert_eq!(parsed.gp_margin_factor, 0.7);
        assert_eq!(parsed.pay_rates.scooper, 16.0);
        assert_eq!(parsed.pay_rates.manager, 28.0);
        assert_eq!(parsed.workflow.min_closers, 2);
        assert_eq!(parsed.season_hours.summer_close, "23:00");
    }

    #[test]
    fn gm_approval_uses_wire_name() {
        let json = serde_json::to_value(WorkflowSettings::default()).expect("serialize");
        assert_eq!(json["requireGMApproval"], serde_json::Value::Bool(true));
    }
}
