use std::collections::BTreeMap;
use std::net::SocketAddr;

use anyhow::Result;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info};

use crate::config::Config;
use crate::financial::{
    day_financial_viability, monthly_metrics_for_location_at_month,
    weekly_metrics_for_location_at_month, CalendarMonth, DayExpectedProfile, FinancialViability,
    MonthlyDataRow, MonthlyMetrics, PlanOptions, WeekdayProfile, WeeklyMetrics,
};
use crate::pto::PtoRequest;
use crate::retrospective::{overstaff_assessment, OverstaffAssessment};
use crate::schedule::validation::{
    day_validation, next_week_checks_with, ValidationResult, WeekReadinessChecks,
};
use crate::schedule::{ScheduleDay, ScheduleWeek, Slot};
use crate::seasonal::{
    rules_for_location, trigger_timing_for_location, LocationTriggerRules, PlaybookMetrics,
    TriggerTiming,
};
use crate::settings::TenantSettings;
use crate::weather::recommendations::day_recommendation_with;
use crate::weather::{
    apply_recommendation_to_day, weather_impact_signal, HourlyWeatherRow, StaffingRecommendation,
    WeatherNormals, WeatherRow, WeatherSignal,
};

#[derive(Clone)]
struct ApiState {
    config: Config,
}

impl ApiState {
    fn settings(&self, requested: Option<TenantSettings>) -> TenantSettings {
        requested.unwrap_or_else(|| self.config.tenant.clone())
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        debug!("rejected request body: {rejection}");
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;
type Payload<T> = std::result::Result<Json<T>, JsonRejection>;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct WeeklyMetricsRequest {
    #[serde(default)]
    profile: WeekdayProfile,
    #[serde(default)]
    options: PlanOptions,
    settings: Option<TenantSettings>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct MonthlyMetricsRequest {
    #[serde(default)]
    row: MonthlyDataRow,
    #[serde(default)]
    profile: WeekdayProfile,
    #[serde(default)]
    calendar: CalendarMonth,
    #[serde(default)]
    options: PlanOptions,
    settings: Option<TenantSettings>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct DayValidationRequest {
    #[serde(default)]
    slots: Vec<Slot>,
    settings: Option<TenantSettings>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct FinancialViabilityRequest {
    expected: Option<DayExpectedProfile>,
    #[serde(default)]
    slots: Vec<Slot>,
    settings: Option<TenantSettings>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WeatherImpactRequest {
    date: NaiveDate,
    #[serde(default)]
    normals: WeatherNormals,
    row: Option<WeatherRow>,
    #[serde(default)]
    hourly: Vec<HourlyWeatherRow>,
    threshold_f: Option<f64>,
    settings: Option<TenantSettings>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WeatherRecommendationRequest {
    signal: WeatherSignal,
    day: ScheduleDay,
    settings: Option<TenantSettings>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OverstaffRequest {
    expected: Option<DayExpectedProfile>,
    #[serde(default)]
    actual_revenue: f64,
    #[serde(default)]
    actual_labor: f64,
    weather_signal: Option<WeatherSignal>,
    settings: Option<TenantSettings>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct WeekReadinessRequest {
    week: Option<ScheduleWeek>,
    #[serde(default)]
    location: String,
    #[serde(default)]
    pto_requests: Vec<PtoRequest>,
    settings: Option<TenantSettings>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct TriggerTimingRequest {
    #[serde(default)]
    location: String,
    rules: Option<LocationTriggerRules>,
    profile: Option<String>,
    #[serde(default)]
    month_keys: Vec<String>,
    #[serde(default)]
    metrics: BTreeMap<String, PlaybookMetrics>,
    current_month: Option<String>,
    #[serde(default)]
    month_labels: BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WeatherRecommendationResponse {
    recommendation: StaffingRecommendation,
    day: ScheduleDay,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WeekReadinessResponse {
    ready: bool,
    #[serde(flatten)]
    checks: WeekReadinessChecks,
}

fn router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/config", get(show_config))
        .route("/compute/weekly-metrics", post(weekly_metrics))
        .route("/compute/monthly-metrics", post(monthly_metrics))
        .route("/compute/day-validation", post(validate_day))
        .route("/compute/financial-viability", post(financial_viability))
        .route("/compute/weather-impact", post(weather_impact))
        .route("/compute/weather-recommendation", post(weather_recommendation))
        .route("/compute/overstaff-assessment", post(overstaff))
        .route("/compute/week-readiness", post(week_readiness))
        .route("/compute/trigger-timing", post(trigger_timing))
        .layer(cors)
        .with_state(state)
}

pub async fn run_server(config: Config, bind: SocketAddr) -> Result<()> {
    let app = router(ApiState { config });

    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("scheduling engine listening on http://{bind}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn show_config(State(state): State<ApiState>) -> Json<Config> {
    Json(state.config)
}

async fn weekly_metrics(
    State(state): State<ApiState>,
    payload: Payload<WeeklyMetricsRequest>,
) -> ApiResult<WeeklyMetrics> {
    let Json(request) = payload?;
    let settings = state.settings(request.settings);
    Ok(Json(weekly_metrics_for_location_at_month(
        &request.profile,
        &request.options,
        &settings,
    )))
}

async fn monthly_metrics(
    State(state): State<ApiState>,
    payload: Payload<MonthlyMetricsRequest>,
) -> ApiResult<MonthlyMetrics> {
    let Json(request) = payload?;
    let settings = state.settings(request.settings);
    Ok(Json(monthly_metrics_for_location_at_month(
        &request.row,
        &request.profile,
        request.calendar,
        &request.options,
        &settings,
    )))
}

async fn validate_day(
    State(state): State<ApiState>,
    payload: Payload<DayValidationRequest>,
) -> ApiResult<ValidationResult> {
    let Json(request) = payload?;
    let settings = state.settings(request.settings);
    Ok(Json(day_validation(&request.slots, &settings.workflow)))
}

async fn financial_viability(
    State(state): State<ApiState>,
    payload: Payload<FinancialViabilityRequest>,
) -> ApiResult<FinancialViability> {
    let Json(request) = payload?;
    let settings = state.settings(request.settings);
    Ok(Json(day_financial_viability(
        request.expected.as_ref(),
        &request.slots,
        &settings,
    )))
}

async fn weather_impact(
    State(state): State<ApiState>,
    payload: Payload<WeatherImpactRequest>,
) -> ApiResult<WeatherSignal> {
    let Json(request) = payload?;
    let settings = state.settings(request.settings);
    let threshold = request
        .threshold_f
        .unwrap_or(settings.weather_threshold_f);
    Ok(Json(weather_impact_signal(
        &request.normals,
        request.date,
        request.row.as_ref(),
        &request.hourly,
        threshold,
    )))
}

async fn weather_recommendation(
    State(state): State<ApiState>,
    payload: Payload<WeatherRecommendationRequest>,
) -> ApiResult<WeatherRecommendationResponse> {
    let Json(request) = payload?;
    let settings = state.settings(request.settings);
    let recommendation = day_recommendation_with(&request.signal, &request.day, &settings.workflow);
    let day = if recommendation.can_apply {
        apply_recommendation_to_day(&request.day, &recommendation)
    } else {
        request.day
    };
    Ok(Json(WeatherRecommendationResponse {
        recommendation,
        day,
    }))
}

async fn overstaff(
    State(state): State<ApiState>,
    payload: Payload<OverstaffRequest>,
) -> ApiResult<OverstaffAssessment> {
    let Json(request) = payload?;
    let settings = state.settings(request.settings);
    let signal = request
        .weather_signal
        .unwrap_or_else(|| WeatherSignal::neutral("No weather signal", "Weather data unavailable."));
    Ok(Json(overstaff_assessment(
        request.expected.as_ref(),
        request.actual_revenue,
        request.actual_labor,
        &signal,
        &settings,
    )))
}

async fn week_readiness(
    State(state): State<ApiState>,
    payload: Payload<WeekReadinessRequest>,
) -> ApiResult<WeekReadinessResponse> {
    let Json(request) = payload?;
    let settings = state.settings(request.settings);
    let checks = next_week_checks_with(
        request.week.as_ref(),
        &request.location,
        &request.pto_requests,
        &settings.workflow,
        &state.config.locations,
    );
    Ok(Json(WeekReadinessResponse {
        ready: checks.is_ready(),
        checks,
    }))
}

async fn trigger_timing(
    State(state): State<ApiState>,
    payload: Payload<TriggerTimingRequest>,
) -> ApiResult<Vec<TriggerTiming>> {
    let Json(request) = payload?;
    let rules = match request.rules {
        Some(rules) => rules,
        None => {
            let profile = request
                .profile
                .as_deref()
                .unwrap_or(&state.config.triggers.profile);
            rules_for_location(profile, &request.location).ok_or_else(|| {
                ApiError::bad_request(format!(
                    "no trigger rules for location {:?}",
                    request.location
                ))
            })?
        }
    };

    let timing = trigger_timing_for_location(
        &rules,
        &request.month_keys,
        |key| request.metrics.get(key).cloned().unwrap_or_default(),
        request.current_month.as_deref(),
        &request.month_labels,
    );
    Ok(Json(timing))
}
