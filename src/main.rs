use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use scheduling_engine::config::{Config, ConfigOverrides};
use scheduling_engine::financial::{day_financial_viability, DayExpectedProfile, FinancialViability};
use scheduling_engine::output::csv::{gaps_to_csv, readiness_to_csv, triggers_to_csv, viability_to_csv};
use scheduling_engine::output::json::render_json;
use scheduling_engine::output::table::{
    render_gaps_table, render_readiness_table, render_recommendation_table,
    render_trigger_gap_table, render_trigger_table, render_viability_table, render_weather_table,
};
use scheduling_engine::pto::PtoRequest;
use scheduling_engine::schedule::validation::{
    assignment_gap_summary, next_week_checks_with, AssignmentGapRow, WeekReadinessChecks,
    DEFAULT_WEEKS_AHEAD,
};
use scheduling_engine::schedule::{ScheduleDay, ScheduleWeek, Slot};
use scheduling_engine::seasonal::{
    closest_rule, closest_trigger_gap, rules_for_location, scale_action_for_rule,
    trigger_timing_for_location, PlaybookMetrics, TriggerTiming,
};
use scheduling_engine::server::run_server;
use scheduling_engine::weather::recommendations::day_recommendation_with;
use scheduling_engine::weather::{
    apply_recommendation_to_day, weather_impact_signal, HourlyWeatherRow, StaffingRecommendation,
    WeatherNormals, WeatherRow, WeatherSignal,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Debug, Parser)]
#[command(
    name = "scheduling-engine",
    about = "Staffing decision support for multi-location schedules"
)]
struct Cli {
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
    /// Target profile for the built-in trigger rules.
    #[arg(long)]
    profile: Option<String>,
    #[arg(long = "weather-threshold")]
    weather_threshold_f: Option<f64>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Score a day's planned labor against its expected baseline.
    Viability {
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Readiness counters for the next week.
    Readiness {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(long, default_value = "BOTH")]
        location: String,
    },
    /// Unfilled positions per upcoming week.
    Gaps {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(long, default_value_t = DEFAULT_WEEKS_AHEAD)]
        weeks_ahead: usize,
    },
    /// Weather demand signal for one date.
    Weather {
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Staffing recommendation for a day under a weather signal.
    Recommend {
        #[arg(short, long)]
        input: PathBuf,
        /// Print the adjusted day as JSON after the recommendation.
        #[arg(long)]
        apply: bool,
    },
    /// Seasonal trigger timing for one location.
    Triggers {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(long)]
        location: String,
    },
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    Config {
        #[arg(long)]
        init: bool,
        #[arg(long)]
        show: bool,
    },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ViabilityInput {
    expected: Option<DayExpectedProfile>,
    #[serde(default)]
    slots: Vec<Slot>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReadinessInput {
    week: Option<ScheduleWeek>,
    #[serde(default)]
    pto_requests: Vec<PtoRequest>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WeatherInput {
    date: NaiveDate,
    #[serde(default)]
    normals: WeatherNormals,
    row: Option<WeatherRow>,
    #[serde(default)]
    hourly: Vec<HourlyWeatherRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecommendInput {
    signal: WeatherSignal,
    day: ScheduleDay,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TriggersInput {
    #[serde(default)]
    month_keys: Vec<String>,
    #[serde(default)]
    metrics: BTreeMap<String, PlaybookMetrics>,
    current_month: Option<String>,
    #[serde(default)]
    month_labels: BTreeMap<String, String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load(Some(&config_path))?;
    let (host, port) = match &cli.command {
        Commands::Serve { host, port } => (host.clone(), *port),
        _ => (None, None),
    };
    config.apply_overrides(ConfigOverrides {
        host,
        port,
        trigger_profile: cli.profile.clone(),
        weather_threshold_f: cli.weather_threshold_f,
    });
    debug!("loaded config from {}", config_path.display());

    match &cli.command {
        Commands::Config { init, show } => {
            handle_config_command(*init, *show, &config, &config_path)?;
        }
        Commands::Serve { .. } => {
            let bind = config.bind_addr()?;
            return run_server(config, bind).await;
        }
        Commands::Viability { input } => {
            let input: ViabilityInput = read_input(input)?;
            let result = day_financial_viability(input.expected.as_ref(), &input.slots, &config.tenant);
            print_viability(&result, cli.output)?;
        }
        Commands::Readiness { input, location } => {
            let input: ReadinessInput = read_input(input)?;
            let checks = next_week_checks_with(
                input.week.as_ref(),
                location,
                &input.pto_requests,
                &config.tenant.workflow,
                &config.locations,
            );
            print_readiness(&checks, cli.output)?;
        }
        Commands::Gaps { input, weeks_ahead } => {
            let weeks: Vec<ScheduleWeek> = read_input(input)?;
            let rows = assignment_gap_summary(&weeks, *weeks_ahead);
            if rows.is_empty() {
                info!("no assignment gaps in the next {weeks_ahead} weeks");
            }
            print_gaps(&rows, cli.output)?;
        }
        Commands::Weather { input } => {
            let input: WeatherInput = read_input(input)?;
            let signal = weather_impact_signal(
                &input.normals,
                input.date,
                input.row.as_ref(),
                &input.hourly,
                config.tenant.weather_threshold_f,
            );
            print_weather(&signal, cli.output)?;
        }
        Commands::Recommend { input, apply } => {
            let input: RecommendInput = read_input(input)?;
            let rec = day_recommendation_with(&input.signal, &input.day, &config.tenant.workflow);
            print_recommendation(&rec, cli.output)?;
            if *apply {
                if !rec.can_apply {
                    warn!("recommendation {:?} cannot be applied; day unchanged", rec.key);
                }
                let day = if rec.can_apply {
                    apply_recommendation_to_day(&input.day, &rec)
                } else {
                    input.day
                };
                println!("{}", render_json(&day)?);
            }
        }
        Commands::Triggers { input, location } => {
            let input: TriggersInput = read_input(input)?;
            let rules = rules_for_location(&config.triggers.profile, location)
                .ok_or_else(|| anyhow!("no trigger rules for location {location}"))?;
            let timing = trigger_timing_for_location(
                &rules,
                &input.month_keys,
                |key| input.metrics.get(key).cloned().unwrap_or_default(),
                input.current_month.as_deref(),
                &input.month_labels,
            );
            print_triggers(&timing, cli.output)?;

            if let (OutputFormat::Table, Some(current)) = (cli.output, input.current_month.as_deref()) {
                let metrics = input.metrics.get(current).cloned().unwrap_or_default();
                let evaluations = closest_trigger_gap(&rules, &metrics);
                println!("{}", render_trigger_gap_table(&evaluations));
                let next = closest_rule(&evaluations).map(|evaluation| evaluation.rule_key);
                println!("{}", scale_action_for_rule(next));
            }
        }
    }
    Ok(())
}

fn read_input<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed reading input: {}", path.display()))?;
    serde_json::from_str(&data)
        .with_context(|| format!("failed parsing JSON input: {}", path.display()))
}

fn handle_config_command(init: bool, show: bool, config: &Config, config_path: &Path) -> Result<()> {
    if init {
        Config::write_template(config_path)?;
        println!("Wrote config template to {}", config_path.display());
    }
    if show || !init {
        println!("{}", render_json(config)?);
    }
    Ok(())
}

fn print_viability(result: &FinancialViability, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_viability_table(result)),
        OutputFormat::Json => println!("{}", render_json(result)?),
        OutputFormat::Csv => println!("{}", viability_to_csv(result)?),
    }
    Ok(())
}

fn print_readiness(checks: &WeekReadinessChecks, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_readiness_table(checks)),
        OutputFormat::Json => println!("{}", render_json(checks)?),
        OutputFormat::Csv => println!("{}", readiness_to_csv(checks)?),
    }
    Ok(())
}

fn print_gaps(rows: &[AssignmentGapRow], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_gaps_table(rows)),
        OutputFormat::Json => println!("{}", render_json(rows)?),
        OutputFormat::Csv => println!("{}", gaps_to_csv(rows)?),
    }
    Ok(())
}

fn print_weather(signal: &WeatherSignal, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_weather_table(signal)),
        OutputFormat::Json => println!("{}", render_json(signal)?),
        OutputFormat::Csv => {
            warn!("CSV output for weather not implemented, using JSON");
            println!("{}", render_json(signal)?);
        }
    }
    Ok(())
}

fn print_recommendation(rec: &StaffingRecommendation, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_recommendation_table(rec)),
        OutputFormat::Json => println!("{}", render_json(rec)?),
        OutputFormat::Csv => {
            warn!("CSV output for recommend not implemented, using JSON");
            println!("{}", render_json(rec)?);
        }
    }
    Ok(())
}

fn print_triggers(timing: &[TriggerTiming], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_trigger_table(timing)),
        OutputFormat::Json => println!("{}", render_json(timing)?),
        OutputFormat::Csv => println!("{}", triggers_to_csv(timing)?),
    }
    Ok(())
}
