use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Row, Table};

use crate::financial::{FinancialViability, Tone};
use crate::schedule::validation::{AssignmentGapRow, WeekReadinessChecks};
use crate::seasonal::{TriggerGapEvaluation, TriggerTiming};
use crate::weather::{StaffingRecommendation, WeatherImpact, WeatherSignal};

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn tone_cell(tone: Tone, text: &str) -> Cell {
    let cell = Cell::new(text);
    match tone {
        Tone::Good => cell.fg(Color::Green),
        Tone::Watch => cell.fg(Color::Yellow),
        Tone::Risk => cell.fg(Color::Red),
        Tone::Pending => cell.fg(Color::DarkGrey),
    }
}

fn impact_cell(impact: WeatherImpact) -> Cell {
    let cell = Cell::new(impact.as_str().to_uppercase());
    match impact {
        WeatherImpact::Up => cell.fg(Color::Green),
        WeatherImpact::Down => cell.fg(Color::Red),
        WeatherImpact::Neutral => cell,
    }
}

fn count_cell(count: usize) -> Cell {
    if count == 0 {
        Cell::new(count).fg(Color::Green)
    } else {
        Cell::new(count).fg(Color::Red)
    }
}

fn degrees(value: Option<f64>) -> String {
    value
        .map(|v| format!("{v:.0}F"))
        .unwrap_or_else(|| "-".to_string())
}

pub fn render_viability_table(result: &FinancialViability) -> String {
    let mut table = new_table();
    table.set_header(vec![
        "Status",
        "Expected Revenue",
        "Expected Labor",
        "Expected Labor %",
        "Planned Labor",
        "Planned Labor %",
        "Expected GP",
    ]);
    table.add_row(Row::from(vec![
        tone_cell(result.tone, &result.label),
        Cell::new(format!("${:.0}", result.expected_revenue)),
        Cell::new(format!("${:.0}", result.expected_labor)),
        Cell::new(format!("{:.1}%", result.expected_labor_pct)),
        Cell::new(format!("${:.0}", result.planned_labor)),
        tone_cell(result.tone, &format!("{:.1}%", result.planned_labor_pct)),
        Cell::new(format!("${:.0}", result.expected_gp)),
    ]));
    format!("{table}\n{}", result.summary)
}

pub fn render_readiness_table(checks: &WeekReadinessChecks) -> String {
    let mut table = new_table();
    table.set_header(vec!["Check", "Count"]);
    let rows = [
        ("Pending requests", checks.pending_requests),
        ("Unsubmitted exceptions", checks.unsubmitted_exceptions),
        ("Unassigned positions", checks.unassigned_positions),
        ("Invalid coverage days", checks.invalid_coverage_days),
        ("PTO conflicts", checks.pto_conflicts),
    ];
    for (label, count) in rows {
        table.add_row(Row::from(vec![Cell::new(label), count_cell(count)]));
    }
    let verdict = if checks.is_ready() {
        "Week is ready to publish."
    } else {
        "Week is not ready to publish."
    };
    format!("{table}\n{verdict}")
}

pub fn render_gaps_table(rows: &[AssignmentGapRow]) -> String {
    let mut table = new_table();
    table.set_header(vec!["Week", "Unassigned", "Days With Gaps"]);
    for row in rows {
        table.add_row(vec![
            row.week_label.clone(),
            row.unassigned.to_string(),
            row.days_with_gaps.to_string(),
        ]);
    }
    table.to_string()
}

pub fn render_weather_table(signal: &WeatherSignal) -> String {
    let mut table = new_table();
    table.set_header(vec!["Impact", "Signal", "Expected", "Actual", "Delta", "Reason"]);
    table.add_row(Row::from(vec![
        impact_cell(signal.impact),
        Cell::new(&signal.label),
        Cell::new(degrees(signal.expected)),
        Cell::new(degrees(signal.actual)),
        Cell::new(
            signal
                .delta
                .map(|d| format!("{d:+.0}F"))
                .unwrap_or_else(|| "-".to_string()),
        ),
        Cell::new(&signal.reason),
    ]));
    table.to_string()
}

pub fn render_recommendation_table(rec: &StaffingRecommendation) -> String {
    let mut table = new_table();
    table.set_header(vec!["Action", "Impact", "Can Apply", "Key"]);
    let apply_cell = if rec.can_apply {
        Cell::new("YES").fg(Color::Green)
    } else {
        Cell::new("NO").fg(Color::DarkGrey)
    };
    table.add_row(Row::from(vec![
        Cell::new(
            rec.action
                .map(|a| a.to_string())
                .unwrap_or_else(|| "-".to_string()),
        ),
        impact_cell(rec.signal.impact),
        apply_cell,
        Cell::new(if rec.key.is_empty() { "-" } else { rec.key.as_str() }),
    ]));
    if rec.button_label.is_empty() {
        format!("{table}\n{}", rec.message)
    } else {
        format!("{table}\n{}\n[{}]", rec.message, rec.button_label)
    }
}

pub fn render_trigger_table(timing: &[TriggerTiming]) -> String {
    let mut table = new_table();
    table.set_header(vec![
        "Transition",
        "Step",
        "First Hit",
        "Last Hit",
        "Hit Rate",
        "Current Month",
    ]);
    for row in timing {
        let current = if row.current_met {
            Cell::new("MET").fg(Color::Green)
        } else {
            Cell::new("-")
        };
        table.add_row(Row::from(vec![
            Cell::new(&row.label),
            Cell::new(&row.detail),
            Cell::new(&row.first_hit),
            Cell::new(&row.last_hit),
            Cell::new(format!("{:.0}%", row.hit_rate)),
            current,
        ]));
    }
    table.to_string()
}

pub fn render_trigger_gap_table(evaluations: &[TriggerGapEvaluation]) -> String {
    let mut table = new_table();
    table.set_header(vec!["Transition", "Unmet Conditions", "Gap"]);
    for evaluation in evaluations {
        let unmet = if evaluation.unmet.is_empty() {
            "all met".to_string()
        } else {
            evaluation
                .unmet
                .iter()
                .map(|c| format!("{} {} {} (short {:.1})", c.metric, c.operator, c.threshold, c.delta))
                .collect::<Vec<_>>()
                .join(", ")
        };
        table.add_row(vec![
            evaluation.label.clone(),
            unmet,
            format!("{:.3}", evaluation.max_norm_gap),
        ]);
    }
    table.to_string()
}
