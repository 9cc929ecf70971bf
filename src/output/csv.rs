use anyhow::Result;

use crate::financial::FinancialViability;
use crate::schedule::validation::{AssignmentGapRow, WeekReadinessChecks};
use crate::seasonal::TriggerTiming;

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

pub fn viability_to_csv(result: &FinancialViability) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record([
        "tone",
        "label",
        "expected_revenue",
        "expected_labor",
        "expected_labor_pct",
        "planned_labor",
        "planned_labor_pct",
        "expected_gp",
    ])?;
    writer.write_record([
        result.tone.to_string(),
        result.label.clone(),
        format!("{:.2}", result.expected_revenue),
        format!("{:.2}", result.expected_labor),
        format!("{:.2}", result.expected_labor_pct),
        format!("{:.2}", result.planned_labor),
        format!("{:.2}", result.planned_labor_pct),
        format!("{:.2}", result.expected_gp),
    ])?;
    finish(writer)
}

pub fn readiness_to_csv(checks: &WeekReadinessChecks) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record([
        "pending_requests",
        "unsubmitted_exceptions",
        "unassigned_positions",
        "invalid_coverage_days",
        "pto_conflicts",
        "ready",
    ])?;
    writer.write_record([
        checks.pending_requests.to_string(),
        checks.unsubmitted_exceptions.to_string(),
        checks.unassigned_positions.to_string(),
        checks.invalid_coverage_days.to_string(),
        checks.pto_conflicts.to_string(),
        checks.is_ready().to_string(),
    ])?;
    finish(writer)
}

pub fn gaps_to_csv(rows: &[AssignmentGapRow]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(["week", "unassigned", "days_with_gaps"])?;
    for row in rows {
        writer.write_record([
            row.week_label.clone(),
            row.unassigned.to_string(),
            row.days_with_gaps.to_string(),
        ])?;
    }
    finish(writer)
}

pub fn triggers_to_csv(timing: &[TriggerTiming]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record([
        "rule_key",
        "label",
        "detail",
        "first_hit",
        "last_hit",
        "hit_rate",
        "current_met",
    ])?;
    for row in timing {
        writer.write_record([
            row.rule_key.to_string(),
            row.label.clone(),
            row.detail.clone(),
            row.first_hit.clone(),
            row.last_hit.clone(),
            format!("{:.1}", row.hit_rate),
            row.current_met.to_string(),
        ])?;
    }
    finish(writer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gap_rows_become_records() {
        let csv = gaps_to_csv(&[AssignmentGapRow {
            week_label: "Week of 2025-07-01".to_string(),
            unassigned: 3,
            days_with_gaps: 2,
        }])
        .expect("csv renders");
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("week,unassigned,days_with_gaps"));
        assert_eq!(lines.next(), Some("Week of 2025-07-01,3,2"));
    }

    #[test]
    fn readiness_includes_verdict() {
        let csv = readiness_to_csv(&WeekReadinessChecks::default()).expect("csv renders");
        assert!(csv.lines().nth(1).is_some_and(|line| line.ends_with(",true")));
    }
}
