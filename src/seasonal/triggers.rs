use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::schedule::Season;
use crate::seasonal::{
    ComparisonOperator, LocationTriggerRules, PlaybookMetrics, TransitionKey, TriggerCondition,
    TriggerGapCondition, TriggerGapEvaluation, TriggerTiming,
};

/// Season of a "YYYY-MM" key. A missing or unreadable month reads as 0,
/// which is winter.
pub fn season_from_month(month_key: &str) -> Season {
    let month = month_key
        .split('-')
        .nth(1)
        .and_then(|part| part.trim().parse::<u32>().ok())
        .unwrap_or(0);
    Season::from_month_number(month)
}

pub fn season_for_date(date: NaiveDate) -> Season {
    Season::from_month_number(date.month())
}

pub fn condition_met(value: f64, operator: ComparisonOperator, threshold: f64) -> bool {
    match operator {
        ComparisonOperator::Ge => value >= threshold,
        ComparisonOperator::Le => value <= threshold,
        ComparisonOperator::Gt => value > threshold,
        ComparisonOperator::Lt => value < threshold,
        ComparisonOperator::Eq => value == threshold,
    }
}

/// Signed distance to the threshold: positive is unmet, negative is headroom.
pub fn condition_gap(condition: &TriggerCondition, metrics: &PlaybookMetrics) -> f64 {
    let value = metrics.value(&condition.metric);
    match condition.operator {
        ComparisonOperator::Le => value - condition.threshold,
        _ => condition.threshold - value,
    }
}

fn rule_fires(conditions: &[TriggerCondition], metrics: &PlaybookMetrics) -> bool {
    conditions.iter().all(|cond| {
        condition_met(metrics.value(&cond.metric), cond.operator, cond.threshold)
    })
}

/// When each transition fired across `month_keys`, in transition order.
pub fn trigger_timing_for_location<F>(
    rules: &LocationTriggerRules,
    month_keys: &[String],
    get_metrics: F,
    current_month: Option<&str>,
    month_labels: &BTreeMap<String, String>,
) -> Vec<TriggerTiming>
where
    F: Fn(&str) -> PlaybookMetrics,
{
    let metrics_by_month: Vec<(&str, PlaybookMetrics)> = month_keys
        .iter()
        .map(|key| (key.as_str(), get_metrics(key)))
        .collect();
    let label_for = |key: &str| {
        month_labels
            .get(key)
            .filter(|label| !label.is_empty())
            .cloned()
            .unwrap_or_else(|| key.to_string())
    };

    TransitionKey::ALL
        .iter()
        .map(|rule_key| {
            let rule = rules.get(*rule_key);
            let hits: Vec<&str> = metrics_by_month
                .iter()
                .filter(|(_, metrics)| rule_fires(&rule.conditions, metrics))
                .map(|(key, _)| *key)
                .collect();

            let hit_rate = if month_keys.is_empty() {
                0.0
            } else {
                hits.len() as f64 / month_keys.len() as f64 * 100.0
            };

            TriggerTiming {
                rule_key: *rule_key,
                label: rule.label.clone(),
                detail: rule.detail.clone(),
                first_hit: hits
                    .first()
                    .map(|key| label_for(key))
                    .unwrap_or_else(|| "Not met in selected range".to_string()),
                last_hit: hits
                    .last()
                    .map(|key| label_for(key))
                    .unwrap_or_else(|| "Not met".to_string()),
                hit_rate,
                current_met: current_month.is_some_and(|current| hits.contains(&current)),
            }
        })
        .collect()
}

/// Per transition, the unmet conditions and the summed normalized gap.
pub fn closest_trigger_gap(
    rules: &LocationTriggerRules,
    metrics: &PlaybookMetrics,
) -> Vec<TriggerGapEvaluation> {
    TransitionKey::ALL
        .iter()
        .map(|rule_key| {
            let rule = rules.get(*rule_key);
            let unmet: Vec<TriggerGapCondition> = rule
                .conditions
                .iter()
                .filter_map(|cond| {
                    let delta = condition_gap(cond, metrics);
                    (delta > 0.0).then(|| TriggerGapCondition {
                        metric: cond.metric.clone(),
                        operator: cond.operator,
                        threshold: cond.threshold,
                        delta,
                        unmet: true,
                        norm_gap: delta / cond.threshold.abs().max(1.0),
                    })
                })
                .collect();
            let max_norm_gap = unmet.iter().map(|cond| cond.norm_gap).sum();

            TriggerGapEvaluation {
                rule_key: *rule_key,
                label: rule.label.clone(),
                detail: rule.detail.clone(),
                unmet,
                max_norm_gap,
            }
        })
        .collect()
}

/// The unmet transition nearest to firing, or `None` when every rule fires.
pub fn closest_rule(evaluations: &[TriggerGapEvaluation]) -> Option<&TriggerGapEvaluation> {
    evaluations
        .iter()
        .filter(|evaluation| !evaluation.unmet.is_empty())
        .min_by(|a, b| a.max_norm_gap.total_cmp(&b.max_norm_gap))
}

pub fn scale_action_for_rule(rule_key: Option<TransitionKey>) -> &'static str {
    match rule_key {
        Some(TransitionKey::UpSpring) => {
            "Prepare spring ramp: add weekend-close overlap and start flex training."
        }
        Some(TransitionKey::UpSummer) => "Prepare summer peak: schedule 5/6-10/11 PM flex blocks.",
        Some(TransitionKey::DownFall) => {
            "Start fall de-ramp: trim weekday flex first while protecting close coverage."
        }
        Some(TransitionKey::DownWinter) => {
            "Move to winter lean template and keep breaks/close coverage protected."
        }
        None => "Hold current template and continue monitoring.",
    }
}
