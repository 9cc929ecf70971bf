use std::collections::BTreeMap;

use tracing::debug;

use crate::seasonal::{
    ComparisonOperator, LocationTriggerRules, PlaybookMetric, TargetProfile, TriggerCondition,
    TriggerRule,
};

pub const FALLBACK_PROFILE: &str = "balanced";

fn profile(label: &str, summary: &str, revenue_factor: f64, share_delta: f64) -> TargetProfile {
    TargetProfile {
        label: label.to_string(),
        summary: summary.to_string(),
        revenue_factor,
        share_delta,
    }
}

pub fn builtin_target_profiles() -> BTreeMap<String, TargetProfile> {
    BTreeMap::from([
        (
            "conservative".to_string(),
            profile("Conservative", "Scale up later and scale down sooner.", 1.08, 2.0),
        ),
        (
            "balanced".to_string(),
            profile("Balanced", "Historical defaults calibrated from store trends.", 1.0, 0.0),
        ),
        (
            "growth".to_string(),
            profile("Growth", "Scale up earlier and hold higher capacity longer.", 0.92, -2.0),
        ),
        (
            "custom".to_string(),
            profile("Custom", "Manual threshold edits are active.", 1.0, 0.0),
        ),
    ])
}

/// Revenue thresholds scale by `revenue_factor`; every other metric shifts
/// by `share_delta` points.
pub fn profile_threshold_from_default(default: &TriggerCondition, profile: &TargetProfile) -> f64 {
    let base = crate::parse::finite_or_zero(default.threshold);
    if default.metric.is_revenue() {
        base * crate::parse::finite_or(profile.revenue_factor, 1.0)
    } else {
        base + crate::parse::finite_or_zero(profile.share_delta)
    }
}

/// Applies the named profile to each location's default rules. Unknown
/// profile keys use the balanced profile; locations without defaults are
/// skipped.
pub fn build_trigger_rules_for_profile(
    profile_key: &str,
    defaults: &BTreeMap<String, LocationTriggerRules>,
    profiles: &BTreeMap<String, TargetProfile>,
    locations: &[String],
) -> BTreeMap<String, LocationTriggerRules> {
    let chosen = profiles.get(profile_key).or_else(|| {
        debug!("unknown target profile {profile_key:?}; using {FALLBACK_PROFILE}");
        profiles.get(FALLBACK_PROFILE)
    });
    let Some(chosen) = chosen else {
        return defaults.clone();
    };

    locations
        .iter()
        .filter_map(|loc| {
            let rules = defaults.get(loc)?;
            let adjusted = rules.map_rules(|rule| TriggerRule {
                label: rule.label.clone(),
                detail: rule.detail.clone(),
                conditions: rule
                    .conditions
                    .iter()
                    .map(|cond| TriggerCondition {
                        metric: cond.metric.clone(),
                        operator: cond.operator,
                        threshold: profile_threshold_from_default(cond, chosen),
                    })
                    .collect(),
            });
            Some((loc.clone(), adjusted))
        })
        .collect()
}

fn rule(label: &str, detail: &str, conditions: &[(PlaybookMetric, ComparisonOperator, f64)]) -> TriggerRule {
    TriggerRule {
        label: label.to_string(),
        detail: detail.to_string(),
        conditions: conditions
            .iter()
            .map(|(metric, operator, threshold)| TriggerCondition {
                metric: metric.clone(),
                operator: *operator,
                threshold: *threshold,
            })
            .collect(),
    }
}

fn location_rules(spring: (f64, f64), summer: (f64, f64), fall: f64, winter: f64) -> LocationTriggerRules {
    use ComparisonOperator::{Ge, Le};
    use PlaybookMetric::{AvgDailyRevenue, PeakShare, WeekendShare};

    LocationTriggerRules {
        up_spring: rule(
            "Winter -> Spring",
            "Scale Up 1",
            &[(AvgDailyRevenue, Ge, spring.0), (WeekendShare, Ge, spring.1)],
        ),
        up_summer: rule(
            "Spring -> Summer",
            "Scale Up 2",
            &[(AvgDailyRevenue, Ge, summer.0), (PeakShare, Ge, summer.1)],
        ),
        down_fall: rule("Summer -> Fall", "Scale Down 1", &[(AvgDailyRevenue, Le, fall)]),
        down_winter: rule("Fall -> Winter", "Scale Down 2", &[(AvgDailyRevenue, Le, winter)]),
    }
}

/// Historical default rules for the two reference stores.
pub fn default_trigger_rules() -> BTreeMap<String, LocationTriggerRules> {
    BTreeMap::from([
        (
            "EP".to_string(),
            location_rules((3450.0, 68.0), (5000.0, 62.0), 4350.0, 2800.0),
        ),
        (
            "NL".to_string(),
            location_rules((1950.0, 68.0), (3200.0, 65.0), 2900.0, 1650.0),
        ),
    ])
}

/// Built-in rules for one location under the named profile.
pub fn rules_for_location(profile_key: &str, location: &str) -> Option<LocationTriggerRules> {
    let location = location.trim().to_string();
    build_trigger_rules_for_profile(
        profile_key,
        &default_trigger_rules(),
        &builtin_target_profiles(),
        std::slice::from_ref(&location),
    )
    .remove(&location)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locations() -> Vec<String> {
        vec!["EP".to_string(), "NL".to_string(), "ZZ".to_string()]
    }

    #[test]
    fn revenue_scales_and_shares_shift() {
        let profiles = builtin_target_profiles();
        let conservative = &profiles["conservative"];
        let revenue = TriggerCondition {
            metric: PlaybookMetric::AvgDailyRevenue,
            operator: ComparisonOperator::Ge,
            threshold: 1000.0,
        };
        let share = TriggerCondition {
            metric: PlaybookMetric::WeekendShare,
            ..revenue.clone()
        };
        assert!((profile_threshold_from_default(&revenue, conservative) - 1080.0).abs() < 1e-9);
        assert_eq!(profile_threshold_from_default(&share, conservative), 1002.0);
    }

    #[test]
    fn growth_profile_lowers_thresholds() {
        let rules = build_trigger_rules_for_profile(
            "growth",
            &default_trigger_rules(),
            &builtin_target_profiles(),
            &locations(),
        );
        assert_eq!(rules.len(), 2);
        let ep = &rules["EP"];
        assert!((ep.up_spring.conditions[0].threshold - 3450.0 * 0.92).abs() < 1e-9);
        assert_eq!(ep.up_spring.conditions[1].threshold, 66.0);
        assert_eq!(ep.up_spring.label, "Winter -> Spring");
    }

    #[test]
    fn rules_for_single_location() {
        let ep = rules_for_location("conservative", " EP ").expect("EP has defaults");
        assert!((ep.down_winter.conditions[0].threshold - 2800.0 * 1.08).abs() < 1e-9);
        assert!(rules_for_location("balanced", "ZZ").is_none());
    }

    #[test]
    fn unknown_profile_falls_back_to_balanced() {
        let defaults = default_trigger_rules();
        let rules = build_trigger_rules_for_profile(
            "aggressive",
            &defaults,
            &builtin_target_profiles(),
            &locations(),
        );
        assert_eq!(rules["NL"], defaults["NL"]);
    }
}
