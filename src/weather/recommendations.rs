use crate::schedule::slots::{is_adjustable_role, is_evening_slot, make_slot};
use crate::schedule::{ScheduleDay, MAX_SLOT_HEADCOUNT};
use crate::settings::WorkflowSettings;
use crate::weather::impact::staffing_weather_action;
use crate::weather::{
    RecommendationAction, SignalWindow, StaffingRecommendation, WeatherImpact, WeatherSignal,
};

fn role_matches_any(role: &str, needles: &[&str]) -> bool {
    let role = role.to_lowercase();
    needles.iter().any(|needle| role.contains(needle))
}

pub fn day_recommendation(signal: &WeatherSignal, day: &ScheduleDay) -> StaffingRecommendation {
    day_recommendation_with(signal, day, &WorkflowSettings::default())
}

/// Recommendation for one day. The message quotes the coverage floor from
/// `workflow`.
pub fn day_recommendation_with(
    signal: &WeatherSignal,
    day: &ScheduleDay,
    workflow: &WorkflowSettings,
) -> StaffingRecommendation {
    let message = staffing_weather_action(signal, workflow.min_openers, workflow.min_closers);
    let action = match signal.impact {
        WeatherImpact::Up => RecommendationAction::IncreaseSupport,
        WeatherImpact::Down => RecommendationAction::DecreaseSupport,
        WeatherImpact::Neutral => {
            return StaffingRecommendation {
                action: None,
                signal: signal.clone(),
                message,
                can_apply: false,
                button_label: String::new(),
                key: String::new(),
                already_applied: false,
            };
        }
    };

    let key = format!("{}:{action}", day.date_iso());
    let already_applied = day.last_accepted_recommendation_key.as_deref() == Some(key.as_str());
    let applicable = match action {
        RecommendationAction::IncreaseSupport => true,
        RecommendationAction::DecreaseSupport => {
            day.slots.iter().any(|slot| is_adjustable_role(&slot.role))
        }
    };
    let button_label = if already_applied {
        "Recommendation Applied"
    } else if action == RecommendationAction::IncreaseSupport {
        "Accept Recommendation (+1 Support)"
    } else {
        "Accept Recommendation (-1 Support)"
    };

    StaffingRecommendation {
        action: Some(action),
        signal: signal.clone(),
        message,
        can_apply: applicable && !already_applied,
        button_label: button_label.to_string(),
        key,
        already_applied,
    }
}

/// Returns a new day with the recommendation applied. The input is never
/// touched, and a copy is returned even when nothing changes.
pub fn apply_recommendation_to_day(
    day: &ScheduleDay,
    rec: &StaffingRecommendation,
) -> ScheduleDay {
    let mut next = day.clone();
    match rec.action {
        Some(RecommendationAction::IncreaseSupport) => {
            let target = next
                .slots
                .iter()
                .position(|slot| role_matches_any(&slot.role, &["peak"]))
                .or_else(|| next.slots.iter().position(|slot| is_adjustable_role(&slot.role)));
            match target {
                Some(idx) => {
                    let slot = &mut next.slots[idx];
                    let bumped = slot.effective_headcount().saturating_add(1).min(MAX_SLOT_HEADCOUNT);
                    slot.set_headcount(bumped);
                }
                None => next
                    .slots
                    .push(make_slot("17:00", "22:00", "Weather Support", 1)),
            }
            next.last_accepted_recommendation_key = Some(rec.key.clone());
        }
        Some(RecommendationAction::DecreaseSupport) => {
            let adjustable: Vec<usize> = next
                .slots
                .iter()
                .enumerate()
                .filter(|(_, slot)| is_adjustable_role(&slot.role))
                .map(|(idx, _)| idx)
                .collect();
            if adjustable.is_empty() {
                return next;
            }

            let evening: Vec<usize> = if rec.signal.window == Some(SignalWindow::Evening) {
                adjustable
                    .iter()
                    .copied()
                    .filter(|idx| is_evening_slot(&next.slots[*idx]))
                    .collect()
            } else {
                adjustable.clone()
            };
            let pool = if evening.is_empty() { &adjustable } else { &evening };
            let Some(target) = pool
                .iter()
                .copied()
                .find(|idx| role_matches_any(&next.slots[*idx].role, &["peak", "support"]))
                .or_else(|| pool.last().copied())
            else {
                return next;
            };

            let headcount = next.slots[target].effective_headcount();
            if headcount > 1 {
                next.slots[target].set_headcount(headcount - 1);
            } else {
                next.slots.remove(target);
            }
            next.last_accepted_recommendation_key = Some(rec.key.clone());
        }
        None => {}
    }
    next
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::schedule::{Slot, MAX_INPUT_HEADCOUNT};

    fn day_with(slots: Vec<Slot>) -> ScheduleDay {
        let date = NaiveDate::from_ymd_opt(2026, 3, 15).expect("valid date");
        ScheduleDay::new(date, slots)
    }

    fn standard_day() -> ScheduleDay {
        day_with(vec![
            make_slot("11:00", "19:00", "Opener Lead", 1),
            make_slot("15:00", "23:00", "Closer Lead", 1),
            make_slot("16:00", "23:00", "Peak Scooper", 2),
        ])
    }

    fn signal(impact: WeatherImpact, delta: Option<f64>) -> WeatherSignal {
        WeatherSignal {
            impact,
            delta,
            ..WeatherSignal::neutral("Test", "Test signal.")
        }
    }

    fn evening_rain() -> WeatherSignal {
        WeatherSignal {
            impact: WeatherImpact::Down,
            window: Some(SignalWindow::Evening),
            event_hour: Some(20),
            ..WeatherSignal::neutral("Evening Rain Risk", "Heavy precipitation likely after 8pm.")
        }
    }

    #[test]
    fn neutral_signal_has_no_action() {
        let rec = day_recommendation(&signal(WeatherImpact::Neutral, Some(3.0)), &standard_day());
        assert!(rec.action.is_none());
        assert!(!rec.can_apply);
        assert!(rec.key.is_empty());
        assert!(rec.button_label.is_empty());
    }

    #[test]
    fn up_and_down_keys() {
        let up = day_recommendation(&signal(WeatherImpact::Up, Some(12.0)), &standard_day());
        assert_eq!(up.action, Some(RecommendationAction::IncreaseSupport));
        assert_eq!(up.key, "2026-03-15:increase_support");
        assert!(up.can_apply);
        assert_eq!(up.button_label, "Accept Recommendation (+1 Support)");

        let down = day_recommendation(&signal(WeatherImpact::Down, Some(-14.0)), &standard_day());
        assert_eq!(down.action, Some(RecommendationAction::DecreaseSupport));
        assert!(down.can_apply);
    }

    #[test]
    fn decrease_needs_adjustable_slot() {
        let day = day_with(vec![
            make_slot("11:00", "19:00", "Opener Lead", 1),
            make_slot("15:00", "23:00", "Closer Lead", 2),
        ]);
        let rec = day_recommendation(&signal(WeatherImpact::Down, Some(-14.0)), &day);
        assert!(!rec.can_apply);

        let applied = apply_recommendation_to_day(&day, &rec);
        assert_eq!(applied.slots, day.slots);
        assert!(applied.last_accepted_recommendation_key.is_none());
    }

    #[test]
    fn already_applied_is_idempotent() {
        let mut day = standard_day();
        day.last_accepted_recommendation_key = Some("2026-03-15:increase_support".to_string());
        let rec = day_recommendation(&signal(WeatherImpact::Up, Some(12.0)), &day);
        assert!(rec.already_applied);
        assert!(!rec.can_apply);
        assert_eq!(rec.button_label, "Recommendation Applied");
    }

    #[test]
    fn apply_never_mutates_input() {
        let day = standard_day();
        let snapshot = day.clone();
        let rec = day_recommendation(&signal(WeatherImpact::Up, Some(12.0)), &day);
        let next = apply_recommendation_to_day(&day, &rec);

        assert_eq!(day, snapshot);
        assert_eq!(next.last_accepted_recommendation_key.as_deref(), Some(rec.key.as_str()));
        assert_eq!(next.slots[2].headcount, 3);
        assert_eq!(next.slots[2].assignments.len(), 3);
    }

    #[test]
    fn increase_adds_weather_support_when_nothing_adjustable() {
        let day = day_with(vec![
            make_slot("11:00", "19:00", "Opener Lead", 1),
            make_slot("15:00", "23:00", "Closer Lead", 1),
        ]);
        let rec = day_recommendation(&signal(WeatherImpact::Up, Some(12.0)), &day);
        let next = apply_recommendation_to_day(&day, &rec);
        assert_eq!(next.slots.len(), 3);
        assert_eq!(next.slots[2].role, "Weather Support");
        assert_eq!(next.slots[2].headcount, 1);
    }

    #[test]
    fn increase_is_capped() {
        let mut day = standard_day();
        day.slots[2].set_headcount(MAX_SLOT_HEADCOUNT);
        let rec = day_recommendation(&signal(WeatherImpact::Up, Some(12.0)), &day);
        let next = apply_recommendation_to_day(&day, &rec);
        assert_eq!(next.slots[2].headcount, MAX_SLOT_HEADCOUNT);
        assert_eq!(next.slots[2].assignments.len(), MAX_SLOT_HEADCOUNT as usize);
    }

    #[test]
    fn oversized_slot_stays_within_bounds() {
        let mut day = standard_day();
        day.slots[2].headcount = u32::MAX;

        let up = day_recommendation(&signal(WeatherImpact::Up, Some(12.0)), &day);
        let raised = apply_recommendation_to_day(&day, &up);
        assert_eq!(raised.slots[2].headcount, MAX_SLOT_HEADCOUNT);

        let down = day_recommendation(&signal(WeatherImpact::Down, Some(-14.0)), &day);
        let lowered = apply_recommendation_to_day(&day, &down);
        assert_eq!(lowered.slots[2].headcount, MAX_INPUT_HEADCOUNT - 1);
        assert_eq!(lowered.slots[2].assignments.len(), (MAX_INPUT_HEADCOUNT - 1) as usize);
    }

    #[test]
    fn decrease_trims_then_removes() {
        let day = standard_day();
        let rec = day_recommendation(&signal(WeatherImpact::Down, Some(-14.0)), &day);
        let once = apply_recommendation_to_day(&day, &rec);
        assert_eq!(once.slots[2].headcount, 1);
        assert_eq!(once.slots[2].assignments.len(), 1);

        let twice = apply_recommendation_to_day(&once, &rec);
        assert_eq!(twice.slots.len(), 2);
    }

    #[test]
    fn evening_window_prefers_evening_slots() {
        let day = day_with(vec![
            make_slot("11:00", "19:00", "Opener Lead", 1),
            make_slot("12:00", "16:00", "Support Scooper", 2),
            make_slot("17:00", "22:00", "Scooper", 2),
            make_slot("15:00", "23:00", "Closer Lead", 2),
        ]);
        let rec = day_recommendation(&evening_rain(), &day);
        let next = apply_recommendation_to_day(&day, &rec);
        assert_eq!(next.slots[1].headcount, 2);
        assert_eq!(next.slots[2].headcount, 1);
        assert_eq!(next.slots[3].headcount, 2);
    }
}
