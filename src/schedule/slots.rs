use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schedule::{Season, Slot, MAX_INPUT_HEADCOUNT};
use crate::settings::{PayRates, SeasonHours};

/// How a role participates in coverage rules and weather adjustments.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RoleClass {
    Opener,
    Closer,
    Adjustable,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OpeningHours {
    pub open_hour: u32,
    pub close_hour: u32,
}

pub fn new_slot_id() -> String {
    let raw = Uuid::new_v4().simple().to_string();
    format!("slot_{}", &raw[..8])
}

pub fn make_slot(start: &str, end: &str, role: &str, headcount: u32) -> Slot {
    let count = headcount.clamp(1, MAX_INPUT_HEADCOUNT);
    Slot {
        id: new_slot_id(),
        start: start.to_string(),
        end: end.to_string(),
        role: role.to_string(),
        headcount: count,
        assignments: vec![String::new(); count as usize],
    }
}

/// "HH:MM" to decimal hours. Anything unparseable reads as 0.
pub fn parse_time_to_hours(raw: &str) -> f64 {
    let mut parts = raw.split(':');
    let (Some(h), Some(m)) = (parts.next(), parts.next()) else {
        return 0.0;
    };
    match (h.trim().parse::<f64>(), m.trim().parse::<f64>()) {
        (Ok(h), Ok(m)) if h.is_finite() && m.is_finite() => h + m / 60.0,
        _ => 0.0,
    }
}

pub fn slot_hours(slot: &Slot) -> f64 {
    span_hours(&slot.start, &slot.end)
}

pub fn span_hours(start: &str, end: &str) -> f64 {
    (parse_time_to_hours(end) - parse_time_to_hours(start)).max(0.0)
}

pub fn hour_to_time(hour: i64) -> String {
    format!("{:02}:00", hour.clamp(0, 23))
}

pub fn is_opener_role(role: &str) -> bool {
    role.to_lowercase().contains("open")
}

pub fn is_closer_role(role: &str) -> bool {
    role.to_lowercase().contains("clos")
}

/// Not an opener and not a closer. "Open-Close Lead" is therefore never adjustable.
pub fn is_adjustable_role(role: &str) -> bool {
    !is_opener_role(role) && !is_closer_role(role)
}

/// Opener is checked first, so a role matching both patterns is an opener.
pub fn classify_role(role: &str) -> RoleClass {
    if is_opener_role(role) {
        RoleClass::Opener
    } else if is_closer_role(role) {
        RoleClass::Closer
    } else {
        RoleClass::Adjustable
    }
}

pub fn is_evening_slot(slot: &Slot) -> bool {
    let start = parse_time_to_hours(&slot.start);
    let end = parse_time_to_hours(&slot.end);
    end >= 20.0 || start >= 17.0
}

pub fn role_rate_for_slot(role: &str, pay_rates: &PayRates) -> f64 {
    let name = role.to_lowercase();
    if name.contains("manager") {
        pay_rates.manager
    } else if name.contains("lead") {
        pay_rates.key_lead
    } else {
        pay_rates.scooper
    }
}

pub fn estimated_labor_for_day(slots: &[Slot], pay_rates: &PayRates) -> f64 {
    slots
        .iter()
        .map(|slot| {
            slot_hours(slot)
                * f64::from(slot.effective_headcount())
                * role_rate_for_slot(&slot.role, pay_rates)
        })
        .sum()
}

pub fn season_hours_for(season: Season, hours: &SeasonHours) -> OpeningHours {
    let (open, close, close_fallback) = match season {
        Season::Winter => (&hours.winter_open, &hours.winter_close, 22),
        Season::Spring => (&hours.spring_open, &hours.spring_close, 22),
        Season::Summer => (&hours.summer_open, &hours.summer_close, 23),
        Season::Fall => (&hours.fall_open, &hours.fall_close, 22),
    };
    OpeningHours {
        open_hour: time_to_hour(open, 12),
        close_hour: time_to_hour(close, close_fallback),
    }
}

fn time_to_hour(raw: &str, fallback: u32) -> u32 {
    raw.split(':')
        .next()
        .and_then(|h| h.trim().parse::<i64>().ok())
        .map(|h| h.clamp(0, 23) as u32)
        .unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn make_slot_sizes_assignments_to_headcount() {
        let slot = make_slot("12:00", "18:00", "Scooper", 3);
        assert_eq!(slot.headcount, 3);
        assert_eq!(slot.assignments, vec![String::new(); 3]);
        assert!(slot.id.starts_with("slot_"));

        let clamped = make_slot("12:00", "18:00", "Scooper", 0);
        assert_eq!(clamped.headcount, 1);
        assert_eq!(clamped.assignments.len(), 1);

        let capped = make_slot("12:00", "18:00", "Scooper", u32::MAX);
        assert_eq!(capped.headcount, MAX_INPUT_HEADCOUNT);
        assert_eq!(capped.assignments.len(), MAX_INPUT_HEADCOUNT as usize);
    }

    #[test]
    fn make_slot_ids_are_unique() {
        let a = make_slot("12:00", "18:00", "Scooper", 1);
        let b = make_slot("12:00", "18:00", "Scooper", 1);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn parses_time_strings() {
        assert_eq!(parse_time_to_hours("17:30"), 17.5);
        assert_eq!(parse_time_to_hours("09:00"), 9.0);
        assert_eq!(parse_time_to_hours("17"), 0.0);
        assert_eq!(parse_time_to_hours("ab:cd"), 0.0);
        assert_eq!(parse_time_to_hours(""), 0.0);
    }

    #[test]
    fn slot_hours_never_negative() {
        let backwards = make_slot("22:00", "12:00", "Scooper", 1);
        assert_eq!(slot_hours(&backwards), 0.0);
        let same = make_slot("12:00", "12:00", "Scooper", 1);
        assert_eq!(slot_hours(&same), 0.0);
        let normal = make_slot("12:00", "20:30", "Scooper", 1);
        assert_eq!(slot_hours(&normal), 8.5);
    }

    #[test]
    fn hour_to_time_clamps_and_pads() {
        assert_eq!(hour_to_time(7), "07:00");
        assert_eq!(hour_to_time(-3), "00:00");
        assert_eq!(hour_to_time(30), "23:00");
    }

    #[test]
    fn role_classification_prefers_opener() {
        assert_eq!(classify_role("Opener Lead"), RoleClass::Opener);
        assert_eq!(classify_role("Closer Scooper"), RoleClass::Closer);
        assert_eq!(classify_role("Closing Lead"), RoleClass::Closer);
        assert_eq!(classify_role("Peak Scooper"), RoleClass::Adjustable);
        // Matches both patterns: opener wins and the role is not adjustable.
        assert_eq!(classify_role("Open-Close Lead"), RoleClass::Opener);
        assert!(is_closer_role("Open-Close Lead"));
        assert!(!is_adjustable_role("Open-Close Lead"));
    }

    #[test]
    fn evening_slots() {
        assert!(is_evening_slot(&make_slot("17:00", "19:00", "Support", 1)));
        assert!(is_evening_slot(&make_slot("12:00", "20:00", "Support", 1)));
        assert!(!is_evening_slot(&make_slot("12:00", "17:00", "Support", 1)));
    }

    #[test]
    fn labor_uses_role_rates() {
        let rates = PayRates::default();
        assert_eq!(role_rate_for_slot("Store Manager", &rates), 28.0);
        assert_eq!(role_rate_for_slot("Closer Lead", &rates), 17.0);
        assert_eq!(role_rate_for_slot("Scooper", &rates), 15.0);

        let slots = vec![
            make_slot("11:00", "19:00", "Opener Lead", 1),
            make_slot("16:00", "22:00", "Peak Scooper", 2),
        ];
        // 8h * 1 * 17 + 6h * 2 * 15
        assert_eq!(estimated_labor_for_day(&slots, &rates), 136.0 + 180.0);
    }

    #[test]
    fn set_headcount_resizes_assignments() {
        let mut slot = make_slot("12:00", "18:00", "Scooper", 2);
        slot.assignments[0] = "Ana".to_string();
        slot.set_headcount(3);
        assert_eq!(slot.assignments, vec!["Ana", "", ""]);
        slot.set_headcount(1);
        assert_eq!(slot.assignments, vec!["Ana"]);
        assert_eq!(slot.headcount, 1);
    }

    #[test]
    fn season_hours_read_settings() {
        let hours = SeasonHours::default();
        let summer = season_hours_for(Season::Summer, &hours);
        assert_eq!((summer.open_hour, summer.close_hour), (12, 23));

        let broken = SeasonHours {
            winter_open: "noon".to_string(),
            ..SeasonHours::default()
        };
        assert_eq!(season_hours_for(Season::Winter, &broken).open_hour, 12);
    }
}
