use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::parse;
use crate::schedule::slots::{make_slot, parse_time_to_hours};
use crate::schedule::{Slot, Weekday, MAX_SLOT_HEADCOUNT};

pub const DEFAULT_TEMPLATE_ROLE: &str = "Support Scooper";

static TIME_OF_DAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$").expect("time-of-day pattern is valid"));

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TemplateSlotDef {
    pub start: String,
    pub end: String,
    pub role: String,
    pub headcount: u32,
}

/// Default slots per weekday. Always carries all seven weekdays.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct WeeklyTemplateProfile {
    days: BTreeMap<Weekday, Vec<TemplateSlotDef>>,
}

impl WeeklyTemplateProfile {
    pub fn empty() -> Self {
        Self {
            days: Weekday::ALL.iter().map(|day| (*day, Vec::new())).collect(),
        }
    }

    pub fn day(&self, weekday: Weekday) -> &[TemplateSlotDef] {
        self.days.get(&weekday).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn set_day(&mut self, weekday: Weekday, slots: Vec<TemplateSlotDef>) {
        self.days.insert(weekday, slots);
    }

    pub fn is_empty(&self) -> bool {
        self.days.values().all(Vec::is_empty)
    }
}

impl Default for WeeklyTemplateProfile {
    fn default() -> Self {
        Self::empty()
    }
}

/// Validates one raw template slot. `None` means the slot is rejected and
/// should be dropped by the caller.
pub fn normalize_template_slot(raw: &Value) -> Option<TemplateSlotDef> {
    let object = raw.as_object()?;
    let start = parse::json_text(object.get("start"));
    let end = parse::json_text(object.get("end"));
    if !TIME_OF_DAY.is_match(&start) || !TIME_OF_DAY.is_match(&end) {
        debug!("rejecting template slot with malformed times: {start:?}-{end:?}");
        return None;
    }
    if parse_time_to_hours(&end) <= parse_time_to_hours(&start) {
        debug!("rejecting template slot ending before it starts: {start}-{end}");
        return None;
    }
    let role = parse::json_text(object.get("role"));
    Some(TemplateSlotDef {
        start,
        end,
        role: if role.is_empty() {
            DEFAULT_TEMPLATE_ROLE.to_string()
        } else {
            role
        },
        headcount: parse::headcount_from_json(object.get("headcount"), 1, MAX_SLOT_HEADCOUNT),
    })
}

/// Maps arbitrary weekday-keyed input onto a full seven-day profile.
/// Unknown keys and non-array values are ignored.
pub fn normalize_template_profile(raw: &Value) -> WeeklyTemplateProfile {
    let mut normalized = WeeklyTemplateProfile::empty();
    let Some(object) = raw.as_object() else {
        return normalized;
    };
    for (raw_day, raw_slots) in object {
        let Ok(day) = raw_day.parse::<Weekday>() else {
            continue;
        };
        let Some(entries) = raw_slots.as_array() else {
            continue;
        };
        normalized.set_day(
            day,
            entries.iter().filter_map(normalize_template_slot).collect(),
        );
    }
    normalized
}

/// Later profiles win per weekday when non-empty. Monday then mirrors
/// Tuesday, and any weekday still empty inherits Tuesday.
pub fn merge_template_profiles<'a, I>(profiles: I) -> WeeklyTemplateProfile
where
    I: IntoIterator<Item = &'a WeeklyTemplateProfile>,
{
    let mut merged = WeeklyTemplateProfile::empty();
    for profile in profiles {
        for day in Weekday::ALL {
            let slots = profile.day(day);
            if !slots.is_empty() {
                merged.set_day(day, clone_template_day(slots));
            }
        }
    }

    let tuesday = clone_template_day(merged.day(Weekday::Tue));
    if !tuesday.is_empty() {
        merged.set_day(Weekday::Mon, tuesday.clone());
        for day in Weekday::ALL {
            if merged.day(day).is_empty() {
                merged.set_day(day, tuesday.clone());
            }
        }
    }
    merged
}

pub fn build_template_slots(weekday: Weekday, profile: &WeeklyTemplateProfile) -> Vec<Slot> {
    let defs = profile.day(weekday);
    if !defs.is_empty() {
        return defs
            .iter()
            .map(|def| make_slot(&def.start, &def.end, &def.role, def.headcount))
            .collect();
    }

    debug!("no template for {weekday}; using minimal coverage pattern");
    vec![
        make_slot("11:00", "19:00", "Opener Lead", 1),
        make_slot("15:00", "23:00", "Closer Lead", 1),
        make_slot("16:00", "23:00", "Closer Scooper", 1),
    ]
}

fn clone_template_day(slots: &[TemplateSlotDef]) -> Vec<TemplateSlotDef> {
    slots
        .iter()
        .map(|slot| TemplateSlotDef {
            headcount: slot.headcount.max(1),
            ..slot.clone()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn def(start: &str, end: &str, role: &str, headcount: u32) -> TemplateSlotDef {
        TemplateSlotDef {
            start: start.to_string(),
            end: end.to_string(),
            role: role.to_string(),
            headcount,
        }
    }

    fn full_profile() -> WeeklyTemplateProfile {
        let mut profile = WeeklyTemplateProfile::empty();
        for (idx, day) in Weekday::ALL.iter().enumerate() {
            profile.set_day(
                *day,
                vec![def("12:00", "18:00", &format!("Role {idx}"), 1)],
            );
        }
        profile
    }

    #[test]
    fn rejects_malformed_template_slots() {
        assert!(normalize_template_slot(&json!({"start": "9:00", "end": "17:00"})).is_none());
        assert!(normalize_template_slot(&json!({"start": "18:00", "end": "12:00"})).is_none());
        assert!(normalize_template_slot(&json!({"start": "12:00", "end": "24:00"})).is_none());
        assert!(normalize_template_slot(&json!("12:00-18:00")).is_none());
    }

    #[test]
    fn normalizes_role_and_headcount() {
        let slot = normalize_template_slot(&json!({
            "start": "12:00",
            "end": "18:00",
            "role": "  ",
            "headcount": 11
        }))
        .expect("slot should be accepted");
        assert_eq!(slot.role, DEFAULT_TEMPLATE_ROLE);
        assert_eq!(slot.headcount, 6);
    }

    #[test]
    fn normalizes_profile_keys() {
        let profile = normalize_template_profile(&json!({
            "tuesday": [{"start": "12:00", "end": "18:00", "role": "Opener"}, {"start": "bad"}],
            "FRI": [{"start": "16:00", "end": "22:00", "role": "Peak", "headcount": 2}],
            "holiday": [{"start": "12:00", "end": "18:00"}],
            "Sat": "not a list"
        }));
        assert_eq!(profile.day(Weekday::Tue).len(), 1);
        assert_eq!(profile.day(Weekday::Fri)[0].headcount, 2);
        assert!(profile.day(Weekday::Sat).is_empty());
        assert!(profile.day(Weekday::Mon).is_empty());
    }

    #[test]
    fn merge_with_empty_profile_only_changes_monday() {
        let full = full_profile();
        let merged = merge_template_profiles([&WeeklyTemplateProfile::empty(), &full]);
        assert_eq!(merged.day(Weekday::Mon), full.day(Weekday::Tue));
        for day in &Weekday::ALL[1..] {
            assert_eq!(merged.day(*day), full.day(*day));
        }
    }

    #[test]
    fn later_profiles_win_and_tuesday_backfills() {
        let mut base = WeeklyTemplateProfile::empty();
        base.set_day(Weekday::Tue, vec![def("12:00", "20:00", "Base Tue", 1)]);
        base.set_day(Weekday::Sat, vec![def("12:00", "23:00", "Base Sat", 2)]);
        let mut overlay = WeeklyTemplateProfile::empty();
        overlay.set_day(Weekday::Tue, vec![def("13:00", "21:00", "Overlay Tue", 1)]);

        let merged = merge_template_profiles([&base, &overlay]);
        assert_eq!(merged.day(Weekday::Tue)[0].role, "Overlay Tue");
        assert_eq!(merged.day(Weekday::Sat)[0].role, "Base Sat");
        assert_eq!(merged.day(Weekday::Mon)[0].role, "Overlay Tue");
        assert_eq!(merged.day(Weekday::Wed)[0].role, "Overlay Tue");
    }

    #[test]
    fn empty_day_falls_back_to_minimal_pattern() {
        let slots = build_template_slots(Weekday::Wed, &WeeklyTemplateProfile::empty());
        assert_eq!(slots.len(), 3);
        assert_eq!(slots[0].role, "Opener Lead");
        assert!(slots.iter().all(|s| s.assignments.len() == s.headcount as usize));
    }

    #[test]
    fn builds_slots_from_template() {
        let mut profile = WeeklyTemplateProfile::empty();
        profile.set_day(Weekday::Fri, vec![def("16:00", "22:00", "Peak Scooper", 3)]);
        let slots = build_template_slots(Weekday::Fri, &profile);
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].assignments.len(), 3);
    }
}
