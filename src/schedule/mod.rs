pub mod calendar;
pub mod slots;
pub mod templates;
pub mod validation;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub use calendar::{Season, SeasonParseError, Weekday, WeekdayParseError};

/// Upper bound on a single slot's headcount for templates and weather adjustments.
pub const MAX_SLOT_HEADCOUNT: u32 = 6;

/// Largest headcount any slot may carry. Larger inputs are clamped.
pub const MAX_INPUT_HEADCOUNT: u32 = 99;

/// One staffing need. `assignments` holds one name per position; an empty
/// string is an unfilled position.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(from = "RawSlot")]
pub struct Slot {
    pub id: String,
    pub start: String,
    pub end: String,
    pub role: String,
    pub headcount: u32,
    pub assignments: Vec<String>,
}

/// Wire shape of a slot before the headcount and position list are
/// reconciled.
#[derive(Debug, Deserialize)]
struct RawSlot {
    #[serde(default = "slots::new_slot_id")]
    id: String,
    start: String,
    end: String,
    #[serde(default)]
    role: String,
    #[serde(default)]
    headcount: Option<serde_json::Value>,
    #[serde(default)]
    assignments: Vec<String>,
}

impl From<RawSlot> for Slot {
    fn from(raw: RawSlot) -> Self {
        let headcount =
            crate::parse::headcount_from_json(raw.headcount.as_ref(), 1, MAX_INPUT_HEADCOUNT);
        let mut slot = Slot {
            id: raw.id,
            start: raw.start,
            end: raw.end,
            role: raw.role,
            headcount,
            assignments: raw.assignments,
        };
        slot.set_headcount(headcount);
        slot
    }
}

impl Slot {
    /// Resizes the position list to `headcount`, keeping existing names by
    /// index and padding new positions as unfilled.
    pub fn set_headcount(&mut self, headcount: u32) {
        let headcount = headcount.clamp(1, MAX_INPUT_HEADCOUNT);
        self.headcount = headcount;
        self.assignments.resize(headcount as usize, String::new());
    }

    pub fn effective_headcount(&self) -> u32 {
        self.headcount.clamp(1, MAX_INPUT_HEADCOUNT)
    }

    pub fn unfilled_positions(&self) -> usize {
        (0..self.effective_headcount() as usize)
            .filter(|idx| {
                self.assignments
                    .get(*idx)
                    .map(|name| name.trim().is_empty())
                    .unwrap_or(true)
            })
            .count()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleDay {
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub season: Season,
    #[serde(default)]
    pub slots: Vec<Slot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default)]
    pub has_exception: bool,
    #[serde(default)]
    pub pending_request_id: Option<String>,
    #[serde(default)]
    pub last_decision: Option<String>,
    #[serde(default)]
    pub last_accepted_recommendation_key: Option<String>,
}

impl ScheduleDay {
    /// Builds a day with weekday and season derived from the date.
    pub fn new(date: NaiveDate, slots: Vec<Slot>) -> Self {
        Self {
            date,
            weekday: Weekday::for_date(date),
            season: crate::seasonal::triggers::season_for_date(date),
            slots,
            note: None,
            has_exception: false,
            pending_request_id: None,
            last_decision: None,
            last_accepted_recommendation_key: None,
        }
    }

    pub fn date_iso(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleWeek {
    pub week_start: NaiveDate,
    #[serde(default)]
    pub days: Vec<ScheduleDay>,
}
