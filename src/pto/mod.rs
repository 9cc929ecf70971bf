pub mod conflicts;

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

pub use conflicts::{
    assigned_people_for_day, pto_date_overlap, pto_location_matches, pto_rows_for_day,
    pto_rows_for_range, pto_summary_for_day,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PtoRequest {
    #[serde(default)]
    pub id: String,
    pub employee: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub location: String,
    pub status: PtoStatus,
}

/// Request lifecycle state. Unrecognized values are kept verbatim and are
/// never actionable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum PtoStatus {
    Approved,
    Pending,
    Denied,
    Cancelled,
    Other(String),
}

impl PtoStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Approved => "approved",
            Self::Pending => "pending",
            Self::Denied => "denied",
            Self::Cancelled => "cancelled",
            Self::Other(raw) => raw,
        }
    }

    /// Approved and pending requests still affect staffing.
    pub fn is_actionable(&self) -> bool {
        matches!(self, Self::Approved | Self::Pending)
    }
}

impl From<String> for PtoStatus {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "approved" => Self::Approved,
            "pending" => Self::Pending,
            "denied" => Self::Denied,
            "cancelled" | "canceled" => Self::Cancelled,
            _ => Self::Other(value),
        }
    }
}

impl From<PtoStatus> for String {
    fn from(value: PtoStatus) -> Self {
        value.as_str().to_string()
    }
}

impl Display for PtoStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PtoSummary {
    pub total: usize,
    pub approved_count: usize,
    pub pending_count: usize,
    pub conflicts: Vec<PtoRequest>,
}

/// Known store codes plus the wildcard that spans all of them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocationSet {
    #[serde(default = "default_codes")]
    pub codes: Vec<String>,
    #[serde(default = "default_wildcard")]
    pub wildcard: String,
}

impl LocationSet {
    /// Known codes pass through after trimming surrounding whitespace;
    /// everything else becomes the wildcard.
    pub fn normalize<'a>(&'a self, raw: &'a str) -> &'a str {
        let trimmed = raw.trim();
        if self.codes.iter().any(|code| code == trimmed) {
            trimmed
        } else {
            &self.wildcard
        }
    }

    pub fn matches(&self, request_location: &str, scope_location: &str) -> bool {
        let request = self.normalize(request_location);
        let scope = self.normalize(scope_location);
        request == self.wildcard || scope == self.wildcard || request == scope
    }
}

impl Default for LocationSet {
    fn default() -> Self {
        Self {
            codes: default_codes(),
            wildcard: default_wildcard(),
        }
    }
}

fn default_codes() -> Vec<String> {
    vec!["EP".to_string(), "NL".to_string()]
}

fn default_wildcard() -> String {
    "BOTH".to_string()
}
