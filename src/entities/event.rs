// 📅 Event Entity - One-off calendar items (Evento)

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: i64,
    pub user_id: i64,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Local start; always on the same date as `end`
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,

    pub color_hex: String,
}

impl Event {
    pub fn date(&self) -> NaiveDate {
        self.start.date()
    }

    pub fn start_time(&self) -> NaiveTime {
        self.start.time()
    }

    pub fn end_time(&self) -> NaiveTime {
        self.end.time()
    }

    /// Case-insensitive match on name or location
    pub fn matches(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.name.to_lowercase().contains(&term)
            || self
                .location
                .as_deref()
                .map_or(false, |loc| loc.to_lowercase().contains(&term))
    }
}

/// Create/update payload. Times arrive as typed by the user and are
/// normalized by the planner.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRequest {
    pub name: String,

    #[serde(default)]
    pub location: Option<String>,

    /// "YYYY-MM-DD"
    pub date: String,
    pub start_time: String,
    pub end_time: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub color_hex: Option<String>,
}
