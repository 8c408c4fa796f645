// 📝 Evaluation Entity - Graded assessments (Evaluación)
//
// score is on a 0-20 scale, weight is the percentage of the subject's
// final grade this evaluation accounts for.

use crate::entities::subject::Subject;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

pub const MAX_SCORE: f64 = 20.0;
pub const PASSING_SCORE: f64 = 10.0;
pub const MAX_WEIGHT: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub subject: Subject,

    /// Percentage of the subject grade (0-100)
    pub weight: f64,

    /// Score on the 0-20 scale
    pub score: f64,

    pub professor: String,
    pub location: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub color_hex: String,
}

impl Evaluation {
    /// Contribution of this evaluation to the subject total
    pub fn weighted_score(&self) -> f64 {
        self.score * (self.weight / 100.0)
    }

    pub fn date(&self) -> NaiveDate {
        self.start.date()
    }

    pub fn start_time(&self) -> NaiveTime {
        self.start.time()
    }

    pub fn end_time(&self) -> NaiveTime {
        self.end.time()
    }

    /// Case-insensitive match on title, professor, location or subject
    pub fn matches(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.title.to_lowercase().contains(&term)
            || self.professor.to_lowercase().contains(&term)
            || self.location.to_lowercase().contains(&term)
            || self.subject.matches(&term)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationRequest {
    pub title: String,
    pub subject_id: i64,
    pub weight: f64,
    pub score: f64,
    pub professor: String,
    pub location: String,

    #[serde(default)]
    pub description: Option<String>,

    /// "YYYY-MM-DD"
    pub date: String,
    pub start_time: String,
    pub end_time: String,

    #[serde(default)]
    pub color_hex: Option<String>,
}
