// 🔍 Search - Jump to the week holding the first match
//
// Order of precedence: events, then classes, then evaluations.
// Events and evaluations lead to their own week; classes recur every week
// so they lead to the current one.

use crate::calendar::{start_of_week, ItemKind};
use crate::entities::{Evaluation, Event, ScheduleSlot};
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub kind: ItemKind,
    pub id: i64,
    pub title: String,

    /// Sunday of the week to display
    pub week_start: NaiveDate,
}

pub fn search(
    term: &str,
    events: &[Event],
    slots: &[ScheduleSlot],
    evaluations: &[Evaluation],
    today: NaiveDate,
) -> Option<SearchResult> {
    let term = term.trim();
    if term.is_empty() {
        return None;
    }

    if let Some(event) = events.iter().find(|e| e.matches(term)) {
        return Some(SearchResult {
            kind: ItemKind::Event,
            id: event.id,
            title: event.name.clone(),
            week_start: start_of_week(event.date()),
        });
    }

    if let Some(slot) = slots.iter().find(|s| s.matches(term)) {
        return Some(SearchResult {
            kind: ItemKind::Class,
            id: slot.id,
            title: slot.subject.name.clone(),
            week_start: start_of_week(today),
        });
    }

    evaluations
        .iter()
        .find(|e| e.matches(term))
        .map(|evaluation| SearchResult {
            kind: ItemKind::Evaluation,
            id: evaluation.id,
            title: evaluation.title.clone(),
            week_start: start_of_week(evaluation.date()),
        })
}

pub fn no_match_message(term: &str) -> String {
    format!("No event, class or evaluation matches \"{}\"", term.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Subject, Weekday};
    use chrono::NaiveTime;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn t(h: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, 0, 0).unwrap()
    }

    fn fixtures() -> (Vec<Event>, Vec<ScheduleSlot>, Vec<Evaluation>) {
        let subject = Subject::new(4, "Ingeniería de Software", "4to Semestre", 4);
        let events = vec![Event {
            id: 1,
            user_id: 1,
            name: "Taller de Rust".to_string(),
            description: None,
            location: Some("Auditorio".to_string()),
            start: d(2025, 6, 18).and_time(t(10)),
            end: d(2025, 6, 18).and_time(t(12)),
            color_hex: "#2196F3".to_string(),
        }];
        let slots = vec![ScheduleSlot {
            id: 2,
            user_id: 1,
            subject: subject.clone(),
            location: "Aula 7".to_string(),
            weekday: Weekday::Thursday,
            start_time: t(7),
            end_time: t(9),
            professor: None,
            class_type: None,
            color_hex: "#2196F3".to_string(),
        }];
        let evaluations = vec![Evaluation {
            id: 3,
            user_id: 1,
            title: "Proyecto final".to_string(),
            subject,
            weight: 40.0,
            score: 17.0,
            professor: "Márquez".to_string(),
            location: "Aula 7".to_string(),
            description: None,
            start: d(2025, 7, 2).and_time(t(8)),
            end: d(2025, 7, 2).and_time(t(10)),
            color_hex: "#FF9800".to_string(),
        }];
        (events, slots, evaluations)
    }

    #[test]
    fn test_event_goes_to_its_week() {
        let (events, slots, evals) = fixtures();
        let hit = search("  auditorio ", &events, &slots, &evals, d(2025, 1, 1)).unwrap();
        assert_eq!(hit.kind, ItemKind::Event);
        assert_eq!(hit.week_start, d(2025, 6, 15));
    }

    #[test]
    fn test_class_goes_to_current_week() {
        let (events, slots, evals) = fixtures();
        // "aula 7" matches the class before the evaluation
        let hit = search("AULA 7", &events, &slots, &evals, d(2025, 3, 5)).unwrap();
        assert_eq!(hit.kind, ItemKind::Class);
        assert_eq!(hit.week_start, d(2025, 3, 2));
    }

    #[test]
    fn test_evaluation_goes_to_its_week() {
        let (events, slots, evals) = fixtures();
        let hit = search("márquez", &events, &slots, &evals, d(2025, 3, 5)).unwrap();
        assert_eq!(hit.kind, ItemKind::Evaluation);
        assert_eq!(hit.week_start, d(2025, 6, 29));
    }

    #[test]
    fn test_no_match_and_empty_term() {
        let (events, slots, evals) = fixtures();
        assert!(search("química", &events, &slots, &evals, d(2025, 3, 5)).is_none());
        assert!(search("   ", &events, &slots, &evals, d(2025, 3, 5)).is_none());
        assert_eq!(
            no_match_message(" química "),
            "No event, class or evaluation matches \"química\""
        );
    }
}
