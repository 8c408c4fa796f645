// ⏱️ Conflict Detection - Overlapping time blocks
//
// Two ranges overlap when a.start < b.end && a.end > b.start.
// Touching ranges (one ends exactly when the other starts) do not conflict.
//
// Events clash with events on the same date and with classes on that weekday.
// Classes clash with classes on the same weekday and with events on any date
// falling on that weekday. Evaluations are never checked.

use crate::entities::{Event, ScheduleSlot, Weekday};
use crate::time_input::format_hhmm;
use chrono::{Datelike, NaiveDate, NaiveTime};
use std::fmt;

// ============================================================================
// CONFLICT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Event,
    Class,
}

/// The stored item a new block would collide with
#[derive(Debug, Clone, PartialEq)]
pub struct Conflict {
    pub kind: BlockKind,
    pub id: i64,
    pub label: String,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let noun = match self.kind {
            BlockKind::Event => "event",
            BlockKind::Class => "class",
        };
        write!(
            f,
            "Overlaps with {} \"{}\" ({} - {})",
            noun,
            self.label,
            format_hhmm(self.start),
            format_hhmm(self.end)
        )
    }
}

pub fn overlaps(a_start: NaiveTime, a_end: NaiveTime, b_start: NaiveTime, b_end: NaiveTime) -> bool {
    a_start < b_end && a_end > b_start
}

// ============================================================================
// CHECKS
// ============================================================================

/// First stored block clashing with an event on `date`.
/// `exclude_event` skips the event being updated.
pub fn find_event_conflict(
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
    events: &[Event],
    slots: &[ScheduleSlot],
    exclude_event: Option<i64>,
) -> Option<Conflict> {
    let event_hit = events
        .iter()
        .filter(|e| Some(e.id) != exclude_event)
        .filter(|e| e.date() == date)
        .find(|e| overlaps(start, end, e.start_time(), e.end_time()))
        .map(event_conflict);

    if event_hit.is_some() {
        return event_hit;
    }

    let weekday = Weekday::from_chrono(date.weekday());
    slots
        .iter()
        .filter(|s| s.weekday == weekday)
        .find(|s| overlaps(start, end, s.start_time, s.end_time))
        .map(slot_conflict)
}

/// First stored block clashing with a class on `weekday`.
/// `exclude_slot` skips the class being updated.
pub fn find_slot_conflict(
    weekday: Weekday,
    start: NaiveTime,
    end: NaiveTime,
    slots: &[ScheduleSlot],
    events: &[Event],
    exclude_slot: Option<i64>,
) -> Option<Conflict> {
    let slot_hit = slots
        .iter()
        .filter(|s| Some(s.id) != exclude_slot)
        .filter(|s| s.weekday == weekday)
        .find(|s| overlaps(start, end, s.start_time, s.end_time))
        .map(slot_conflict);

    if slot_hit.is_some() {
        return slot_hit;
    }

    events
        .iter()
        .filter(|e| Weekday::from_chrono(e.date().weekday()) == weekday)
        .find(|e| overlaps(start, end, e.start_time(), e.end_time()))
        .map(event_conflict)
}

fn event_conflict(event: &Event) -> Conflict {
    Conflict {
        kind: BlockKind::Event,
        id: event.id,
        label: event.name.clone(),
        start: event.start_time(),
        end: event.end_time(),
    }
}

fn slot_conflict(slot: &ScheduleSlot) -> Conflict {
    Conflict {
        kind: BlockKind::Class,
        id: slot.id,
        label: format!("{} ({})", slot.subject.name, slot.weekday),
        start: slot.start_time,
        end: slot.end_time,
    }
}
