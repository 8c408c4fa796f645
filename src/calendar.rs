// 📆 Calendar - Week/month windowing and item projection
//
// Weeks start on Sunday. A month grid always has 42 cells (6 rows × 7),
// starting with the tail of the previous month so day 1 sits under its weekday.
//
// Dated items (events, evaluations) occur on their start date.
// Class slots occur on every date whose weekday matches.

use crate::entities::{Evaluation, Event, ScheduleSlot, Weekday};
use crate::time_input::{format_hhmm, minutes_of_day};
use chrono::{Datelike, Duration, Months, NaiveDate, NaiveTime};
use serde::Serialize;

const MINUTES_PER_DAY: f64 = 1440.0;
const MIN_HEIGHT_PERCENT: f64 = 2.0;
pub const MONTH_GRID_CELLS: usize = 42;

const MONTH_NAMES: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sep", "oct", "nov", "dic",
];

// ============================================================================
// WEEK WINDOW
// ============================================================================

/// Sunday of the week containing `date`
pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_sunday() as i64)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeekWindow {
    pub start: NaiveDate,
}

impl WeekWindow {
    pub fn containing(date: NaiveDate) -> Self {
        WeekWindow {
            start: start_of_week(date),
        }
    }

    /// Saturday, inclusive
    pub fn end(&self) -> NaiveDate {
        self.start + Duration::days(6)
    }

    pub fn days(&self) -> Vec<NaiveDate> {
        (0..7).map(|i| self.start + Duration::days(i)).collect()
    }

    pub fn next(&self) -> Self {
        WeekWindow {
            start: self.start + Duration::days(7),
        }
    }

    pub fn previous(&self) -> Self {
        WeekWindow {
            start: self.start - Duration::days(7),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end()
    }
}

// ============================================================================
// MONTH GRID
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthCell {
    pub date: NaiveDate,
    pub in_month: bool,
    pub is_today: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub title: String,
    pub cells: Vec<MonthCell>,
}

impl MonthGrid {
    pub fn for_month(date: NaiveDate, today: NaiveDate) -> Self {
        let first = first_of_month(date);
        let grid_start = start_of_week(first);

        let cells = (0..MONTH_GRID_CELLS as i64)
            .map(|i| {
                let day = grid_start + Duration::days(i);
                MonthCell {
                    date: day,
                    in_month: day.month() == first.month() && day.year() == first.year(),
                    is_today: day == today,
                }
            })
            .collect();

        MonthGrid {
            year: first.year(),
            month: first.month(),
            title: format_month_title(first),
            cells,
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &[MonthCell]> {
        self.cells.chunks(7)
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Shift by whole months, clamping the day (Jan 31 + 1 -> Feb 28/29)
pub fn add_months(date: NaiveDate, months: i32) -> NaiveDate {
    let shifted = if months >= 0 {
        date.checked_add_months(Months::new(months as u32))
    } else {
        date.checked_sub_months(Months::new(months.unsigned_abs()))
    };
    shifted.unwrap_or(date)
}

// ============================================================================
// CALENDAR ITEMS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Event,
    Class,
    Evaluation,
}

impl ItemKind {
    pub fn label(&self) -> &'static str {
        match self {
            ItemKind::Event => "Evento",
            ItemKind::Class => "Clase",
            ItemKind::Evaluation => "Evaluación",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum CalendarItem<'a> {
    Event(&'a Event),
    Slot(&'a ScheduleSlot),
    Evaluation(&'a Evaluation),
}

impl<'a> CalendarItem<'a> {
    pub fn kind(&self) -> ItemKind {
        match self {
            CalendarItem::Event(_) => ItemKind::Event,
            CalendarItem::Slot(_) => ItemKind::Class,
            CalendarItem::Evaluation(_) => ItemKind::Evaluation,
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            CalendarItem::Event(e) => e.id,
            CalendarItem::Slot(s) => s.id,
            CalendarItem::Evaluation(e) => e.id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            CalendarItem::Event(e) => &e.name,
            CalendarItem::Slot(s) => &s.subject.name,
            CalendarItem::Evaluation(e) => &e.title,
        }
    }

    pub fn location(&self) -> Option<&str> {
        match self {
            CalendarItem::Event(e) => e.location.as_deref(),
            CalendarItem::Slot(s) => Some(s.location.as_str()),
            CalendarItem::Evaluation(e) => Some(e.location.as_str()),
        }
    }

    pub fn start_time(&self) -> NaiveTime {
        match self {
            CalendarItem::Event(e) => e.start_time(),
            CalendarItem::Slot(s) => s.start_time,
            CalendarItem::Evaluation(e) => e.start_time(),
        }
    }

    pub fn end_time(&self) -> NaiveTime {
        match self {
            CalendarItem::Event(e) => e.end_time(),
            CalendarItem::Slot(s) => s.end_time,
            CalendarItem::Evaluation(e) => e.end_time(),
        }
    }

    pub fn color_hex(&self) -> &str {
        match self {
            CalendarItem::Event(e) => &e.color_hex,
            CalendarItem::Slot(s) => &s.color_hex,
            CalendarItem::Evaluation(e) => &e.color_hex,
        }
    }

    pub fn occurs_on(&self, day: NaiveDate) -> bool {
        match self {
            CalendarItem::Event(e) => e.date() == day,
            CalendarItem::Slot(s) => s.weekday == Weekday::from_chrono(day.weekday()),
            CalendarItem::Evaluation(e) => e.date() == day,
        }
    }

    /// Concrete placement on `day`
    pub fn occurrence(&self, day: NaiveDate) -> Occurrence {
        let start = self.start_time();
        let end = self.end_time();
        Occurrence {
            kind: self.kind(),
            id: self.id(),
            title: self.title().to_string(),
            location: self.location().map(str::to_string),
            date: day,
            start_time: format_hhmm(start),
            end_time: format_hhmm(end),
            color_hex: self.color_hex().to_string(),
            top_percent: top_percent(start),
            height_percent: height_percent(start, end),
        }
    }
}

/// One item placed on one concrete date
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Occurrence {
    pub kind: ItemKind,
    pub id: i64,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub color_hex: String,
    pub top_percent: f64,
    pub height_percent: f64,
}

/// All items that fall on `day`, sorted by start time
pub fn items_for_day<'a>(
    day: NaiveDate,
    events: &'a [Event],
    slots: &'a [ScheduleSlot],
    evaluations: &'a [Evaluation],
) -> Vec<CalendarItem<'a>> {
    let mut items: Vec<CalendarItem<'a>> = events
        .iter()
        .map(CalendarItem::Event)
        .chain(slots.iter().map(CalendarItem::Slot))
        .chain(evaluations.iter().map(CalendarItem::Evaluation))
        .filter(|item| item.occurs_on(day))
        .collect();
    items.sort_by_key(|item| (item.start_time(), item.end_time()));
    items
}

// ============================================================================
// WEEK PROJECTION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayColumn {
    pub date: NaiveDate,
    pub label: String,
    pub occurrences: Vec<Occurrence>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekView {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub label: String,
    pub days: Vec<DayColumn>,
}

impl WeekView {
    pub fn total_occurrences(&self) -> usize {
        self.days.iter().map(|d| d.occurrences.len()).sum()
    }
}

pub fn project_week(
    window: WeekWindow,
    events: &[Event],
    slots: &[ScheduleSlot],
    evaluations: &[Evaluation],
) -> WeekView {
    let days = window
        .days()
        .into_iter()
        .map(|day| DayColumn {
            date: day,
            label: format_day_name(day),
            occurrences: items_for_day(day, events, slots, evaluations)
                .iter()
                .map(|item| item.occurrence(day))
                .collect(),
        })
        .collect();

    WeekView {
        start: window.start,
        end: window.end(),
        label: format_week_range(window),
        days,
    }
}

// ============================================================================
// LAYOUT
// ============================================================================

/// Vertical offset within a day column, 0-100
pub fn top_percent(start: NaiveTime) -> f64 {
    (minutes_of_day(start) as f64 / MINUTES_PER_DAY * 100.0).clamp(0.0, 100.0)
}

/// Block height within a day column, at least 2%
pub fn height_percent(start: NaiveTime, end: NaiveTime) -> f64 {
    let minutes = minutes_of_day(end) as f64 - minutes_of_day(start) as f64;
    (minutes / MINUTES_PER_DAY * 100.0).max(MIN_HEIGHT_PERCENT)
}

// ============================================================================
// LABELS
// ============================================================================

/// "Lun 6"
pub fn format_day_name(date: NaiveDate) -> String {
    format!(
        "{} {}",
        Weekday::from_chrono(date.weekday()).short_name(),
        date.day()
    )
}

/// "ene 5 - ene 11, 2025"; both years shown when the week spans two
pub fn format_week_range(window: WeekWindow) -> String {
    let start = window.start;
    let end = window.end();
    if start.year() == end.year() {
        format!(
            "{} {} - {} {}, {}",
            month_abbreviation(start),
            start.day(),
            month_abbreviation(end),
            end.day(),
            end.year()
        )
    } else {
        format!(
            "{} {}, {} - {} {}, {}",
            month_abbreviation(start),
            start.day(),
            start.year(),
            month_abbreviation(end),
            end.day(),
            end.year()
        )
    }
}

/// "Lunes, 6 de enero de 2025"
pub fn format_long_date(date: NaiveDate) -> String {
    format!(
        "{}, {} de {} de {}",
        Weekday::from_chrono(date.weekday()),
        date.day(),
        month_name(date),
        date.year()
    )
}

/// "enero 2025"
pub fn format_month_title(date: NaiveDate) -> String {
    format!("{} {}", month_name(date), date.year())
}

fn month_name(date: NaiveDate) -> &'static str {
    MONTH_NAMES[date.month0() as usize]
}

fn month_abbreviation(date: NaiveDate) -> &'static str {
    MONTH_ABBREVIATIONS[date.month0() as usize]
}
