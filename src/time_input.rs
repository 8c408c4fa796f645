// ⏱️ Time Input - Parsing and normalization of user-typed times and dates
//
// Three entry points with different strictness:
// - parse_time24:      the stored/wire format, strict "HH:MM"
// - normalize_time:    form input, accepts AM/PM and keeps minutes
// - parse_picker_time: hour picker, accepts shorthand and rounds to the hour

use chrono::{NaiveDate, NaiveTime, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;

static TIME24_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([01]\d|2[0-3]):([0-5]\d)$").expect("valid time24 regex"));
static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date regex"));
static CLOCK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2}):(\d{2})$").expect("valid clock regex"));
static MERIDIEM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2})(?::(\d{2}))?\s*(am|pm)$").expect("valid meridiem regex")
});
static COMPACT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})(\d{2})?$").expect("valid compact regex"));

pub const TIME_FORMAT: &str = "%H:%M";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// STRICT FORMATS
// ============================================================================

/// Parse the canonical 24h "HH:MM" format (two digits each, no seconds).
pub fn parse_time24(input: &str) -> Result<NaiveTime, String> {
    let caps = TIME24_RE
        .captures(input.trim())
        .ok_or_else(|| format!("\"{}\" must be HH:MM (24h)", input))?;

    let hour: u32 = caps[1].parse().map_err(|_| format!("invalid hour in \"{}\"", input))?;
    let minute: u32 = caps[2].parse().map_err(|_| format!("invalid minute in \"{}\"", input))?;

    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| format!("invalid time \"{}\"", input))
}

/// Parse a calendar date in "YYYY-MM-DD" format.
pub fn parse_date(input: &str) -> Result<NaiveDate, String> {
    let trimmed = input.trim();
    if !DATE_RE.is_match(trimmed) {
        return Err(format!("\"{}\" must be YYYY-MM-DD", input));
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map_err(|_| format!("\"{}\" is not a valid date", input))
}

pub fn format_hhmm(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

pub fn minutes_of_day(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

// ============================================================================
// FORM INPUT
// ============================================================================

/// Normalize a form time to a 24h time, keeping minutes.
///
/// Accepts "14:05", "9:30", "2 PM", "2:30pm", "12:15 AM".
/// 12 PM stays 12, 12 AM becomes 0.
pub fn normalize_time(input: &str) -> Result<NaiveTime, String> {
    let lowered = input.trim().to_lowercase();
    if lowered.is_empty() {
        return Err("time is required".to_string());
    }

    if let Some(caps) = MERIDIEM_RE.captures(&lowered) {
        let mut hour: u32 = caps[1].parse().map_err(|_| format!("invalid hour in \"{}\"", input))?;
        let minute: u32 = match caps.get(2) {
            Some(m) => m.as_str().parse().map_err(|_| format!("invalid minute in \"{}\"", input))?,
            None => 0,
        };
        if !(1..=12).contains(&hour) || minute > 59 {
            return Err(format!("\"{}\" is not a valid 12h time", input));
        }
        match &caps[3] {
            "pm" if hour != 12 => hour += 12,
            "am" if hour == 12 => hour = 0,
            _ => {}
        }
        return NaiveTime::from_hms_opt(hour, minute, 0)
            .ok_or_else(|| format!("invalid time \"{}\"", input));
    }

    if let Some(caps) = CLOCK_RE.captures(&lowered) {
        let hour: u32 = caps[1].parse().map_err(|_| format!("invalid hour in \"{}\"", input))?;
        let minute: u32 = caps[2].parse().map_err(|_| format!("invalid minute in \"{}\"", input))?;
        return NaiveTime::from_hms_opt(hour, minute, 0)
            .filter(|_| hour <= 23 && minute <= 59)
            .ok_or_else(|| format!("\"{}\" is not a valid time", input));
    }

    Err(format!("\"{}\" is not a recognized time (use HH:MM or h:mm AM/PM)", input))
}

// ============================================================================
// HOUR PICKER
// ============================================================================

/// Parse picker shorthand and round to the whole hour.
///
/// Minutes >= 30 round up; 23:30 and later wrap to 00:00.
pub fn parse_picker_time(input: &str) -> Option<NaiveTime> {
    let lowered = input.trim().to_lowercase();
    if lowered.is_empty() {
        return None;
    }

    if let Some(caps) = CLOCK_RE.captures(&lowered) {
        let hour: u32 = caps[1].parse().ok()?;
        let minute: u32 = caps[2].parse().ok()?;
        if hour <= 23 && minute <= 59 {
            return Some(round_to_hour(hour, minute));
        }
    }

    if let Some(caps) = MERIDIEM_RE.captures(&lowered) {
        let mut hour: u32 = caps[1].parse().ok()?;
        let minute: u32 = caps.get(2).map_or(Some(0), |m| m.as_str().parse().ok())?;
        if (1..=12).contains(&hour) && minute <= 59 {
            match &caps[3] {
                "pm" if hour != 12 => hour += 12,
                "am" if hour == 12 => hour = 0,
                _ => {}
            }
            return Some(round_to_hour(hour, minute));
        }
    }

    if let Some(caps) = COMPACT_RE.captures(&lowered) {
        let hour: u32 = caps[1].parse().ok()?;
        let minute: u32 = caps.get(2).map_or(Some(0), |m| m.as_str().parse().ok())?;
        if hour <= 23 && minute <= 59 {
            return Some(round_to_hour(hour, minute));
        }
    }

    None
}

fn round_to_hour(hour: u32, minute: u32) -> NaiveTime {
    let hour = if minute >= 30 { (hour + 1) % 24 } else { hour };
    NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN)
}

/// Whole-hour picker options, optionally only those strictly after `min`.
pub fn picker_options(min: Option<NaiveTime>) -> Vec<NaiveTime> {
    (0..24)
        .filter_map(|h| NaiveTime::from_hms_opt(h, 0, 0))
        .filter(|option| min.map_or(true, |m| *option > m))
        .collect()
}

// ============================================================================
// SERDE HELPERS
// ============================================================================

/// Serialize `NaiveTime` as "HH:MM" on the wire.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_hhmm(*time))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_time24(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_parse_time24_strict() {
        assert_eq!(parse_time24("08:15").unwrap(), t(8, 15));
        assert_eq!(parse_time24("23:59").unwrap(), t(23, 59));
        assert!(parse_time24("8:15").is_err());
        assert!(parse_time24("24:00").is_err());
        assert!(parse_time24("12:60").is_err());
        assert!(parse_time24("12:00:00").is_err());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2025-01-06").unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 6).unwrap()
        );
        assert!(parse_date("2025-1-6").is_err());
        assert!(parse_date("2025-02-30").is_err());
    }

    #[test]
    fn test_normalize_time_meridiem() {
        assert_eq!(normalize_time("2:30 PM").unwrap(), t(14, 30));
        assert_eq!(normalize_time("2pm").unwrap(), t(14, 0));
        assert_eq!(normalize_time("12 PM").unwrap(), t(12, 0));
        assert_eq!(normalize_time("12:15 am").unwrap(), t(0, 15));
        assert!(normalize_time("13 PM").is_err());
    }

    #[test]
    fn test_normalize_time_keeps_minutes() {
        assert_eq!(normalize_time("9:05").unwrap(), t(9, 5));
        assert_eq!(normalize_time(" 17:45 ").unwrap(), t(17, 45));
        assert!(normalize_time("25:00").is_err());
        assert!(normalize_time("").is_err());
        assert!(normalize_time("noon").is_err());
    }

    #[test]
    fn test_picker_rounds_to_hour() {
        assert_eq!(parse_picker_time("14:29"), Some(t(14, 0)));
        assert_eq!(parse_picker_time("14:30"), Some(t(15, 0)));
        assert_eq!(parse_picker_time("2:45 pm"), Some(t(15, 0)));
        assert_eq!(parse_picker_time("12am"), Some(t(0, 0)));
        assert_eq!(parse_picker_time("23:45"), Some(t(0, 0)));
    }

    #[test]
    fn test_picker_compact_forms() {
        assert_eq!(parse_picker_time("9"), Some(t(9, 0)));
        assert_eq!(parse_picker_time("17"), Some(t(17, 0)));
        assert_eq!(parse_picker_time("930"), Some(t(10, 0)));
        assert_eq!(parse_picker_time("1410"), Some(t(14, 0)));
        assert_eq!(parse_picker_time("24"), None);
        assert_eq!(parse_picker_time("abc"), None);
        assert_eq!(parse_picker_time("   "), None);
    }

    #[test]
    fn test_picker_options_after_min() {
        assert_eq!(picker_options(None).len(), 24);

        let after_nine = picker_options(Some(t(9, 0)));
        assert_eq!(after_nine.first(), Some(&t(10, 0)));
        assert_eq!(after_nine.len(), 14);

        let after_half = picker_options(Some(t(9, 30)));
        assert_eq!(after_half.first(), Some(&t(10, 0)));
    }
}
