// 🗓️ Schedule Slot Entity - Weekly recurring class blocks (Horario)
//
// A slot has no date: it repeats every week on its weekday.
// Weekday wire values are the Spanish day names ("Lunes" .. "Domingo").

use crate::entities::subject::Subject;
use crate::time_input::hhmm;
use chrono::NaiveTime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// WEEKDAY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    /// Spanish display/wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Monday => "Lunes",
            Weekday::Tuesday => "Martes",
            Weekday::Wednesday => "Miércoles",
            Weekday::Thursday => "Jueves",
            Weekday::Friday => "Viernes",
            Weekday::Saturday => "Sábado",
            Weekday::Sunday => "Domingo",
        }
    }

    pub fn short_name(&self) -> &'static str {
        match self {
            Weekday::Monday => "Lun",
            Weekday::Tuesday => "Mar",
            Weekday::Wednesday => "Mié",
            Weekday::Thursday => "Jue",
            Weekday::Friday => "Vie",
            Weekday::Saturday => "Sáb",
            Weekday::Sunday => "Dom",
        }
    }

    pub fn to_chrono(self) -> chrono::Weekday {
        match self {
            Weekday::Monday => chrono::Weekday::Mon,
            Weekday::Tuesday => chrono::Weekday::Tue,
            Weekday::Wednesday => chrono::Weekday::Wed,
            Weekday::Thursday => chrono::Weekday::Thu,
            Weekday::Friday => chrono::Weekday::Fri,
            Weekday::Saturday => chrono::Weekday::Sat,
            Weekday::Sunday => chrono::Weekday::Sun,
        }
    }

    pub fn from_chrono(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Mon => Weekday::Monday,
            chrono::Weekday::Tue => Weekday::Tuesday,
            chrono::Weekday::Wed => Weekday::Wednesday,
            chrono::Weekday::Thu => Weekday::Thursday,
            chrono::Weekday::Fri => Weekday::Friday,
            chrono::Weekday::Sat => Weekday::Saturday,
            chrono::Weekday::Sun => Weekday::Sunday,
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Weekday {
    type Err = String;

    /// Spanish (with or without accents) or English, any case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded = fold_accents(&s.trim().to_lowercase());
        match folded.as_str() {
            "lunes" | "monday" => Ok(Weekday::Monday),
            "martes" | "tuesday" => Ok(Weekday::Tuesday),
            "miercoles" | "wednesday" => Ok(Weekday::Wednesday),
            "jueves" | "thursday" => Ok(Weekday::Thursday),
            "viernes" | "friday" => Ok(Weekday::Friday),
            "sabado" | "saturday" => Ok(Weekday::Saturday),
            "domingo" | "sunday" => Ok(Weekday::Sunday),
            _ => Err(format!("\"{}\" is not a weekday", s)),
        }
    }
}

impl Serialize for Weekday {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Weekday {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

fn fold_accents(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            'á' => 'a',
            'é' => 'e',
            'í' => 'i',
            'ó' => 'o',
            'ú' => 'u',
            other => other,
        })
        .collect()
}

// ============================================================================
// CLASS TYPE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassType {
    #[serde(rename = "Teoría", alias = "Teoria")]
    Theory,
    #[serde(rename = "Práctica", alias = "Practica")]
    Practice,
    #[serde(rename = "Taller")]
    Workshop,
}

impl ClassType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassType::Theory => "Teoría",
            ClassType::Practice => "Práctica",
            ClassType::Workshop => "Taller",
        }
    }
}

impl FromStr for ClassType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match fold_accents(&s.trim().to_lowercase()).as_str() {
            "teoria" | "theory" => Ok(ClassType::Theory),
            "practica" | "practice" => Ok(ClassType::Practice),
            "taller" | "workshop" => Ok(ClassType::Workshop),
            _ => Err(format!("\"{}\" is not a class type (Teoría, Práctica, Taller)", s)),
        }
    }
}

// ============================================================================
// SCHEDULE SLOT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSlot {
    pub id: i64,
    pub user_id: i64,
    pub subject: Subject,

    /// Classroom (aula)
    pub location: String,

    pub weekday: Weekday,

    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,

    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub professor: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_type: Option<ClassType>,

    pub color_hex: String,
}

impl ScheduleSlot {
    /// Case-insensitive match on subject name or classroom
    pub fn matches(&self, term: &str) -> bool {
        self.subject.matches(term) || self.location.to_lowercase().contains(&term.to_lowercase())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRequest {
    pub subject_id: i64,
    pub location: String,
    pub weekday: String,
    pub start_time: String,
    pub end_time: String,

    #[serde(default)]
    pub professor: Option<String>,

    #[serde(default)]
    pub class_type: Option<String>,

    #[serde(default)]
    pub color_hex: Option<String>,
}

/// One weekday/time pair of a batch
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleDay {
    pub weekday: String,
    pub start_time: String,
    pub end_time: String,
}

/// Same class on several weekdays, created together
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchScheduleRequest {
    pub subject_id: i64,
    pub location: String,

    #[serde(default)]
    pub professor: Option<String>,

    #[serde(default)]
    pub class_type: Option<String>,

    #[serde(default)]
    pub color_hex: Option<String>,

    pub days: Vec<ScheduleDay>,
}

impl BatchScheduleRequest {
    /// Expand into one request per day
    pub fn expand(&self) -> Vec<ScheduleRequest> {
        self.days
            .iter()
            .map(|day| ScheduleRequest {
                subject_id: self.subject_id,
                location: self.location.clone(),
                weekday: day.weekday.clone(),
                start_time: day.start_time.clone(),
                end_time: day.end_time.clone(),
                professor: self.professor.clone(),
                class_type: self.class_type.clone(),
                color_hex: self.color_hex.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weekday_parse_variants() {
        assert_eq!("Miércoles".parse::<Weekday>().unwrap(), Weekday::Wednesday);
        assert_eq!("miercoles".parse::<Weekday>().unwrap(), Weekday::Wednesday);
        assert_eq!("SÁBADO".parse::<Weekday>().unwrap(), Weekday::Saturday);
        assert_eq!("friday".parse::<Weekday>().unwrap(), Weekday::Friday);
        assert!("Funday".parse::<Weekday>().is_err());
    }

    #[test]
    fn test_weekday_chrono_roundtrip() {
        for day in Weekday::ALL {
            assert_eq!(Weekday::from_chrono(day.to_chrono()), day);
        }
    }

    #[test]
    fn test_weekday_wire_name() {
        let json = serde_json::to_string(&Weekday::Wednesday).unwrap();
        assert_eq!(json, "\"Miércoles\"");
        let back: Weekday = serde_json::from_str("\"Domingo\"").unwrap();
        assert_eq!(back, Weekday::Sunday);
    }

    #[test]
    fn test_class_type_parse() {
        assert_eq!("Practica".parse::<ClassType>().unwrap(), ClassType::Practice);
        assert_eq!("taller".parse::<ClassType>().unwrap(), ClassType::Workshop);
        assert!("Seminario".parse::<ClassType>().is_err());
    }

    #[test]
    fn test_slot_times_serialize_as_hhmm() {
        let slot = ScheduleSlot {
            id: 1,
            user_id: 2,
            subject: Subject::new(5, "Cálculo Vectorial", "4to Semestre", 4),
            location: "A-12".to_string(),
            weekday: Weekday::Tuesday,
            start_time: NaiveTime::from_hms_opt(7, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(8, 45, 0).unwrap(),
            professor: None,
            class_type: Some(ClassType::Theory),
            color_hex: "#2196F3".to_string(),
        };

        let json = serde_json::to_value(&slot).unwrap();
        assert_eq!(json["startTime"], "07:00");
        assert_eq!(json["endTime"], "08:45");
        assert_eq!(json["weekday"], "Martes");
        assert_eq!(json["classType"], "Teoría");
        assert!(slot.matches("a-12"));
        assert!(slot.matches("cálculo"));
    }

    #[test]
    fn test_batch_expand() {
        let batch = BatchScheduleRequest {
            subject_id: 2,
            location: "Lab 3".to_string(),
            days: vec![
                ScheduleDay {
                    weekday: "Lunes".to_string(),
                    start_time: "07:00".to_string(),
                    end_time: "09:00".to_string(),
                },
                ScheduleDay {
                    weekday: "Jueves".to_string(),
                    start_time: "09:00".to_string(),
                    end_time: "11:00".to_string(),
                },
            ],
            ..Default::default()
        };

        let requests = batch.expand();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].weekday, "Jueves");
        assert_eq!(requests[1].location, "Lab 3");
    }
}
