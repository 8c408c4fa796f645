// 📤 Transfer - CSV schedule import and grade export
//
// Schedule CSV header:
//   subject_id,location,weekday,start_time,end_time,professor,class_type,color_hex
// Empty optional cells are read as absent.

use crate::entities::ScheduleRequest;
use crate::grades::{format_grade, GradeReport};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::Path;

#[derive(Debug, Deserialize)]
struct ScheduleCsvRow {
    subject_id: i64,
    location: String,
    weekday: String,
    start_time: String,
    end_time: String,
    #[serde(default)]
    professor: Option<String>,
    #[serde(default)]
    class_type: Option<String>,
    #[serde(default)]
    color_hex: Option<String>,
}

impl From<ScheduleCsvRow> for ScheduleRequest {
    fn from(row: ScheduleCsvRow) -> Self {
        ScheduleRequest {
            subject_id: row.subject_id,
            location: row.location,
            weekday: row.weekday,
            start_time: row.start_time,
            end_time: row.end_time,
            professor: row.professor,
            class_type: row.class_type,
            color_hex: row.color_hex,
        }
    }
}

pub fn load_schedule_csv(csv_path: &Path) -> Result<Vec<ScheduleRequest>> {
    let file = std::fs::File::open(csv_path)
        .with_context(|| format!("Failed to open CSV file {}", csv_path.display()))?;
    read_schedule_csv(file)
}

pub fn read_schedule_csv<R: Read>(reader: R) -> Result<Vec<ScheduleRequest>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let mut requests = Vec::new();
    for (index, result) in rdr.deserialize::<ScheduleCsvRow>().enumerate() {
        // header is line 1
        let row = result.with_context(|| format!("Invalid schedule row at line {}", index + 2))?;
        requests.push(row.into());
    }
    Ok(requests)
}

#[derive(Debug, Serialize)]
struct GradeCsvRow<'a> {
    subject: &'a str,
    evaluation: &'a str,
    date: String,
    weight: f64,
    score: String,
    weighted: String,
    approved: &'a str,
}

/// One row per evaluation, then a TOTAL row per subject
pub fn write_grade_report_csv<W: Write>(report: &GradeReport, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    for row in &report.subjects {
        for eval in &row.evaluations {
            wtr.serialize(GradeCsvRow {
                subject: &row.subject.name,
                evaluation: &eval.title,
                date: eval.date().to_string(),
                weight: eval.weight,
                score: format_grade(eval.score),
                weighted: format_grade(eval.weighted_score()),
                approved: "",
            })?;
        }
        wtr.serialize(GradeCsvRow {
            subject: &row.subject.name,
            evaluation: "TOTAL",
            date: String::new(),
            weight: row.weight_used,
            score: String::new(),
            weighted: format_grade(row.total),
            approved: if row.approved { "yes" } else { "no" },
        })?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn export_grade_report(report: &GradeReport, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    write_grade_report_csv(report, file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_schedule_rows() {
        let data = "\
subject_id,location,weekday,start_time,end_time,professor,class_type,color_hex
1, A-12 ,Lunes,07:00,08:45,Rivas,Teoría,
5,Lab 3,miercoles,2 PM,4 PM,,,#00FF00
";
        let rows = read_schedule_csv(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].location, "A-12");
        assert_eq!(rows[0].class_type.as_deref(), Some("Teoría"));
        assert!(rows[0].color_hex.is_none());
        assert!(rows[1].professor.is_none());
        assert_eq!(rows[1].color_hex.as_deref(), Some("#00FF00"));
    }

    #[test]
    fn test_bad_row_names_line() {
        let data = "subject_id,location,weekday,start_time,end_time,professor,class_type,color_hex\nx,A,Lunes,07:00,08:00,,,\n";
        let err = read_schedule_csv(data.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }
}
