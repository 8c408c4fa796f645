// 🎓 Grades - Weight budget and weighted subject totals
//
// Scores are on a 0-20 scale and a subject is approved at 10.
// Subject total = Σ score × weight / 100.
// The weights of one subject's evaluations never add up past 100.

use crate::entities::{Evaluation, Subject, MAX_WEIGHT, PASSING_SCORE};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Float slack so 33.3 + 33.3 + 33.4 still fits
const WEIGHT_TOLERANCE: f64 = 1e-6;

// ============================================================================
// WEIGHT BUDGET
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct WeightBudgetError {
    pub existing: f64,
    pub requested: f64,
}

impl WeightBudgetError {
    pub fn total(&self) -> f64 {
        self.existing + self.requested
    }
}

impl fmt::Display for WeightBudgetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Weights would total {}% ({}% already assigned + {}% requested), maximum is {}%",
            format_percent(self.total()),
            format_percent(self.existing),
            format_percent(self.requested),
            format_percent(MAX_WEIGHT)
        )
    }
}

impl std::error::Error for WeightBudgetError {}

/// Weight already assigned to a subject, skipping `exclude_id`
pub fn weight_used(existing: &[Evaluation], subject_id: i64, exclude_id: Option<i64>) -> f64 {
    existing
        .iter()
        .filter(|e| e.subject.id == subject_id)
        .filter(|e| Some(e.id) != exclude_id)
        .map(|e| e.weight)
        .sum()
}

/// Check that adding `requested` keeps the subject at or under 100%.
/// Returns the weight left after the addition.
pub fn check_weight_budget(
    existing: &[Evaluation],
    subject_id: i64,
    requested: f64,
    exclude_id: Option<i64>,
) -> Result<f64, WeightBudgetError> {
    let used = weight_used(existing, subject_id, exclude_id);
    if used + requested > MAX_WEIGHT + WEIGHT_TOLERANCE {
        return Err(WeightBudgetError {
            existing: used,
            requested,
        });
    }
    Ok((MAX_WEIGHT - used - requested).max(0.0))
}

// ============================================================================
// SUBJECT TOTALS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectTotal {
    pub subject: Subject,
    pub evaluations: Vec<Evaluation>,
    pub total: f64,
    pub weight_used: f64,
    pub weight_remaining: f64,
    pub approved: bool,
}

pub fn weighted_score(evaluation: &Evaluation) -> f64 {
    evaluation.weighted_score()
}

/// Group evaluations per subject, sorted by subject name
pub fn subject_totals(evaluations: &[Evaluation]) -> Vec<SubjectTotal> {
    let mut groups: BTreeMap<i64, Vec<Evaluation>> = BTreeMap::new();
    for evaluation in evaluations {
        groups
            .entry(evaluation.subject.id)
            .or_default()
            .push(evaluation.clone());
    }

    let mut totals: Vec<SubjectTotal> = groups
        .into_values()
        .filter_map(|mut evals| {
            let subject = evals.first()?.subject.clone();
            evals.sort_by(|a, b| a.start.cmp(&b.start));
            let total: f64 = evals.iter().map(weighted_score).sum();
            let used: f64 = evals.iter().map(|e| e.weight).sum();
            Some(SubjectTotal {
                subject,
                total,
                weight_used: used,
                weight_remaining: (MAX_WEIGHT - used).max(0.0),
                approved: total >= PASSING_SCORE,
                evaluations: evals,
            })
        })
        .collect();

    totals.sort_by(|a, b| a.subject.name.cmp(&b.subject.name));
    totals
}

// ============================================================================
// GRADE REPORT
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeReport {
    pub subjects: Vec<SubjectTotal>,

    /// Credit-weighted average of subject totals; None without evaluations
    pub overall_average: Option<f64>,

    pub approved_count: usize,
    pub credits_approved: u32,
}

impl GradeReport {
    pub fn build(evaluations: &[Evaluation]) -> Self {
        let subjects = subject_totals(evaluations);

        let (weighted_sum, weight_sum) = subjects.iter().fold((0.0, 0.0), |(sum, weights), row| {
            let w = credit_weight(&row.subject);
            (sum + row.total * w, weights + w)
        });
        let overall_average = if weight_sum > 0.0 {
            Some(weighted_sum / weight_sum)
        } else {
            None
        };

        let approved: Vec<&SubjectTotal> = subjects.iter().filter(|s| s.approved).collect();
        let approved_count = approved.len();
        let credits_approved = approved.iter().map(|s| s.subject.credits).sum();

        GradeReport {
            subjects,
            overall_average,
            approved_count,
            credits_approved,
        }
    }

    pub fn find_subject(&self, subject_id: i64) -> Option<&SubjectTotal> {
        self.subjects.iter().find(|s| s.subject.id == subject_id)
    }
}

fn credit_weight(subject: &Subject) -> f64 {
    if subject.credits == 0 {
        1.0
    } else {
        subject.credits as f64
    }
}

// ============================================================================
// FORMATTING
// ============================================================================

/// One decimal with a comma separator: 12.46 -> "12,5"
pub fn format_grade(value: f64) -> String {
    format!("{:.1}", value).replace('.', ",")
}

fn format_percent(value: f64) -> String {
    if (value - value.round()).abs() < WEIGHT_TOLERANCE {
        format!("{}", value.round() as i64)
    } else {
        format!("{:.1}", value)
    }
}
