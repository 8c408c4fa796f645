// 📐 Validation Layer - Field checks for incoming requests
//
// Every validator collects ALL field errors instead of stopping at the first,
// and on success hands back the parsed values so callers never re-parse.

use crate::entities::{
    ClassType, EvaluationRequest, EventRequest, RegisterRequest, ScheduleRequest, Weekday,
    DEFAULT_BLOCK_COLOR, DEFAULT_EVALUATION_COLOR, MAX_SCORE, MAX_WEIGHT,
};
use crate::time_input::{format_hhmm, normalize_time, parse_date};
use chrono::{NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));
static COLOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("valid color regex"));

pub const MAX_USERNAME_CHARS: usize = 30;
pub const MAX_PASSWORD_CHARS: usize = 10;
pub const MAX_TITLE_CHARS: usize = 100;
pub const MAX_PROFESSOR_CHARS: usize = 100;
pub const MAX_LOCATION_CHARS: usize = 50;

// ============================================================================
// VALIDATION RESULT
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub context: String,
}

impl ValidationError {
    fn new(context: &str, field: &str, message: impl Into<String>) -> Self {
        ValidationError {
            field: field.to_string(),
            message: message.into(),
            context: context.to_string(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.context, self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult<T> = Result<T, Vec<ValidationError>>;

/// Join messages the way they are shown to the user
pub fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

// ============================================================================
// ACCOUNT RULES
// ============================================================================

/// Registration policy (configurable email domain)
#[derive(Debug, Clone, PartialEq)]
pub struct AccountRules {
    pub email_domain: String,
}

impl Default for AccountRules {
    fn default() -> Self {
        AccountRules {
            email_domain: "@est.ucab.edu.ve".to_string(),
        }
    }
}

// ============================================================================
// PARSED FORMS
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ValidEvent {
    pub name: String,
    pub location: Option<String>,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub color_hex: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidSchedule {
    pub subject_id: i64,
    pub location: String,
    pub weekday: Weekday,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub professor: Option<String>,
    pub class_type: Option<ClassType>,
    pub color_hex: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidEvaluation {
    pub title: String,
    pub subject_id: i64,
    pub weight: f64,
    pub score: f64,
    pub professor: String,
    pub location: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub color_hex: String,
}

// ============================================================================
// VALIDATORS
// ============================================================================

/// Validate a registration form. Returns the lowercased email on success.
pub fn validate_registration(req: &RegisterRequest, rules: &AccountRules) -> ValidationResult<String> {
    let ctx = "User";
    let mut errors = Vec::new();

    let username = req.username.trim();
    if username.is_empty() {
        errors.push(ValidationError::new(ctx, "username", "Username is required"));
    } else if username.chars().count() > MAX_USERNAME_CHARS {
        errors.push(ValidationError::new(
            ctx,
            "username",
            format!("Username cannot exceed {} characters", MAX_USERNAME_CHARS),
        ));
    }

    let email = req.email.trim().to_lowercase();
    if email.is_empty() {
        errors.push(ValidationError::new(ctx, "email", "Email is required"));
    } else if !EMAIL_RE.is_match(&email) {
        errors.push(ValidationError::new(ctx, "email", "Email must be valid"));
    } else if !email.ends_with(&rules.email_domain.to_lowercase()) {
        errors.push(ValidationError::new(
            ctx,
            "email",
            format!("Email must belong to the {} domain", rules.email_domain),
        ));
    }

    if req.password.is_empty() {
        errors.push(ValidationError::new(ctx, "password", "Password is required"));
    } else if req.password.chars().count() > MAX_PASSWORD_CHARS {
        errors.push(ValidationError::new(
            ctx,
            "password",
            format!("Password cannot exceed {} characters", MAX_PASSWORD_CHARS),
        ));
    }

    if errors.is_empty() {
        Ok(email)
    } else {
        Err(errors)
    }
}

pub fn validate_event(req: &EventRequest) -> ValidationResult<ValidEvent> {
    let ctx = "Event";
    let mut errors = Vec::new();

    let name = req.name.trim();
    if name.is_empty() {
        errors.push(ValidationError::new(ctx, "name", "Name is required"));
    }

    let date = collect(&mut errors, ctx, "date", parse_date(&req.date));
    let start = collect(&mut errors, ctx, "startTime", normalize_time(&req.start_time));
    let end = collect(&mut errors, ctx, "endTime", normalize_time(&req.end_time));
    let color_hex = check_color(&mut errors, ctx, req.color_hex.as_deref(), DEFAULT_BLOCK_COLOR);

    match (date, start, end) {
        (Some(date), Some(start), Some(end)) if errors.is_empty() => Ok(ValidEvent {
            name: name.to_string(),
            location: non_blank(req.location.as_deref()),
            description: non_blank(req.description.as_deref()),
            date,
            start,
            end,
            color_hex,
        }),
        _ => Err(errors),
    }
}

pub fn validate_schedule(req: &ScheduleRequest) -> ValidationResult<ValidSchedule> {
    let ctx = "Schedule";
    let mut errors = Vec::new();

    if req.subject_id <= 0 {
        errors.push(ValidationError::new(ctx, "subjectId", "Subject is required"));
    }

    let location = req.location.trim();
    check_required_len(&mut errors, ctx, "location", location, MAX_LOCATION_CHARS);

    let weekday = collect(&mut errors, ctx, "weekday", req.weekday.parse::<Weekday>());
    let start = collect(&mut errors, ctx, "startTime", normalize_time(&req.start_time));
    let end = collect(&mut errors, ctx, "endTime", normalize_time(&req.end_time));

    let professor = non_blank(req.professor.as_deref());
    if let Some(p) = &professor {
        check_max_len(&mut errors, ctx, "professor", p, MAX_PROFESSOR_CHARS);
    }

    let class_type = match non_blank(req.class_type.as_deref()) {
        Some(raw) => collect(&mut errors, ctx, "classType", raw.parse::<ClassType>()),
        None => None,
    };

    let color_hex = check_color(&mut errors, ctx, req.color_hex.as_deref(), DEFAULT_BLOCK_COLOR);

    match (weekday, start, end) {
        (Some(weekday), Some(start), Some(end)) if errors.is_empty() => Ok(ValidSchedule {
            subject_id: req.subject_id,
            location: location.to_string(),
            weekday,
            start,
            end,
            professor,
            class_type,
            color_hex,
        }),
        _ => Err(errors),
    }
}

pub fn validate_evaluation(req: &EvaluationRequest) -> ValidationResult<ValidEvaluation> {
    let ctx = "Evaluation";
    let mut errors = Vec::new();

    let title = req.title.trim();
    check_required_len(&mut errors, ctx, "title", title, MAX_TITLE_CHARS);

    if req.subject_id <= 0 {
        errors.push(ValidationError::new(ctx, "subjectId", "Subject is required"));
    }

    if !req.weight.is_finite() || req.weight < 0.0 || req.weight > MAX_WEIGHT {
        errors.push(ValidationError::new(
            ctx,
            "weight",
            format!("Weight must be between 0 and {}", MAX_WEIGHT),
        ));
    }

    if !req.score.is_finite() || req.score < 0.0 || req.score > MAX_SCORE {
        errors.push(ValidationError::new(
            ctx,
            "score",
            format!("Score must be between 0 and {}", MAX_SCORE),
        ));
    }

    let professor = req.professor.trim();
    check_required_len(&mut errors, ctx, "professor", professor, MAX_PROFESSOR_CHARS);

    let location = req.location.trim();
    check_required_len(&mut errors, ctx, "location", location, MAX_LOCATION_CHARS);

    let date = collect(&mut errors, ctx, "date", parse_date(&req.date));
    let start = collect(&mut errors, ctx, "startTime", normalize_time(&req.start_time));
    let end = collect(&mut errors, ctx, "endTime", normalize_time(&req.end_time));
    let color_hex =
        check_color(&mut errors, ctx, req.color_hex.as_deref(), DEFAULT_EVALUATION_COLOR);

    match (date, start, end) {
        (Some(date), Some(start), Some(end)) if errors.is_empty() => Ok(ValidEvaluation {
            title: title.to_string(),
            subject_id: req.subject_id,
            weight: req.weight,
            score: req.score,
            professor: professor.to_string(),
            location: location.to_string(),
            description: non_blank(req.description.as_deref()),
            date,
            start,
            end,
            color_hex,
        }),
        _ => Err(errors),
    }
}

/// End must be strictly after start
pub fn ensure_time_order(start: NaiveTime, end: NaiveTime) -> Result<(), String> {
    if end <= start {
        Err(format!(
            "End time ({}) must be after start time ({})",
            format_hhmm(end),
            format_hhmm(start)
        ))
    } else {
        Ok(())
    }
}

pub fn is_valid_color(color: &str) -> bool {
    COLOR_RE.is_match(color)
}

// ============================================================================
// HELPERS
// ============================================================================

fn collect<T, E: std::fmt::Display>(
    errors: &mut Vec<ValidationError>,
    ctx: &str,
    field: &str,
    result: Result<T, E>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            errors.push(ValidationError::new(ctx, field, e.to_string()));
            None
        }
    }
}

fn check_required_len(
    errors: &mut Vec<ValidationError>,
    ctx: &str,
    field: &str,
    value: &str,
    max: usize,
) {
    if value.is_empty() {
        errors.push(ValidationError::new(ctx, field, "Required field is empty"));
    } else {
        check_max_len(errors, ctx, field, value, max);
    }
}

fn check_max_len(errors: &mut Vec<ValidationError>, ctx: &str, field: &str, value: &str, max: usize) {
    if value.chars().count() > max {
        errors.push(ValidationError::new(
            ctx,
            field,
            format!("Cannot exceed {} characters", max),
        ));
    }
}

fn check_color(
    errors: &mut Vec<ValidationError>,
    ctx: &str,
    color: Option<&str>,
    default: &str,
) -> String {
    match non_blank(color) {
        Some(c) if is_valid_color(&c) => c.to_uppercase(),
        Some(c) => {
            errors.push(ValidationError::new(
                ctx,
                "colorHex",
                format!("\"{}\" must be a hex color #RRGGBB", c),
            ));
            default.to_string()
        }
        None => default.to_string(),
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}
