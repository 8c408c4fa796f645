// ❗ Planner errors - user-facing failures of planner operations
//
// Storage failures wrap anyhow; everything else carries a message that can
// be shown to the user as-is.

use crate::validation::{join_messages, ValidationError};
use std::fmt;

#[derive(Debug)]
pub enum PlannerError {
    Validation(Vec<ValidationError>),
    InvalidTime(String),
    Conflict(String),
    WeightExceeded {
        subject: String,
        existing: f64,
        requested: f64,
    },
    EmailTaken,
    InvalidCredentials,
    NotFound(String),
    Storage(anyhow::Error),
}

pub type PlannerResult<T> = Result<T, PlannerError>;

impl PlannerError {
    pub fn not_found(what: &str, id: i64) -> Self {
        PlannerError::NotFound(format!("{} {} not found", what, id))
    }

    /// Short machine-readable tag, used in log lines
    pub fn kind(&self) -> &'static str {
        match self {
            PlannerError::Validation(_) => "validation",
            PlannerError::InvalidTime(_) => "invalid_time",
            PlannerError::Conflict(_) => "conflict",
            PlannerError::WeightExceeded { .. } => "weight_exceeded",
            PlannerError::EmailTaken => "email_taken",
            PlannerError::InvalidCredentials => "invalid_credentials",
            PlannerError::NotFound(_) => "not_found",
            PlannerError::Storage(_) => "storage",
        }
    }
}

impl fmt::Display for PlannerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlannerError::Validation(errors) => write!(f, "Invalid data: {}", join_messages(errors)),
            PlannerError::InvalidTime(msg) => f.write_str(msg),
            PlannerError::Conflict(msg) => write!(f, "Schedule conflict: {}", msg),
            PlannerError::WeightExceeded {
                subject,
                existing,
                requested,
            } => write!(
                f,
                "Weight limit exceeded for {}: {:.1}% already assigned, {:.1}% requested, total {:.1}% (max 100%)",
                subject,
                existing,
                requested,
                existing + requested
            ),
            PlannerError::EmailTaken => f.write_str("Email is already registered"),
            PlannerError::InvalidCredentials => f.write_str("Invalid email or password"),
            PlannerError::NotFound(msg) => f.write_str(msg),
            PlannerError::Storage(err) => write!(f, "Storage error: {}", err),
        }
    }
}

impl std::error::Error for PlannerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PlannerError::Storage(err) => {
                let inner: &(dyn std::error::Error + 'static) = err.as_ref();
                Some(inner)
            }
            _ => None,
        }
    }
}

impl From<anyhow::Error> for PlannerError {
    fn from(err: anyhow::Error) -> Self {
        PlannerError::Storage(err)
    }
}

impl From<rusqlite::Error> for PlannerError {
    fn from(err: rusqlite::Error) -> Self {
        PlannerError::Storage(err.into())
    }
}

impl From<Vec<ValidationError>> for PlannerError {
    fn from(errors: Vec<ValidationError>) -> Self {
        PlannerError::Validation(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            PlannerError::InvalidCredentials.to_string(),
            "Invalid email or password"
        );
        assert_eq!(
            PlannerError::not_found("Event", 9).to_string(),
            "Event 9 not found"
        );
        let weight = PlannerError::WeightExceeded {
            subject: "Redes".to_string(),
            existing: 80.0,
            requested: 30.0,
        };
        assert!(weight.to_string().contains("total 110.0%"));
        assert_eq!(weight.kind(), "weight_exceeded");
    }

    #[test]
    fn test_storage_source() {
        use std::error::Error;
        let err = PlannerError::from(anyhow::anyhow!("disk full"));
        assert!(err.source().is_some());
        assert!(err.to_string().contains("disk full"));
    }
}
