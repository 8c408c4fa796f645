// Entity Models
//
// Flat records exchanged as camelCase JSON:
// - User:         account (password kept out of the public view)
// - Subject:      course catalog entry
// - Event:        one-off dated item
// - ScheduleSlot: weekly recurring class block
// - Evaluation:   graded assessment tied to a subject

pub mod user;
pub mod subject;
pub mod event;
pub mod schedule;
pub mod evaluation;

pub use user::{User, UserRecord, RegisterRequest, LoginRequest, hash_password, new_salt};
pub use subject::{Subject, SubjectRegistry};
pub use event::{Event, EventRequest};
pub use schedule::{
    ScheduleSlot, ScheduleRequest, ScheduleDay, BatchScheduleRequest, Weekday, ClassType,
};
pub use evaluation::{Evaluation, EvaluationRequest, MAX_SCORE, MAX_WEIGHT, PASSING_SCORE};

/// Default color for events and schedule slots
pub const DEFAULT_BLOCK_COLOR: &str = "#2196F3";

/// Default color for evaluations
pub const DEFAULT_EVALUATION_COLOR: &str = "#FF9800";
