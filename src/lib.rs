// Study Planner - Core Library
// Shared by the terminal client, the API server and the tests

pub mod config;
pub mod logging;
pub mod entities;       // Users, subjects, events, classes, evaluations
pub mod time_input;     // Time-string parsing and normalization
pub mod validation;     // Field checks for incoming requests
pub mod error;          // PlannerError
pub mod conflicts;      // Overlap detection
pub mod grades;         // Weight budget and weighted totals
pub mod calendar;       // Week/month windowing and projection
pub mod search;
pub mod db;
pub mod planner;        // Use-case facade
pub mod session;        // Logged-in user for the terminal client
pub mod transfer;       // CSV import/export

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use config::Config;
pub use entities::{
    BatchScheduleRequest, ClassType, Evaluation, EvaluationRequest, Event, EventRequest,
    LoginRequest, RegisterRequest, ScheduleDay, ScheduleRequest, ScheduleSlot, Subject,
    SubjectRegistry, User, Weekday,
};
pub use error::{PlannerError, PlannerResult};
pub use validation::{AccountRules, ValidationError};
pub use conflicts::{find_event_conflict, find_slot_conflict, overlaps, Conflict};
pub use grades::{check_weight_budget, format_grade, subject_totals, GradeReport, SubjectTotal};
pub use calendar::{
    add_months, project_week, start_of_week, CalendarItem, ItemKind, MonthGrid, Occurrence,
    WeekView, WeekWindow,
};
pub use search::{search, SearchResult};
pub use db::{open_database, open_in_memory, setup_database};
pub use planner::Planner;
pub use session::Session;
pub use transfer::{load_schedule_csv, write_grade_report_csv};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
