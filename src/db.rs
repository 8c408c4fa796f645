// 🗄️ Storage Layer - SQLite persistence
//
// Tables: users, subjects, events, schedule_slots, evaluations.
// Date-times are ISO text ("2025-05-12T08:00:00"), class times are "HH:MM".
// Every item table carries user_id; callers always filter by owner.

use crate::entities::{
    ClassType, Evaluation, Event, ScheduleSlot, Subject, SubjectRegistry, User, UserRecord,
    Weekday,
};
use crate::time_input::{format_hhmm, parse_time24};
use crate::validation::{ValidEvaluation, ValidEvent, ValidSchedule};
use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

// ============================================================================
// SETUP
// ============================================================================

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL,
            email TEXT UNIQUE NOT NULL,
            password_hash TEXT NOT NULL,
            salt TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS subjects (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            semester TEXT NOT NULL,
            credits INTEGER NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            description TEXT,
            location TEXT,
            start_at TEXT NOT NULL,
            end_at TEXT NOT NULL,
            color_hex TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS schedule_slots (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            subject_id INTEGER NOT NULL REFERENCES subjects(id),
            location TEXT NOT NULL,
            weekday TEXT NOT NULL,
            start_time TEXT NOT NULL,
            end_time TEXT NOT NULL,
            professor TEXT,
            class_type TEXT,
            color_hex TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS evaluations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            subject_id INTEGER NOT NULL REFERENCES subjects(id),
            title TEXT NOT NULL,
            weight REAL NOT NULL,
            score REAL NOT NULL,
            professor TEXT NOT NULL,
            location TEXT NOT NULL,
            description TEXT,
            start_at TEXT NOT NULL,
            end_at TEXT NOT NULL,
            color_hex TEXT NOT NULL
        )",
        [],
    )?;

    // ==========================================================================
    // Indexes
    // ==========================================================================
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_events_user ON events(user_id, start_at)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_slots_user ON schedule_slots(user_id)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_evaluations_user ON evaluations(user_id, subject_id)",
        [],
    )?;

    Ok(())
}

/// Open (or create) a database file, set up tables and seed the catalog
pub fn open_database(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("Failed to open database {}", path.display()))?;
    setup_database(&conn)?;
    seed_subjects(&conn, &SubjectRegistry::new())?;
    Ok(conn)
}

/// In-memory database with tables and catalog, for tests and demos
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    setup_database(&conn)?;
    seed_subjects(&conn, &SubjectRegistry::new())?;
    Ok(conn)
}

// ============================================================================
// SUBJECTS
// ============================================================================

/// Insert catalog subjects that are not there yet. Returns how many were added.
pub fn seed_subjects(conn: &Connection, registry: &SubjectRegistry) -> Result<usize> {
    let mut inserted = 0;
    for subject in registry.all() {
        inserted += conn.execute(
            "INSERT OR IGNORE INTO subjects (id, name, semester, credits) VALUES (?1, ?2, ?3, ?4)",
            params![subject.id, subject.name, subject.semester, subject.credits],
        )?;
    }
    Ok(inserted)
}

pub fn list_subjects(conn: &Connection) -> Result<Vec<Subject>> {
    let mut stmt = conn.prepare("SELECT id, name, semester, credits FROM subjects ORDER BY name")?;
    let subjects = stmt
        .query_map([], |row| subject_from_row(row, 0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(subjects)
}

pub fn get_subject(conn: &Connection, id: i64) -> Result<Option<Subject>> {
    let subject = conn
        .query_row(
            "SELECT id, name, semester, credits FROM subjects WHERE id = ?1",
            params![id],
            |row| subject_from_row(row, 0),
        )
        .optional()?;
    Ok(subject)
}

fn subject_from_row(row: &Row, offset: usize) -> rusqlite::Result<Subject> {
    Ok(Subject {
        id: row.get(offset)?,
        name: row.get(offset + 1)?,
        semester: row.get(offset + 2)?,
        credits: row.get(offset + 3)?,
    })
}

// ============================================================================
// USERS
// ============================================================================

pub fn insert_user(
    conn: &Connection,
    username: &str,
    email: &str,
    password_hash: &str,
    salt: &str,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO users (username, email, password_hash, salt) VALUES (?1, ?2, ?3, ?4)",
        params![username, email, password_hash, salt],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn find_user_by_email(conn: &Connection, email: &str) -> Result<Option<UserRecord>> {
    let record = conn
        .query_row(
            "SELECT id, username, email, password_hash, salt FROM users WHERE email = ?1",
            params![email],
            |row| {
                Ok(UserRecord {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    email: row.get(2)?,
                    password_hash: row.get(3)?,
                    salt: row.get(4)?,
                })
            },
        )
        .optional()?;
    Ok(record)
}

pub fn user_exists_by_email(conn: &Connection, email: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM users WHERE email = ?1",
        params![email],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn get_user(conn: &Connection, id: i64) -> Result<Option<User>> {
    let user = conn
        .query_row(
            "SELECT id, username, email FROM users WHERE id = ?1",
            params![id],
            |row| {
                Ok(User {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    email: row.get(2)?,
                })
            },
        )
        .optional()?;
    Ok(user)
}

// ============================================================================
// EVENTS
// ============================================================================

const EVENT_COLUMNS: &str = "id, user_id, name, description, location, start_at, end_at, color_hex";

pub fn insert_event(conn: &Connection, user_id: i64, event: &ValidEvent) -> Result<i64> {
    conn.execute(
        "INSERT INTO events (user_id, name, description, location, start_at, end_at, color_hex)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            user_id,
            event.name,
            event.description,
            event.location,
            format_datetime(event.date, event.start),
            format_datetime(event.date, event.end),
            event.color_hex,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Returns false when no event with that id belongs to the user
pub fn update_event(conn: &Connection, id: i64, user_id: i64, event: &ValidEvent) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE events
         SET name = ?1, description = ?2, location = ?3, start_at = ?4, end_at = ?5, color_hex = ?6
         WHERE id = ?7 AND user_id = ?8",
        params![
            event.name,
            event.description,
            event.location,
            format_datetime(event.date, event.start),
            format_datetime(event.date, event.end),
            event.color_hex,
            id,
            user_id,
        ],
    )?;
    Ok(changed > 0)
}

pub fn delete_event(conn: &Connection, id: i64, user_id: i64) -> Result<bool> {
    let changed = conn.execute(
        "DELETE FROM events WHERE id = ?1 AND user_id = ?2",
        params![id, user_id],
    )?;
    Ok(changed > 0)
}

pub fn get_event(conn: &Connection, id: i64) -> Result<Option<Event>> {
    let sql = format!("SELECT {} FROM events WHERE id = ?1", EVENT_COLUMNS);
    let event = conn.query_row(&sql, params![id], event_from_row).optional()?;
    Ok(event)
}

pub fn list_events_for_user(conn: &Connection, user_id: i64) -> Result<Vec<Event>> {
    let sql = format!(
        "SELECT {} FROM events WHERE user_id = ?1 ORDER BY start_at, id",
        EVENT_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let events = stmt
        .query_map(params![user_id], event_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(events)
}

fn event_from_row(row: &Row) -> rusqlite::Result<Event> {
    Ok(Event {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        location: row.get(4)?,
        start: datetime_column(row, 5)?,
        end: datetime_column(row, 6)?,
        color_hex: row.get(7)?,
    })
}

// ============================================================================
// SCHEDULE SLOTS
// ============================================================================

const SLOT_SELECT: &str = "SELECT s.id, s.user_id, s.location, s.weekday, s.start_time, s.end_time,
                s.professor, s.class_type, s.color_hex,
                sub.id, sub.name, sub.semester, sub.credits
         FROM schedule_slots s
         JOIN subjects sub ON sub.id = s.subject_id";

pub fn insert_schedule_slot(conn: &Connection, user_id: i64, slot: &ValidSchedule) -> Result<i64> {
    conn.execute(
        "INSERT INTO schedule_slots (
            user_id, subject_id, location, weekday, start_time, end_time,
            professor, class_type, color_hex
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            user_id,
            slot.subject_id,
            slot.location,
            slot.weekday.as_str(),
            format_hhmm(slot.start),
            format_hhmm(slot.end),
            slot.professor,
            slot.class_type.map(|c| c.as_str()),
            slot.color_hex,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_schedule_slot(
    conn: &Connection,
    id: i64,
    user_id: i64,
    slot: &ValidSchedule,
) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE schedule_slots
         SET subject_id = ?1, location = ?2, weekday = ?3, start_time = ?4, end_time = ?5,
             professor = ?6, class_type = ?7, color_hex = ?8
         WHERE id = ?9 AND user_id = ?10",
        params![
            slot.subject_id,
            slot.location,
            slot.weekday.as_str(),
            format_hhmm(slot.start),
            format_hhmm(slot.end),
            slot.professor,
            slot.class_type.map(|c| c.as_str()),
            slot.color_hex,
            id,
            user_id,
        ],
    )?;
    Ok(changed > 0)
}

pub fn delete_schedule_slot(conn: &Connection, id: i64, user_id: i64) -> Result<bool> {
    let changed = conn.execute(
        "DELETE FROM schedule_slots WHERE id = ?1 AND user_id = ?2",
        params![id, user_id],
    )?;
    Ok(changed > 0)
}

pub fn get_schedule_slot(conn: &Connection, id: i64) -> Result<Option<ScheduleSlot>> {
    let sql = format!("{} WHERE s.id = ?1", SLOT_SELECT);
    let slot = conn.query_row(&sql, params![id], slot_from_row).optional()?;
    Ok(slot)
}

/// Sorted by weekday (Monday first), then start time
pub fn list_schedule_slots_for_user(conn: &Connection, user_id: i64) -> Result<Vec<ScheduleSlot>> {
    let sql = format!("{} WHERE s.user_id = ?1", SLOT_SELECT);
    let mut stmt = conn.prepare(&sql)?;
    let mut slots = stmt
        .query_map(params![user_id], slot_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    slots.sort_by_key(|s| (s.weekday, s.start_time, s.id));
    Ok(slots)
}

fn slot_from_row(row: &Row) -> rusqlite::Result<ScheduleSlot> {
    let weekday_raw: String = row.get(3)?;
    let weekday: Weekday = weekday_raw
        .parse()
        .map_err(|e: String| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, e.into()))?;

    let class_type_raw: Option<String> = row.get(7)?;
    let class_type = class_type_raw
        .map(|raw| raw.parse::<ClassType>())
        .transpose()
        .map_err(|e: String| rusqlite::Error::FromSqlConversionFailure(7, Type::Text, e.into()))?;

    Ok(ScheduleSlot {
        id: row.get(0)?,
        user_id: row.get(1)?,
        location: row.get(2)?,
        weekday,
        start_time: time_column(row, 4)?,
        end_time: time_column(row, 5)?,
        professor: row.get(6)?,
        class_type,
        color_hex: row.get(8)?,
        subject: subject_from_row(row, 9)?,
    })
}

// ============================================================================
// EVALUATIONS
// ============================================================================

const EVALUATION_SELECT: &str = "SELECT e.id, e.user_id, e.title, e.weight, e.score, e.professor,
                e.location, e.description, e.start_at, e.end_at, e.color_hex,
                sub.id, sub.name, sub.semester, sub.credits
         FROM evaluations e
         JOIN subjects sub ON sub.id = e.subject_id";

pub fn insert_evaluation(conn: &Connection, user_id: i64, eval: &ValidEvaluation) -> Result<i64> {
    conn.execute(
        "INSERT INTO evaluations (
            user_id, subject_id, title, weight, score, professor, location,
            description, start_at, end_at, color_hex
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            user_id,
            eval.subject_id,
            eval.title,
            eval.weight,
            eval.score,
            eval.professor,
            eval.location,
            eval.description,
            format_datetime(eval.date, eval.start),
            format_datetime(eval.date, eval.end),
            eval.color_hex,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_evaluation(
    conn: &Connection,
    id: i64,
    user_id: i64,
    eval: &ValidEvaluation,
) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE evaluations
         SET subject_id = ?1, title = ?2, weight = ?3, score = ?4, professor = ?5,
             location = ?6, description = ?7, start_at = ?8, end_at = ?9, color_hex = ?10
         WHERE id = ?11 AND user_id = ?12",
        params![
            eval.subject_id,
            eval.title,
            eval.weight,
            eval.score,
            eval.professor,
            eval.location,
            eval.description,
            format_datetime(eval.date, eval.start),
            format_datetime(eval.date, eval.end),
            eval.color_hex,
            id,
            user_id,
        ],
    )?;
    Ok(changed > 0)
}

pub fn delete_evaluation(conn: &Connection, id: i64, user_id: i64) -> Result<bool> {
    let changed = conn.execute(
        "DELETE FROM evaluations WHERE id = ?1 AND user_id = ?2",
        params![id, user_id],
    )?;
    Ok(changed > 0)
}

pub fn get_evaluation(conn: &Connection, id: i64) -> Result<Option<Evaluation>> {
    let sql = format!("{} WHERE e.id = ?1", EVALUATION_SELECT);
    let eval = conn.query_row(&sql, params![id], evaluation_from_row).optional()?;
    Ok(eval)
}

pub fn list_evaluations_for_user(conn: &Connection, user_id: i64) -> Result<Vec<Evaluation>> {
    let sql = format!(
        "{} WHERE e.user_id = ?1 ORDER BY e.start_at, e.id",
        EVALUATION_SELECT
    );
    let mut stmt = conn.prepare(&sql)?;
    let evals = stmt
        .query_map(params![user_id], evaluation_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(evals)
}

fn evaluation_from_row(row: &Row) -> rusqlite::Result<Evaluation> {
    Ok(Evaluation {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        weight: row.get(3)?,
        score: row.get(4)?,
        professor: row.get(5)?,
        location: row.get(6)?,
        description: row.get(7)?,
        start: datetime_column(row, 8)?,
        end: datetime_column(row, 9)?,
        color_hex: row.get(10)?,
        subject: subject_from_row(row, 11)?,
    })
}

// ============================================================================
// COLUMN HELPERS
// ============================================================================

fn format_datetime(date: NaiveDate, time: NaiveTime) -> String {
    date.and_time(time).format(DATETIME_FORMAT).to_string()
}

fn datetime_column(row: &Row, idx: usize) -> rusqlite::Result<NaiveDateTime> {
    let raw: String = row.get(idx)?;
    NaiveDateTime::parse_from_str(&raw, DATETIME_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn time_column(row: &Row, idx: usize) -> rusqlite::Result<NaiveTime> {
    let raw: String = row.get(idx)?;
    parse_time24(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into()))
}
