// 🧭 Planner - Use-case facade over storage
//
// Every write goes through the same pipeline:
//   validate fields → check time order → check references →
//   check conflicts / weight budget → persist → read back
//
// Items are scoped by owner: another user's item id is reported as not found.

use crate::calendar::{project_week, MonthGrid, WeekView, WeekWindow};
use crate::conflicts::{find_event_conflict, find_slot_conflict, overlaps};
use crate::db;
use crate::entities::{
    hash_password, new_salt, BatchScheduleRequest, Evaluation, EvaluationRequest, Event,
    EventRequest, LoginRequest, RegisterRequest, ScheduleRequest, ScheduleSlot, Subject, User,
    Weekday,
};
use crate::error::{PlannerError, PlannerResult};
use crate::grades::{check_weight_budget, GradeReport};
use crate::search::{self, SearchResult};
use crate::validation::{
    ensure_time_order, validate_evaluation, validate_event, validate_registration,
    validate_schedule, AccountRules, ValidEvent, ValidSchedule, ValidationError,
};
use chrono::NaiveDate;
use log::{info, warn};
use rusqlite::Connection;
use std::collections::HashSet;

pub struct Planner<'c> {
    conn: &'c Connection,
    rules: AccountRules,
}

impl<'c> Planner<'c> {
    pub fn new(conn: &'c Connection, rules: AccountRules) -> Self {
        Planner { conn, rules }
    }

    // ========================================================================
    // ACCOUNTS
    // ========================================================================

    pub fn register(&self, req: &RegisterRequest) -> PlannerResult<User> {
        let email = validate_registration(req, &self.rules)?;

        if db::user_exists_by_email(self.conn, &email)? {
            warn!("event=register status=rejected reason=email_taken");
            return Err(PlannerError::EmailTaken);
        }

        let salt = new_salt();
        let hash = hash_password(&salt, &req.password);
        let id = db::insert_user(self.conn, req.username.trim(), &email, &hash, &salt)?;

        info!("event=register status=ok user_id={}", id);
        self.get_user(id)
    }

    /// Unknown email and wrong password fail the same way
    pub fn login(&self, req: &LoginRequest) -> PlannerResult<User> {
        let email = req.email.trim().to_lowercase();
        let mut errors = Vec::new();
        if email.is_empty() {
            errors.push(required("User", "email"));
        }
        if req.password.is_empty() {
            errors.push(required("User", "password"));
        }
        if !errors.is_empty() {
            return Err(PlannerError::Validation(errors));
        }

        match db::find_user_by_email(self.conn, &email)? {
            Some(record) if record.verify_password(&req.password) => {
                info!("event=login status=ok user_id={}", record.id);
                Ok(record.to_user())
            }
            _ => {
                warn!("event=login status=rejected");
                Err(PlannerError::InvalidCredentials)
            }
        }
    }

    pub fn get_user(&self, id: i64) -> PlannerResult<User> {
        db::get_user(self.conn, id)?.ok_or_else(|| PlannerError::not_found("User", id))
    }

    pub fn list_subjects(&self) -> PlannerResult<Vec<Subject>> {
        Ok(db::list_subjects(self.conn)?)
    }

    // ========================================================================
    // EVENTS
    // ========================================================================

    pub fn list_events(&self, user_id: i64) -> PlannerResult<Vec<Event>> {
        self.get_user(user_id)?;
        Ok(db::list_events_for_user(self.conn, user_id)?)
    }

    pub fn create_event(&self, user_id: i64, req: &EventRequest) -> PlannerResult<Event> {
        self.get_user(user_id)?;
        let event = validate_event(req)?;
        ensure_time_order(event.start, event.end).map_err(PlannerError::InvalidTime)?;
        self.check_event_conflict(user_id, &event, None)?;

        let id = db::insert_event(self.conn, user_id, &event)?;
        info!("event=event_created user_id={} id={} date={}", user_id, id, event.date);
        self.owned_event(user_id, id)
    }

    pub fn update_event(&self, user_id: i64, id: i64, req: &EventRequest) -> PlannerResult<Event> {
        self.owned_event(user_id, id)?;
        let event = validate_event(req)?;
        ensure_time_order(event.start, event.end).map_err(PlannerError::InvalidTime)?;
        self.check_event_conflict(user_id, &event, Some(id))?;

        db::update_event(self.conn, id, user_id, &event)?;
        info!("event=event_updated user_id={} id={}", user_id, id);
        self.owned_event(user_id, id)
    }

    pub fn delete_event(&self, user_id: i64, id: i64) -> PlannerResult<()> {
        if !db::delete_event(self.conn, id, user_id)? {
            return Err(PlannerError::not_found("Event", id));
        }
        info!("event=event_deleted user_id={} id={}", user_id, id);
        Ok(())
    }

    fn owned_event(&self, user_id: i64, id: i64) -> PlannerResult<Event> {
        db::get_event(self.conn, id)?
            .filter(|e| e.user_id == user_id)
            .ok_or_else(|| PlannerError::not_found("Event", id))
    }

    fn check_event_conflict(
        &self,
        user_id: i64,
        event: &ValidEvent,
        exclude: Option<i64>,
    ) -> PlannerResult<()> {
        let events = db::list_events_for_user(self.conn, user_id)?;
        let slots = db::list_schedule_slots_for_user(self.conn, user_id)?;
        match find_event_conflict(event.date, event.start, event.end, &events, &slots, exclude) {
            Some(conflict) => {
                warn!(
                    "event=conflict user_id={} kind=event with_id={}",
                    user_id, conflict.id
                );
                Err(PlannerError::Conflict(conflict.to_string()))
            }
            None => Ok(()),
        }
    }

    // ========================================================================
    // SCHEDULE SLOTS
    // ========================================================================

    pub fn list_schedules(&self, user_id: i64) -> PlannerResult<Vec<ScheduleSlot>> {
        self.get_user(user_id)?;
        Ok(db::list_schedule_slots_for_user(self.conn, user_id)?)
    }

    pub fn create_schedule(&self, user_id: i64, req: &ScheduleRequest) -> PlannerResult<ScheduleSlot> {
        self.get_user(user_id)?;
        let slot = self.prepare_schedule(req)?;
        self.check_slot_conflict(user_id, &slot, None)?;

        let id = db::insert_schedule_slot(self.conn, user_id, &slot)?;
        info!(
            "event=schedule_created user_id={} id={} weekday={}",
            user_id, id, slot.weekday
        );
        self.owned_slot(user_id, id)
    }

    /// All days are validated and conflict-checked before anything is stored;
    /// the inserts share one transaction.
    pub fn create_schedule_batch(
        &self,
        user_id: i64,
        req: &BatchScheduleRequest,
    ) -> PlannerResult<Vec<ScheduleSlot>> {
        self.get_user(user_id)?;

        let requests = req.expand();
        if requests.is_empty() {
            return Err(PlannerError::Validation(vec![ValidationError {
                field: "days".to_string(),
                message: "At least one day is required".to_string(),
                context: "Schedule".to_string(),
            }]));
        }

        let mut prepared = Vec::with_capacity(requests.len());
        let mut errors = Vec::new();
        for request in &requests {
            match validate_schedule(request) {
                Ok(slot) => prepared.push(slot),
                Err(mut day_errors) => errors.append(&mut day_errors),
            }
        }
        if !errors.is_empty() {
            return Err(PlannerError::Validation(errors));
        }

        let mut seen: HashSet<Weekday> = HashSet::new();
        for slot in &prepared {
            if !seen.insert(slot.weekday) {
                return Err(PlannerError::Validation(vec![ValidationError {
                    field: "days".to_string(),
                    message: format!("{} appears more than once", slot.weekday),
                    context: "Schedule".to_string(),
                }]));
            }
            ensure_time_order(slot.start, slot.end).map_err(PlannerError::InvalidTime)?;
        }

        self.require_subject(req.subject_id)?;
        // Days are distinct, so batch members cannot overlap each other
        for slot in &prepared {
            self.check_slot_conflict(user_id, slot, None)?;
        }

        let tx = self.conn.unchecked_transaction()?;
        let mut ids = Vec::with_capacity(prepared.len());
        for slot in &prepared {
            ids.push(db::insert_schedule_slot(&tx, user_id, slot)?);
        }
        tx.commit()?;

        info!(
            "event=schedule_batch_created user_id={} count={}",
            user_id,
            ids.len()
        );
        ids.into_iter().map(|id| self.owned_slot(user_id, id)).collect()
    }

    /// Store imported rows all-or-nothing. A row is rejected when it
    /// conflicts with stored items or with an earlier row of the import.
    pub fn import_schedule(
        &self,
        user_id: i64,
        requests: &[ScheduleRequest],
    ) -> PlannerResult<Vec<ScheduleSlot>> {
        self.get_user(user_id)?;

        let mut prepared: Vec<ValidSchedule> = Vec::with_capacity(requests.len());
        for (index, request) in requests.iter().enumerate() {
            let row = index + 1;
            let slot = self
                .prepare_schedule(request)
                .map_err(|err| in_row(row, err))?;
            self.check_slot_conflict(user_id, &slot, None)
                .map_err(|err| in_row(row, err))?;

            if let Some(earlier) = prepared.iter().position(|p| {
                p.weekday == slot.weekday && overlaps(p.start, p.end, slot.start, slot.end)
            }) {
                return Err(PlannerError::Conflict(format!(
                    "Row {} overlaps row {} on {}",
                    row,
                    earlier + 1,
                    slot.weekday
                )));
            }
            prepared.push(slot);
        }

        let tx = self.conn.unchecked_transaction()?;
        let mut ids = Vec::with_capacity(prepared.len());
        for slot in &prepared {
            ids.push(db::insert_schedule_slot(&tx, user_id, slot)?);
        }
        tx.commit()?;

        info!(
            "event=schedule_imported user_id={} count={}",
            user_id,
            ids.len()
        );
        ids.into_iter().map(|id| self.owned_slot(user_id, id)).collect()
    }

    pub fn update_schedule(
        &self,
        user_id: i64,
        id: i64,
        req: &ScheduleRequest,
    ) -> PlannerResult<ScheduleSlot> {
        self.owned_slot(user_id, id)?;
        let slot = self.prepare_schedule(req)?;
        self.check_slot_conflict(user_id, &slot, Some(id))?;

        db::update_schedule_slot(self.conn, id, user_id, &slot)?;
        info!("event=schedule_updated user_id={} id={}", user_id, id);
        self.owned_slot(user_id, id)
    }

    pub fn delete_schedule(&self, user_id: i64, id: i64) -> PlannerResult<()> {
        if !db::delete_schedule_slot(self.conn, id, user_id)? {
            return Err(PlannerError::not_found("Schedule", id));
        }
        info!("event=schedule_deleted user_id={} id={}", user_id, id);
        Ok(())
    }

    fn prepare_schedule(&self, req: &ScheduleRequest) -> PlannerResult<ValidSchedule> {
        let slot = validate_schedule(req)?;
        ensure_time_order(slot.start, slot.end).map_err(PlannerError::InvalidTime)?;
        self.require_subject(slot.subject_id)?;
        Ok(slot)
    }

    fn owned_slot(&self, user_id: i64, id: i64) -> PlannerResult<ScheduleSlot> {
        db::get_schedule_slot(self.conn, id)?
            .filter(|s| s.user_id == user_id)
            .ok_or_else(|| PlannerError::not_found("Schedule", id))
    }

    fn check_slot_conflict(
        &self,
        user_id: i64,
        slot: &ValidSchedule,
        exclude: Option<i64>,
    ) -> PlannerResult<()> {
        let slots = db::list_schedule_slots_for_user(self.conn, user_id)?;
        let events = db::list_events_for_user(self.conn, user_id)?;
        match find_slot_conflict(slot.weekday, slot.start, slot.end, &slots, &events, exclude) {
            Some(conflict) => {
                warn!(
                    "event=conflict user_id={} kind=schedule with_id={}",
                    user_id, conflict.id
                );
                Err(PlannerError::Conflict(conflict.to_string()))
            }
            None => Ok(()),
        }
    }

    // ========================================================================
    // EVALUATIONS
    // ========================================================================

    pub fn list_evaluations(&self, user_id: i64) -> PlannerResult<Vec<Evaluation>> {
        self.get_user(user_id)?;
        Ok(db::list_evaluations_for_user(self.conn, user_id)?)
    }

    pub fn create_evaluation(
        &self,
        user_id: i64,
        req: &EvaluationRequest,
    ) -> PlannerResult<Evaluation> {
        self.get_user(user_id)?;
        let eval = validate_evaluation(req)?;
        ensure_time_order(eval.start, eval.end).map_err(PlannerError::InvalidTime)?;
        let subject = self.require_subject(eval.subject_id)?;
        self.check_weight(user_id, &subject, eval.weight, None)?;

        let id = db::insert_evaluation(self.conn, user_id, &eval)?;
        info!(
            "event=evaluation_created user_id={} id={} subject_id={} weight={}",
            user_id, id, subject.id, eval.weight
        );
        self.owned_evaluation(user_id, id)
    }

    pub fn update_evaluation(
        &self,
        user_id: i64,
        id: i64,
        req: &EvaluationRequest,
    ) -> PlannerResult<Evaluation> {
        self.owned_evaluation(user_id, id)?;
        let eval = validate_evaluation(req)?;
        ensure_time_order(eval.start, eval.end).map_err(PlannerError::InvalidTime)?;
        let subject = self.require_subject(eval.subject_id)?;
        self.check_weight(user_id, &subject, eval.weight, Some(id))?;

        db::update_evaluation(self.conn, id, user_id, &eval)?;
        info!("event=evaluation_updated user_id={} id={}", user_id, id);
        self.owned_evaluation(user_id, id)
    }

    pub fn delete_evaluation(&self, user_id: i64, id: i64) -> PlannerResult<()> {
        if !db::delete_evaluation(self.conn, id, user_id)? {
            return Err(PlannerError::not_found("Evaluation", id));
        }
        info!("event=evaluation_deleted user_id={} id={}", user_id, id);
        Ok(())
    }

    fn owned_evaluation(&self, user_id: i64, id: i64) -> PlannerResult<Evaluation> {
        db::get_evaluation(self.conn, id)?
            .filter(|e| e.user_id == user_id)
            .ok_or_else(|| PlannerError::not_found("Evaluation", id))
    }

    fn check_weight(
        &self,
        user_id: i64,
        subject: &Subject,
        requested: f64,
        exclude: Option<i64>,
    ) -> PlannerResult<()> {
        let existing = db::list_evaluations_for_user(self.conn, user_id)?;
        check_weight_budget(&existing, subject.id, requested, exclude)
            .map(|_| ())
            .map_err(|err| {
                warn!(
                    "event=weight_exceeded user_id={} subject_id={} total={}",
                    user_id,
                    subject.id,
                    err.total()
                );
                PlannerError::WeightExceeded {
                    subject: subject.name.clone(),
                    existing: err.existing,
                    requested: err.requested,
                }
            })
    }

    // ========================================================================
    // VIEWS
    // ========================================================================

    pub fn grade_report(&self, user_id: i64) -> PlannerResult<GradeReport> {
        let evaluations = self.list_evaluations(user_id)?;
        Ok(GradeReport::build(&evaluations))
    }

    /// The Sunday-based week containing `date`, with every item placed
    pub fn week_view(&self, user_id: i64, date: NaiveDate) -> PlannerResult<WeekView> {
        let events = self.list_events(user_id)?;
        let slots = db::list_schedule_slots_for_user(self.conn, user_id)?;
        let evaluations = db::list_evaluations_for_user(self.conn, user_id)?;
        Ok(project_week(
            WeekWindow::containing(date),
            &events,
            &slots,
            &evaluations,
        ))
    }

    pub fn month_view(&self, date: NaiveDate, today: NaiveDate) -> MonthGrid {
        MonthGrid::for_month(date, today)
    }

    pub fn search(
        &self,
        user_id: i64,
        term: &str,
        today: NaiveDate,
    ) -> PlannerResult<Option<SearchResult>> {
        let events = self.list_events(user_id)?;
        let slots = db::list_schedule_slots_for_user(self.conn, user_id)?;
        let evaluations = db::list_evaluations_for_user(self.conn, user_id)?;
        Ok(search::search(term, &events, &slots, &evaluations, today))
    }

    // ========================================================================
    // HELPERS
    // ========================================================================

    fn require_subject(&self, subject_id: i64) -> PlannerResult<Subject> {
        db::get_subject(self.conn, subject_id)?.ok_or_else(|| {
            PlannerError::Validation(vec![ValidationError {
                field: "subjectId".to_string(),
                message: format!("Unknown subject {}", subject_id),
                context: "Subject".to_string(),
            }])
        })
    }
}

/// Put an import row number into an error's message
fn in_row(row: usize, err: PlannerError) -> PlannerError {
    match err {
        PlannerError::Validation(errors) => PlannerError::Validation(
            errors
                .into_iter()
                .map(|mut e| {
                    e.field = format!("Row {} {}", row, e.field);
                    e.context = format!("Row {}", row);
                    e
                })
                .collect(),
        ),
        PlannerError::InvalidTime(msg) => PlannerError::InvalidTime(format!("Row {}: {}", row, msg)),
        PlannerError::Conflict(msg) => PlannerError::Conflict(format!("Row {}: {}", row, msg)),
        other => other,
    }
}

fn required(context: &str, field: &str) -> ValidationError {
    ValidationError {
        field: field.to_string(),
        message: "Required field is empty".to_string(),
        context: context.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planner(conn: &Connection) -> Planner<'_> {
        Planner::new(conn, AccountRules::default())
    }

    fn register(p: &Planner, email: &str) -> User {
        p.register(&RegisterRequest {
            username: "estudiante".to_string(),
            email: email.to_string(),
            password: "secreta".to_string(),
        })
        .unwrap()
    }

    fn event_req(date: &str, start: &str, end: &str) -> EventRequest {
        EventRequest {
            name: "Estudio".to_string(),
            date: date.to_string(),
            start_time: start.to_string(),
            end_time: end.to_string(),
            ..Default::default()
        }
    }

    fn slot_req(weekday: &str, start: &str, end: &str) -> ScheduleRequest {
        ScheduleRequest {
            subject_id: 1,
            location: "A-1".to_string(),
            weekday: weekday.to_string(),
            start_time: start.to_string(),
            end_time: end.to_string(),
            ..Default::default()
        }
    }

    fn eval_req(subject_id: i64, weight: f64, score: f64) -> EvaluationRequest {
        EvaluationRequest {
            title: "Parcial".to_string(),
            subject_id,
            weight,
            score,
            professor: "Prof".to_string(),
            location: "B-2".to_string(),
            date: "2025-05-20".to_string(),
            start_time: "08:00".to_string(),
            end_time: "10:00".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_register_and_login() {
        let conn = db::open_in_memory().unwrap();
        let p = planner(&conn);

        let user = register(&p, "Ana@EST.ucab.edu.ve");
        assert_eq!(user.email, "ana@est.ucab.edu.ve");

        let again = p.register(&RegisterRequest {
            username: "otra".to_string(),
            email: "ana@est.ucab.edu.ve".to_string(),
            password: "x".to_string(),
        });
        assert!(matches!(again, Err(PlannerError::EmailTaken)));

        let ok = p
            .login(&LoginRequest {
                email: " ANA@est.ucab.edu.ve ".to_string(),
                password: "secreta".to_string(),
            })
            .unwrap();
        assert_eq!(ok.id, user.id);

        let wrong = p.login(&LoginRequest {
            email: "ana@est.ucab.edu.ve".to_string(),
            password: "otra".to_string(),
        });
        let unknown = p.login(&LoginRequest {
            email: "nadie@est.ucab.edu.ve".to_string(),
            password: "secreta".to_string(),
        });
        assert_eq!(wrong.unwrap_err().to_string(), unknown.unwrap_err().to_string());
    }

    #[test]
    fn test_event_conflicts_and_update_excludes_self() {
        let conn = db::open_in_memory().unwrap();
        let p = planner(&conn);
        let user = register(&p, "a@est.ucab.edu.ve");

        let first = p.create_event(user.id, &event_req("2025-05-12", "10:00", "11:00")).unwrap();
        let clash = p.create_event(user.id, &event_req("2025-05-12", "10:30", "12:00"));
        assert!(matches!(clash, Err(PlannerError::Conflict(_))));

        // touching is fine
        p.create_event(user.id, &event_req("2025-05-12", "11:00", "12:00")).unwrap();

        // moving the first event within its own slot
        let moved = p
            .update_event(user.id, first.id, &event_req("2025-05-12", "9:30", "10:30"))
            .unwrap();
        assert_eq!(moved.start_time().to_string(), "09:30:00");
    }

    #[test]
    fn test_bad_time_order() {
        let conn = db::open_in_memory().unwrap();
        let p = planner(&conn);
        let user = register(&p, "a@est.ucab.edu.ve");
        let result = p.create_event(user.id, &event_req("2025-05-12", "3 PM", "14:00"));
        assert!(matches!(result, Err(PlannerError::InvalidTime(_))));
    }

    #[test]
    fn test_slot_vs_event_conflict() {
        let conn = db::open_in_memory().unwrap();
        let p = planner(&conn);
        let user = register(&p, "a@est.ucab.edu.ve");

        // 2025-05-12 is a Monday
        p.create_event(user.id, &event_req("2025-05-12", "08:00", "09:00")).unwrap();
        let clash = p.create_schedule(user.id, &slot_req("Lunes", "07:00", "08:30"));
        assert!(matches!(clash, Err(PlannerError::Conflict(_))));

        let slot = p.create_schedule(user.id, &slot_req("Martes", "07:00", "08:30")).unwrap();
        assert_eq!(slot.subject.id, 1);
        let clash = p.create_event(user.id, &event_req("2025-05-13", "08:00", "09:00"));
        assert!(matches!(clash, Err(PlannerError::Conflict(_))));
    }

    #[test]
    fn test_batch_is_all_or_nothing() {
        let conn = db::open_in_memory().unwrap();
        let p = planner(&conn);
        let user = register(&p, "a@est.ucab.edu.ve");

        p.create_schedule(user.id, &slot_req("Jueves", "09:00", "11:00")).unwrap();

        let batch = BatchScheduleRequest {
            subject_id: 2,
            location: "Lab".to_string(),
            days: vec![
                crate::entities::ScheduleDay {
                    weekday: "Lunes".to_string(),
                    start_time: "09:00".to_string(),
                    end_time: "11:00".to_string(),
                },
                crate::entities::ScheduleDay {
                    weekday: "Jueves".to_string(),
                    start_time: "10:00".to_string(),
                    end_time: "12:00".to_string(),
                },
            ],
            ..Default::default()
        };
        assert!(matches!(
            p.create_schedule_batch(user.id, &batch),
            Err(PlannerError::Conflict(_))
        ));
        assert_eq!(p.list_schedules(user.id).unwrap().len(), 1);

        let mut dup = batch.clone();
        dup.days[1].weekday = "lunes".to_string();
        assert!(matches!(
            p.create_schedule_batch(user.id, &dup),
            Err(PlannerError::Validation(_))
        ));

        let mut ok = batch.clone();
        ok.days[1].weekday = "Viernes".to_string();
        let created = p.create_schedule_batch(user.id, &ok).unwrap();
        assert_eq!(created.len(), 2);
        assert_eq!(p.list_schedules(user.id).unwrap().len(), 3);
    }

    #[test]
    fn test_weight_budget_enforced() {
        let conn = db::open_in_memory().unwrap();
        let p = planner(&conn);
        let user = register(&p, "a@est.ucab.edu.ve");

        let first = p.create_evaluation(user.id, &eval_req(3, 60.0, 12.0)).unwrap();
        let over = p.create_evaluation(user.id, &eval_req(3, 50.0, 12.0));
        match over {
            Err(PlannerError::WeightExceeded { existing, requested, .. }) => {
                assert_eq!(existing, 60.0);
                assert_eq!(requested, 50.0);
            }
            other => panic!("expected weight error, got {:?}", other),
        }

        // other subjects have their own budget
        p.create_evaluation(user.id, &eval_req(4, 50.0, 12.0)).unwrap();

        // update replaces its own weight
        p.update_evaluation(user.id, first.id, &eval_req(3, 100.0, 15.0)).unwrap();

        let report = p.grade_report(user.id).unwrap();
        assert_eq!(report.subjects.len(), 2);
        assert!((report.find_subject(3).unwrap().total - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_items_scoped_by_owner() {
        let conn = db::open_in_memory().unwrap();
        let p = planner(&conn);
        let ana = register(&p, "ana@est.ucab.edu.ve");
        let luis = register(&p, "luis@est.ucab.edu.ve");

        let event = p.create_event(ana.id, &event_req("2025-05-12", "10:00", "11:00")).unwrap();
        assert!(matches!(
            p.delete_event(luis.id, event.id),
            Err(PlannerError::NotFound(_))
        ));
        assert!(matches!(
            p.update_event(luis.id, event.id, &event_req("2025-05-12", "10:00", "11:00")),
            Err(PlannerError::NotFound(_))
        ));

        // Luis is free to book the same time
        p.create_event(luis.id, &event_req("2025-05-12", "10:00", "11:00")).unwrap();
        assert!(matches!(p.list_events(999), Err(PlannerError::NotFound(_))));
    }

    #[test]
    fn test_week_view_and_search() {
        let conn = db::open_in_memory().unwrap();
        let p = planner(&conn);
        let user = register(&p, "a@est.ucab.edu.ve");

        p.create_schedule(user.id, &slot_req("Lunes", "07:00", "09:00")).unwrap();
        p.create_evaluation(user.id, &eval_req(2, 20.0, 18.0)).unwrap();

        let date = NaiveDate::from_ymd_opt(2025, 5, 20).unwrap();
        let week = p.week_view(user.id, date).unwrap();
        assert_eq!(week.start, NaiveDate::from_ymd_opt(2025, 5, 18).unwrap());
        assert_eq!(week.total_occurrences(), 2);

        let hit = p.search(user.id, "parcial", date).unwrap().unwrap();
        assert_eq!(hit.week_start, week.start);
        assert!(p.search(user.id, "nada", date).unwrap().is_none());
    }

    #[test]
    fn test_import_rejects_overlapping_rows() {
        let conn = db::open_in_memory().unwrap();
        let p = planner(&conn);
        let user = register(&p, "a@est.ucab.edu.ve");

        let rows = vec![
            slot_req("Lunes", "07:00", "09:00"),
            slot_req("Martes", "07:00", "09:00"),
            slot_req("lunes", "08:00", "10:00"),
        ];
        let err = p.import_schedule(user.id, &rows).unwrap_err();
        assert!(matches!(err, PlannerError::Conflict(ref m) if m.contains("Row 3 overlaps row 1")));
        assert!(p.list_schedules(user.id).unwrap().is_empty());

        let mut bad = slot_req("Lunes", "07:00", "09:00");
        bad.location = String::new();
        match p.import_schedule(user.id, &[slot_req("Jueves", "07:00", "09:00"), bad]) {
            Err(PlannerError::Validation(errors)) => assert_eq!(errors[0].context, "Row 2"),
            other => panic!("unexpected {:?}", other),
        }

        let stored = p.import_schedule(user.id, &rows[..2]).unwrap();
        assert_eq!(stored.len(), 2);
    }

    #[test]
    fn test_import_errors_name_the_row() {
        let conn = db::open_in_memory().unwrap();
        let p = planner(&conn);
        let user = register(&p, "a@est.ucab.edu.ve");
        let mut cita = event_req("2025-05-12", "08:00", "09:00");
        cita.name = "Cita".to_string();
        p.create_event(user.id, &cita).unwrap();

        let first = slot_req("Martes", "07:00", "09:00");

        let backwards = slot_req("Jueves", "10:00", "09:00");
        let mut unknown_subject = slot_req("Jueves", "07:00", "09:00");
        unknown_subject.subject_id = 999;
        let bad_weekday = slot_req("Funday", "07:00", "09:00");
        let over_event = slot_req("Lunes", "07:30", "08:30");

        for second in [backwards, unknown_subject, bad_weekday, over_event] {
            let err = p
                .import_schedule(user.id, &[first.clone(), second.clone()])
                .unwrap_err();
            assert!(
                err.to_string().contains("Row 2"),
                "{:?} gave {}",
                second,
                err
            );
            assert!(!err.to_string().contains("Row 1"));
        }
        assert!(p.list_schedules(user.id).unwrap().is_empty());
    }

    #[test]
    fn test_update_schedule_excludes_itself() {
        let conn = db::open_in_memory().unwrap();
        let p = planner(&conn);
        let user = register(&p, "a@est.ucab.edu.ve");

        let slot = p.create_schedule(user.id, &slot_req("Lunes", "07:00", "09:00")).unwrap();
        let other = p.create_schedule(user.id, &slot_req("Lunes", "11:00", "13:00")).unwrap();

        // overlapping its own old time is allowed
        let moved = p
            .update_schedule(user.id, slot.id, &slot_req("Lunes", "08:00", "10:00"))
            .unwrap();
        assert_eq!(moved.id, slot.id);
        assert_eq!(moved.start_time.format("%H:%M").to_string(), "08:00");

        let clash = p.update_schedule(user.id, slot.id, &slot_req("Lunes", "10:00", "12:00"));
        assert!(matches!(clash, Err(PlannerError::Conflict(ref m)) if m.starts_with("Overlaps with class")));

        // failed update leaves the stored slot alone
        let stored = p.list_schedules(user.id).unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].start_time.format("%H:%M").to_string(), "08:00");

        let luis = register(&p, "luis@est.ucab.edu.ve");
        assert!(matches!(
            p.update_schedule(luis.id, other.id, &slot_req("Martes", "07:00", "08:00")),
            Err(PlannerError::NotFound(_))
        ));
    }
}
