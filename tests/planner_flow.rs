use chrono::NaiveDate;
use std::fs;
use study_planner::transfer::{export_grade_report, load_schedule_csv};
use study_planner::{
    open_database, AccountRules, EvaluationRequest, EventRequest, LoginRequest, Planner,
    PlannerError, RegisterRequest, Session,
};
use tempfile::TempDir;

fn rules() -> AccountRules {
    AccountRules::default()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

#[test]
fn data_survives_reopening_the_database() {
    let dir = TempDir::new().expect("tempdir");
    let db_path = dir.path().join("planner.db");

    let user_id = {
        let conn = open_database(&db_path).expect("open");
        let planner = Planner::new(&conn, rules());
        let user = planner
            .register(&RegisterRequest {
                username: "Ana".to_string(),
                email: "ana@est.ucab.edu.ve".to_string(),
                password: "secreta".to_string(),
            })
            .expect("register");
        planner
            .create_event(
                user.id,
                &EventRequest {
                    name: "Tutoría".to_string(),
                    date: "2025-05-12".to_string(),
                    start_time: "2 PM".to_string(),
                    end_time: "3:30 PM".to_string(),
                    ..Default::default()
                },
            )
            .expect("event");
        user.id
    };

    // Reopening must not reseed or duplicate the subject catalog
    let conn = open_database(&db_path).expect("reopen");
    let planner = Planner::new(&conn, rules());
    assert_eq!(planner.list_subjects().expect("subjects").len(), 7);

    let user = planner
        .login(&LoginRequest {
            email: "ana@est.ucab.edu.ve".to_string(),
            password: "secreta".to_string(),
        })
        .expect("login");
    assert_eq!(user.id, user_id);

    let events = planner.list_events(user.id).expect("events");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].start_time().format("%H:%M").to_string(), "14:00");
    assert_eq!(events[0].end_time().format("%H:%M").to_string(), "15:30");
}

#[test]
fn session_file_tracks_login_and_logout() {
    let dir = TempDir::new().expect("tempdir");
    let conn = open_database(&dir.path().join("planner.db")).expect("open");
    let planner = Planner::new(&conn, rules());
    let session_path = dir.path().join("session.json");

    let user = planner
        .register(&RegisterRequest {
            username: "Luis".to_string(),
            email: "luis@est.ucab.edu.ve".to_string(),
            password: "clave".to_string(),
        })
        .expect("register");

    let mut session = Session::load(&session_path).expect("load");
    assert!(!session.is_logged_in());
    session.save(user.clone()).expect("save");

    let restored = Session::load(&session_path).expect("reload");
    assert_eq!(restored.current_user(), Some(&user));

    let mut restored = restored;
    restored.clear().expect("clear");
    assert!(!Session::load(&session_path).expect("reload").is_logged_in());
}

#[test]
fn imported_schedule_shows_in_week_and_conflicts_with_events() {
    let dir = TempDir::new().expect("tempdir");
    let conn = open_database(&dir.path().join("planner.db")).expect("open");
    let planner = Planner::new(&conn, rules());
    let user = planner
        .register(&RegisterRequest {
            username: "Ana".to_string(),
            email: "ana@est.ucab.edu.ve".to_string(),
            password: "secreta".to_string(),
        })
        .expect("register");

    let csv_path = dir.path().join("horario.csv");
    fs::write(
        &csv_path,
        "subject_id,location,weekday,start_time,end_time,professor,class_type,color_hex\n\
         1,A-12,Lunes,7:00 AM,8:45 AM,Rivas,Teoría,\n\
         5,Lab 3,Miércoles,14:00,16:00,,Práctica,#00aa00\n",
    )
    .expect("write csv");

    let requests = load_schedule_csv(&csv_path).expect("read csv");
    let slots = planner.import_schedule(user.id, &requests).expect("import");
    assert_eq!(slots.len(), 2);
    assert_eq!(slots[1].color_hex, "#00AA00");

    let week = planner.week_view(user.id, date(2025, 5, 14)).expect("week");
    assert_eq!(week.total_occurrences(), 2);
    assert_eq!(week.days[1].occurrences[0].title, "Ingeniería de Software");
    assert_eq!(week.days[3].occurrences[0].start_time, "14:00");

    // Monday 2025-05-12 08:00 overlaps the imported Monday class
    let err = planner
        .create_event(
            user.id,
            &EventRequest {
                name: "Cita".to_string(),
                date: "2025-05-12".to_string(),
                start_time: "08:00".to_string(),
                end_time: "09:00".to_string(),
                ..Default::default()
            },
        )
        .expect_err("conflict");
    assert!(matches!(err, PlannerError::Conflict(_)));
    assert!(err.to_string().contains("Ingeniería de Software"));
}

#[test]
fn grade_export_writes_totals() {
    let dir = TempDir::new().expect("tempdir");
    let conn = open_database(&dir.path().join("planner.db")).expect("open");
    let planner = Planner::new(&conn, rules());
    let user = planner
        .register(&RegisterRequest {
            username: "Ana".to_string(),
            email: "ana@est.ucab.edu.ve".to_string(),
            password: "secreta".to_string(),
        })
        .expect("register");

    for (title, weight, score) in [("Parcial 1", 30.0, 12.0), ("Parcial 2", 30.0, 6.0)] {
        planner
            .create_evaluation(
                user.id,
                &EvaluationRequest {
                    title: title.to_string(),
                    subject_id: 3,
                    weight,
                    score,
                    professor: "Mora".to_string(),
                    location: "B-4".to_string(),
                    date: "2025-06-02".to_string(),
                    start_time: "10:00".to_string(),
                    end_time: "12:00".to_string(),
                    ..Default::default()
                },
            )
            .expect("evaluation");
    }

    let report = planner.grade_report(user.id).expect("report");
    assert_eq!(report.subjects.len(), 1);
    // 30% of 12 + 30% of 6 = 5.4, below the passing score
    assert!(!report.subjects[0].approved);
    assert_eq!(report.approved_count, 0);

    let out = dir.path().join("notas.csv");
    export_grade_report(&report, &out).expect("export");
    let text = fs::read_to_string(&out).expect("read export");
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("subject,evaluation,date,weight"));
    assert!(lines[3].contains("TOTAL"));
    assert!(lines[3].ends_with(",no"));
}
