// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{anyhow, Result};
use chrono::{Local, NaiveDate, NaiveTime};
use log::info;
use std::env;
use std::path::PathBuf;

use study_planner::calendar::Occurrence;
use study_planner::grades::format_grade;
use study_planner::time_input::{format_hhmm, parse_date, parse_picker_time, picker_options};
use study_planner::transfer::{export_grade_report, load_schedule_csv};
use study_planner::{
    logging, open_database, Config, EvaluationRequest, EventRequest, LoginRequest, Planner,
    RegisterRequest, ScheduleRequest, Session, User,
};

#[derive(Debug, Clone, PartialEq)]
enum Command {
    Ui,
    Help,
    Register { username: String, email: String, password: String },
    Login { email: String, password: String },
    Logout,
    WhoAmI,
    Subjects,
    AddEvent(EventArgs),
    AddClass(ClassArgs),
    AddEvaluation(EvaluationArgs),
    DeleteEvent(i64),
    DeleteClass(i64),
    DeleteEvaluation(i64),
    Week(Option<NaiveDate>),
    Hours(Option<NaiveTime>),
    Grades,
    ImportSchedule(PathBuf),
    ExportGrades(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
struct EventArgs {
    name: String,
    date: String,
    start: String,
    end: String,
    location: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
struct ClassArgs {
    subject_id: i64,
    weekday: String,
    start: String,
    end: String,
    location: String,
    professor: Option<String>,
    class_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
struct EvaluationArgs {
    subject_id: i64,
    title: String,
    date: String,
    start: String,
    end: String,
    weight: f64,
    score: f64,
    professor: String,
    location: String,
}

const USAGE: &str = "\
Usage: study-planner [command]

  (no command)                                 open the calendar UI
  register <username> <email> <password>
  login <email> <password>
  logout
  whoami
  subjects
  add-event <name> <date> <start> <end> [location]
  add-class <subject_id> <weekday> <start> <end> <location> [professor] [type]
  add-evaluation <subject_id> <title> <date> <start> <end> <weight> <score> <professor> <location>
  delete-event <id> | delete-class <id> | delete-evaluation <id>
  week [date]
  hours [start]                                whole-hour end times after start
  grades
  import-schedule <file.csv>
  export-grades <file.csv>";

impl Command {
    /// Parse the arguments after the program name
    fn parse(args: &[String]) -> Result<Command, String> {
        let name = match args.first() {
            Some(name) => name.as_str(),
            None => return Ok(Command::Ui),
        };
        let rest = &args[1..];

        let command = match name {
            "help" | "--help" | "-h" => Command::Help,
            "register" => {
                expect_args(name, rest, 3, 3)?;
                Command::Register {
                    username: rest[0].clone(),
                    email: rest[1].clone(),
                    password: rest[2].clone(),
                }
            }
            "login" => {
                expect_args(name, rest, 2, 2)?;
                Command::Login {
                    email: rest[0].clone(),
                    password: rest[1].clone(),
                }
            }
            "logout" => Command::Logout,
            "whoami" => Command::WhoAmI,
            "subjects" => Command::Subjects,
            "add-event" => {
                expect_args(name, rest, 4, 5)?;
                Command::AddEvent(EventArgs {
                    name: rest[0].clone(),
                    date: rest[1].clone(),
                    start: rest[2].clone(),
                    end: rest[3].clone(),
                    location: rest.get(4).cloned(),
                })
            }
            "add-class" => {
                expect_args(name, rest, 5, 7)?;
                Command::AddClass(ClassArgs {
                    subject_id: parse_number(&rest[0], "subject_id")?,
                    weekday: rest[1].clone(),
                    start: rest[2].clone(),
                    end: rest[3].clone(),
                    location: rest[4].clone(),
                    professor: rest.get(5).cloned(),
                    class_type: rest.get(6).cloned(),
                })
            }
            "add-evaluation" => {
                expect_args(name, rest, 9, 9)?;
                Command::AddEvaluation(EvaluationArgs {
                    subject_id: parse_number(&rest[0], "subject_id")?,
                    title: rest[1].clone(),
                    date: rest[2].clone(),
                    start: rest[3].clone(),
                    end: rest[4].clone(),
                    weight: parse_number(&rest[5], "weight")?,
                    score: parse_number(&rest[6], "score")?,
                    professor: rest[7].clone(),
                    location: rest[8].clone(),
                })
            }
            "delete-event" | "delete-class" | "delete-evaluation" => {
                expect_args(name, rest, 1, 1)?;
                let id = parse_number(&rest[0], "id")?;
                match name {
                    "delete-event" => Command::DeleteEvent(id),
                    "delete-class" => Command::DeleteClass(id),
                    _ => Command::DeleteEvaluation(id),
                }
            }
            "week" => {
                expect_args(name, rest, 0, 1)?;
                Command::Week(rest.first().map(|d| parse_date(d)).transpose()?)
            }
            "hours" => {
                expect_args(name, rest, 0, 1)?;
                let start = match rest.first() {
                    Some(raw) => Some(
                        parse_picker_time(raw)
                            .ok_or_else(|| format!("\"{}\" is not a recognized hour", raw))?,
                    ),
                    None => None,
                };
                Command::Hours(start)
            }
            "grades" => Command::Grades,
            "import-schedule" => {
                expect_args(name, rest, 1, 1)?;
                Command::ImportSchedule(PathBuf::from(&rest[0]))
            }
            "export-grades" => {
                expect_args(name, rest, 1, 1)?;
                Command::ExportGrades(PathBuf::from(&rest[0]))
            }
            other => return Err(format!("Unknown command: {}", other)),
        };
        Ok(command)
    }
}

fn expect_args(command: &str, rest: &[String], min: usize, max: usize) -> Result<(), String> {
    if rest.len() < min || rest.len() > max {
        let expected = if min == max {
            min.to_string()
        } else {
            format!("{} to {}", min, max)
        };
        return Err(format!(
            "{} takes {} argument(s), got {}",
            command,
            expected,
            rest.len()
        ));
    }
    Ok(())
}

fn parse_number<T: std::str::FromStr>(value: &str, field: &str) -> Result<T, String> {
    value
        .trim()
        .parse()
        .map_err(|_| format!("{} must be a number, got '{}'", field, value))
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();

    let command = match Command::parse(&args) {
        Ok(command) => command,
        Err(message) => {
            eprintln!("❌ {}\n", message);
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    };

    let config = Config::from_env()?;

    match command {
        Command::Help => {
            println!("{}", USAGE);
            Ok(())
        }
        Command::Ui => run_ui_mode(&config),
        Command::Hours(start) => {
            println!("{}", hour_options_line(start));
            Ok(())
        }
        other => {
            logging::init_logging(&config.log_level, config.log_dir.as_deref())
                .map_err(anyhow::Error::msg)?;
            run_command(&config, other)
        }
    }
}

fn run_command(config: &Config, command: Command) -> Result<()> {
    let conn = open_database(&config.db_path)?;
    let planner = Planner::new(&conn, config.account_rules());
    let mut session = Session::load(&config.session_path)?;

    match command {
        Command::Register {
            username,
            email,
            password,
        } => {
            let user = planner.register(&RegisterRequest {
                username,
                email,
                password,
            })?;
            session.save(user.clone())?;
            println!("✓ Registered {} <{}>", user.username, user.email);
        }
        Command::Login { email, password } => {
            let user = planner.login(&LoginRequest { email, password })?;
            session.save(user.clone())?;
            println!("✓ Logged in as {}", user.username);
        }
        Command::Logout => {
            session.clear()?;
            println!("✓ Logged out");
        }
        Command::WhoAmI => match session.current_user() {
            Some(user) => println!("👤 {} <{}> (id {})", user.username, user.email, user.id),
            None => println!("Not logged in"),
        },
        Command::Subjects => {
            println!("📚 Subjects");
            for subject in planner.list_subjects()? {
                println!(
                    "  {:>2}  {:<40} {:<14} {} credits",
                    subject.id, subject.name, subject.semester, subject.credits
                );
            }
        }
        Command::AddEvent(args) => {
            let user = require_user(&session)?;
            let event = planner.create_event(
                user.id,
                &EventRequest {
                    name: args.name,
                    location: args.location,
                    date: args.date,
                    start_time: args.start,
                    end_time: args.end,
                    ..Default::default()
                },
            )?;
            println!("✓ Event #{} created: {} on {}", event.id, event.name, event.date());
        }
        Command::AddClass(args) => {
            let user = require_user(&session)?;
            let slot = planner.create_schedule(
                user.id,
                &ScheduleRequest {
                    subject_id: args.subject_id,
                    location: args.location,
                    weekday: args.weekday,
                    start_time: args.start,
                    end_time: args.end,
                    professor: args.professor,
                    class_type: args.class_type,
                    color_hex: None,
                },
            )?;
            println!(
                "✓ Class #{} created: {} on {}",
                slot.id, slot.subject.name, slot.weekday
            );
        }
        Command::AddEvaluation(args) => {
            let user = require_user(&session)?;
            let eval = planner.create_evaluation(
                user.id,
                &EvaluationRequest {
                    title: args.title,
                    subject_id: args.subject_id,
                    weight: args.weight,
                    score: args.score,
                    professor: args.professor,
                    location: args.location,
                    date: args.date,
                    start_time: args.start,
                    end_time: args.end,
                    ..Default::default()
                },
            )?;
            println!(
                "✓ Evaluation #{} created: {} ({}%) for {}",
                eval.id, eval.title, eval.weight, eval.subject.name
            );
        }
        Command::DeleteEvent(id) => {
            let user = require_user(&session)?;
            planner.delete_event(user.id, id)?;
            println!("✓ Event #{} deleted", id);
        }
        Command::DeleteClass(id) => {
            let user = require_user(&session)?;
            planner.delete_schedule(user.id, id)?;
            println!("✓ Class #{} deleted", id);
        }
        Command::DeleteEvaluation(id) => {
            let user = require_user(&session)?;
            planner.delete_evaluation(user.id, id)?;
            println!("✓ Evaluation #{} deleted", id);
        }
        Command::Week(date) => {
            let user = require_user(&session)?;
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            let view = planner.week_view(user.id, date)?;
            println!("📅 {}", view.label);
            println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
            for day in &view.days {
                println!("\n{}", day.label);
                if day.occurrences.is_empty() {
                    println!("  -");
                }
                for occurrence in &day.occurrences {
                    println!("  {}", occurrence_line(occurrence));
                }
            }
        }
        Command::Grades => {
            let user = require_user(&session)?;
            let report = planner.grade_report(user.id)?;
            println!("🎓 Grades");
            println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
            for row in &report.subjects {
                let mark = if row.approved { "✅" } else { "❌" };
                println!(
                    "{} {:<40} {:>5} / 20  ({}% evaluated)",
                    mark,
                    row.subject.name,
                    format_grade(row.total),
                    row.weight_used
                );
            }
            match report.overall_average {
                Some(avg) => println!("\nAverage: {}", format_grade(avg)),
                None => println!("\nNo evaluations yet"),
            }
            println!(
                "Approved: {} / {}   Credits: {}",
                report.approved_count,
                report.subjects.len(),
                report.credits_approved
            );
        }
        Command::ImportSchedule(path) => {
            let user = require_user(&session)?;
            println!("📂 Loading {}...", path.display());
            let requests = load_schedule_csv(&path)?;
            let slots = planner.import_schedule(user.id, &requests)?;
            println!("✓ Imported {} classes", slots.len());
        }
        Command::ExportGrades(path) => {
            let user = require_user(&session)?;
            let report = planner.grade_report(user.id)?;
            export_grade_report(&report, &path)?;
            info!("event=grades_exported user_id={} path={}", user.id, path.display());
            println!("✓ Grades written to {}", path.display());
        }
        Command::Ui | Command::Help | Command::Hours(_) => {}
    }

    Ok(())
}

fn require_user(session: &Session) -> Result<User> {
    session
        .current_user()
        .cloned()
        .ok_or_else(|| anyhow!("Not logged in. Run: study-planner login <email> <password>"))
}

fn occurrence_line(occurrence: &Occurrence) -> String {
    let location = occurrence
        .location
        .as_deref()
        .map(|l| format!(" @ {}", l))
        .unwrap_or_default();
    format!(
        "{}-{}  [{}] {}{}",
        occurrence.start_time,
        occurrence.end_time,
        occurrence.kind.label(),
        occurrence.title,
        location
    )
}

/// End-time choices for a class or event starting at `start`
fn hour_options_line(start: Option<NaiveTime>) -> String {
    let options: Vec<String> = picker_options(start).into_iter().map(format_hhmm).collect();
    if options.is_empty() {
        return "No whole hour left after that start".to_string();
    }
    format!("🕐 {}", options.join(" "))
}

#[cfg(feature = "tui")]
fn run_ui_mode(config: &Config) -> Result<()> {
    // Logs go to files so they do not draw over the terminal
    let log_dir = config
        .log_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("logs"));
    logging::init_logging(&config.log_level, Some(&log_dir)).map_err(anyhow::Error::msg)?;

    println!("🖥️  Loading Study Planner...\n");

    let session = Session::load(&config.session_path)?;
    let user = match session.current_user() {
        Some(user) => user.clone(),
        None => {
            eprintln!("❌ Not logged in!");
            eprintln!("   Run: study-planner login <email> <password>");
            eprintln!("   or:  study-planner register <username> <email> <password>");
            std::process::exit(1);
        }
    };

    let conn = open_database(&config.db_path)?;
    let planner = Planner::new(&conn, config.account_rules());

    let snapshot = ui::Snapshot::load(&planner, user.id)?;
    println!(
        "✓ Loaded {} events, {} classes, {} evaluations\n",
        snapshot.events.len(),
        snapshot.slots.len(),
        snapshot.evaluations.len()
    );
    println!("Starting UI... (Press 'q' to quit)\n");
    info!("event=ui_start user_id={}", user.id);

    let mut app = ui::App::new(user, snapshot, Local::now().date_naive());
    ui::run_ui(&mut app, &planner)?;

    println!("\n✅ UI closed successfully");

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_config: &Config) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use the API: cargo run --bin planner-server --features server");
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_no_arguments_opens_ui() {
        assert_eq!(Command::parse(&[]).unwrap(), Command::Ui);
    }

    #[test]
    fn test_parse_add_class_with_optionals() {
        let cmd = Command::parse(&args(&[
            "add-class", "5", "Lunes", "7:00 AM", "8:45 AM", "A-21", "Pérez",
        ]))
        .unwrap();
        match cmd {
            Command::AddClass(c) => {
                assert_eq!(c.subject_id, 5);
                assert_eq!(c.weekday, "Lunes");
                assert_eq!(c.professor.as_deref(), Some("Pérez"));
                assert!(c.class_type.is_none());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_add_evaluation_numbers() {
        let cmd = Command::parse(&args(&[
            "add-evaluation", "1", "Parcial", "2025-05-14", "10:00", "12:00", "25", "17.5",
            "Rivas", "A-12",
        ]))
        .unwrap();
        match cmd {
            Command::AddEvaluation(e) => {
                assert_eq!(e.weight, 25.0);
                assert_eq!(e.score, 17.5);
                assert_eq!(e.location, "A-12");
            }
            other => panic!("unexpected {:?}", other),
        }

        let err = Command::parse(&args(&[
            "add-evaluation", "1", "Parcial", "2025-05-14", "10:00", "12:00", "x", "17",
            "Rivas", "A-12",
        ]))
        .unwrap_err();
        assert!(err.contains("weight"));
    }

    #[test]
    fn test_parse_week_and_deletes() {
        assert_eq!(
            Command::parse(&args(&["week", "2025-05-14"])).unwrap(),
            Command::Week(NaiveDate::from_ymd_opt(2025, 5, 14))
        );
        assert_eq!(Command::parse(&args(&["week"])).unwrap(), Command::Week(None));
        assert!(Command::parse(&args(&["week", "14/05/2025"])).is_err());
        assert_eq!(
            Command::parse(&args(&["delete-class", "7"])).unwrap(),
            Command::DeleteClass(7)
        );
    }

    #[test]
    fn test_parse_rejects_bad_arity_and_unknown() {
        let err = Command::parse(&args(&["login", "a@est.ucab.edu.ve"])).unwrap_err();
        assert!(err.contains("login takes 2 argument(s), got 1"));
        let err = Command::parse(&args(&["add-event", "a", "b", "c"])).unwrap_err();
        assert!(err.contains("4 to 5"));
        assert!(Command::parse(&args(&["frobnicate"])).is_err());
    }

    #[test]
    fn test_hours_rounds_start_and_lists_later_hours() {
        let nine = NaiveTime::from_hms_opt(9, 0, 0);
        assert_eq!(Command::parse(&args(&["hours", "8:45"])).unwrap(), Command::Hours(nine));
        assert_eq!(Command::parse(&args(&["hours", "9am"])).unwrap(), Command::Hours(nine));
        assert_eq!(Command::parse(&args(&["hours"])).unwrap(), Command::Hours(None));
        assert!(Command::parse(&args(&["hours", "25:00"])).is_err());

        let line = hour_options_line(NaiveTime::from_hms_opt(21, 0, 0));
        assert_eq!(line, "🕐 22:00 23:00");
        assert_eq!(hour_options_line(None).matches(':').count(), 24);
        assert!(hour_options_line(NaiveTime::from_hms_opt(23, 0, 0)).starts_with("No whole hour"));
    }
}
