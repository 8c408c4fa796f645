use anyhow::Result;
use chrono::{Duration, NaiveDate};
use crossterm::{
    event::{self, Event as TermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;
use study_planner::calendar::{
    add_months, format_long_date, items_for_day, project_week, MonthGrid, Occurrence, WeekView,
    WeekWindow,
};
use study_planner::grades::format_grade;
use study_planner::search::{no_match_message, search};
use study_planner::{
    Evaluation, Event, GradeReport, ItemKind, Planner, PlannerResult, ScheduleSlot, User,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Week,
    Month,
    Grades,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Week => Page::Month,
            Page::Month => Page::Grades,
            Page::Grades => Page::Week,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Week => Page::Grades,
            Page::Month => Page::Week,
            Page::Grades => Page::Month,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Week => "Week",
            Page::Month => "Month",
            Page::Grades => "Grades",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputMode {
    Normal,
    Search(String),
    ConfirmDelete { kind: ItemKind, id: i64, title: String },
}

/// What the event loop must do after a key press
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    None,
    Quit,
    Delete { kind: ItemKind, id: i64 },
}

/// Everything the UI shows for one user
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub events: Vec<Event>,
    pub slots: Vec<ScheduleSlot>,
    pub evaluations: Vec<Evaluation>,
    pub report: GradeReport,
}

impl Snapshot {
    pub fn load(planner: &Planner, user_id: i64) -> PlannerResult<Self> {
        Ok(Snapshot {
            events: planner.list_events(user_id)?,
            slots: planner.list_schedules(user_id)?,
            evaluations: planner.list_evaluations(user_id)?,
            report: planner.grade_report(user_id)?,
        })
    }
}

pub struct App {
    pub user: User,
    pub data: Snapshot,
    pub today: NaiveDate,
    pub week: WeekWindow,
    pub month_cursor: NaiveDate,
    pub current_page: Page,
    pub selected: Option<usize>,
    pub grades_state: TableState,
    pub show_detail: bool,
    pub mode: InputMode,
    pub status: Option<String>,
}

impl App {
    pub fn new(user: User, data: Snapshot, today: NaiveDate) -> Self {
        let mut grades_state = TableState::default();
        if !data.report.subjects.is_empty() {
            grades_state.select(Some(0));
        }

        let mut app = Self {
            user,
            data,
            today,
            week: WeekWindow::containing(today),
            month_cursor: today,
            current_page: Page::Week,
            selected: None,
            grades_state,
            show_detail: false,
            mode: InputMode::Normal,
            status: None,
        };
        app.reset_selection();
        app
    }

    /// Swap in fresh data after a change, keeping the current week
    pub fn replace_data(&mut self, data: Snapshot) {
        self.data = data;
        self.reset_selection();
        if self.data.report.subjects.is_empty() {
            self.grades_state.select(None);
        } else {
            let last = self.data.report.subjects.len() - 1;
            let keep = self.grades_state.selected().unwrap_or(0).min(last);
            self.grades_state.select(Some(keep));
        }
    }

    pub fn week_view(&self) -> WeekView {
        project_week(
            self.week,
            &self.data.events,
            &self.data.slots,
            &self.data.evaluations,
        )
    }

    /// Occurrences of the shown week, day by day, in selection order
    pub fn week_items(&self) -> Vec<Occurrence> {
        self.week_view()
            .days
            .into_iter()
            .flat_map(|day| day.occurrences)
            .collect()
    }

    pub fn selected_item(&self) -> Option<Occurrence> {
        self.selected.and_then(|i| self.week_items().into_iter().nth(i))
    }

    fn reset_selection(&mut self) {
        self.selected = if self.week_items().is_empty() {
            None
        } else {
            Some(0)
        };
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
    }

    pub fn toggle_detail(&mut self) {
        self.show_detail = !self.show_detail;
    }

    pub fn go_to_week(&mut self, window: WeekWindow) {
        self.week = window;
        self.reset_selection();
    }

    pub fn next(&mut self) {
        let len = self.week_items().len();
        if len == 0 {
            return;
        }
        let i = match self.selected {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.selected = Some(i);
    }

    pub fn previous(&mut self) {
        let len = self.week_items().len();
        if len == 0 {
            return;
        }
        let i = match self.selected {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.selected = Some(i);
    }

    fn move_grade_selection(&mut self, forward: bool) {
        let len = self.data.report.subjects.len();
        if len == 0 {
            return;
        }
        let i = match (self.grades_state.selected(), forward) {
            (Some(i), true) if i + 1 < len => i + 1,
            (Some(_), true) | (None, _) => 0,
            (Some(0), false) => len - 1,
            (Some(i), false) => i - 1,
        };
        self.grades_state.select(Some(i));
    }

    pub fn move_month_cursor(&mut self, days: i64) {
        self.month_cursor = self.month_cursor + Duration::days(days);
    }

    /// Jump to the week of the first match, or leave a status message
    pub fn run_search(&mut self, term: &str) {
        if term.trim().is_empty() {
            return;
        }
        match search(
            term,
            &self.data.events,
            &self.data.slots,
            &self.data.evaluations,
            self.today,
        ) {
            Some(hit) => {
                self.go_to_week(WeekWindow { start: hit.week_start });
                self.current_page = Page::Week;
                let items = self.week_items();
                if let Some(pos) = items.iter().position(|o| o.kind == hit.kind && o.id == hit.id) {
                    self.selected = Some(pos);
                }
                self.status = Some(format!("{}: {}", hit.kind.label(), hit.title));
            }
            None => self.status = Some(no_match_message(term)),
        }
    }

    /// Field/value pairs for the selected item's detail panel
    pub fn detail_lines(&self) -> Vec<(String, String)> {
        let item = match self.selected_item() {
            Some(item) => item,
            None => return Vec::new(),
        };
        let time = format!("{} - {}", item.start_time, item.end_time);

        match item.kind {
            ItemKind::Event => match self.data.events.iter().find(|e| e.id == item.id) {
                Some(e) => vec![
                    ("Event".to_string(), e.name.clone()),
                    ("Date".to_string(), format_long_date(e.date())),
                    ("Time".to_string(), time),
                    ("Location".to_string(), e.location.clone().unwrap_or_default()),
                    ("Notes".to_string(), e.description.clone().unwrap_or_default()),
                ],
                None => Vec::new(),
            },
            ItemKind::Class => match self.data.slots.iter().find(|s| s.id == item.id) {
                Some(s) => vec![
                    ("Subject".to_string(), s.subject.name.clone()),
                    ("Day".to_string(), s.weekday.to_string()),
                    ("Time".to_string(), time),
                    ("Classroom".to_string(), s.location.clone()),
                    ("Professor".to_string(), s.professor.clone().unwrap_or_default()),
                    (
                        "Type".to_string(),
                        s.class_type.map(|c| c.as_str().to_string()).unwrap_or_default(),
                    ),
                ],
                None => Vec::new(),
            },
            ItemKind::Evaluation => match self.data.evaluations.iter().find(|e| e.id == item.id) {
                Some(e) => vec![
                    ("Evaluation".to_string(), e.title.clone()),
                    ("Subject".to_string(), e.subject.name.clone()),
                    ("Date".to_string(), format_long_date(e.date())),
                    ("Time".to_string(), time),
                    ("Weight".to_string(), format!("{}%", e.weight)),
                    ("Score".to_string(), format!("{} / 20", format_grade(e.score))),
                    ("Professor".to_string(), e.professor.clone()),
                    ("Location".to_string(), e.location.clone()),
                ],
                None => Vec::new(),
            },
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        match self.mode.clone() {
            InputMode::Search(mut term) => {
                match key.code {
                    KeyCode::Esc => self.mode = InputMode::Normal,
                    KeyCode::Enter => {
                        self.mode = InputMode::Normal;
                        self.run_search(&term);
                    }
                    KeyCode::Backspace => {
                        term.pop();
                        self.mode = InputMode::Search(term);
                    }
                    KeyCode::Char(c) => {
                        term.push(c);
                        self.mode = InputMode::Search(term);
                    }
                    _ => {}
                }
                Action::None
            }
            InputMode::ConfirmDelete { kind, id, .. } => {
                self.mode = InputMode::Normal;
                match key.code {
                    KeyCode::Char('y') | KeyCode::Char('Y') => Action::Delete { kind, id },
                    _ => {
                        self.status = Some("Delete cancelled".to_string());
                        Action::None
                    }
                }
            }
            InputMode::Normal => self.handle_normal_key(key),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Char('q') => return Action::Quit,
            KeyCode::Esc if self.show_detail => self.show_detail = false,
            KeyCode::Esc => return Action::Quit,
            KeyCode::Tab => {
                if key.modifiers.contains(KeyModifiers::SHIFT) {
                    self.previous_page();
                } else {
                    self.next_page();
                }
            }
            KeyCode::BackTab => self.previous_page(),
            KeyCode::Char('/') => {
                self.status = None;
                self.mode = InputMode::Search(String::new());
            }
            _ => match self.current_page {
                Page::Week => self.handle_week_key(key),
                Page::Month => self.handle_month_key(key),
                Page::Grades => match key.code {
                    KeyCode::Down | KeyCode::Char('j') => self.move_grade_selection(true),
                    KeyCode::Up | KeyCode::Char('k') => self.move_grade_selection(false),
                    _ => {}
                },
            },
        }
        Action::None
    }

    fn handle_week_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Left | KeyCode::Char('h') => self.go_to_week(self.week.previous()),
            KeyCode::Right | KeyCode::Char('l') => self.go_to_week(self.week.next()),
            KeyCode::Char('t') => self.go_to_week(WeekWindow::containing(self.today)),
            KeyCode::Down | KeyCode::Char('j') => self.next(),
            KeyCode::Up | KeyCode::Char('k') => self.previous(),
            KeyCode::Enter => self.toggle_detail(),
            KeyCode::Char('d') => {
                if let Some(item) = self.selected_item() {
                    self.mode = InputMode::ConfirmDelete {
                        kind: item.kind,
                        id: item.id,
                        title: item.title,
                    };
                }
            }
            _ => {}
        }
    }

    fn handle_month_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Left | KeyCode::Char('h') => self.move_month_cursor(-1),
            KeyCode::Right | KeyCode::Char('l') => self.move_month_cursor(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_month_cursor(-7),
            KeyCode::Down | KeyCode::Char('j') => self.move_month_cursor(7),
            KeyCode::Char('n') => self.month_cursor = add_months(self.month_cursor, 1),
            KeyCode::Char('p') => self.month_cursor = add_months(self.month_cursor, -1),
            KeyCode::Char('t') => self.month_cursor = self.today,
            KeyCode::Enter => {
                self.go_to_week(WeekWindow::containing(self.month_cursor));
                self.current_page = Page::Week;
            }
            _ => {}
        }
    }
}

pub fn run_ui(app: &mut App, planner: &Planner) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app, planner);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    planner: &Planner,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let TermEvent::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match app.handle_key(key) {
                Action::Quit => return Ok(()),
                Action::Delete { kind, id } => {
                    let user_id = app.user.id;
                    let result = match kind {
                        ItemKind::Event => planner.delete_event(user_id, id),
                        ItemKind::Class => planner.delete_schedule(user_id, id),
                        ItemKind::Evaluation => planner.delete_evaluation(user_id, id),
                    };
                    app.status = Some(match result.and_then(|_| Snapshot::load(planner, user_id)) {
                        Ok(data) => {
                            app.replace_data(data);
                            format!("{} deleted", kind.label())
                        }
                        Err(e) => e.to_string(),
                    });
                }
                Action::None => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    if app.show_detail && app.current_page == Page::Week {
        let content_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(chunks[1]);

        render_week(f, content_chunks[0], app);
        render_detail_panel(f, content_chunks[1], app);
    } else {
        match app.current_page {
            Page::Week => render_week(f, chunks[1], app),
            Page::Month => render_month(f, chunks[1], app),
            Page::Grades => render_grades(f, chunks[1], app),
        }
    }

    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let pages = [Page::Week, Page::Month, Page::Grades];

    let mut spans = vec![];
    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" │ "));
        }
        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(page.title().to_string(), style));
    }

    let subtitle = match app.current_page {
        Page::Week => app.week_view().label,
        Page::Month => MonthGrid::for_month(app.month_cursor, app.today).title,
        Page::Grades => match app.data.report.overall_average {
            Some(avg) => format!("Average {}", format_grade(avg)),
            None => "No evaluations yet".to_string(),
        },
    };
    spans.push(Span::raw("   "));
    spans.push(Span::styled(subtitle, Style::default().fg(Color::Cyan)));

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(format!(" 📚 Study Planner - {} ", app.user.username)),
    );
    f.render_widget(header, area);
}

fn render_week(f: &mut Frame, area: Rect, app: &App) {
    let view = app.week_view();
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 7); 7])
        .split(area);

    let mut index = 0;
    for (column, day) in columns.iter().zip(view.days.iter()) {
        let width = column.width.saturating_sub(2) as usize;
        let mut lines = Vec::new();

        for occurrence in &day.occurrences {
            let selected = app.selected == Some(index);
            let mut style = Style::default().fg(hex_color(&occurrence.color_hex));
            if selected {
                style = style.add_modifier(Modifier::REVERSED | Modifier::BOLD);
            }
            lines.push(Line::from(Span::styled(
                truncate(&format!("{}-{}", occurrence.start_time, occurrence.end_time), width),
                style,
            )));
            lines.push(Line::from(Span::styled(truncate(&occurrence.title, width), style)));
            lines.push(Line::from(""));
            index += 1;
        }

        let border = if day.date == app.today {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::White)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(format!(" {} ", day.label));
        f.render_widget(Paragraph::new(lines).block(block), *column);
    }
}

fn render_month(f: &mut Frame, area: Rect, app: &App) {
    let grid = MonthGrid::for_month(app.month_cursor, app.today);

    let header = Row::new(
        ["Dom", "Lun", "Mar", "Mié", "Jue", "Vie", "Sáb"]
            .iter()
            .map(|d| Cell::from(*d).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))),
    )
    .style(Style::default().bg(Color::DarkGray))
    .height(1);

    let rows = grid.rows().map(|week| {
        let cells = week.iter().map(|cell| {
            let count = items_for_day(
                cell.date,
                &app.data.events,
                &app.data.slots,
                &app.data.evaluations,
            )
            .len();
            let text = if count > 0 {
                format!("{:>2} •{}", cell.date.format("%-d"), count)
            } else {
                format!("{:>2}", cell.date.format("%-d"))
            };

            let mut style = if !cell.in_month {
                Style::default().fg(Color::DarkGray)
            } else if cell.is_today {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            if cell.date == app.month_cursor {
                style = style.add_modifier(Modifier::REVERSED);
            }
            Cell::from(text).style(style)
        });
        Row::new(cells).height(2)
    });

    let table = Table::new(rows, [Constraint::Ratio(1, 7); 7])
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(format!(" {} ", grid.title)),
        );

    f.render_widget(table, area);
}

fn render_grades(f: &mut Frame, area: Rect, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(4)])
        .split(area);

    let header_cells = ["Subject", "Credits", "Evaluations", "Weight used", "Total", "Status"]
        .iter()
        .map(|h| {
            Cell::from(*h).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = app.data.report.subjects.iter().map(|row| {
        let (status, color) = if row.approved {
            ("Approved", Color::Green)
        } else {
            ("Failing", Color::Red)
        };
        Row::new(vec![
            Cell::from(truncate(&row.subject.name, 36)),
            Cell::from(row.subject.credits.to_string()),
            Cell::from(row.evaluations.len().to_string()),
            Cell::from(format!("{}%", row.weight_used)),
            Cell::from(format_grade(row.total)).style(Style::default().fg(color)),
            Cell::from(status).style(Style::default().fg(color)),
        ])
        .height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(38),
            Constraint::Length(9),
            Constraint::Length(13),
            Constraint::Length(13),
            Constraint::Length(8),
            Constraint::Length(10),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Grades by Subject "),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, chunks[0], &mut app.grades_state);

    let report = &app.data.report;
    let summary = vec![
        Line::from(vec![
            Span::styled("  Average: ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Span::raw(
                report
                    .overall_average
                    .map(format_grade)
                    .unwrap_or_else(|| "-".to_string()),
            ),
            Span::styled("   Approved: ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Span::raw(format!("{} / {}", report.approved_count, report.subjects.len())),
            Span::styled("   Credits: ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Span::raw(report.credits_approved.to_string()),
        ]),
    ];
    f.render_widget(
        Paragraph::new(summary).block(Block::default().borders(Borders::ALL).title(" Summary ")),
        chunks[1],
    );
}

fn render_detail_panel(f: &mut Frame, area: Rect, app: &App) {
    let details = app.detail_lines();
    if details.is_empty() {
        let no_selection = Paragraph::new("Nothing selected").block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow))
                .title(" Details "),
        );
        f.render_widget(no_selection, area);
        return;
    }

    let width = area.width.saturating_sub(4) as usize;
    let mut content = vec![Line::from("")];
    for (label, value) in details {
        if value.is_empty() {
            continue;
        }
        content.push(Line::from(vec![Span::styled(
            format!("  {}: ", label),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )]));
        for chunk in wrap_text(&value, width.max(10)) {
            content.push(Line::from(format!("    {}", chunk)));
        }
        content.push(Line::from(""));
    }
    content.push(Line::from(vec![Span::styled(
        "  Enter to close, d to delete",
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC),
    )]));

    let panel = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" Details "),
    );
    f.render_widget(panel, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let line = match &app.mode {
        InputMode::Search(term) => Line::from(vec![
            Span::styled(" Search: ", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::raw(format!("{}█", term)),
            Span::styled("  (Enter to go, Esc to cancel)", Style::default().fg(Color::DarkGray)),
        ]),
        InputMode::ConfirmDelete { kind, title, .. } => Line::from(vec![Span::styled(
            format!(" Delete {} \"{}\"? (y/n)", kind.label(), title),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )]),
        InputMode::Normal => match &app.status {
            Some(message) => Line::from(Span::styled(
                format!(" {}", message),
                Style::default().fg(Color::Cyan),
            )),
            None => Line::from(Span::styled(
                hint_for(app.current_page),
                Style::default().fg(Color::DarkGray),
            )),
        },
    };

    let status = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );
    f.render_widget(status, area);
}

fn hint_for(page: Page) -> &'static str {
    match page {
        Page::Week => " ←/→ week  t today  j/k select  Enter details  d delete  / search  Tab page  q quit",
        Page::Month => " arrows move  n/p month  Enter open week  t today  / search  Tab page  q quit",
        Page::Grades => " j/k select  / search  Tab page  q quit",
    }
}

/// "#RRGGBB" to a terminal color, white when malformed
fn hex_color(hex: &str) -> Color {
    let digits = hex.trim_start_matches('#');
    if digits.len() != 6 {
        return Color::White;
    }
    let channel = |range: std::ops::Range<usize>| {
        digits
            .get(range)
            .and_then(|part| u8::from_str_radix(part, 16).ok())
    };
    match (channel(0..2), channel(2..4), channel(4..6)) {
        (Some(r), Some(g), Some(b)) => Color::Rgb(r, g, b),
        _ => Color::White,
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}

fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current_line = String::new();

    for word in text.split_whitespace() {
        let needed = current_line.chars().count() + word.chars().count() + 1;
        if current_line.is_empty() || needed <= width {
            if !current_line.is_empty() {
                current_line.push(' ');
            }
            current_line.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current_line));
            current_line = word.to_string();
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }
    lines
}
