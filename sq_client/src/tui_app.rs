//! TUI dashboard for the study tracker.
//!
//! This module provides a terminal dashboard using ratatui: level and
//! weekly-goal gauges, the day's tasks, the leaderboard for a selected
//! period, the exam checklist, and a history of recent events.

use anyhow::Result;
use chrono::{DateTime, Local, NaiveDate};
use ratatui::{
    DefaultTerminal, Frame,
    crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Cell, Clear, Gauge, List, ListDirection, ListItem, Padding, Paragraph, Row, Table, TableState},
};
use std::{collections::VecDeque, time::Duration};
use study_quest::{
    checklist::{ChecklistProgress, apply_update, is_overdue, sorted_by_order},
    level::{HundredPointLevels, LevelEngine, LevelTier, weekly_goal_percent},
    models::{ChecklistItem, RankingPeriod, RankingUser},
    ranking::{RANKING_CAP, RankingRow, describe_self_rank, is_capped, points_label, ranking_rows, self_rank},
    schedule::{DayTasks, format_date, format_points, shift_date},
};

use crate::{credentials::CredentialStore, session::Session};

const HELP: &str = "\
Up / Down
        Select a task.
Enter / Space
        Toggle completion of the selected task.
Left / Right
        Previous / next day.
t
        Jump back to today.
Tab
        Cycle the leaderboard period (week, month, all).
c
        Check off the first open checklist item.
r
        Refresh everything.
?
        Show or hide this help.
q / Esc
        Exit.
";
const MAX_LOG_RECORDS: usize = 256;
const POLL_TIMEOUT: Duration = Duration::from_millis(100);

#[derive(Clone, Copy)]
enum RecordKind {
    Info,
    Alert,
    Error,
}

/// A timestamped event line for the history window.
#[derive(Clone)]
struct Record {
    datetime: DateTime<Local>,
    kind: RecordKind,
    content: String,
}

impl Record {
    fn new(kind: RecordKind, content: String) -> Self {
        Self {
            datetime: Local::now(),
            kind,
            content,
        }
    }
}

impl From<&Record> for ListItem<'_> {
    fn from(val: &Record) -> Self {
        let repr = match val.kind {
            RecordKind::Info => "INFO".light_blue(),
            RecordKind::Alert => "ALERT".light_magenta(),
            RecordKind::Error => "ERROR".light_red(),
        };

        let msg = vec![
            format!("[{} ", val.datetime.format("%H:%M:%S")).into(),
            Span::styled(format!("{repr:5}"), repr.style),
            format!("]: {}", val.content).into(),
        ];
        ListItem::new(Line::from(msg))
    }
}

/// The viewer's row stands out; podium rows are bold.
fn ranking_row_style(row: &RankingRow) -> Style {
    if row.is_viewer {
        Style::default().bold().white()
    } else if row.badge.is_medal() {
        Style::default().bold()
    } else {
        Style::default()
    }
}

/// TUI App state
pub struct TuiApp<S: CredentialStore, L: LevelEngine = HundredPointLevels> {
    session: Session<S, L>,
    today: NaiveDate,
    /// Day shown in the task table
    date: NaiveDate,
    day: DayTasks,
    task_state: TableState,
    period: RankingPeriod,
    rankings: Vec<RankingUser>,
    checklist: Vec<ChecklistItem>,
    /// Newest first
    log: VecDeque<Record>,
    show_help_menu: bool,
}

impl<S: CredentialStore, L: LevelEngine> TuiApp<S, L> {
    pub fn new(session: Session<S, L>, today: NaiveDate) -> Self {
        Self {
            session,
            today,
            date: today,
            day: DayTasks::default(),
            task_state: TableState::default(),
            period: RankingPeriod::default(),
            rankings: Vec::new(),
            checklist: Vec::new(),
            log: VecDeque::new(),
            show_help_menu: false,
        }
    }

    fn add_log(&mut self, kind: RecordKind, content: String) {
        self.log.push_front(Record::new(kind, content));
        self.log.truncate(MAX_LOG_RECORDS);
    }

    // === Data loading ===

    async fn refresh_tasks(&mut self) {
        match self.session.api().tasks(Some(self.date)).await {
            Ok(tasks) => {
                self.day = DayTasks::new(self.date, tasks);
                let selected = (!self.day.tasks.is_empty()).then_some(0);
                self.task_state.select(selected);
            }
            Err(e) => {
                tracing::warn!(error = %e, date = %self.date, "Failed to fetch tasks");
                self.add_log(RecordKind::Error, format!("Failed to load tasks: {e}"));
            }
        }
    }

    /// Show the leaderboard for `period` once its rows arrive. A failed
    /// fetch keeps the previous period and rows together.
    async fn load_rankings(&mut self, period: RankingPeriod) {
        match self.session.api().rankings(period).await {
            Ok(rankings) => {
                self.period = period;
                self.rankings = rankings;
            }
            Err(e) => {
                tracing::warn!(error = %e, period = %period, "Failed to fetch rankings");
                self.add_log(RecordKind::Error, format!("Failed to load rankings: {e}"));
            }
        }
    }

    async fn refresh_checklist(&mut self) {
        match self.session.api().checklists().await {
            Ok(items) => self.checklist = sorted_by_order(&items),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fetch checklist");
                self.add_log(RecordKind::Error, format!("Failed to load checklist: {e}"));
            }
        }
    }

    async fn refresh_all(&mut self) {
        if let Err(e) = self.session.refresh_profile().await {
            self.add_log(RecordKind::Error, format!("Failed to load profile: {e}"));
        }
        self.refresh_tasks().await;
        self.load_rankings(self.period).await;
        self.refresh_checklist().await;
    }

    // === Actions ===

    async fn toggle_selected_task(&mut self) {
        let Some(task) = self.task_state.selected().and_then(|idx| self.day.tasks.get(idx)) else {
            return;
        };
        let task_id = task.id;
        let level_before = self.session.level_info().level;

        match self.session.complete_task(task_id).await {
            Ok(task) => {
                let verb = if task.completed { "Completed" } else { "Reopened" };
                self.add_log(
                    RecordKind::Info,
                    format!("{} {} ({})", verb, task.task_type.name, format_points(task.task_type.points)),
                );
                self.day.replace(task);

                let level_after = self.session.level_info().level;
                if level_after > level_before {
                    self.add_log(RecordKind::Alert, format!("Level up! You reached level {level_after}"));
                }
            }
            Err(e) => self.add_log(RecordKind::Error, e.to_string()),
        }
    }

    async fn check_next_item(&mut self) {
        let Some(item_id) = self.checklist.iter().find(|item| !item.completed).map(|item| item.id) else {
            self.add_log(RecordKind::Info, "Checklist already complete".to_string());
            return;
        };
        match self.session.api().complete_checklist(item_id).await {
            Ok(item) => {
                self.add_log(RecordKind::Info, format!("Checked off {}", item.title));
                apply_update(&mut self.checklist, item);
            }
            Err(e) => self.add_log(RecordKind::Error, e.to_string()),
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.day.tasks.len();
        if len == 0 {
            self.task_state.select(None);
            return;
        }
        let current = self.task_state.selected().unwrap_or(0) as isize;
        let next = (current + delta).rem_euclid(len as isize) as usize;
        self.task_state.select(Some(next));
    }

    async fn change_day(&mut self, date: NaiveDate) {
        self.date = date;
        self.refresh_tasks().await;
    }

    /// Handle one key press. Returns `false` when the app should exit.
    async fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return false,
            KeyCode::Char('?') => self.show_help_menu = !self.show_help_menu,
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::Enter | KeyCode::Char(' ') => self.toggle_selected_task().await,
            KeyCode::Left => self.change_day(shift_date(self.date, -1)).await,
            KeyCode::Right => self.change_day(shift_date(self.date, 1)).await,
            KeyCode::Char('t') => self.change_day(self.today).await,
            KeyCode::Tab => self.load_rankings(self.period.next()).await,
            KeyCode::Char('c') => self.check_next_item().await,
            KeyCode::Char('r') => {
                self.refresh_all().await;
                self.add_log(RecordKind::Info, "Refreshed".to_string());
            }
            _ => {}
        }
        true
    }

    // === Rendering ===

    /// Render the level and weekly goal gauges
    fn draw_gauges(&self, frame: &mut Frame, area: Rect) {
        let [level_area, week_area] =
            Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)]).areas(area);

        let info = self.session.level_info();
        let level_gauge = Gauge::default()
            .block(Block::bordered().title(format!(
                " level {} · {}  ",
                info.level,
                LevelTier::from_level(info.level)
            )))
            .gauge_style(Style::default().light_green())
            .percent(info.percent_rounded().min(100))
            .label(format!(
                "{} pt · {} pt to level {}",
                info.total_points,
                info.points_to_next,
                info.next_level
            ));
        frame.render_widget(level_gauge, level_area);

        let week_points = self.session.user().and_then(|user| user.week_points);
        let week_percent = weekly_goal_percent(week_points);
        let week_gauge = Gauge::default()
            .block(Block::bordered().title(" this week  "))
            .gauge_style(Style::default().light_blue())
            .percent(week_percent.round() as u16)
            .label(format!("{} pt ({:.0}%)", week_points.unwrap_or(0), week_percent));
        frame.render_widget(week_gauge, week_area);
    }

    /// Render the task table for the selected day
    fn draw_tasks(&mut self, frame: &mut Frame, area: Rect) {
        let rows = self.day.tasks.iter().map(|task| {
            let points = format_points(task.task_type.points);
            let points = if task.task_type.points >= 0 {
                Span::styled(points, Style::default().light_green())
            } else {
                Span::styled(points, Style::default().light_red())
            };
            let row = Row::new(vec![
                Cell::new(if task.completed { "[x]" } else { "[ ]" }),
                Cell::new(task.task_type.category.clone()),
                Cell::new(task.task_type.name.clone()),
                Cell::new(Text::from(points).alignment(Alignment::Right)),
            ]);
            if task.completed { row.dim() } else { row }
        });

        let day_label = if self.date == self.today {
            format!("{} (today)", format_date(self.date))
        } else {
            format_date(self.date)
        };
        let table = Table::new(
            rows,
            [
                Constraint::Length(3),
                Constraint::Fill(1),
                Constraint::Fill(2),
                Constraint::Length(8),
            ],
        )
        .header(Row::new(vec!["", "category", "task", "points"]).bold())
        .row_highlight_style(Style::default().reversed())
        .block(
            Block::bordered()
                .padding(Padding::horizontal(1))
                .title(format!(" tasks {}  ", day_label))
                .title_bottom(format!(" earned {}  ", format_points(self.day.earned_points()))),
        );
        frame.render_stateful_widget(table, area, &mut self.task_state);
    }

    /// Render the leaderboard for the selected period
    fn draw_rankings(&self, frame: &mut Frame, area: Rect) {
        let viewer = self.session.username();
        let rows = ranking_rows(&self.rankings, self.period, viewer).into_iter().map(|row| {
            let name = if row.is_viewer {
                format!("{} (you)", row.username)
            } else {
                row.username.clone()
            };
            let value = match row.secondary_total {
                Some(total) => format!("{} ({})", row.value, total),
                None => row.value.to_string(),
            };
            Row::new(vec![
                Cell::new(Text::from(row.badge.to_string()).alignment(Alignment::Center)),
                Cell::new(name),
                Cell::new(format!("Lv{}", row.level)),
                Cell::new(Text::from(value).alignment(Alignment::Right)),
            ])
            .style(ranking_row_style(&row))
        });

        let table = Table::new(
            rows,
            [
                Constraint::Length(4),
                Constraint::Fill(2),
                Constraint::Length(5),
                Constraint::Fill(1),
            ],
        )
        .header(Row::new(vec!["", "user", "lv", points_label(self.period)]).bold())
        .block(
            Block::bordered()
                .padding(Padding::horizontal(1))
                .title(format!(" ranking · {}  ", self.period))
                .title_bottom(self.ranking_footer()),
        );
        frame.render_widget(table, area);
    }

    fn ranking_footer(&self) -> String {
        let rank = self
            .session
            .username()
            .map_or_else(|| "-".to_string(), |name| describe_self_rank(self_rank(&self.rankings, name)));
        if is_capped(&self.rankings) {
            format!(" you: {rank} · top {RANKING_CAP} only  ")
        } else {
            format!(" you: {rank}  ")
        }
    }

    /// Render the checklist with its progress
    fn draw_checklist(&self, frame: &mut Frame, area: Rect) {
        let progress = ChecklistProgress::of(&self.checklist);
        let items: Vec<ListItem> = self
            .checklist
            .iter()
            .map(|item| {
                let mut spans = vec![
                    Span::raw(if item.completed { "[x] " } else { "[ ] " }),
                    Span::raw(item.title.clone()),
                ];
                if let Some(deadline) = item.deadline {
                    let due = format!("  due {}", format_date(deadline));
                    if is_overdue(item, self.today) {
                        spans.push(Span::styled(due, Style::default().light_red()));
                    } else {
                        spans.push(Span::raw(due));
                    }
                }
                let line = Line::from(spans);
                if item.completed {
                    ListItem::new(line).dim()
                } else {
                    ListItem::new(line)
                }
            })
            .collect();

        let list = List::new(items).block(Block::bordered().padding(Padding::horizontal(1)).title(format!(
            " checklist {}/{} ({:.0}%)  ",
            progress.completed, progress.total, progress.percent
        )));
        frame.render_widget(list, area);
    }

    /// Render the history window
    fn draw_log(&self, frame: &mut Frame, area: Rect) {
        let records: Vec<ListItem> = self.log.iter().map(ListItem::from).collect();
        let list = List::new(records)
            .direction(ListDirection::BottomToTop)
            .block(Block::bordered().title(" history  "));
        frame.render_widget(list, area);
    }

    /// Render the status bar at the bottom
    fn draw_help_bar(&self, frame: &mut Frame, area: Rect) {
        let who = match self.session.username() {
            Some(name) => format!("● {name}").green(),
            None => "● logged out".red(),
        };
        let help_message = vec![
            who,
            " | press ".into(),
            "?".bold().white(),
            " for help, ".into(),
            "Enter".bold().white(),
            " to toggle a task, or ".into(),
            "q".bold().white(),
            " to exit".into(),
        ];
        frame.render_widget(Paragraph::new(Line::from(help_message)), area);
    }

    /// Render the help menu overlay
    fn draw_help_menu(&self, frame: &mut Frame) {
        let vertical = Layout::vertical([Constraint::Max(24)]).flex(Flex::Center);
        let horizontal = Layout::horizontal([Constraint::Max(64)]).flex(Flex::Center);
        let [help_area] = vertical.areas(frame.area());
        let [help_area] = horizontal.areas(help_area);
        frame.render_widget(Clear, help_area);

        let help = Paragraph::new(HELP).block(Block::bordered().padding(Padding::uniform(1)).title(" keys  "));
        frame.render_widget(help, help_area);
    }

    /// Main draw function - orchestrates rendering of all UI components
    fn draw(&mut self, frame: &mut Frame) {
        let window = Layout::vertical([
            Constraint::Length(3), // Gauges
            Constraint::Min(8),    // Tasks + ranking
            Constraint::Length(9), // Checklist + history
            Constraint::Length(1), // Help bar
        ]);
        let [gauge_area, middle_area, bottom_area, help_area] = window.areas(frame.area());

        let [task_area, ranking_area] =
            Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)]).areas(middle_area);
        let [checklist_area, log_area] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(bottom_area);

        self.draw_gauges(frame, gauge_area);
        self.draw_tasks(frame, task_area);
        self.draw_rankings(frame, ranking_area);
        self.draw_checklist(frame, checklist_area);
        self.draw_log(frame, log_area);
        self.draw_help_bar(frame, help_area);

        if self.show_help_menu {
            self.draw_help_menu(frame);
        }
    }

    /// Run the dashboard until the user exits
    pub async fn run(&mut self, mut terminal: DefaultTerminal) -> Result<()> {
        self.refresh_all().await;

        loop {
            terminal.draw(|frame| self.draw(frame))?;

            if event::poll(POLL_TIMEOUT)?
                && let Event::Key(KeyEvent { code, kind, .. }) = event::read()?
                && kind == KeyEventKind::Press
                && !self.handle_key(code).await
            {
                return Ok(());
            }
        }
    }
}
