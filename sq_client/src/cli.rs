//! Line-oriented client: one command in, one text view out.

use anyhow::Result;
use chrono::{Local, NaiveDate};
use std::io::{self, BufRead, Write};
use study_quest::{
    checklist::apply_update,
    level::{HundredPointLevels, LevelEngine},
    models::ChecklistItem,
    schedule::{DayTasks, format_date, format_points, shift_date},
};

use crate::{
    commands::{Command, HELP, parse_command},
    credentials::CredentialStore,
    render,
    session::Session,
};

/// What the prompt loop should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Print the output and keep reading
    Continue(String),
    /// Print the output and stop
    Exit(String),
}

/// Interactive client state on top of a [`Session`].
pub struct CliApp<S: CredentialStore, L: LevelEngine = HundredPointLevels> {
    session: Session<S, L>,
    /// Day the task commands operate on
    date: NaiveDate,
    /// Last fetched tasks for `date`
    day: DayTasks,
    /// Last fetched checklist
    checklist: Vec<ChecklistItem>,
}

impl<S: CredentialStore, L: LevelEngine> CliApp<S, L> {
    pub fn new(session: Session<S, L>, today: NaiveDate) -> Self {
        Self {
            session,
            date: today,
            day: DayTasks::default(),
            checklist: Vec::new(),
        }
    }

    pub fn session(&self) -> &Session<S, L> {
        &self.session
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Parse and run one line of input. Errors are rendered inline.
    pub async fn handle_line(&mut self, line: &str) -> Outcome {
        let command = match parse_command(line) {
            Ok(command) => command,
            Err(e) => return Outcome::Continue(format!("Error: {e}")),
        };
        match self.execute(command).await {
            Ok(outcome) => outcome,
            Err(e) => Outcome::Continue(format!("Error: {e}")),
        }
    }

    /// Run a parsed command.
    pub async fn execute(&mut self, command: Command) -> Result<Outcome> {
        let output = match command {
            Command::Tasks(date) => {
                if let Some(date) = date {
                    self.date = date;
                }
                self.load_tasks().await?
            }
            Command::Shift(days) => {
                self.date = shift_date(self.date, days);
                self.load_tasks().await?
            }
            Command::Types => render::task_types(&self.session.api().task_types().await?),
            Command::Add { task_type_id, date } => {
                let date = date.unwrap_or(self.date);
                let task = self.session.api().create_task(task_type_id, date).await?;
                let summary = format!(
                    "Added #{} {} on {}",
                    task.id,
                    task.task_type.name,
                    format_date(task.date)
                );
                if self.day.date == Some(task.date) {
                    self.day.push_created(task);
                }
                summary
            }
            Command::Done(task_id) => {
                let task = self.session.complete_task(task_id).await?;
                let state = if task.completed { "completed" } else { "reopened" };
                let summary = format!(
                    "Task #{} {} ({})\n{}",
                    task.id,
                    state,
                    format_points(task.task_type.points),
                    render::level(&self.session.level_info())
                );
                self.day.replace(task);
                summary
            }
            Command::Remove(task_id) => {
                let response = self.session.api().delete_task(task_id).await?;
                self.day.remove(task_id);
                if response.message.is_empty() {
                    format!("Deleted task #{task_id}")
                } else {
                    response.message
                }
            }
            Command::Checklist => {
                self.checklist = self.session.api().checklists().await?;
                render::checklist(&self.checklist, self.date)
            }
            Command::Check(item_id) => {
                let item = self.session.api().complete_checklist(item_id).await?;
                let summary = format!("Checked off #{} {}", item.id, item.title);
                apply_update(&mut self.checklist, item);
                summary
            }
            Command::Rank(period) => {
                let entries = self.session.api().rankings(period).await?;
                render::rankings(&entries, period, self.session.username())
            }
            Command::Top => {
                let entries = self.session.api().top_rankings().await?;
                render::top(&entries, self.session.username())
            }
            Command::Profile(None) => {
                let user = self.session.refresh_profile().await?.clone();
                render::profile(&user, &self.session.level_info())
            }
            Command::Profile(Some(user_id)) => {
                let user = self.session.api().user_profile(user_id).await?;
                render::profile(&user, &self.session.levels().level_info(user.level, user.total_points))
            }
            Command::Level => render::level(&self.session.level_info()),
            Command::Logout => {
                self.session.logout().await?;
                return Ok(Outcome::Exit("Logged out.".to_string()));
            }
            Command::Help => HELP.trim_end().to_string(),
            Command::Quit => return Ok(Outcome::Exit("Bye!".to_string())),
        };
        Ok(Outcome::Continue(output))
    }

    async fn load_tasks(&mut self) -> Result<String> {
        let tasks = self.session.api().tasks(Some(self.date)).await?;
        self.day = DayTasks::new(self.date, tasks);
        Ok(render::tasks(self.date, &self.day.tasks))
    }

    /// Read commands from stdin until `quit`, `logout` or end of input.
    pub async fn run(mut self) -> Result<()> {
        println!("Type 'help' to see available commands.");
        let stdin = io::stdin();
        loop {
            print!("{}> ", self.session.username().unwrap_or("guest"));
            io::stdout().flush()?;

            let mut input = String::new();
            if stdin.lock().read_line(&mut input)? == 0 {
                return Ok(());
            }
            if input.trim().is_empty() {
                continue;
            }

            match self.handle_line(&input).await {
                Outcome::Continue(output) => println!("{output}"),
                Outcome::Exit(output) => {
                    println!("{output}");
                    return Ok(());
                }
            }
        }
    }
}

/// Today's date in local time.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
