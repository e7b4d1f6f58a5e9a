use chrono::NaiveDate;
use std::fmt;
use study_quest::{
    models::{ChecklistId, RankingPeriod, TaskId, TaskTypeId, UserId},
    schedule::parse_date,
};

/// A command entered at the interactive prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List tasks for a day (the current day when omitted)
    Tasks(Option<NaiveDate>),
    /// Move the current day forwards or backwards
    Shift(i64),
    /// List task types by category
    Types,
    /// Schedule a task of the given type
    Add {
        task_type_id: TaskTypeId,
        date: Option<NaiveDate>,
    },
    /// Toggle a task's completion
    Done(TaskId),
    /// Delete a task
    Remove(TaskId),
    /// Show the checklist
    Checklist,
    /// Mark a checklist item complete
    Check(ChecklistId),
    /// Leaderboard for a period
    Rank(RankingPeriod),
    /// Top rankings preview
    Top,
    /// Own profile, or another user's
    Profile(Option<UserId>),
    /// Level progress
    Level,
    Logout,
    Help,
    Quit,
}

/// Errors that can occur during command parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A required argument is missing.
    MissingArgument { usage: &'static str },
    /// An ID argument is not a number.
    InvalidId(String),
    /// A date argument is not YYYY-MM-DD.
    InvalidDate(String),
    /// A day offset is not a whole number.
    InvalidOffset(String),
    /// Unknown ranking period.
    InvalidPeriod(String),
    /// Unrecognized command.
    UnrecognizedCommand(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingArgument { usage } => write!(f, "Missing argument. Usage: {}", usage),
            Self::InvalidId(value) => write!(f, "Invalid ID '{}'. Must be a positive number", value),
            Self::InvalidDate(value) => write!(f, "Invalid date '{}'. Use YYYY-MM-DD (e.g., '2024-05-06')", value),
            Self::InvalidOffset(value) => {
                write!(f, "Invalid day offset '{}'. Use a whole number (e.g., 'next 2')", value)
            }
            Self::InvalidPeriod(value) => {
                write!(f, "Invalid period '{}'. Use 'week', 'month' or 'all'", value)
            }
            Self::UnrecognizedCommand(cmd) => write!(
                f,
                "Unrecognized command '{}'. Type 'help' to see available commands",
                cmd
            ),
        }
    }
}

impl std::error::Error for ParseError {}

/// Help text listing every command.
pub const HELP: &str = "\
tasks [DATE]
        List tasks for DATE (YYYY-MM-DD), or for the current day.
next [DAYS] / prev [DAYS]
        Move the current day forwards or backwards (default 1 day).
types
        List task types grouped by category.
add <TYPE_ID> [DATE]
        Schedule a task of TYPE_ID on DATE, or on the current day.
done <TASK_ID>
        Toggle a task's completion. Your points and level update from the server.
rm <TASK_ID>
        Delete a task.
checklist
        Show the exam-prep checklist.
check <ITEM_ID>
        Mark a checklist item complete.
rank [week|month|all]
        Show the leaderboard (default: all).
top
        Show the top rankings preview.
profile [USER_ID]
        Show your profile, or another user's.
level
        Show your level progress.
logout
        Log out and forget stored credentials.
help
        Show this help.
quit
        Exit.
";

/// Parse a command string into a [`Command`].
///
/// # Examples
///
/// ```
/// use sq_client::commands::{Command, parse_command};
/// use study_quest::models::RankingPeriod;
///
/// assert_eq!(parse_command("done 12"), Ok(Command::Done(12)));
/// assert_eq!(parse_command("rank week"), Ok(Command::Rank(RankingPeriod::Week)));
/// assert_eq!(parse_command("rank"), Ok(Command::Rank(RankingPeriod::All)));
/// ```
pub fn parse_command(input: &str) -> Result<Command, ParseError> {
    let trimmed = input.trim();

    // Try single-word commands first
    match trimmed {
        "types" => return Ok(Command::Types),
        "checklist" => return Ok(Command::Checklist),
        "top" => return Ok(Command::Top),
        "level" => return Ok(Command::Level),
        "logout" => return Ok(Command::Logout),
        "help" | "?" => return Ok(Command::Help),
        "quit" | "exit" => return Ok(Command::Quit),
        _ => {}
    }

    let parts: Vec<&str> = trimmed.split_ascii_whitespace().collect();
    match parts.first() {
        Some(&"tasks") => Ok(Command::Tasks(parts.get(1).map(|d| parse_day(d)).transpose()?)),
        Some(&"next") => Ok(Command::Shift(parse_offset(parts.get(1))?)),
        Some(&"prev") => Ok(Command::Shift(-parse_offset(parts.get(1))?)),
        Some(&"add") => {
            let task_type_id = parse_id(parts.get(1), "add <TYPE_ID> [DATE]")?;
            let date = parts.get(2).map(|d| parse_day(d)).transpose()?;
            Ok(Command::Add { task_type_id, date })
        }
        Some(&"done") => Ok(Command::Done(parse_id(parts.get(1), "done <TASK_ID>")?)),
        Some(&"rm") => Ok(Command::Remove(parse_id(parts.get(1), "rm <TASK_ID>")?)),
        Some(&"check") => Ok(Command::Check(parse_id(parts.get(1), "check <ITEM_ID>")?)),
        Some(&"rank") => match parts.get(1) {
            Some(period) => period
                .parse()
                .map(Command::Rank)
                .map_err(|_| ParseError::InvalidPeriod(period.to_string())),
            None => Ok(Command::Rank(RankingPeriod::default())),
        },
        Some(&"profile") => match parts.get(1) {
            Some(id) => Ok(Command::Profile(Some(parse_id(Some(id), "profile [USER_ID]")?))),
            None => Ok(Command::Profile(None)),
        },
        _ => Err(ParseError::UnrecognizedCommand(trimmed.to_string())),
    }
}

/// Parse a positive numeric ID argument
fn parse_id(value: Option<&&str>, usage: &'static str) -> Result<i64, ParseError> {
    let value = value.ok_or(ParseError::MissingArgument { usage })?;
    value
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ParseError::InvalidId(value.to_string()))
}

fn parse_day(value: &str) -> Result<NaiveDate, ParseError> {
    parse_date(value).map_err(|_| ParseError::InvalidDate(value.to_string()))
}

fn parse_offset(value: Option<&&str>) -> Result<i64, ParseError> {
    match value {
        Some(value) => value
            .parse::<i64>()
            .map_err(|_| ParseError::InvalidOffset(value.to_string())),
        None => Ok(1),
    }
}
