//! Data models shared between the backend API and the client.
//!
//! The backend owns every record here. The client only ever holds cached
//! copies and replaces them wholesale from API responses.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::errors::ModelError;

/// User ID type
pub type UserId = i64;

/// Task ID type
pub type TaskId = i64;

/// Task type ID type
pub type TaskTypeId = i64;

/// Checklist item ID type
pub type ChecklistId = i64;

/// User model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub username: String,
    /// Authoritative level, always >= 1 when it comes from the backend.
    pub level: i64,
    /// Authoritative cumulative points.
    pub total_points: i64,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week_points: Option<i64>,
}

/// Task category and reward (or penalty) definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskType {
    pub id: TaskTypeId,
    pub category: String,
    pub name: String,
    /// Positive for a reward, negative for a penalty.
    pub points: i64,
}

/// A task scheduled for one user on one day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub user_id: UserId,
    pub task_type: TaskType,
    pub date: NaiveDate,
    pub completed: bool,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Exam-prep checklist item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: ChecklistId,
    pub title: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
    pub order: i64,
    pub completed: bool,
}

/// Leaderboard row as returned by the rankings endpoints
///
/// Period rankings carry `points`, all-time rankings carry `total_points`.
/// Some backends send both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingUser {
    pub rank: u32,
    pub username: String,
    pub level: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_points: Option<i64>,
}

/// Time window for a leaderboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankingPeriod {
    Week,
    Month,
    #[default]
    All,
}

impl RankingPeriod {
    /// All periods in display order.
    pub const ALL: [RankingPeriod; 3] = [RankingPeriod::Week, RankingPeriod::Month, RankingPeriod::All];

    /// Query-string value used by the rankings endpoint.
    pub fn as_str(self) -> &'static str {
        match self {
            RankingPeriod::Week => "week",
            RankingPeriod::Month => "month",
            RankingPeriod::All => "all",
        }
    }

    /// The period after this one, wrapping around.
    pub fn next(self) -> Self {
        match self {
            RankingPeriod::Week => RankingPeriod::Month,
            RankingPeriod::Month => RankingPeriod::All,
            RankingPeriod::All => RankingPeriod::Week,
        }
    }
}

impl fmt::Display for RankingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RankingPeriod {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "week" => Ok(RankingPeriod::Week),
            "month" => Ok(RankingPeriod::Month),
            "all" => Ok(RankingPeriod::All),
            other => Err(ModelError::InvalidPeriod(other.to_string())),
        }
    }
}

/// Login/registration response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub user: User,
}

/// Task completion response carrying the post-completion user snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskCompletion {
    pub task: Task,
    pub user: User,
}

/// Plain acknowledgement body (`{"message": "..."}`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

/// Timestamps arrive either as RFC 3339 or as naive ISO-8601 (UTC implied).
pub mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

    /// Parse a backend timestamp.
    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .map(|naive| naive.and_utc())
    }

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp '{raw}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_accepts_naive_timestamp_and_missing_week_points() {
        let user: User = serde_json::from_str(
            r#"{"id":1,"email":"a@b.c","username":"a","level":2,"total_points":250,
                "created_at":"2024-04-01T09:30:00.123456"}"#,
        )
        .unwrap();
        assert_eq!(user.level, 2);
        assert_eq!(user.week_points, None);
        assert_eq!(user.created_at.format("%Y-%m-%d %H:%M").to_string(), "2024-04-01 09:30");
    }

    #[test]
    fn test_user_accepts_rfc3339_timestamp() {
        let user: User = serde_json::from_str(
            r#"{"id":1,"email":"a@b.c","username":"a","level":1,"total_points":0,
                "created_at":"2024-04-01T09:30:00+09:00","week_points":12}"#,
        )
        .unwrap();
        assert_eq!(user.created_at.format("%H:%M").to_string(), "00:30");
        assert_eq!(user.week_points, Some(12));
    }

    #[test]
    fn test_invalid_timestamp_rejected() {
        let result = serde_json::from_str::<User>(
            r#"{"id":1,"email":"a@b.c","username":"a","level":1,"total_points":0,"created_at":"yesterday"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_task_date_parses_calendar_date() {
        let task: Task = serde_json::from_str(
            r#"{"id":7,"user_id":1,"date":"2024-05-06","completed":false,
                "created_at":"2024-05-06 08:00:00",
                "task_type":{"id":3,"category":"Exam","name":"Mock test","points":30}}"#,
        )
        .unwrap();
        assert_eq!(task.date, NaiveDate::from_ymd_opt(2024, 5, 6).unwrap());
        assert_eq!(task.task_type.points, 30);
    }

    #[test]
    fn test_checklist_blank_description_is_none() {
        let item: ChecklistItem = serde_json::from_str(
            r#"{"id":1,"title":"Apply","description":"","deadline":null,"order":2,"completed":false}"#,
        )
        .unwrap();
        assert_eq!(item.description, None);
        assert_eq!(item.deadline, None);
    }

    #[test]
    fn test_ranking_user_optional_points() {
        let row: RankingUser =
            serde_json::from_str(r#"{"rank":1,"username":"a","level":3,"total_points":300}"#).unwrap();
        assert_eq!(row.points, None);
        assert_eq!(row.total_points, Some(300));
    }

    #[test]
    fn test_period_parse_and_display() {
        assert_eq!("week".parse::<RankingPeriod>().unwrap(), RankingPeriod::Week);
        assert_eq!(" MONTH ".parse::<RankingPeriod>().unwrap(), RankingPeriod::Month);
        assert_eq!(RankingPeriod::All.to_string(), "all");
        assert!(matches!(
            "year".parse::<RankingPeriod>(),
            Err(ModelError::InvalidPeriod(p)) if p == "year"
        ));
    }

    #[test]
    fn test_period_default_and_cycle() {
        assert_eq!(RankingPeriod::default(), RankingPeriod::All);
        assert_eq!(RankingPeriod::All.next(), RankingPeriod::Week);
        assert_eq!(RankingPeriod::Week.next().next(), RankingPeriod::All);
    }
}
