//! # Study Quest
//!
//! Domain model and display logic for a gamified study-task tracker.
//!
//! The backend owns users, tasks, checklists and rankings, and is the
//! authority on points and levels. This crate holds the cached models and
//! the pure derivations the client shows on top of them:
//!
//! - [`level`]: level thresholds and progress from (level, total points)
//! - [`ranking`]: which figure a leaderboard row shows for a period, rank
//!   badges, and the viewer's own position
//! - [`schedule`]: daily earned points, task-type grouping, dates
//! - [`checklist`]: checklist progress and overdue items
//!
//! None of these perform I/O.
//!
//! ## Example
//!
//! ```
//! use study_quest::level::level_info;
//!
//! let info = level_info(5, 550);
//! assert_eq!(info.progress_percent, 50.0);
//! assert_eq!(info.points_to_next, 50);
//! ```

pub mod checklist;
pub mod errors;
pub mod level;
pub mod models;
pub mod ranking;
pub mod schedule;

pub use errors::{ModelError, ModelResult};
pub use level::{HundredPointLevels, LevelEngine, LevelInfo, LevelTier, level_info};
pub use models::{
    AuthResponse, ChecklistItem, MessageResponse, RankingPeriod, RankingUser, Task, TaskCompletion, TaskType,
    User, UserId,
};
pub use ranking::{RankBadge, RankingRow, ranking_rows, self_rank};
