//! Leaderboard display rules.
//!
//! Rankings arrive already sorted by the backend. Everything here only
//! decides which figure to show for a period, how to badge a rank, and
//! where the viewer sits in the list.

use serde::Serialize;
use std::fmt;

use crate::models::{RankingPeriod, RankingUser};

/// Maximum number of entries the rankings endpoint returns.
pub const RANKING_CAP: usize = 100;

/// Number of entries in the dashboard preview.
pub const TOP_PREVIEW_LEN: usize = 5;

/// Placeholder for an empty podium position.
pub const EMPTY_PODIUM: &str = "---";

/// Rank marker: medals for the podium, the plain number otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RankBadge {
    Gold,
    Silver,
    Bronze,
    Plain(u32),
}

impl RankBadge {
    pub fn from_rank(rank: u32) -> Self {
        match rank {
            1 => RankBadge::Gold,
            2 => RankBadge::Silver,
            3 => RankBadge::Bronze,
            n => RankBadge::Plain(n),
        }
    }

    pub fn is_medal(&self) -> bool {
        !matches!(self, RankBadge::Plain(_))
    }
}

impl fmt::Display for RankBadge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankBadge::Gold => write!(f, "🥇"),
            RankBadge::Silver => write!(f, "🥈"),
            RankBadge::Bronze => write!(f, "🥉"),
            RankBadge::Plain(n) => write!(f, "{n}"),
        }
    }
}

/// Heading of the points column for a period.
pub fn points_label(period: RankingPeriod) -> &'static str {
    match period {
        RankingPeriod::Week => "This week",
        RankingPeriod::Month => "This month",
        RankingPeriod::All => "All-time",
    }
}

/// The figure shown in the points column.
pub fn display_points(user: &RankingUser, period: RankingPeriod) -> i64 {
    match period {
        RankingPeriod::All => user.total_points.unwrap_or(0),
        RankingPeriod::Week | RankingPeriod::Month => user.points.unwrap_or(0),
    }
}

/// All-time total shown under period-scoped figures, when there is one.
pub fn secondary_total(user: &RankingUser, period: RankingPeriod) -> Option<i64> {
    match period {
        RankingPeriod::All => None,
        RankingPeriod::Week | RankingPeriod::Month => user.total_points.filter(|&total| total != 0),
    }
}

/// One rendered leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankingRow {
    pub rank: u32,
    pub badge: RankBadge,
    pub username: String,
    pub level: i64,
    pub label: &'static str,
    pub value: i64,
    pub secondary_total: Option<i64>,
    pub is_viewer: bool,
}

/// Rows for a leaderboard as seen by `viewer` (if logged in).
pub fn ranking_rows(entries: &[RankingUser], period: RankingPeriod, viewer: Option<&str>) -> Vec<RankingRow> {
    let label = points_label(period);
    entries
        .iter()
        .map(|entry| RankingRow {
            rank: entry.rank,
            badge: RankBadge::from_rank(entry.rank),
            username: entry.username.clone(),
            level: entry.level,
            label,
            value: display_points(entry, period),
            secondary_total: secondary_total(entry, period),
            is_viewer: viewer.is_some_and(|name| name == entry.username),
        })
        .collect()
}

/// 1-based position of `username` in the list, or `None` when unranked.
///
/// The list is capped at [`RANKING_CAP`] entries, so anyone beyond it is
/// reported as unranked rather than looked up separately.
pub fn self_rank(entries: &[RankingUser], username: &str) -> Option<usize> {
    entries
        .iter()
        .position(|entry| entry.username == username)
        .map(|idx| idx + 1)
}

/// Whether the list hit [`RANKING_CAP`], so entries past it were cut off.
pub fn is_capped(entries: &[RankingUser]) -> bool {
    entries.len() >= RANKING_CAP
}

/// Human-readable self rank, e.g. `"3rd"` or `"unranked"`.
pub fn describe_self_rank(rank: Option<usize>) -> String {
    match rank {
        Some(rank) => {
            let suffix = match (rank % 10, rank % 100) {
                (_, 11..=13) => "th",
                (1, _) => "st",
                (2, _) => "nd",
                (3, _) => "rd",
                _ => "th",
            };
            format!("{rank}{suffix}")
        }
        None => "unranked".to_string(),
    }
}

/// Usernames for the three podium positions.
pub fn podium(entries: &[RankingUser]) -> [&str; 3] {
    let name = |idx: usize| entries.get(idx).map_or(EMPTY_PODIUM, |e| e.username.as_str());
    [name(0), name(1), name(2)]
}

/// First entries of the top rankings, for the dashboard preview.
pub fn top_preview(entries: &[RankingUser]) -> &[RankingUser] {
    &entries[..entries.len().min(TOP_PREVIEW_LEN)]
}
