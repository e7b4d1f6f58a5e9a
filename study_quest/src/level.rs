//! Level progress derived from a user's level and cumulative points.
//!
//! The backend is the authority on both numbers. The client only derives
//! display values from them, so every output here is clamped to a sane
//! range even when the inputs disagree with each other (a stale level after
//! a multi-level jump, or points corrected downwards by the server).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::User;

/// Points spanned by each level band.
pub const POINTS_PER_LEVEL: i64 = 100;

/// Lowest valid level. Anything below is treated as this.
pub const MIN_LEVEL: i64 = 1;

/// Weekly points target shown on the profile page.
pub const WEEKLY_GOAL_POINTS: i64 = 500;

/// Derived level progress for display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelInfo {
    /// Level after normalisation (never below [`MIN_LEVEL`]).
    pub level: i64,
    /// Level reached at `next_level_threshold`.
    pub next_level: i64,
    pub total_points: i64,
    pub current_level_threshold: i64,
    pub next_level_threshold: i64,
    /// Always within `0.0..=100.0`.
    pub progress_percent: f64,
    /// Never negative.
    pub points_to_next: i64,
}

impl LevelInfo {
    /// Progress as a whole percentage, for gauges.
    pub fn percent_rounded(&self) -> u16 {
        self.progress_percent.round() as u16
    }
}

/// Formula mapping (level, points) to level progress.
///
/// Kept behind a trait so the client-side formula can be swapped for a
/// value served by the backend without touching callers.
pub trait LevelEngine {
    fn level_info(&self, level: i64, total_points: i64) -> LevelInfo;

    /// Level info for an optional user; a missing user is level 1 with no points.
    fn for_user(&self, user: Option<&User>) -> LevelInfo {
        match user {
            Some(user) => self.level_info(user.level, user.total_points),
            None => self.level_info(MIN_LEVEL, 0),
        }
    }
}

/// Fixed 100-points-per-level bands, mirroring the backend formula.
#[derive(Debug, Clone, Copy, Default)]
pub struct HundredPointLevels;

impl LevelEngine for HundredPointLevels {
    fn level_info(&self, level: i64, total_points: i64) -> LevelInfo {
        let level = level.max(MIN_LEVEL);
        let next_level = level.saturating_add(1);
        let current = level.saturating_mul(POINTS_PER_LEVEL);
        let next = next_level.saturating_mul(POINTS_PER_LEVEL);
        let band = next.saturating_sub(current);

        let progress_percent = if band > 0 {
            let into_band = total_points.saturating_sub(current) as f64;
            (into_band / band as f64 * 100.0).clamp(0.0, 100.0)
        } else {
            100.0
        };

        LevelInfo {
            level,
            next_level,
            total_points,
            current_level_threshold: current,
            next_level_threshold: next,
            progress_percent,
            points_to_next: next.saturating_sub(total_points).max(0),
        }
    }
}

/// Level info using the default formula.
pub fn level_info(level: i64, total_points: i64) -> LevelInfo {
    HundredPointLevels.level_info(level, total_points)
}

/// Badge tier shown next to a level number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelTier {
    Novice,
    Intermediate,
    Advanced,
    Expert,
    Legendary,
}

impl LevelTier {
    pub fn from_level(level: i64) -> Self {
        match level {
            l if l >= 50 => LevelTier::Legendary,
            l if l >= 30 => LevelTier::Expert,
            l if l >= 20 => LevelTier::Advanced,
            l if l >= 10 => LevelTier::Intermediate,
            _ => LevelTier::Novice,
        }
    }
}

impl fmt::Display for LevelTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelTier::Novice => write!(f, "novice"),
            LevelTier::Intermediate => write!(f, "intermediate"),
            LevelTier::Advanced => write!(f, "advanced"),
            LevelTier::Expert => write!(f, "expert"),
            LevelTier::Legendary => write!(f, "legendary"),
        }
    }
}

/// Progress towards [`WEEKLY_GOAL_POINTS`], clamped to `0.0..=100.0`.
pub fn weekly_goal_percent(week_points: Option<i64>) -> f64 {
    let points = week_points.unwrap_or(0) as f64;
    (points / WEEKLY_GOAL_POINTS as f64 * 100.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thresholds_at_band_start() {
        let info = level_info(5, 500);
        assert_eq!(info.current_level_threshold, 500);
        assert_eq!(info.next_level_threshold, 600);
        assert_eq!(info.points_to_next, 100);
        assert_eq!(info.progress_percent, 0.0);
        assert_eq!(info.next_level, 6);
    }

    #[test]
    fn test_mid_band_progress() {
        assert_eq!(level_info(5, 550).progress_percent, 50.0);
        assert_eq!(level_info(5, 575).percent_rounded(), 75);
    }

    #[test]
    fn test_points_below_band_clamp_to_zero() {
        let info = level_info(5, 450);
        assert_eq!(info.progress_percent, 0.0);
        assert_eq!(info.points_to_next, 150);
    }

    #[test]
    fn test_points_above_band_clamp_to_hundred() {
        let info = level_info(5, 650);
        assert_eq!(info.progress_percent, 100.0);
        assert_eq!(info.points_to_next, 0);
    }

    #[test]
    fn test_level_below_one_is_normalised() {
        assert_eq!(level_info(0, 150), level_info(1, 150));
        assert_eq!(level_info(-3, 150).level, 1);
    }

    #[test]
    fn test_missing_user_is_level_one() {
        let info = HundredPointLevels.for_user(None);
        assert_eq!(info.level, 1);
        assert_eq!(info.total_points, 0);
        assert_eq!(info.progress_percent, 0.0);
        assert_eq!(info.points_to_next, 200);
    }

    #[test]
    fn test_extreme_level_does_not_overflow() {
        let info = level_info(i64::MAX, i64::MAX);
        assert!((0.0..=100.0).contains(&info.progress_percent));
        assert!(info.points_to_next >= 0);
        assert_eq!(info.next_level, i64::MAX);
    }

    #[test]
    fn test_level_tier_boundaries() {
        assert_eq!(LevelTier::from_level(1), LevelTier::Novice);
        assert_eq!(LevelTier::from_level(9), LevelTier::Novice);
        assert_eq!(LevelTier::from_level(10), LevelTier::Intermediate);
        assert_eq!(LevelTier::from_level(20), LevelTier::Advanced);
        assert_eq!(LevelTier::from_level(30), LevelTier::Expert);
        assert_eq!(LevelTier::from_level(49), LevelTier::Expert);
        assert_eq!(LevelTier::from_level(50), LevelTier::Legendary);
    }

    #[test]
    fn test_weekly_goal_percent() {
        assert_eq!(weekly_goal_percent(Some(250)), 50.0);
        assert_eq!(weekly_goal_percent(Some(900)), 100.0);
        assert_eq!(weekly_goal_percent(None), 0.0);
        assert_eq!(weekly_goal_percent(Some(-20)), 0.0);
    }
}
