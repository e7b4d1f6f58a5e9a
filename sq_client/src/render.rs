//! Plain-text views for the line-oriented client.

use chrono::NaiveDate;
use std::fmt::Write;
use study_quest::{
    checklist::{ChecklistProgress, is_overdue, sorted_by_order},
    level::{LevelInfo, LevelTier, weekly_goal_percent},
    models::{ChecklistItem, RankingPeriod, RankingUser, Task, TaskType, User},
    ranking::{RANKING_CAP, describe_self_rank, is_capped, podium, points_label, ranking_rows, self_rank, top_preview},
    schedule::{completed_count, earned_points, format_date, format_points, group_by_category},
};

const BAR_WIDTH: usize = 20;

/// A `[#####.....]` bar for a percentage in `0..=100`.
pub fn progress_bar(percent: f64) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * BAR_WIDTH as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

pub fn level(info: &LevelInfo) -> String {
    format!(
        "Level {} ({})  {} {:.0}%\n{} pt total, {} pt to level {} ({} pt)",
        info.level,
        LevelTier::from_level(info.level),
        progress_bar(info.progress_percent),
        info.progress_percent,
        info.total_points,
        info.points_to_next,
        info.next_level,
        info.next_level_threshold,
    )
}

pub fn profile(user: &User, info: &LevelInfo) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} <{}>", user.username, user.email);
    let _ = writeln!(out, "Member since {}", user.created_at.format("%Y-%m-%d"));
    let _ = writeln!(out, "{}", level(info));
    let week = user.week_points.unwrap_or(0);
    let _ = write!(
        out,
        "This week: {} pt {} {:.0}% of weekly goal",
        week,
        progress_bar(weekly_goal_percent(user.week_points)),
        weekly_goal_percent(user.week_points)
    );
    out
}

pub fn tasks(date: NaiveDate, tasks: &[Task]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Tasks for {}", format_date(date));
    if tasks.is_empty() {
        out.push_str("  (no tasks)\n");
    }
    for task in tasks {
        let _ = writeln!(
            out,
            "  [{}] #{} {} / {} {}",
            if task.completed { "x" } else { " " },
            task.id,
            task.task_type.category,
            task.task_type.name,
            format_points(task.task_type.points)
        );
    }
    let _ = write!(
        out,
        "{}/{} done, {} today",
        completed_count(tasks),
        tasks.len(),
        format_points(earned_points(tasks))
    );
    out
}

pub fn task_types(task_types: &[TaskType]) -> String {
    let mut out = String::new();
    for (category, members) in group_by_category(task_types) {
        let _ = writeln!(out, "{category}");
        for task_type in members {
            let _ = writeln!(
                out,
                "  #{} {} {}",
                task_type.id,
                task_type.name,
                format_points(task_type.points)
            );
        }
    }
    if out.is_empty() {
        out.push_str("(no task types)\n");
    }
    out.trim_end().to_string()
}

pub fn checklist(items: &[ChecklistItem], today: NaiveDate) -> String {
    let progress = ChecklistProgress::of(items);
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Checklist {}/{} complete {}",
        progress.completed,
        progress.total,
        progress_bar(progress.percent)
    );
    for item in sorted_by_order(items) {
        let _ = write!(
            out,
            "  [{}] #{} {}",
            if item.completed { "x" } else { " " },
            item.id,
            item.title
        );
        if let Some(deadline) = item.deadline {
            let _ = write!(out, " (due {})", format_date(deadline));
            if is_overdue(&item, today) {
                out.push_str(" OVERDUE");
            }
        }
        out.push('\n');
        if let Some(description) = &item.description {
            let _ = writeln!(out, "      {description}");
        }
    }
    out.trim_end().to_string()
}

pub fn rankings(entries: &[RankingUser], period: RankingPeriod, viewer: Option<&str>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Leaderboard: {}", points_label(period));
    if entries.is_empty() {
        out.push_str("  (no ranking data)\n");
    } else {
        let [first, second, third] = podium(entries);
        let _ = writeln!(out, "Podium: 🥇 {first}  🥈 {second}  🥉 {third}");
    }
    for row in ranking_rows(entries, period, viewer) {
        let _ = write!(
            out,
            "  {:>3}  {:<16} Lv{:<3} {:>6} pt",
            row.badge.to_string(),
            row.username,
            row.level,
            row.value
        );
        if let Some(total) = row.secondary_total {
            let _ = write!(out, "  (total {total} pt)");
        }
        if row.is_viewer {
            out.push_str("  <- you");
        }
        out.push('\n');
    }
    if is_capped(entries) {
        let _ = writeln!(out, "  (showing the top {RANKING_CAP} only)");
    }
    if let Some(viewer) = viewer {
        let _ = write!(out, "Your rank: {}", describe_self_rank(self_rank(entries, viewer)));
    }
    out.trim_end().to_string()
}

/// Podium and the first few rows of the all-time top list.
pub fn top(entries: &[RankingUser], viewer: Option<&str>) -> String {
    rankings(top_preview(entries), RankingPeriod::All, viewer)
}
