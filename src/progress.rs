use chrono::{Duration, NaiveDate};
use crate::models::{Log, Task};

/// Derived view state for one task on a given day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaskProgress {
    /// Minutes logged for today, 0 when nothing is logged.
    pub time_spent_today: u32,
    /// Whether today's minutes reach the daily target.
    pub goal_met_today: bool,
    /// Today's minutes as a share of the target, capped at 100.
    pub progress_percent: f64,
    /// All-time sum of logged minutes.
    pub total_time: u64,
    /// Consecutive qualifying days ending today or yesterday.
    pub streak: u32,
}

/// One bar of the recent-history chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayEntry {
    pub date: NaiveDate,
    pub minutes: u32,
}

/// Computes today's progress, the all-time total, and the current streak.
///
/// Pure with respect to `(task.logs, task.target_time, today)`.
pub fn compute_progress(task: &Task, today: NaiveDate) -> TaskProgress {
    let time_spent_today = task.log_for(today).unwrap_or(0);
    let total_time = task.logs.iter().map(|l| u64::from(l.time_spent)).sum();
    let progress_percent = if task.target_time == 0 {
        0.0
    } else {
        (100.0 * f64::from(time_spent_today) / f64::from(task.target_time)).min(100.0)
    };

    TaskProgress {
        time_spent_today,
        goal_met_today: task.target_time > 0 && time_spent_today >= task.target_time,
        progress_percent,
        total_time,
        streak: compute_streak(&task.logs, task.target_time, today),
    }
}

/// Counts consecutive days meeting `target` walking back from the newest log.
///
/// The walk is anchored at `today`, or at yesterday when the newest log is not
/// from today, so an unlogged today does not break yesterday's streak. The
/// newest log must fall on the anchor day itself; every later log must be at
/// most one day before the previous counted day. Each must meet the target,
/// and the first log that fails ends the walk.
pub fn compute_streak(logs: &[Log], target: u32, today: NaiveDate) -> u32 {
    let mut sorted: Vec<&Log> = logs.iter().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));

    let mut cursor = today;
    if let Some(newest) = sorted.first() {
        if newest.date != today {
            cursor = cursor - Duration::days(1);
        }
    }

    let mut streak = 0;
    for log in sorted {
        let day_gap = (cursor - log.date).num_days();
        let max_gap = if streak == 0 { 0 } else { 1 };
        if (0..=max_gap).contains(&day_gap) && log.time_spent >= target {
            streak += 1;
            cursor = log.date;
        } else {
            break;
        }
    }
    streak
}

/// Minutes per day for the `days` days ending at `today`, oldest first.
pub fn recent_history(task: &Task, today: NaiveDate, days: u32) -> Vec<DayEntry> {
    (0..i64::from(days))
        .rev()
        .map(|back| {
            let date = today - Duration::days(back);
            DayEntry {
                date,
                minutes: task.log_for(date).unwrap_or(0),
            }
        })
        .collect()
}

/// Formats minutes as a short duration: `45m`, `2h`, `1h 30m`.
pub fn format_minutes(minutes: u64) -> String {
    if minutes < 60 {
        return format!("{}m", minutes);
    }
    let h = minutes / 60;
    let m = minutes % 60;
    if m > 0 {
        format!("{}h {}m", h, m)
    } else {
        format!("{}h", h)
    }
}
