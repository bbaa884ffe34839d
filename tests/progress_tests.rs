use chrono::{Duration, NaiveDate, Utc};
use streakboard::models::{Log, Task};
use streakboard::progress::{compute_progress, compute_streak, recent_history, DayEntry};
use uuid::Uuid;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
}

fn days_ago(n: i64) -> NaiveDate {
    today() - Duration::days(n)
}

fn task_with(target: u32, logs: &[(i64, u32)]) -> Task {
    let mut task = Task {
        id: Uuid::new_v4(),
        name: "Study".into(),
        target_time: target,
        logs: Vec::new(),
        created_at: Utc::now(),
    };
    for &(ago, minutes) in logs {
        task.set_log(days_ago(ago), minutes);
    }
    task
}

#[test]
fn test_streak_today_and_yesterday() {
    let task = task_with(60, &[(0, 60), (1, 60)]);
    assert_eq!(compute_progress(&task, today()).streak, 2);
}

#[test]
fn test_streak_broken_by_short_today() {
    let task = task_with(60, &[(0, 30), (1, 60)]);
    assert_eq!(compute_progress(&task, today()).streak, 0);
}

#[test]
fn test_streak_survives_unlogged_today() {
    let task = task_with(60, &[(1, 60), (2, 60)]);
    assert_eq!(compute_progress(&task, today()).streak, 2);
}

#[test]
fn test_streak_stops_at_gap() {
    let task = task_with(60, &[(0, 60), (3, 60)]);
    assert_eq!(compute_progress(&task, today()).streak, 1);
}

#[test]
fn test_short_day_hides_older_qualifying_days() {
    let task = task_with(30, &[(0, 45), (1, 10), (2, 45), (3, 45)]);
    assert_eq!(compute_progress(&task, today()).streak, 1);
}

#[test]
fn test_long_unbroken_streak() {
    let logs: Vec<(i64, u32)> = (0..30).map(|d| (d, 25)).collect();
    let task = task_with(20, &logs);
    assert_eq!(compute_progress(&task, today()).streak, 30);
}

#[test]
fn test_streak_ignores_input_order() {
    let logs = vec![
        Log { date: days_ago(2), time_spent: 60 },
        Log { date: days_ago(0), time_spent: 60 },
        Log { date: days_ago(1), time_spent: 60 },
    ];
    assert_eq!(compute_streak(&logs, 60, today()), 3);
}

#[test]
fn test_streak_needs_today_or_yesterday() {
    // Nothing logged yesterday or today: older qualifying days are history.
    let task = task_with(60, &[(2, 60), (3, 60)]);
    assert_eq!(compute_progress(&task, today()).streak, 0);

    let task = task_with(60, &[(3, 60)]);
    assert_eq!(compute_progress(&task, today()).streak, 0);
}

#[test]
fn test_empty_logs() {
    let task = task_with(45, &[]);
    let p = compute_progress(&task, today());
    assert_eq!(p.streak, 0);
    assert_eq!(p.total_time, 0);
    assert_eq!(p.time_spent_today, 0);
    assert!(!p.goal_met_today);
    assert_eq!(p.progress_percent, 0.0);
}

#[test]
fn test_today_progress_and_cap() {
    let task = task_with(40, &[(0, 10)]);
    let p = compute_progress(&task, today());
    assert_eq!(p.time_spent_today, 10);
    assert_eq!(p.progress_percent, 25.0);
    assert!(!p.goal_met_today);

    let task = task_with(40, &[(0, 100)]);
    let p = compute_progress(&task, today());
    assert_eq!(p.progress_percent, 100.0);
    assert!(p.goal_met_today);
}

#[test]
fn test_goal_met_exactly_at_target() {
    let task = task_with(40, &[(0, 40)]);
    assert!(compute_progress(&task, today()).goal_met_today);
}

#[test]
fn test_total_time_counts_every_log() {
    let task = task_with(60, &[(0, 5), (1, 60), (10, 90), (400, 15)]);
    let p = compute_progress(&task, today());
    assert_eq!(p.total_time, 170);
    assert_eq!(p.streak, 0);
}

#[test]
fn test_progress_is_repeatable() {
    let task = task_with(30, &[(0, 30), (1, 30), (5, 10)]);
    assert_eq!(compute_progress(&task, today()), compute_progress(&task, today()));
}

#[test]
fn test_recent_history_fills_missing_days() {
    let task = task_with(30, &[(0, 30), (2, 15), (9, 50)]);
    let history = recent_history(&task, today(), 3);
    assert_eq!(
        history,
        vec![
            DayEntry { date: days_ago(2), minutes: 15 },
            DayEntry { date: days_ago(1), minutes: 0 },
            DayEntry { date: days_ago(0), minutes: 30 },
        ]
    );
    assert_eq!(recent_history(&task, today(), 7).len(), 7);
}

#[test]
fn test_future_log_does_not_start_a_streak() {
    let logs = vec![
        Log { date: today() + Duration::days(3), time_spent: 60 },
        Log { date: days_ago(0), time_spent: 60 },
    ];
    assert_eq!(compute_streak(&logs, 60, today()), 0);
}
