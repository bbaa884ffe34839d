use std::io::{self, Write};
use std::time::Duration;

use chrono::NaiveDate;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use crate::manager::{MessageSlot, TaskManager};
use crate::models::{Task, TaskId};
use crate::progress::{format_minutes, recent_history};
use crate::storage::TaskStore;

/// Days shown in the history table and chart.
pub const HISTORY_DAYS: u32 = 7;

/// Adds a new goal with a daily target in minutes.
pub fn cmd_add<S: TaskStore>(manager: &mut TaskManager<S>, name: String, target: i64, silent: bool) {
    match manager.add_task(&name, target) {
        Ok(task) => {
            if !silent { println!("Task added (id = {})", short_id(task.id)); }
        }
        Err(e) => {
            if !silent { eprintln!("{}", e); }
        }
    }
}

/// Records minutes for today (or `date`, YYYY-MM-DD) and prints the coach's reply.
///
/// Zero minutes clears the day's entry.
pub fn cmd_log<S: TaskStore>(
    manager: &mut TaskManager<S>,
    id: &str,
    minutes: i64,
    date: Option<String>,
    wait: Duration,
    silent: bool,
) {
    let Some(task_id) = resolve(manager, id, silent) else { return };

    let date = match date {
        Some(d) => match NaiveDate::parse_from_str(&d, "%Y-%m-%d") {
            Ok(date) => date,
            Err(e) => {
                if !silent { eprintln!("Invalid date '{}': {}. Use YYYY-MM-DD.", d, e); }
                return;
            }
        },
        None => manager.today(),
    };

    let progress = match manager.record_time(task_id, date, minutes) {
        Ok(p) => p,
        Err(e) => {
            if !silent { eprintln!("{}", e); }
            return;
        }
    };

    if !silent {
        if minutes == 0 {
            println!("Cleared {} for {}.", date, short_id(task_id));
        } else {
            println!("Logged {} on {}.", format_minutes(minutes as u64), date);
        }
        println!(
            "Today: {} ({:.0}%) | Streak: {} days | Total: {}",
            format_minutes(u64::from(progress.time_spent_today)),
            progress.progress_percent,
            progress.streak,
            format_minutes(progress.total_time),
        );
    }

    let slot = manager.wait_for_message(task_id, wait);
    if !silent {
        match slot {
            MessageSlot::Resolved(m) | MessageSlot::Failed(m) => println!("\nCoach: {}", m),
            MessageSlot::Pending => println!("\nCoach is still thinking, try `show` later."),
            MessageSlot::Idle => {}
        }
    }
}

/// Removes a task after asking for confirmation, unless `force` is set.
pub fn cmd_remove<S: TaskStore>(manager: &mut TaskManager<S>, id: &str, force: bool, silent: bool) {
    let Some(task_id) = resolve(manager, id, silent) else { return };

    let result = manager.delete_task(task_id, |task| force || confirm_delete(task));
    match result {
        Ok(true) => {
            if !silent { println!("Task {} removed.", short_id(task_id)); }
        }
        Ok(false) => {
            if !silent { println!("Aborted."); }
        }
        Err(e) => {
            if !silent { eprintln!("{}", e); }
        }
    }
}

fn confirm_delete(task: &Task) -> bool {
    print!("Really delete \"{}\" and all its logs? This cannot be undone. [y/N] ", task.name);
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return false;
    }
    input.trim().eq_ignore_ascii_case("y")
}

/// Lists all goals with today's progress, oldest first.
pub fn cmd_list<S: TaskStore>(manager: &TaskManager<S>) {
    let views = manager.views();
    if views.is_empty() {
        println!("No goals yet. Add one with `streakboard add <NAME> --target <MINUTES>`.");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").add_attribute(Attribute::Bold),
            Cell::new("Name").add_attribute(Attribute::Bold),
            Cell::new("Today").add_attribute(Attribute::Bold),
            Cell::new("Progress").add_attribute(Attribute::Bold),
            Cell::new("Streak").add_attribute(Attribute::Bold),
            Cell::new("Total").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
        ]);

    for view in views {
        let p = view.progress;
        let color = if p.goal_met_today {
            Color::Green
        } else if p.time_spent_today > 0 {
            Color::Yellow
        } else {
            Color::Reset
        };
        let status = if p.goal_met_today { "Done" } else { "In progress" };

        table.add_row(vec![
            Cell::new(short_id(view.task.id)),
            Cell::new(&view.task.name),
            Cell::new(format!(
                "{} / {}",
                format_minutes(u64::from(p.time_spent_today)),
                format_minutes(u64::from(view.task.target_time))
            )),
            Cell::new(format!("{} {:>3.0}%", progress_bar(p.progress_percent, 10), p.progress_percent)).fg(color),
            Cell::new(format!("{}d", p.streak)).fg(if p.streak > 0 { Color::Red } else { Color::Reset }),
            Cell::new(format_minutes(p.total_time)),
            Cell::new(status).fg(color),
        ]);
    }

    println!("{table}");
}

/// Shows one goal in detail: stats and the last week.
pub fn cmd_show<S: TaskStore>(manager: &TaskManager<S>, id: &str) {
    let Some(task_id) = resolve(manager, id, false) else { return };
    let Some(view) = manager.views().into_iter().find(|v| v.task.id == task_id) else { return };
    let task = view.task;
    let p = view.progress;

    println!("{} ({})", task.name, task.id);
    println!("Daily goal:  {}", format_minutes(u64::from(task.target_time)));
    println!(
        "Today:       {} / {} {} {:.0}%",
        format_minutes(u64::from(p.time_spent_today)),
        format_minutes(u64::from(task.target_time)),
        progress_bar(p.progress_percent, 20),
        p.progress_percent
    );
    println!("Streak:      {} days", p.streak);
    println!("Total time:  {}", format_minutes(p.total_time));
    println!("Goal today:  {}", if p.goal_met_today { "Met" } else { "In progress" });

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Date", "Logged", "Target", ""]);
    for entry in recent_history(task, manager.today(), HISTORY_DAYS) {
        let pct = 100.0 * f64::from(entry.minutes) / f64::from(task.target_time.max(1));
        let met = entry.minutes >= task.target_time;
        table.add_row(vec![
            Cell::new(entry.date.format("%a %m/%d")),
            Cell::new(format_minutes(u64::from(entry.minutes))).fg(if met { Color::Green } else { Color::Reset }),
            Cell::new(format_minutes(u64::from(task.target_time))),
            Cell::new(progress_bar(pct, 10)),
        ]);
    }
    println!("{table}");
}

/// Renders a text progress bar of `width` cells.
pub fn progress_bar(percent: f64, width: usize) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// First eight characters of the id, enough to address a task from the CLI.
pub fn short_id(id: TaskId) -> String {
    id.to_string().chars().take(8).collect()
}

fn resolve<S: TaskStore>(manager: &TaskManager<S>, id: &str, silent: bool) -> Option<TaskId> {
    match manager.repository().find_by_prefix(id) {
        Ok(task) => Some(task.id),
        Err(e) => {
            if !silent { eprintln!("{}", e); }
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_bar_fills_proportionally() {
        assert_eq!(progress_bar(0.0, 4), "░░░░");
        assert_eq!(progress_bar(50.0, 4), "██░░");
        assert_eq!(progress_bar(100.0, 4), "████");
        assert_eq!(progress_bar(250.0, 4), "████");
    }
}
