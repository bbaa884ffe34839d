use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a task. Serialized as a plain UUID string.
pub type TaskId = Uuid;

/// One day's recorded minutes for a task.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Log {
    /// The calendar day this entry belongs to (YYYY-MM-DD).
    pub date: NaiveDate,
    /// Minutes spent on that day. Always greater than zero once stored.
    pub time_spent: u32,
}

/// A tracked goal with a daily time target.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier for the task.
    pub id: TaskId,
    /// The name of the goal.
    pub name: String,
    /// Daily target in minutes.
    pub target_time: u32,
    /// Per-day entries, sorted by date ascending, at most one per date.
    #[serde(default)]
    pub logs: Vec<Log>,
    /// Timestamp when the task was created (RFC 3339).
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Returns the minutes logged for `date`, if any.
    pub fn log_for(&self, date: NaiveDate) -> Option<u32> {
        self.logs
            .binary_search_by_key(&date, |l| l.date)
            .ok()
            .map(|i| self.logs[i].time_spent)
    }

    /// Sets the entry for `date`. Zero minutes removes the entry.
    pub fn set_log(&mut self, date: NaiveDate, minutes: u32) {
        match self.logs.binary_search_by_key(&date, |l| l.date) {
            Ok(i) if minutes == 0 => {
                self.logs.remove(i);
            }
            Ok(i) => self.logs[i].time_spent = minutes,
            Err(_) if minutes == 0 => {}
            Err(i) => self.logs.insert(i, Log { date, time_spent: minutes }),
        }
    }

    /// Restores the log invariants on data that did not come through `set_log`:
    /// sorted ascending, one entry per date (the last one wins), no empty days.
    pub fn normalize_logs(&mut self) {
        let mut logs = std::mem::take(&mut self.logs);
        // Stable sort keeps file order among duplicates, so the last one wins below.
        logs.sort_by_key(|l| l.date);
        for log in logs {
            match self.logs.last_mut() {
                Some(last) if last.date == log.date => last.time_spent = log.time_spent,
                _ => self.logs.push(log),
            }
        }
        self.logs.retain(|l| l.time_spent > 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn empty_task() -> Task {
        Task {
            id: Uuid::new_v4(),
            name: "Read".into(),
            target_time: 30,
            logs: Vec::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn set_log_keeps_dates_sorted_and_unique() {
        let mut task = empty_task();
        task.set_log(day(5), 10);
        task.set_log(day(2), 20);
        task.set_log(day(5), 40);

        let dates: Vec<_> = task.logs.iter().map(|l| l.date).collect();
        assert_eq!(dates, vec![day(2), day(5)]);
        assert_eq!(task.log_for(day(5)), Some(40));
    }

    #[test]
    fn zero_minutes_removes_the_day() {
        let mut task = empty_task();
        task.set_log(day(1), 15);
        task.set_log(day(1), 0);
        assert!(task.logs.is_empty());
        assert_eq!(task.log_for(day(1)), None);
    }

    #[test]
    fn normalize_drops_duplicates_and_zero_entries() {
        let mut task = empty_task();
        task.logs = vec![
            Log { date: day(3), time_spent: 5 },
            Log { date: day(1), time_spent: 0 },
            Log { date: day(3), time_spent: 25 },
            Log { date: day(2), time_spent: 10 },
        ];
        task.normalize_logs();
        assert_eq!(
            task.logs,
            vec![
                Log { date: day(2), time_spent: 10 },
                Log { date: day(3), time_spent: 25 },
            ]
        );
    }

    #[test]
    fn serializes_with_dashboard_field_names() {
        let mut task = empty_task();
        task.set_log(day(4), 45);
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["targetTime"], 30);
        assert_eq!(json["logs"][0]["date"], "2024-03-04");
        assert_eq!(json["logs"][0]["timeSpent"], 45);
        assert!(json.get("createdAt").is_some());
    }
}
