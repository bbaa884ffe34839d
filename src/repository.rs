use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::models::{Task, TaskId};
use crate::storage::TaskStore;

/// Owns the task collection and writes the full snapshot after every change.
pub struct TaskRepository<S: TaskStore> {
    store: S,
    clock: Arc<dyn Clock>,
    tasks: Vec<Task>,
}

impl<S: TaskStore> TaskRepository<S> {
    /// Loads the stored snapshot.
    ///
    /// Missing or unreadable state is logged and replaced by an empty list.
    pub fn open(store: S, clock: Arc<dyn Clock>) -> TaskRepository<S> {
        let mut tasks = match store.load() {
            Ok(tasks) => tasks,
            Err(e) => {
                warn!(error = %e, "stored tasks unreadable, starting with an empty dashboard");
                Vec::new()
            }
        };
        for task in tasks.iter_mut() {
            task.normalize_logs();
        }
        TaskRepository { store, clock, tasks }
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Creates a task with a fresh id and no logs.
    pub fn create_task(&mut self, name: &str, target_time: i64) -> Result<Task> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::Validation("task name must not be blank".into()));
        }
        if target_time <= 0 {
            return Err(Error::Validation("target time must be a positive number of minutes".into()));
        }
        let target_time = u32::try_from(target_time)
            .map_err(|_| Error::Validation(format!("target time {} is too large", target_time)))?;

        let task = Task {
            id: Uuid::new_v4(),
            name: name.to_string(),
            target_time,
            logs: Vec::new(),
            created_at: self.clock.now(),
        };
        self.tasks.push(task.clone());
        info!(task = %task.id, name = %task.name, target_time, "task created");
        self.persist();
        Ok(task)
    }

    /// Removes a task and returns it.
    pub fn delete_task(&mut self, id: TaskId) -> Result<Task> {
        let idx = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| not_found(id))?;
        let task = self.tasks.remove(idx);
        info!(task = %id, "task deleted");
        self.persist();
        Ok(task)
    }

    /// Sets the minutes for `date`. Zero or negative minutes remove the day's entry.
    pub fn upsert_log(&mut self, task_id: TaskId, date: NaiveDate, minutes: i64) -> Result<&Task> {
        let idx = self
            .tasks
            .iter()
            .position(|t| t.id == task_id)
            .ok_or_else(|| not_found(task_id))?;
        let minutes = u32::try_from(minutes.max(0))
            .map_err(|_| Error::Validation(format!("{} minutes is too large", minutes)))?;

        if self.tasks[idx].log_for(date).unwrap_or(0) == minutes {
            // Nothing changes, so nothing to write.
            return Ok(&self.tasks[idx]);
        }
        self.tasks[idx].set_log(date, minutes);
        info!(task = %task_id, %date, minutes, "log updated");
        self.persist();
        Ok(&self.tasks[idx])
    }

    /// All tasks, oldest first. Tasks created at the same instant keep insertion order.
    pub fn list_tasks(&self) -> Vec<&Task> {
        let mut tasks: Vec<&Task> = self.tasks.iter().collect();
        tasks.sort_by_key(|t| t.created_at);
        tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Resolves a task from a full id or a unique id prefix.
    pub fn find_by_prefix(&self, prefix: &str) -> Result<&Task> {
        let prefix = prefix.trim().to_ascii_lowercase();
        if prefix.is_empty() {
            return Err(Error::Validation("task id must not be empty".into()));
        }
        let matches: Vec<&Task> = self
            .tasks
            .iter()
            .filter(|t| t.id.to_string().starts_with(&prefix))
            .collect();
        match matches.as_slice() {
            [task] => Ok(*task),
            [] => Err(Error::NotFound(prefix)),
            _ => Err(Error::Validation(format!(
                "id prefix '{}' matches more than one task",
                prefix
            ))),
        }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    fn persist(&self) {
        // The in-memory state stays authoritative; the next successful write
        // stores the whole snapshot again.
        if let Err(e) = self.store.save(&self.tasks) {
            warn!(error = %e, "failed to save tasks");
        }
    }
}

fn not_found(id: TaskId) -> Error {
    warn!(task = %id, "operation on unknown task");
    Error::NotFound(id.to_string())
}
