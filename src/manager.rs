//! Task lifecycle: the command surface the CLI and the TUI call into.

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::models::{Task, TaskId};
use crate::motivation::{MotivationRequest, MotivationService, FALLBACK_MESSAGE};
use crate::progress::{compute_progress, TaskProgress};
use crate::repository::TaskRepository;
use crate::storage::TaskStore;

/// State of a task's latest coach request. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageSlot {
    Idle,
    Pending,
    Resolved(String),
    /// The coach failed; holds the fallback text.
    Failed(String),
}

impl MessageSlot {
    pub fn is_pending(&self) -> bool {
        matches!(self, MessageSlot::Pending)
    }

    /// The text to show, if a request has finished.
    pub fn text(&self) -> Option<&str> {
        match self {
            MessageSlot::Resolved(m) | MessageSlot::Failed(m) => Some(m),
            MessageSlot::Idle | MessageSlot::Pending => None,
        }
    }
}

static IDLE: MessageSlot = MessageSlot::Idle;

/// A task together with its derived state, ready to render.
#[derive(Debug)]
pub struct TaskView<'a> {
    pub task: &'a Task,
    pub progress: TaskProgress,
    pub message: &'a MessageSlot,
}

struct SlotState {
    generation: u64,
    slot: MessageSlot,
}

struct CoachOutcome {
    task_id: TaskId,
    generation: u64,
    result: Result<String>,
}

pub struct TaskManager<S: TaskStore> {
    repo: TaskRepository<S>,
    coach: Arc<dyn MotivationService>,
    slots: HashMap<TaskId, SlotState>,
    next_generation: u64,
    tx: Sender<CoachOutcome>,
    rx: Receiver<CoachOutcome>,
}

impl<S: TaskStore> TaskManager<S> {
    /// Opens the repository behind `store` and wires in the coach.
    pub fn new(store: S, clock: Arc<dyn Clock>, coach: Arc<dyn MotivationService>) -> TaskManager<S> {
        let (tx, rx) = mpsc::channel();
        TaskManager {
            repo: TaskRepository::open(store, clock),
            coach,
            slots: HashMap::new(),
            next_generation: 0,
            tx,
            rx,
        }
    }

    pub fn repository(&self) -> &TaskRepository<S> {
        &self.repo
    }

    pub fn today(&self) -> NaiveDate {
        self.repo.clock().today()
    }

    pub fn add_task(&mut self, name: &str, target_time: i64) -> Result<Task> {
        self.repo.create_task(name, target_time)
    }

    /// Deletes a task once `confirm` agrees. Returns whether it was deleted.
    pub fn delete_task<F>(&mut self, id: TaskId, confirm: F) -> Result<bool>
    where
        F: FnOnce(&Task) -> bool,
    {
        let task = self.repo.get(id).ok_or_else(|| {
            warn!(task = %id, "delete requested for unknown task");
            Error::NotFound(id.to_string())
        })?;
        if !confirm(task) {
            debug!(task = %id, "deletion declined");
            return Ok(false);
        }
        self.repo.delete_task(id)?;
        self.slots.remove(&id);
        Ok(true)
    }

    /// Records today's minutes for a task and asks the coach for a message.
    pub fn record_time_today(&mut self, id: TaskId, minutes: i64) -> Result<TaskProgress> {
        let today = self.today();
        self.record_time(id, today, minutes)
    }

    /// Records minutes for today or an earlier day. Zero removes that day's entry.
    ///
    /// Returns the progress relative to today straight away; the coach's answer
    /// arrives later through [`poll_messages`](Self::poll_messages).
    pub fn record_time(&mut self, id: TaskId, date: NaiveDate, minutes: i64) -> Result<TaskProgress> {
        if minutes < 0 {
            return Err(Error::Validation("logged minutes must not be negative".into()));
        }
        let today = self.today();
        if date > today {
            return Err(Error::Validation(format!("cannot log time for {}, it is after today", date)));
        }
        let task = self.repo.upsert_log(id, date, minutes)?;
        let progress = compute_progress(task, today);
        let request = MotivationRequest {
            task_name: task.name.clone(),
            target_time: task.target_time,
            time_spent_today: progress.time_spent_today,
            streak: progress.streak,
        };
        self.request_message(id, request);
        Ok(progress)
    }

    fn request_message(&mut self, task_id: TaskId, request: MotivationRequest) {
        self.next_generation += 1;
        let generation = self.next_generation;
        self.slots.insert(
            task_id,
            SlotState {
                generation,
                slot: MessageSlot::Pending,
            },
        );

        let coach = Arc::clone(&self.coach);
        let tx = self.tx.clone();
        thread::spawn(move || {
            let result = coach.motivational_message(&request);
            // The manager may be gone by now; nothing to deliver to then.
            let _ = tx.send(CoachOutcome {
                task_id,
                generation,
                result,
            });
        });
    }

    /// Applies every finished coach request without blocking.
    ///
    /// Returns how many task slots changed.
    pub fn poll_messages(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(outcome) = self.rx.try_recv() {
            if self.apply(outcome) {
                applied += 1;
            }
        }
        applied
    }

    /// Blocks until the task's slot is no longer pending or `timeout` elapses.
    pub fn wait_for_message(&mut self, id: TaskId, timeout: Duration) -> &MessageSlot {
        let deadline = Instant::now() + timeout;
        while self.message(id).is_pending() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok(outcome) => {
                    self.apply(outcome);
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        self.message(id)
    }

    fn apply(&mut self, outcome: CoachOutcome) -> bool {
        let state = match self.slots.get_mut(&outcome.task_id) {
            Some(s) if s.generation == outcome.generation && s.slot.is_pending() => s,
            _ => {
                debug!(
                    task = %outcome.task_id,
                    generation = outcome.generation,
                    "discarding superseded coach message"
                );
                return false;
            }
        };
        state.slot = match outcome.result {
            Ok(message) => MessageSlot::Resolved(message),
            Err(e) => {
                warn!(task = %outcome.task_id, error = %e, "coach failed, using fallback message");
                MessageSlot::Failed(FALLBACK_MESSAGE.to_string())
            }
        };
        true
    }

    pub fn message(&self, id: TaskId) -> &MessageSlot {
        self.slots.get(&id).map(|s| &s.slot).unwrap_or(&IDLE)
    }

    pub fn progress(&self, id: TaskId) -> Result<TaskProgress> {
        let task = self
            .repo
            .get(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        Ok(compute_progress(task, self.today()))
    }

    /// Every task in dashboard order with its progress and coach message.
    pub fn views(&self) -> Vec<TaskView<'_>> {
        let today = self.today();
        self.repo
            .list_tasks()
            .into_iter()
            .map(|task| TaskView {
                task,
                progress: compute_progress(task, today),
                message: self.message(task.id),
            })
            .collect()
    }
}
