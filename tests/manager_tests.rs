use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use chrono::{Duration as Days, NaiveDate};
use streakboard::clock::FixedClock;
use streakboard::error::{Error, Result};
use streakboard::manager::{MessageSlot, TaskManager};
use streakboard::motivation::{MotivationRequest, MotivationService, FALLBACK_MESSAGE};
use streakboard::storage::{MemoryStore, TaskStore};

const WAIT: Duration = Duration::from_secs(5);

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 9, 1).unwrap()
}

/// Echoes the request back and remembers it.
#[derive(Default)]
struct EchoCoach {
    seen: Mutex<Vec<MotivationRequest>>,
}

impl MotivationService for EchoCoach {
    fn motivational_message(&self, request: &MotivationRequest) -> Result<String> {
        self.seen.lock().unwrap().push(request.clone());
        Ok(format!("{}: {} min, {} day streak", request.task_name, request.time_spent_today, request.streak))
    }
}

struct DownCoach;

impl MotivationService for DownCoach {
    fn motivational_message(&self, _request: &MotivationRequest) -> Result<String> {
        Err(Error::ExternalService("connection refused".into()))
    }
}

/// Answers slowly for one specific minute count.
struct SlowCoach {
    slow_minutes: u32,
    delay: Duration,
}

impl MotivationService for SlowCoach {
    fn motivational_message(&self, request: &MotivationRequest) -> Result<String> {
        if request.time_spent_today == self.slow_minutes {
            thread::sleep(self.delay);
        }
        Ok(format!("logged {}", request.time_spent_today))
    }
}

fn manager_with(coach: Arc<dyn MotivationService>) -> (TaskManager<MemoryStore>, MemoryStore) {
    let store = MemoryStore::new();
    let manager = TaskManager::new(store.clone(), Arc::new(FixedClock::on(today())), coach);
    (manager, store)
}

#[test]
fn test_add_task_validates() {
    let (mut manager, _) = manager_with(Arc::new(EchoCoach::default()));
    assert!(matches!(manager.add_task("", 30), Err(Error::Validation(_))));
    assert!(matches!(manager.add_task("Draw", 0), Err(Error::Validation(_))));
    assert!(manager.views().is_empty());

    manager.add_task("Draw", 30).unwrap();
    assert_eq!(manager.views().len(), 1);
}

#[test]
fn test_record_time_returns_fresh_progress() {
    let (mut manager, _) = manager_with(Arc::new(EchoCoach::default()));
    let id = manager.add_task("Draw", 30).unwrap().id;
    manager
        .record_time(id, today() - Days::days(1), 30)
        .unwrap();

    let progress = manager.record_time_today(id, 45).unwrap();
    assert_eq!(progress.time_spent_today, 45);
    assert!(progress.goal_met_today);
    assert_eq!(progress.streak, 2);
    assert_eq!(progress.total_time, 75);
    assert_eq!(manager.progress(id).unwrap(), progress);
}

#[test]
fn test_negative_minutes_rejected_without_effect() {
    let (mut manager, store) = manager_with(Arc::new(EchoCoach::default()));
    let id = manager.add_task("Draw", 30).unwrap().id;
    manager.record_time_today(id, 10).unwrap();
    manager.wait_for_message(id, WAIT);
    let snapshot = store.snapshot();

    assert!(matches!(manager.record_time_today(id, -1), Err(Error::Validation(_))));
    assert_eq!(store.snapshot(), snapshot);
    assert!(!manager.message(id).is_pending());
}

#[test]
fn test_future_date_rejected_without_effect() {
    let (mut manager, store) = manager_with(Arc::new(EchoCoach::default()));
    let id = manager.add_task("Draw", 30).unwrap().id;
    manager.record_time(id, today() - Days::days(1), 30).unwrap();
    manager.record_time_today(id, 30).unwrap();
    manager.wait_for_message(id, WAIT);
    let snapshot = store.snapshot();

    let result = manager.record_time(id, today() + Days::days(30), 60);
    assert!(matches!(result, Err(Error::Validation(_))));
    assert_eq!(store.snapshot(), snapshot);
    assert_eq!(manager.repository().get(id).unwrap().logs.len(), 2);
    assert_eq!(manager.progress(id).unwrap().streak, 2);
    assert!(!manager.message(id).is_pending());
}

#[test]
fn test_zero_minutes_clears_today() {
    let (mut manager, store) = manager_with(Arc::new(EchoCoach::default()));
    let id = manager.add_task("Draw", 30).unwrap().id;
    manager.record_time_today(id, 20).unwrap();
    let progress = manager.record_time_today(id, 0).unwrap();

    assert_eq!(progress.time_spent_today, 0);
    assert!(store.load().unwrap()[0].logs.is_empty());
}

#[test]
fn test_message_slot_lifecycle() {
    let coach = Arc::new(EchoCoach::default());
    let (mut manager, _) = manager_with(coach.clone());
    let id = manager.add_task("Draw", 30).unwrap().id;
    assert_eq!(manager.message(id), &MessageSlot::Idle);

    manager.record_time_today(id, 30).unwrap();
    let slot = manager.wait_for_message(id, WAIT).clone();
    assert_eq!(slot, MessageSlot::Resolved("Draw: 30 min, 1 day streak".into()));

    let seen = coach.seen.lock().unwrap().clone();
    assert_eq!(
        seen,
        vec![MotivationRequest {
            task_name: "Draw".into(),
            target_time: 30,
            time_spent_today: 30,
            streak: 1,
        }]
    );
}

#[test]
fn test_new_log_resets_slot_to_pending() {
    let coach = Arc::new(SlowCoach { slow_minutes: 5, delay: Duration::from_millis(300) });
    let (mut manager, _) = manager_with(coach);
    let id = manager.add_task("Draw", 30).unwrap().id;

    manager.record_time_today(id, 1).unwrap();
    assert!(matches!(manager.wait_for_message(id, WAIT), MessageSlot::Resolved(_)));

    manager.record_time_today(id, 5).unwrap();
    assert!(manager.message(id).is_pending());
    assert_eq!(manager.message(id).text(), None);
}

#[test]
fn test_coach_failure_uses_fallback() {
    let (mut manager, _) = manager_with(Arc::new(DownCoach));
    let id = manager.add_task("Draw", 30).unwrap().id;
    manager.record_time_today(id, 10).unwrap();

    let slot = manager.wait_for_message(id, WAIT);
    assert_eq!(slot, &MessageSlot::Failed(FALLBACK_MESSAGE.to_string()));
    assert_eq!(slot.text(), Some(FALLBACK_MESSAGE));
}

#[test]
fn test_superseded_reply_is_discarded() {
    let coach = Arc::new(SlowCoach { slow_minutes: 10, delay: Duration::from_millis(300) });
    let (mut manager, _) = manager_with(coach);
    let id = manager.add_task("Draw", 30).unwrap().id;

    manager.record_time_today(id, 10).unwrap(); // slow reply
    manager.record_time_today(id, 20).unwrap(); // fast reply
    assert_eq!(manager.wait_for_message(id, WAIT), &MessageSlot::Resolved("logged 20".into()));

    // Let the slow reply land, then make sure it does not overwrite the newer one.
    thread::sleep(Duration::from_millis(600));
    assert_eq!(manager.poll_messages(), 0);
    assert_eq!(manager.message(id), &MessageSlot::Resolved("logged 20".into()));
}

#[test]
fn test_poll_messages_applies_finished_requests() {
    let (mut manager, _) = manager_with(Arc::new(EchoCoach::default()));
    let a = manager.add_task("A", 10).unwrap().id;
    let b = manager.add_task("B", 10).unwrap().id;
    manager.record_time_today(a, 10).unwrap();
    manager.record_time_today(b, 5).unwrap();

    let mut applied = 0;
    for _ in 0..100 {
        applied += manager.poll_messages();
        if applied == 2 {
            break;
        }
        thread::sleep(Duration::from_millis(20));
    }
    assert_eq!(applied, 2);
    assert!(manager.message(a).text().unwrap().starts_with("A:"));
    assert!(manager.message(b).text().unwrap().starts_with("B:"));
}

#[test]
fn test_delete_requires_confirmation() {
    let (mut manager, _) = manager_with(Arc::new(EchoCoach::default()));
    let id = manager.add_task("Draw", 30).unwrap().id;

    let mut asked = None;
    let deleted = manager
        .delete_task(id, |task| {
            asked = Some(task.name.clone());
            false
        })
        .unwrap();
    assert!(!deleted);
    assert_eq!(asked.as_deref(), Some("Draw"));
    assert_eq!(manager.views().len(), 1);

    assert!(manager.delete_task(id, |_| true).unwrap());
    assert!(manager.views().is_empty());
    assert!(matches!(manager.record_time_today(id, 10), Err(Error::NotFound(_))));
    assert!(matches!(manager.delete_task(id, |_| true), Err(Error::NotFound(_))));
}

#[test]
fn test_reply_for_deleted_task_is_dropped() {
    let coach = Arc::new(SlowCoach { slow_minutes: 10, delay: Duration::from_millis(200) });
    let (mut manager, _) = manager_with(coach);
    let id = manager.add_task("Draw", 30).unwrap().id;
    manager.record_time_today(id, 10).unwrap();
    manager.delete_task(id, |_| true).unwrap();

    thread::sleep(Duration::from_millis(500));
    assert_eq!(manager.poll_messages(), 0);
    assert_eq!(manager.message(id), &MessageSlot::Idle);
}

#[test]
fn test_views_follow_creation_order() {
    let (mut manager, _) = manager_with(Arc::new(EchoCoach::default()));
    for name in ["first", "second", "third"] {
        manager.add_task(name, 15).unwrap();
    }
    let names: Vec<String> = manager.views().iter().map(|v| v.task.name.clone()).collect();
    assert_eq!(names, vec!["first", "second", "third"]);
}
