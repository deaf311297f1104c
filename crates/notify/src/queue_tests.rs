use super::*;
use crate::models::{NewToast, ToastId};
use chrono::Utc;

fn toast(priority: Priority) -> Toast {
    let new = NewToast::new("t", "m").priority(priority);
    Toast {
        id: ToastId::new(),
        kind: new.kind,
        title: new.title,
        message: new.message,
        icon: new.icon,
        duration: new.duration,
        position: new.position,
        actions: new.actions,
        created_at: Utc::now(),
        expires_at: None,
        persistent: new.persistent,
        auto_dismiss: false,
        priority: new.priority,
        category: new.category,
        progress: new.progress,
        metadata: new.metadata,
    }
}

fn item(priority: Priority, at: DateTime<Utc>) -> QueuedNotification {
    QueuedNotification::new_toast(toast(priority), at, 3)
}

#[test]
fn queue_len_never_exceeds_max_size() {
    let mut q = NotificationQueue::new(2);
    let t0 = Utc::now();
    q.push(item(Priority::Low, t0));
    q.push(item(Priority::Medium, t0));
    q.push(item(Priority::High, t0));
    assert_eq!(q.len(), 2);
}

#[test]
fn full_queue_drops_oldest_entry() {
    let mut q = NotificationQueue::new(1);
    let t0 = Utc::now();
    let t1 = t0 + chrono::Duration::seconds(1);
    q.push(item(Priority::Low, t0));
    q.push(item(Priority::Low, t1));
    let remaining = q.pop_front().unwrap();
    assert_eq!(remaining.queued_at, t1);
}

#[test]
fn pop_front_returns_highest_priority_first() {
    let mut q = NotificationQueue::new(10);
    let t0 = Utc::now();
    q.push(item(Priority::Low, t0));
    q.push(item(Priority::Critical, t0));
    q.push(item(Priority::Medium, t0));

    assert_eq!(q.pop_front().unwrap().priority, Priority::Critical);
    assert_eq!(q.pop_front().unwrap().priority, Priority::Medium);
    assert_eq!(q.pop_front().unwrap().priority, Priority::Low);
}

#[test]
fn same_priority_preserves_fifo_order() {
    let mut q = NotificationQueue::new(10);
    let t0 = Utc::now();
    let t1 = t0 + chrono::Duration::seconds(1);
    let first = item(Priority::Medium, t0);
    let second = item(Priority::Medium, t1);
    q.push(first);
    q.push(second);

    assert_eq!(q.pop_front().unwrap().queued_at, t0);
    assert_eq!(q.pop_front().unwrap().queued_at, t1);
}

#[test]
fn requeue_below_max_attempts_succeeds() {
    let mut q = NotificationQueue::new(10);
    let entry = item(Priority::Low, Utc::now());
    assert!(q.requeue(entry));
    assert_eq!(q.len(), 1);
}

#[test]
fn requeue_at_max_attempts_drops_the_item() {
    let mut q = NotificationQueue::new(10);
    let mut entry = item(Priority::Low, Utc::now());
    entry.attempts = 2;
    entry.max_attempts = 3;
    assert!(!q.requeue(entry));
    assert_eq!(q.len(), 0);
}
