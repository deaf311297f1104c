// SPDX-License-Identifier: MIT

//! Notification Service (C8, spec §4.8): toast and system delivery, DND,
//! per-category/priority throttling, filters, a bounded retry queue,
//! statistics, and durable history.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use mcpweaver_core::{AppError, Clock, EventSink, Metadata, RowStore, SqlValue};
use mcpweaver_resilience::{retry, CircuitBreaker, RetryPolicy};
use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;

use crate::config::NotificationConfig;
use crate::dnd;
use crate::filter::{self, FilterOutcome};
use crate::models::{
    HistoryRecord, HistorySource, NewSystemNotification, NewToast, SystemNotification, SystemNotificationId, Toast,
    ToastId,
};
use crate::queue::{NotificationQueue, QueuedKind, QueuedNotification};
use crate::stats::NotificationStats;
use crate::ui_bridge::{DialogType, NativeDialogRequest, UiBridge};

/// Outcome of [`NotificationService::show_toast`] (spec §4.8 "ShowToast"):
/// every gate short of an outright service error returns success, the
/// outcome just records which path was taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToastOutcome {
    Delivered(ToastId),
    Queued(ToastId),
    Blocked,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemOutcome {
    Delivered(SystemNotificationId),
    Queued(SystemNotificationId),
    Blocked,
}

/// Result of running the gating pipeline (DND/filter/throttle) once,
/// without touching the queue — `Deferred` hands the item back so the
/// caller can decide whether to push it fresh (`ShowToast`) or requeue it
/// with its existing attempt count (the drain tick).
enum ToastAttempt {
    Delivered(ToastId),
    Blocked,
    Deferred(Toast),
}

enum SystemAttempt {
    Delivered(SystemNotificationId),
    Blocked,
    Deferred(SystemNotification),
}

struct State {
    config: NotificationConfig,
    active: Vec<Toast>,
    history: HashMap<String, HistoryRecord>,
    history_order: VecDeque<String>,
    throttle: crate::throttle::ThrottleTracker,
    queue: NotificationQueue,
    stats: NotificationStats,
}

/// Toast + system delivery engine, wired up with DND, throttling, filters,
/// a retry queue, stats, and optional durable history (spec §4.8).
pub struct NotificationService<C: Clock, S: EventSink, U: UiBridge> {
    clock: C,
    sink: S,
    ui: U,
    breaker: CircuitBreaker<C>,
    retry_policy: RetryPolicy,
    row_store: Option<Arc<dyn RowStore>>,
    state: RwLock<State>,
}

impl<C: Clock, S: EventSink, U: UiBridge> NotificationService<C, S, U> {
    pub fn new(clock: C, sink: S, ui: U, config: NotificationConfig) -> Self {
        let breaker = CircuitBreaker::new(clock.clone(), 5, std::time::Duration::from_secs(30));
        let queue = NotificationQueue::new(config.max_queue_size);
        Self {
            clock,
            sink,
            ui,
            breaker,
            retry_policy: RetryPolicy::default(),
            row_store: None,
            state: RwLock::new(State {
                config,
                active: Vec::new(),
                history: HashMap::new(),
                history_order: VecDeque::new(),
                throttle: crate::throttle::ThrottleTracker::new(),
                queue,
                stats: NotificationStats::new(),
            }),
        }
    }

    pub fn with_row_store(mut self, store: Arc<dyn RowStore>) -> Self {
        self.row_store = Some(store);
        self
    }

    pub fn config(&self) -> NotificationConfig {
        self.state.read().config.clone()
    }

    /// Replace the live configuration (spec §6 `notification:config_updated`).
    pub fn update_config(&self, config: NotificationConfig) {
        let mut state = self.state.write();
        state.queue = {
            let mut q = NotificationQueue::new(config.max_queue_size);
            while let Some(item) = state.queue.pop_front() {
                q.push(item);
            }
            q
        };
        state.config = config;
        drop(state);
        self.sink.emit("notification:config_updated", Metadata::new());
    }

    pub fn started(&self) {
        self.sink.emit("notification:service_started", Metadata::new());
    }

    pub fn stopped(&self) {
        self.sink.emit("notification:service_stopped", Metadata::new());
    }

    pub fn stats(&self) -> NotificationStats {
        self.state.read().stats.clone()
    }

    pub fn get_active_toasts(&self) -> Vec<Toast> {
        self.state.read().active.clone()
    }

    pub fn history(&self, limit: usize) -> Vec<HistoryRecord> {
        let state = self.state.read();
        let mut entries: Vec<HistoryRecord> = state.history.values().cloned().collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        entries.truncate(limit);
        entries
    }

    // ── ShowToast (spec §4.8 "ShowToast") ───────────────────────────────

    pub fn show_toast(&self, new: NewToast) -> Result<ToastOutcome, AppError> {
        let (notifications_enabled, toasts_enabled) = {
            let state = self.state.read();
            (state.config.notifications_enabled, state.config.toasts_enabled)
        };
        if !notifications_enabled || !toasts_enabled {
            return Err(AppError::validation("notify.disabled", "toast notifications are disabled")
                .with_suggestion("enable notifications in settings"));
        }

        let now = self.clock.now_utc();
        let toast = stamp_toast(new, now, self.state.read().config.default_duration);
        Ok(self.deliver_toast(toast, now))
    }

    /// Fresh-delivery wrapper around `attempt_toast`: a deferred outcome is
    /// pushed onto the queue as a brand-new entry (0 attempts so far).
    fn deliver_toast(&self, toast: Toast, now: DateTime<Utc>) -> ToastOutcome {
        match self.attempt_toast(toast, now) {
            ToastAttempt::Delivered(id) => ToastOutcome::Delivered(id),
            ToastAttempt::Blocked => ToastOutcome::Blocked,
            ToastAttempt::Deferred(toast) => {
                let id = toast.id;
                let mut state = self.state.write();
                state.queue.push(QueuedNotification::new_toast(toast, now, state.config.max_attempts));
                ToastOutcome::Queued(id)
            }
        }
    }

    /// Gating pipeline shared by `deliver_toast` (fresh sends) and the
    /// queue drain tick (re-delivery attempts). Never touches the queue
    /// itself — a deferred toast is handed back to the caller.
    fn attempt_toast(&self, toast: Toast, now: DateTime<Utc>) -> ToastAttempt {
        let mut state = self.state.write();

        if dnd::is_active(state.config.dnd_mode, state.config.dnd_schedule.as_ref(), now, toast.priority) {
            return ToastAttempt::Deferred(toast);
        }

        if filter::evaluate(&state.config.filters, &toast.title, &toast.message, &toast.category, toast.priority)
            == FilterOutcome::Block
        {
            return ToastAttempt::Blocked;
        }

        if state.throttle.is_throttled(&state.config.throttle, &toast.category, toast.priority, self.clock.now()) {
            return ToastAttempt::Deferred(toast);
        }

        let max = state.config.max_toast_notifications;
        if state.active.len() >= max {
            if let Some(idx) = state.active.iter().position(|t| !t.persistent) {
                let evicted = state.active.remove(idx);
                mark_dismissed(&mut state, &evicted.id.to_string(), now);
                self.sink.emit("notification:toast_auto_removed", toast_metadata(&evicted));
            }
        }

        let id = toast.id;
        state.throttle.track(&toast.category, toast.priority, self.clock.now());
        state.stats.record_toast_sent(&toast.category, toast.priority, now);
        let record = HistoryRecord::from_toast(&toast);
        self.insert_history(&mut state, record.clone());
        let payload = toast_metadata(&toast);
        state.active.push(toast);
        drop(state);

        self.spawn_history_insert(&record);
        self.sink.emit("notification:toast", payload);
        ToastAttempt::Delivered(id)
    }

    pub fn dismiss_toast(&self, id: ToastId) -> Result<(), AppError> {
        let mut state = self.state.write();
        let idx = state
            .active
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| AppError::validation("notify.unknown_toast", "no active toast with that id"))?;
        let toast = state.active.remove(idx);
        let now = self.clock.now_utc();
        mark_dismissed(&mut state, &toast.id.to_string(), now);
        self.spawn_history_update(&toast.id.to_string(), HistoryField::Dismissed(now));
        drop(state);
        self.sink.emit("notification:toast_dismissed", toast_metadata(&toast));
        Ok(())
    }

    pub fn dismiss_all_toasts(&self) {
        let mut state = self.state.write();
        let now = self.clock.now_utc();
        let dismissed: Vec<Toast> = state.active.drain(..).collect();
        for toast in &dismissed {
            mark_dismissed(&mut state, &toast.id.to_string(), now);
        }
        drop(state);
        for toast in &dismissed {
            self.spawn_history_update(&toast.id.to_string(), HistoryField::Dismissed(now));
        }
        self.sink.emit("notification:all_toasts_dismissed", Metadata::new());
    }

    pub fn mark_as_read(&self, id: &str) -> Result<(), AppError> {
        let mut state = self.state.write();
        let record = state
            .history
            .get_mut(id)
            .ok_or_else(|| AppError::validation("notify.unknown_notification", "no history record with that id"))?;
        if record.read_at.is_some() {
            return Ok(());
        }
        let now = self.clock.now_utc();
        record.read_at = Some(now);
        let (category, priority) = (record.category.clone(), record.priority);
        state.stats.record_read(&category, priority);
        drop(state);
        self.spawn_history_update(id, HistoryField::Read(now));
        self.sink.emit("notification:marked_read", id_metadata(id));
        Ok(())
    }

    pub fn execute_action(&self, notif_id: &str, action_id: &str, data: Metadata) -> Result<(), AppError> {
        {
            let state = self.state.read();
            let known = state.active.iter().any(|t| t.id.as_str() == notif_id)
                || state.history.contains_key(notif_id)
                || notif_id.is_empty();
            if !known {
                return Err(AppError::validation("notify.unknown_notification", "no notification with that id"));
            }
            let has_action = state
                .active
                .iter()
                .find(|t| t.id.as_str() == notif_id)
                .map(|t| t.actions.iter().any(|a| a.id == action_id))
                .unwrap_or(true);
            if !has_action {
                return Err(AppError::validation("notify.unknown_action", "no action with that id on this notification"));
            }
        }

        let now = self.clock.now_utc();
        {
            let mut state = self.state.write();
            if let Some(record) = state.history.get_mut(notif_id) {
                if record.interacted_at.is_none() {
                    record.interacted_at = Some(now);
                    record.action_taken = Some(action_id.to_string());
                    let (category, priority) = (record.category.clone(), record.priority);
                    state.stats.record_interacted(&category, priority);
                }
            }
        }
        self.spawn_history_update(notif_id, HistoryField::Interacted(now, action_id.to_string()));

        let mut payload = id_metadata(notif_id);
        payload.insert("action_id".to_string(), serde_json::Value::String(action_id.to_string()));
        payload.extend(data);
        self.sink.emit("notification:action_executed", payload);

        match action_id {
            "dismiss" => {
                let _ = self.dismiss_toast(ToastId::from_string(notif_id));
            }
            "install_now" => self.sink.emit("notification:install_now", id_metadata(notif_id)),
            "install_later" => self.sink.emit("notification:install_later", id_metadata(notif_id)),
            _ => {}
        }
        Ok(())
    }

    // ── ShowSystemNotification (spec §4.8) ──────────────────────────────

    pub async fn show_system_notification(&self, new: NewSystemNotification) -> Result<SystemOutcome, AppError> {
        let (notifications_enabled, system_enabled) = {
            let state = self.state.read();
            (state.config.notifications_enabled, state.config.system_enabled)
        };
        if !notifications_enabled || !system_enabled {
            return Err(AppError::validation("notify.disabled", "system notifications are disabled")
                .with_suggestion("enable notifications in settings"));
        }

        let now = self.clock.now_utc();
        let notif = stamp_system(new, now);
        self.deliver_system(notif, now).await
    }

    /// Fresh-delivery wrapper around `attempt_system`: a deferred outcome
    /// is pushed onto the queue as a brand-new entry (0 attempts so far).
    async fn deliver_system(&self, notif: SystemNotification, now: DateTime<Utc>) -> Result<SystemOutcome, AppError> {
        match self.attempt_system(notif, now).await? {
            SystemAttempt::Delivered(id) => Ok(SystemOutcome::Delivered(id)),
            SystemAttempt::Blocked => Ok(SystemOutcome::Blocked),
            SystemAttempt::Deferred(notif) => {
                let id = notif.id;
                let mut state = self.state.write();
                state.queue.push(QueuedNotification::new_system(notif, now, state.config.max_attempts));
                Ok(SystemOutcome::Queued(id))
            }
        }
    }

    /// Gating pipeline shared by `deliver_system` (fresh sends) and the
    /// queue drain tick (re-delivery attempts). Never touches the queue
    /// itself — a deferred notification is handed back to the caller.
    async fn attempt_system(&self, notif: SystemNotification, now: DateTime<Utc>) -> Result<SystemAttempt, AppError> {
        let priority = notif.urgency.to_priority();

        {
            let state = self.state.read();
            if dnd::is_active(state.config.dnd_mode, state.config.dnd_schedule.as_ref(), now, priority) {
                return Ok(SystemAttempt::Deferred(notif));
            }
            if filter::evaluate(&state.config.filters, &notif.title, &notif.body, &notif.category, priority) == FilterOutcome::Block {
                return Ok(SystemAttempt::Blocked);
            }
            if state.throttle.is_throttled(&state.config.throttle, &notif.category, priority, self.clock.now()) {
                return Ok(SystemAttempt::Deferred(notif));
            }
        }

        let dialog_type = match notif.urgency {
            mcpweaver_core::Urgency::Critical => DialogType::Error,
            mcpweaver_core::Urgency::High => DialogType::Warning,
            mcpweaver_core::Urgency::Normal | mcpweaver_core::Urgency::Low => DialogType::Info,
        };
        let request = NativeDialogRequest { dialog_type, title: notif.title.clone(), message: notif.body.clone() };
        let ui = &self.ui;
        let result = retry(&self.retry_policy, &self.clock, &CancellationToken::new(), || {
            self.breaker.execute(|| ui.show_native_dialog(request.clone()))
        })
        .await;
        result.into_result()?;

        let id = notif.id;
        {
            let mut state = self.state.write();
            state.throttle.track(&notif.category, priority, self.clock.now());
            state.stats.record_system_sent(&notif.category, priority, now);
            let record = HistoryRecord::from_system(&notif);
            self.insert_history(&mut state, record.clone());
            self.spawn_history_insert(&record);
        }
        self.sink.emit("notification:system", system_metadata(&notif));
        Ok(SystemAttempt::Delivered(id))
    }

    // ── Background loops (spec §4.8 "Auto-expiry loop", "Queue",
    //    "History retention"; spec §5 suspension points) ────────────────

    /// One queue-drain tick for queued toasts only: while the highest
    /// priority entry is a toast, pop it and re-attempt delivery via
    /// `ShowToast`'s gating pipeline (spec §4.8 "Queue"). Queued system
    /// notifications are left in place for `drain_queue_tick_async`, which
    /// has access to the async UI bridge.
    pub fn drain_queue_tick(&self) {
        loop {
            let is_toast = matches!(self.state.read().queue.peek_front(), Some(q) if matches!(q.kind, QueuedKind::Toast(_)));
            if !is_toast {
                break;
            }
            let Some(mut item) = self.state.write().queue.pop_front() else { break };
            let now = self.clock.now_utc();
            // `peek_front` (read lock) and this `pop_front` (write lock) are
            // separate acquisitions, so a concurrent drain could have popped
            // the toast we peeked and left a system notification at the
            // head. Put it back and stop rather than assume the peek still
            // holds.
            let QueuedKind::Toast(toast) = item.kind.clone() else {
                let mut state = self.state.write();
                if !state.queue.requeue(item) {
                    tracing::debug!("requeued system notification exhausted retry attempts, dropping");
                }
                break;
            };
            match self.attempt_toast(toast, now) {
                ToastAttempt::Deferred(toast) => {
                    item.kind = QueuedKind::Toast(toast);
                    let mut state = self.state.write();
                    if !state.queue.requeue(item) {
                        tracing::debug!("queued toast exhausted retry attempts, dropping");
                    }
                    break;
                }
                ToastAttempt::Delivered(_) | ToastAttempt::Blocked => {}
            }
        }
    }

    /// Async counterpart of `drain_queue_tick`: drains the whole queue each
    /// tick (spec §4.8 "Queue" — "while not paused and non-empty"),
    /// re-attempting toasts and system notifications alike through the
    /// async UI bridge. The original queue entry (with its accumulated
    /// attempt count) is requeued on a deferred outcome; gating never
    /// pushes a fresh entry here, only `ShowToast`/`ShowSystemNotification`
    /// do that.
    pub async fn drain_queue_tick_async(&self) {
        loop {
            let item = {
                let mut state = self.state.write();
                state.queue.pop_front()
            };
            let Some(mut item) = item else { break };
            let now = self.clock.now_utc();
            // `consumed`: the re-attempt reached a terminal outcome (delivered,
            // blocked, or an unrecoverable delivery error) and should not go
            // back on the queue. Still deferred means the same gate
            // (DND/throttle) fired again — count it as a failed attempt and
            // requeue if attempts remain.
            let consumed = match item.kind.clone() {
                QueuedKind::Toast(toast) => match self.attempt_toast(toast, now) {
                    ToastAttempt::Deferred(toast) => {
                        item.kind = QueuedKind::Toast(toast);
                        false
                    }
                    ToastAttempt::Delivered(_) | ToastAttempt::Blocked => true,
                },
                QueuedKind::System(notif) => match self.attempt_system(notif, now).await {
                    Ok(SystemAttempt::Deferred(notif)) => {
                        item.kind = QueuedKind::System(notif);
                        false
                    }
                    Ok(SystemAttempt::Delivered(_)) | Ok(SystemAttempt::Blocked) => true,
                    Err(err) => {
                        tracing::warn!(error = %err, "system notification delivery failed during queue drain");
                        true
                    }
                },
            };
            if consumed {
                continue;
            }
            let mut state = self.state.write();
            if !state.queue.requeue(item) {
                tracing::debug!("queued notification exhausted retry attempts, dropping");
            }
        }
    }

    /// Sweep active toasts for expiry (spec §4.8 "Auto-expiry loop").
    pub fn expire_toasts_tick(&self) {
        let now = self.clock.now_utc();
        let mut state = self.state.write();
        let mut expired = Vec::new();
        state.active.retain(|t| {
            let keep = t.persistent || t.expires_at.map(|exp| exp > now).unwrap_or(true);
            if !keep {
                expired.push(t.clone());
            }
            keep
        });
        for toast in &expired {
            mark_dismissed(&mut state, &toast.id.to_string(), now);
        }
        drop(state);
        for toast in &expired {
            self.spawn_history_update(&toast.id.to_string(), HistoryField::Dismissed(now));
            self.sink.emit("notification:toast_expired", toast_metadata(toast));
        }
    }

    /// Prune history older than `history_retention` (spec §4.8 "History
    /// retention").
    pub fn prune_history_tick(&self) {
        let mut state = self.state.write();
        let cutoff = self.clock.now_utc() - state.config.history_retention;
        let stale: Vec<String> = state
            .history
            .values()
            .filter(|r| r.created_at < cutoff)
            .map(|r| r.id.clone())
            .collect();
        for id in stale {
            state.history.remove(&id);
            state.history_order.retain(|existing| existing != &id);
        }
    }

    fn insert_history(&self, state: &mut State, record: HistoryRecord) {
        let cap = state.config.history_cache_cap;
        state.history_order.push_back(record.id.clone());
        state.history.insert(record.id.clone(), record);
        while state.history_order.len() > cap {
            if let Some(oldest) = state.history_order.pop_front() {
                state.history.remove(&oldest);
            }
        }
    }

    fn spawn_history_insert(&self, record: &HistoryRecord) {
        let Some(store) = self.row_store.clone() else { return };
        let record = record.clone();
        tokio::spawn(async move {
            let actions = serde_json::to_string(&record.actions).unwrap_or_default();
            let metadata = serde_json::to_string(&record.metadata).unwrap_or_default();
            let source = match record.source {
                HistorySource::Toast => "toast",
                HistorySource::System => "system",
            };
            let args = vec![
                SqlValue::from(record.id.clone()),
                SqlValue::from(record.kind.clone()),
                SqlValue::from(record.title.clone()),
                SqlValue::from(record.message.clone()),
                SqlValue::from(record.icon.clone()),
                SqlValue::from(actions),
                SqlValue::from(record.category.clone()),
                SqlValue::from(format!("{:?}", record.priority).to_lowercase()),
                SqlValue::from(record.created_at.to_rfc3339()),
                SqlValue::from(source),
                SqlValue::from(metadata),
            ];
            if let Err(err) = store
                .exec(
                    "INSERT INTO notification_history (id, type, title, message, icon, actions, category, priority, created_at, source, metadata) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                    args,
                )
                .await
            {
                tracing::warn!(error = %err, "failed to persist notification history row");
            }
        });
    }

    fn spawn_history_update(&self, id: &str, field: HistoryField) {
        let Some(store) = self.row_store.clone() else { return };
        let id = id.to_string();
        tokio::spawn(async move {
            let (sql, args): (&str, Vec<SqlValue>) = match field {
                HistoryField::Read(at) => (
                    "UPDATE notification_history SET read_at = ? WHERE id = ?",
                    vec![SqlValue::from(at.to_rfc3339()), SqlValue::from(id.clone())],
                ),
                HistoryField::Dismissed(at) => (
                    "UPDATE notification_history SET dismissed_at = ? WHERE id = ?",
                    vec![SqlValue::from(at.to_rfc3339()), SqlValue::from(id.clone())],
                ),
                HistoryField::Interacted(at, action) => (
                    "UPDATE notification_history SET interacted_at = ?, action_taken = ? WHERE id = ?",
                    vec![SqlValue::from(at.to_rfc3339()), SqlValue::from(action), SqlValue::from(id.clone())],
                ),
            };
            if let Err(err) = store.exec(sql, args).await {
                tracing::warn!(error = %err, "failed to update notification history row");
            }
        });
    }

    /// Hydrate the in-memory history cache from the attached row store,
    /// newest first, capped at `history_cache_cap` (spec §4.8 "Durable
    /// history").
    pub async fn hydrate_history(&self) -> Result<(), AppError> {
        let Some(store) = self.row_store.clone() else { return Ok(()) };
        let cap = self.state.read().config.history_cache_cap;
        let rows = store
            .query(
                "SELECT id, type, title, message, icon, actions, category, priority, created_at, read_at, dismissed_at, interacted_at, action_taken, source, metadata FROM notification_history ORDER BY created_at DESC LIMIT ?",
                vec![SqlValue::Integer(cap as i64)],
            )
            .await?;
        let mut state = self.state.write();
        for row in rows {
            if let Some(record) = row_to_history(&row) {
                state.history_order.push_back(record.id.clone());
                state.history.insert(record.id.clone(), record);
            }
        }
        Ok(())
    }
}

enum HistoryField {
    Read(DateTime<Utc>),
    Dismissed(DateTime<Utc>),
    Interacted(DateTime<Utc>, String),
}

fn row_to_history(row: &mcpweaver_core::Row) -> Option<HistoryRecord> {
    let id = row.get_str("id")?.to_string();
    let priority = match row.get_str("priority")? {
        "low" => mcpweaver_core::Priority::Low,
        "high" => mcpweaver_core::Priority::High,
        "critical" => mcpweaver_core::Priority::Critical,
        _ => mcpweaver_core::Priority::Medium,
    };
    let source = match row.get_str("source")? {
        "system" => HistorySource::System,
        _ => HistorySource::Toast,
    };
    let created_at = DateTime::parse_from_rfc3339(row.get_str("created_at")?).ok()?.with_timezone(&Utc);
    Some(HistoryRecord {
        id,
        source,
        kind: row.get_str("type").unwrap_or_default().to_string(),
        title: row.get_str("title").unwrap_or_default().to_string(),
        message: row.get_str("message").unwrap_or_default().to_string(),
        icon: row.get_str("icon").map(str::to_string),
        actions: row
            .get_str("actions")
            .and_then(|s| serde_json::from_str(s).ok())
            .unwrap_or_default(),
        category: row.get_str("category").unwrap_or_default().to_string(),
        priority,
        created_at,
        read_at: row.get_str("read_at").and_then(|s| DateTime::parse_from_rfc3339(s).ok()).map(|d| d.with_timezone(&Utc)),
        dismissed_at: row
            .get_str("dismissed_at")
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|d| d.with_timezone(&Utc)),
        interacted_at: row
            .get_str("interacted_at")
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|d| d.with_timezone(&Utc)),
        action_taken: row.get_str("action_taken").map(str::to_string),
        metadata: row.get_str("metadata").and_then(|s| serde_json::from_str(s).ok()).unwrap_or_default(),
    })
}

fn stamp_toast(new: NewToast, now: DateTime<Utc>, default_duration: std::time::Duration) -> Toast {
    let duration = if new.duration.is_zero() { default_duration } else { new.duration };
    let (expires_at, auto_dismiss) =
        if new.persistent { (None, false) } else { (Some(now + chrono::Duration::from_std(duration).unwrap_or_default()), true) };
    Toast {
        id: ToastId::new(),
        kind: new.kind,
        title: new.title,
        message: new.message,
        icon: new.icon,
        duration,
        position: new.position,
        actions: new.actions,
        created_at: now,
        expires_at,
        persistent: new.persistent,
        auto_dismiss,
        priority: new.priority,
        category: new.category,
        progress: new.progress,
        metadata: new.metadata,
    }
}

fn stamp_system(new: NewSystemNotification, now: DateTime<Utc>) -> SystemNotification {
    SystemNotification {
        id: SystemNotificationId::new(),
        title: new.title,
        body: new.body,
        icon: new.icon,
        urgency: new.urgency,
        actions: new.actions,
        category: new.category,
        timeout: new.timeout,
        silent: new.silent,
        created_at: now,
        metadata: new.metadata,
    }
}

fn mark_dismissed(state: &mut State, id: &str, now: DateTime<Utc>) {
    if let Some(record) = state.history.get_mut(id) {
        if record.dismissed_at.is_none() {
            record.dismissed_at = Some(now);
            let (category, priority) = (record.category.clone(), record.priority);
            state.stats.record_dismissed(&category, priority);
        }
    }
}

fn toast_metadata(toast: &Toast) -> Metadata {
    match serde_json::to_value(toast) {
        Ok(serde_json::Value::Object(map)) => map,
        _ => Metadata::new(),
    }
}

fn system_metadata(notif: &SystemNotification) -> Metadata {
    match serde_json::to_value(notif) {
        Ok(serde_json::Value::Object(map)) => map,
        _ => Metadata::new(),
    }
}

fn id_metadata(id: &str) -> Metadata {
    let mut map = Metadata::new();
    map.insert("id".to_string(), serde_json::Value::String(id.to_string()));
    map
}

/// Spawn the 1-second queue drain loop (spec §4.8 "Queue", §5 "the queue
/// drain tick").
pub fn spawn_queue_drain_loop<C, S, U>(
    service: Arc<NotificationService<C, S, U>>,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()>
where
    C: Clock + 'static,
    S: EventSink + 'static,
    U: UiBridge,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(service.config().drain_rate);
        loop {
            tokio::select! {
                _ = ticker.tick() => service.drain_queue_tick_async().await,
                _ = cancel.cancelled() => break,
            }
        }
    })
}

/// Spawn the 1-minute auto-expiry sweep (spec §4.8 "Auto-expiry loop").
pub fn spawn_expiry_loop<C, S, U>(
    service: Arc<NotificationService<C, S, U>>,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()>
where
    C: Clock + 'static,
    S: EventSink + 'static,
    U: UiBridge,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(60));
        loop {
            tokio::select! {
                _ = ticker.tick() => service.expire_toasts_tick(),
                _ = cancel.cancelled() => break,
            }
        }
    })
}

/// Spawn the hourly history retention sweep (spec §4.8 "History retention").
pub fn spawn_history_retention_loop<C, S, U>(
    service: Arc<NotificationService<C, S, U>>,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()>
where
    C: Clock + 'static,
    S: EventSink + 'static,
    U: UiBridge,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(3600));
        loop {
            tokio::select! {
                _ = ticker.tick() => service.prune_history_tick(),
                _ = cancel.cancelled() => break,
            }
        }
    })
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
