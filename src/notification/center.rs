//! The notification center: ordered toasts with independent timers.

use chrono::Utc;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::{DismissReason, Notification, NotificationError, NotificationId, NotificationSpec};
use crate::config::NotificationConfig;

struct CenterInner {
    config: NotificationConfig,
    /// Current list, in display order. The sender doubles as storage.
    state: watch::Sender<Vec<Notification>>,
    /// Pending auto-dismiss timers by notification.
    timers: Mutex<HashMap<NotificationId, JoinHandle<()>>>,
}

impl CenterInner {
    fn timers(&self) -> MutexGuard<'_, HashMap<NotificationId, JoinHandle<()>>> {
        self.timers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn remove(&self, id: &NotificationId, reason: DismissReason) -> Option<Notification> {
        let mut removed = None;
        self.state.send_if_modified(|list| {
            match list.iter().position(|n| &n.id == id) {
                Some(index) => {
                    removed = Some(list.remove(index));
                    true
                }
                None => false,
            }
        });

        if let Some(timer) = self.timers().remove(id) {
            // An expiring timer is the running task itself
            if reason != DismissReason::Expired {
                timer.abort();
            }
        }

        if removed.is_some() {
            debug!(id = %id, reason = %reason, "Notification dismissed");
        }
        removed
    }
}

impl Drop for CenterInner {
    fn drop(&mut self) {
        let timers = self.timers.get_mut().unwrap_or_else(PoisonError::into_inner);
        for (_, timer) in timers.drain() {
            timer.abort();
        }
    }
}

/// Owns the ordered list of visible notifications and their lifecycle.
///
/// The center is a cheaply clonable handle. Auto-dismiss timers run on the
/// ambient tokio runtime; each notification has its own timer, which is
/// cancelled when the notification is removed early.
#[derive(Clone)]
pub struct NotificationCenter {
    inner: Arc<CenterInner>,
}

impl NotificationCenter {
    pub fn new(config: NotificationConfig) -> Self {
        let (state, _) = watch::channel(Vec::new());
        Self {
            inner: Arc::new(CenterInner {
                config,
                state,
                timers: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn config(&self) -> &NotificationConfig {
        &self.inner.config
    }

    /// Adds a notification and returns its id.
    ///
    /// Defaults: dismissible, auto-dismiss after the configured default
    /// duration. Persistent notifications get no timer. At capacity the
    /// oldest notification is evicted first.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError::EmptyTitle`] if the title is blank.
    pub fn add_notification(
        &self,
        spec: NotificationSpec,
    ) -> Result<NotificationId, NotificationError> {
        if spec.title.trim().is_empty() {
            return Err(NotificationError::EmptyTitle);
        }

        let duration = if spec.persistent {
            None
        } else {
            Some(
                spec.duration
                    .unwrap_or_else(|| self.inner.config.default_duration()),
            )
        };

        let notification = Notification {
            id: NotificationId::generate(),
            kind: spec.kind,
            title: spec.title,
            message: spec.message,
            action: spec.action,
            dismissible: spec.dismissible.unwrap_or(true),
            persistent: spec.persistent,
            duration,
            created_at: Utc::now(),
        };
        let id = notification.id.clone();

        if let Some(cap) = self.inner.config.max_visible {
            let overflow = (self.len() + 1).saturating_sub(cap.max(1));
            let evicted: Vec<NotificationId> = self
                .inner
                .state
                .borrow()
                .iter()
                .take(overflow)
                .map(|n| n.id.clone())
                .collect();
            for old in evicted {
                self.inner.remove(&old, DismissReason::Evicted);
            }
        }

        debug!(
            id = %id,
            kind = %notification.kind,
            title = %notification.title,
            duration_ms = ?duration.map(|d| d.as_millis()),
            "Notification added"
        );
        self.inner.state.send_modify(|list| list.push(notification));

        if let Some(duration) = duration {
            self.schedule_dismiss(id.clone(), duration);
        }

        Ok(id)
    }

    fn schedule_dismiss(&self, id: NotificationId, duration: std::time::Duration) {
        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                warn!(id = %id, "No async runtime available; notification will not auto-dismiss");
                return;
            }
        };

        let deadline = Instant::now() + duration;
        let weak: Weak<CenterInner> = Arc::downgrade(&self.inner);
        let timer_id = id.clone();

        // Hold the lock across spawn so the timer cannot fire before it is
        // registered
        let mut timers = self.inner.timers();
        let handle = runtime.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            if let Some(inner) = weak.upgrade() {
                inner.remove(&timer_id, DismissReason::Expired);
            }
        });
        timers.insert(id, handle);
    }

    /// Removes a notification by id.
    ///
    /// Removing an id that is not present is a no-op and returns `None`.
    pub fn remove_notification(&self, id: &NotificationId) -> Option<Notification> {
        self.inner.remove(id, DismissReason::Manual)
    }

    /// Runs a notification's action, then dismisses it unless persistent.
    ///
    /// Returns true if the notification was dismissed.
    ///
    /// # Errors
    ///
    /// Returns an error if the notification is not visible or has no
    /// action.
    pub fn invoke_action(&self, id: &NotificationId) -> Result<bool, NotificationError> {
        let (action, persistent) = {
            let list = self.inner.state.borrow();
            let notification = list
                .iter()
                .find(|n| &n.id == id)
                .ok_or_else(|| NotificationError::NotFound(id.clone()))?;
            let action = notification
                .action
                .clone()
                .ok_or_else(|| NotificationError::NoAction(id.clone()))?;
            (action, notification.persistent)
        };

        debug!(id = %id, label = action.label(), "Running notification action");
        action.invoke();

        if persistent {
            return Ok(false);
        }
        Ok(self.inner.remove(id, DismissReason::Action).is_some())
    }

    /// Dismisses every notification.
    pub fn clear(&self) {
        let ids: Vec<NotificationId> = self
            .inner
            .state
            .borrow()
            .iter()
            .map(|n| n.id.clone())
            .collect();
        for id in ids {
            self.inner.remove(&id, DismissReason::Manual);
        }
    }

    /// Returns the current notifications in display order.
    pub fn notifications(&self) -> Vec<Notification> {
        self.inner.state.borrow().clone()
    }

    /// Returns a notification by id.
    pub fn get(&self, id: &NotificationId) -> Option<Notification> {
        self.inner
            .state
            .borrow()
            .iter()
            .find(|n| &n.id == id)
            .cloned()
    }

    /// Subscribes to list changes. The receiver sees the current list
    /// immediately.
    pub fn subscribe(&self) -> watch::Receiver<Vec<Notification>> {
        self.inner.state.subscribe()
    }

    pub fn len(&self) -> usize {
        self.inner.state.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of auto-dismiss timers still pending.
    pub fn pending_timers(&self) -> usize {
        self.inner.timers().len()
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(NotificationConfig::default())
    }
}

impl fmt::Debug for NotificationCenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationCenter")
            .field("visible", &self.len())
            .field("pending_timers", &self.pending_timers())
            .finish()
    }
}
