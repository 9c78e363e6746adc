//! Transient, severity-tagged notifications.
//!
//! The [`NotificationCenter`] owns the live list of notifications. Each entry
//! posted with a non-zero TTL gets its own timer task that removes it when the
//! TTL elapses; dismissing the entry first aborts that timer, so an entry is
//! never removed twice. A zero TTL keeps the entry until it is dismissed.
//!
//! Rendering is somebody else's job: consumers read
//! [`notifications`](NotificationCenter::notifications) or
//! [`subscribe`](NotificationCenter::subscribe) to the live list.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Unique identifier for a notification (UUID v7, time-ordered).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NotificationId(Uuid);

impl NotificationId {
    /// Creates a new time-ordered identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Returns the inner UUID value.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for NotificationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "notification-{}", self.0)
    }
}

/// How important a notification is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Neutral information.
    Info,
    /// An operation completed.
    Success,
    /// Something needs attention but nothing failed.
    Warning,
    /// An operation failed.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Success => write!(f, "success"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A single advisory message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Identifier used to dismiss the notification.
    pub id: NotificationId,
    /// Text shown to the user.
    pub message: String,
    /// Severity level.
    pub severity: Severity,
    /// Lifetime; zero means the notification stays until dismissed.
    pub ttl: Duration,
}

/// Default lifetimes used by the per-severity helpers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationTtls {
    /// TTL for [`Severity::Info`].
    pub info: Duration,
    /// TTL for [`Severity::Success`].
    pub success: Duration,
    /// TTL for [`Severity::Warning`].
    pub warning: Duration,
    /// TTL for [`Severity::Error`].
    pub error: Duration,
}

impl Default for NotificationTtls {
    fn default() -> Self {
        Self {
            info: Duration::from_millis(3000),
            success: Duration::from_millis(3000),
            warning: Duration::from_millis(4000),
            error: Duration::from_millis(5000),
        }
    }
}

impl NotificationTtls {
    /// Returns the default TTL for `severity`.
    #[must_use]
    pub const fn for_severity(&self, severity: Severity) -> Duration {
        match severity {
            Severity::Info => self.info,
            Severity::Success => self.success,
            Severity::Warning => self.warning,
            Severity::Error => self.error,
        }
    }
}

#[derive(Default)]
struct Entries {
    live: Vec<Notification>,
    timers: HashMap<NotificationId, JoinHandle<()>>,
}

struct Shared {
    entries: Mutex<Entries>,
    published: watch::Sender<Vec<Notification>>,
    ttls: NotificationTtls,
}

impl Shared {
    fn publish(&self, entries: &Entries) {
        self.published.send_replace(entries.live.clone());
    }

    /// Called by an entry's own timer once its TTL has elapsed.
    fn expire(&self, id: NotificationId) {
        let mut entries = self.entries.lock();
        entries.timers.remove(&id);
        let before = entries.live.len();
        entries.live.retain(|n| n.id != id);
        if entries.live.len() != before {
            tracing::debug!(%id, "notification expired");
            self.publish(&entries);
        }
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        for (_, timer) in self.entries.get_mut().timers.drain() {
            timer.abort();
        }
    }
}

/// Owner of the live notification list. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct NotificationCenter {
    shared: Arc<Shared>,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for NotificationCenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationCenter")
            .field("live", &self.shared.entries.lock().live.len())
            .field("ttls", &self.shared.ttls)
            .finish()
    }
}

impl NotificationCenter {
    /// Creates an empty center with the default per-severity TTLs.
    #[must_use]
    pub fn new() -> Self {
        Self::with_ttls(NotificationTtls::default())
    }

    /// Creates an empty center with custom per-severity TTLs.
    #[must_use]
    pub fn with_ttls(ttls: NotificationTtls) -> Self {
        let (published, _) = watch::channel(Vec::new());
        Self {
            shared: Arc::new(Shared {
                entries: Mutex::new(Entries::default()),
                published,
                ttls,
            }),
        }
    }

    /// Adds a notification and, if `ttl` is non-zero, schedules its removal.
    ///
    /// Must be called from within a Tokio runtime when `ttl` is non-zero.
    pub fn post(
        &self,
        message: impl Into<String>,
        severity: Severity,
        ttl: Duration,
    ) -> NotificationId {
        let notification = Notification {
            id: NotificationId::new(),
            message: message.into(),
            severity,
            ttl,
        };
        let id = notification.id;
        tracing::debug!(
            %id,
            %severity,
            ttl_ms = ttl.as_millis(),
            message = %notification.message,
            "notification posted"
        );

        // The lock is held across the spawn so the timer cannot expire the
        // entry before it is registered.
        let mut entries = self.shared.entries.lock();
        entries.live.push(notification);
        if !ttl.is_zero() {
            let weak: Weak<Shared> = Arc::downgrade(&self.shared);
            let timer = tokio::spawn(async move {
                tokio::time::sleep(ttl).await;
                if let Some(shared) = weak.upgrade() {
                    shared.expire(id);
                }
            });
            entries.timers.insert(id, timer);
        }
        self.shared.publish(&entries);
        id
    }

    /// Posts an info notification with the default info TTL.
    pub fn info(&self, message: impl Into<String>) -> NotificationId {
        self.post(message, Severity::Info, self.shared.ttls.info)
    }

    /// Posts a success notification with the default success TTL.
    pub fn success(&self, message: impl Into<String>) -> NotificationId {
        self.post(message, Severity::Success, self.shared.ttls.success)
    }

    /// Posts a warning notification with the default warning TTL.
    pub fn warning(&self, message: impl Into<String>) -> NotificationId {
        self.post(message, Severity::Warning, self.shared.ttls.warning)
    }

    /// Posts an error notification with the default error TTL.
    pub fn error(&self, message: impl Into<String>) -> NotificationId {
        self.post(message, Severity::Error, self.shared.ttls.error)
    }

    /// Removes a notification and cancels its timer.
    ///
    /// Returns `false` if the notification was already gone.
    pub fn dismiss(&self, id: NotificationId) -> bool {
        let mut entries = self.shared.entries.lock();
        let Some(pos) = entries.live.iter().position(|n| n.id == id) else {
            return false;
        };
        entries.live.remove(pos);
        if let Some(timer) = entries.timers.remove(&id) {
            timer.abort();
        }
        self.shared.publish(&entries);
        true
    }

    /// Removes every notification and cancels every timer.
    pub fn clear(&self) {
        let mut entries = self.shared.entries.lock();
        for (_, timer) in entries.timers.drain() {
            timer.abort();
        }
        entries.live.clear();
        self.shared.publish(&entries);
    }

    /// Live notifications in creation order.
    #[must_use]
    pub fn notifications(&self) -> Vec<Notification> {
        self.shared.entries.lock().live.clone()
    }

    /// Number of pending expiry timers.
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.shared.entries.lock().timers.len()
    }

    /// Subscribes to the live list.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Vec<Notification>> {
        self.shared.published.subscribe()
    }

    /// Default TTLs used by the helpers.
    #[must_use]
    pub fn ttls(&self) -> &NotificationTtls {
        &self.shared.ttls
    }
}
