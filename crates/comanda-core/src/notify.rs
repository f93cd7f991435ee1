//! Transient user-facing notifications with timed expiry.
//!
//! Failures reported by the service clients land here, decoupled from the
//! call sites that produced them; the host application renders whatever
//! [`Notifications::list`] returns. Every entry schedules its own removal
//! and can be dismissed early.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

/// How long an error stays visible.
const ERROR_TTL: Duration = Duration::from_millis(4000);

/// How long success and warning messages stay visible.
const NOTICE_TTL: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
    Warning,
}

impl Severity {
    fn ttl(self) -> Duration {
        match self {
            Severity::Error => ERROR_TTL,
            Severity::Success | Severity::Warning => NOTICE_TTL,
        }
    }
}

/// A short-lived message shown to the user.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: u64,
    pub severity: Severity,
    pub text: String,
}

#[derive(Default)]
struct Queue {
    entries: Vec<Notification>,
    /// Expiry timers keyed by notification id; dismissal aborts them.
    timers: HashMap<u64, JoinHandle<()>>,
}

#[derive(Default)]
struct Shared {
    queue: Mutex<Queue>,
    next_id: AtomicU64,
}

/// Handle to the notification queue. Clone is cheap; all clones share the
/// same queue.
///
/// Enqueuing spawns the expiry timer on the ambient Tokio runtime, so the
/// reporting methods must be called from within one.
#[derive(Clone, Default)]
pub struct Notifications {
    shared: Arc<Shared>,
}

impl Notifications {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success(&self, text: impl Into<String>) -> u64 {
        self.push(Severity::Success, text.into())
    }

    pub fn error(&self, text: impl Into<String>) -> u64 {
        self.push(Severity::Error, text.into())
    }

    pub fn warning(&self, text: impl Into<String>) -> u64 {
        self.push(Severity::Warning, text.into())
    }

    /// Current notifications in enqueue order, oldest first.
    pub fn list(&self) -> Vec<Notification> {
        self.shared.queue.lock().entries.clone()
    }

    /// Remove a notification immediately and cancel its timer. Unknown ids
    /// are a no-op.
    pub fn dismiss(&self, id: u64) {
        let mut queue = self.shared.queue.lock();
        queue.entries.retain(|n| n.id != id);
        if let Some(timer) = queue.timers.remove(&id) {
            timer.abort();
        }
    }

    fn push(&self, severity: Severity, text: String) -> u64 {
        let id = self.shared.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let ttl = severity.ttl();

        let mut queue = self.shared.queue.lock();
        queue.entries.push(Notification { id, severity, text });

        // The timer holds only a weak handle; a dropped queue stops mattering.
        let shared = Arc::downgrade(&self.shared);
        queue
            .timers
            .insert(id, tokio::spawn(expire(shared, id, ttl)));
        id
    }
}

async fn expire(shared: Weak<Shared>, id: u64, ttl: Duration) {
    tokio::time::sleep(ttl).await;
    if let Some(shared) = shared.upgrade() {
        let mut queue = shared.queue.lock();
        queue.entries.retain(|n| n.id != id);
        queue.timers.remove(&id);
    }
}
