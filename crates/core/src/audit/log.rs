//! Append-only request/response audit log
//!
//! Every outbound call appends exactly one record. Entries are kept in
//! completion order and numbered as they arrive. Appends never fail and
//! never wait on I/O; the lock is held only for the push itself.

use std::collections::VecDeque;

use parking_lot::Mutex;
use ravenfleet_domain::{AuditLogEntry, AuditRecord};
use tokio::sync::broadcast;
use tracing::trace;

/// Buffered entries per live subscriber before it starts lagging.
const SUBSCRIBER_CAPACITY: usize = 256;

#[derive(Debug)]
struct LogInner {
    entries: VecDeque<AuditLogEntry>,
    next_id: u64,
}

/// Ordered record of every request/response pair.
#[derive(Debug)]
pub struct AuditLog {
    inner: Mutex<LogInner>,
    max_entries: Option<usize>,
    events: broadcast::Sender<AuditLogEntry>,
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditLog {
    /// Unbounded log.
    pub fn new() -> Self {
        Self::with_max_entries(None)
    }

    /// Log that drops its oldest entries once it holds `max_entries`.
    /// `Some(0)` is treated as unbounded.
    pub fn with_max_entries(max_entries: Option<usize>) -> Self {
        let (events, _) = broadcast::channel(SUBSCRIBER_CAPACITY);
        Self {
            inner: Mutex::new(LogInner { entries: VecDeque::new(), next_id: 1 }),
            max_entries: max_entries.filter(|max| *max > 0),
            events,
        }
    }

    /// Record a completed call and return the stored entry.
    pub fn append(&self, record: AuditRecord) -> AuditLogEntry {
        let entry = {
            let mut inner = self.inner.lock();
            let entry = AuditLogEntry { id: inner.next_id, record };
            inner.next_id += 1;
            inner.entries.push_back(entry.clone());
            if let Some(max) = self.max_entries {
                while inner.entries.len() > max {
                    inner.entries.pop_front();
                }
            }
            entry
        };

        trace!(id = entry.id, endpoint = %entry.endpoint(), status = entry.status(), "audit entry appended");
        // no subscribers is fine
        let _ = self.events.send(entry.clone());
        entry
    }

    /// Snapshot of all entries, oldest first.
    pub fn entries(&self) -> Vec<AuditLogEntry> {
        self.inner.lock().entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    /// Drop all entries. Ids keep increasing across clears.
    pub fn clear(&self) {
        self.inner.lock().entries.clear();
    }

    /// Receive every entry appended from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<AuditLogEntry> {
        self.events.subscribe()
    }
}
