//! Debounced persistence
//!
//! One pending write slot. Every `schedule` replaces the payload and pushes the
//! deadline out by the debounce window, so a burst of mutations lands as a
//! single write carrying the latest state.

use std::time::{Duration, Instant};

use super::kv::KeyValueStore;

pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// Key of the persisted application state record
pub const STATE_KEY: &str = "workbook-state";

struct PendingWrite {
    payload: String,
    deadline: Instant,
}

pub struct PersistScheduler {
    store: Box<dyn KeyValueStore>,
    key: String,
    debounce: Duration,
    pending: Option<PendingWrite>,
    writes: u64,
}

impl PersistScheduler {
    pub fn new(store: Box<dyn KeyValueStore>, key: impl Into<String>, debounce: Duration) -> Self {
        Self {
            store,
            key: key.into(),
            debounce,
            pending: None,
            writes: 0,
        }
    }

    /// Scheduler for the application state record with the default window
    pub fn for_state(store: Box<dyn KeyValueStore>) -> Self {
        Self::new(store, STATE_KEY, Duration::from_millis(DEFAULT_DEBOUNCE_MS))
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    pub fn schedule(&mut self, payload: String) {
        self.schedule_at(payload, Instant::now());
    }

    /// Replace the pending payload and reset the deadline to `now + debounce`
    pub fn schedule_at(&mut self, payload: String, now: Instant) {
        self.pending = Some(PendingWrite {
            payload,
            deadline: now + self.debounce,
        });
    }

    pub fn poll(&mut self) -> bool {
        self.poll_at(Instant::now())
    }

    /// Write the pending payload if its deadline has passed
    ///
    /// Returns whether a write was attempted.
    pub fn poll_at(&mut self, now: Instant) -> bool {
        match &self.pending {
            Some(pending) if pending.deadline <= now => self.flush(),
            _ => false,
        }
    }

    /// Write the pending payload now, if any
    pub fn flush(&mut self) -> bool {
        let Some(pending) = self.pending.take() else {
            return false;
        };

        match self.store.set(&self.key, &pending.payload) {
            Ok(()) => {
                self.writes += 1;
                tracing::debug!(key = %self.key, bytes = pending.payload.len(), "state persisted");
            }
            // In-memory state stays authoritative; the write is dropped, not retried
            Err(e) => tracing::warn!(key = %self.key, error = %e, "failed to persist state"),
        }
        true
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    /// Successful writes so far
    pub fn write_count(&self) -> u64 {
        self.writes
    }
}

impl Drop for PersistScheduler {
    fn drop(&mut self) {
        self.flush();
    }
}
