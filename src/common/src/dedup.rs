//! Time-windowed suppression of repeated alerts.
//!
//! A gate remembers when each error signature last produced a notification.
//! Signatures seen again inside the window are suppressed; the table is only
//! written when a notification is allowed through.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;

use crate::constants::{DEDUP_SWEEP_THRESHOLD, DEDUP_WINDOW_MS};
use crate::types::records::ErrorRecord;

#[derive(Debug)]
pub struct DedupGate {
    window: Duration,
    last_notified: DashMap<String, Instant>,
    /// Table size that triggers the next sweep. Doubles past the live set so
    /// a table full of unexpired signatures is not rescanned on every insert.
    next_sweep_len: AtomicUsize,
}

impl Default for DedupGate {
    fn default() -> Self {
        Self::with_window(Duration::from_millis(DEDUP_WINDOW_MS))
    }
}

impl DedupGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_window(window: Duration) -> Self {
        Self {
            window,
            last_notified: DashMap::new(),
            next_sweep_len: AtomicUsize::new(DEDUP_SWEEP_THRESHOLD),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn should_notify(&self, record: &ErrorRecord) -> bool {
        self.should_notify_at(record, Instant::now())
    }

    /// Same as [`DedupGate::should_notify`] with an explicit clock reading.
    pub fn should_notify_at(&self, record: &ErrorRecord, now: Instant) -> bool {
        let key = record.dedup_key();

        // The entry guard must be released before sweeping, dashmap shards are not re-entrant.
        let notify = match self.last_notified.entry(key) {
            Entry::Occupied(mut seen) => {
                if now.saturating_duration_since(*seen.get()) < self.window {
                    debug!(
                        "Duplicate error {} within {:?}, not notifying",
                        seen.key(),
                        self.window
                    );
                    false
                } else {
                    seen.insert(now);
                    true
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(now);
                true
            }
        };

        if notify && self.last_notified.len() > self.next_sweep_len.load(Ordering::Relaxed) {
            self.sweep_expired_at(now);
        }

        notify
    }

    /// Drops every signature whose window has already elapsed.
    pub fn sweep_expired(&self) -> usize {
        self.sweep_expired_at(Instant::now())
    }

    pub fn sweep_expired_at(&self, now: Instant) -> usize {
        let before = self.last_notified.len();
        self.last_notified
            .retain(|_, seen| now.saturating_duration_since(*seen) < self.window);
        let remaining = self.last_notified.len();
        self.next_sweep_len.store(
            DEDUP_SWEEP_THRESHOLD.max(remaining.saturating_mul(2)),
            Ordering::Relaxed,
        );

        let removed = before.saturating_sub(remaining);
        if removed > 0 {
            debug!("Swept {} expired dedup entries", removed);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.last_notified.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_notified.is_empty()
    }
}
