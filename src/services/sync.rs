//! Debounced outbound sync.
//!
//! The scheduler is clock-agnostic: callers pass the current [`Instant`] to
//! both [`SyncScheduler::schedule`] and [`SyncScheduler::poll`], which keeps
//! bursts deterministic under test.

use std::time::{Duration, Instant};

use anyhow::Result;

use crate::services::flat_format::FlatGroup;

/// Receives the flat export when a debounced sync fires.
pub trait SyncSink {
    /// Delivers every bucket's flat list, read at fire time.
    fn sync(&mut self, groups: &[FlatGroup]) -> Result<()>;
}

impl<F> SyncSink for F
where
    F: FnMut(&[FlatGroup]) -> Result<()>,
{
    fn sync(&mut self, groups: &[FlatGroup]) -> Result<()> {
        self(groups)
    }
}

/// Restart-on-schedule debounce timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncScheduler {
    debounce: Duration,
    deadline: Option<Instant>,
}

impl SyncScheduler {
    /// Creates an idle scheduler.
    #[must_use]
    pub const fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            deadline: None,
        }
    }

    /// (Re)starts the timer; any pending deadline is replaced.
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.debounce);
    }

    /// Returns true exactly once when the pending deadline has passed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Returns true if a sync is waiting to fire.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Drops any pending sync.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}
