//! Virtual-time scheduler owned by the round engine.
//!
//! Time only moves when the owner calls [`Scheduler::pop_due`]. Timers fire
//! in `(due, id)` order. A cancelled timer is removed from the queue
//! outright, so it can never fire late.

use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct Timer<K> {
    id: TimerId,
    due_ms: u64,
    period_ms: Option<u64>,
    kind: K,
}

#[derive(Debug, Clone)]
pub struct Scheduler<K> {
    now_ms: u64,
    next_id: u64,
    timers: Vec<Timer<K>>,
}

impl<K: Copy + std::fmt::Debug> Default for Scheduler<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Copy + std::fmt::Debug> Scheduler<K> {
    pub fn new() -> Self {
        Self {
            now_ms: 0,
            next_id: 0,
            timers: Vec::new(),
        }
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        Duration::from_millis(self.now_ms)
    }

    /// Fire once after `delay`.
    pub fn once(&mut self, delay: Duration, kind: K) -> TimerId {
        self.insert(delay, None, kind)
    }

    /// Fire every `period`, first after one period. A zero period is
    /// treated as one millisecond.
    pub fn every(&mut self, period: Duration, kind: K) -> TimerId {
        let period_ms = millis(period).max(1);
        self.insert(Duration::from_millis(period_ms), Some(period_ms), kind)
    }

    fn insert(&mut self, delay: Duration, period_ms: Option<u64>, kind: K) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let due_ms = self.now_ms.saturating_add(millis(delay));
        debug!(?id, ?kind, due_ms, ?period_ms, "Timer scheduled");
        self.timers.push(Timer {
            id,
            due_ms,
            period_ms,
            kind,
        });
        id
    }

    pub fn cancel(&mut self, id: TimerId) {
        self.timers.retain(|t| t.id != id);
    }

    /// Drop every pending timer.
    pub fn cancel_all(&mut self) {
        if !self.timers.is_empty() {
            debug!(count = self.timers.len(), "Timers cancelled");
        }
        self.timers.clear();
    }

    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.timers.iter().any(|t| t.id == id)
    }

    /// Pop the earliest timer due at or before `deadline`, moving the clock
    /// to its due time. Repeating timers are re-armed for their next period
    /// before being returned.
    ///
    /// Callers must handle each returned timer before popping the next one,
    /// so that cancellations made by a handler take effect.
    pub fn pop_due(&mut self, deadline: Duration) -> Option<K> {
        let deadline_ms = millis(deadline);
        let index = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due_ms <= deadline_ms)
            .min_by_key(|(_, t)| (t.due_ms, t.id))
            .map(|(i, _)| i)?;

        let timer = &mut self.timers[index];
        self.now_ms = self.now_ms.max(timer.due_ms);
        let kind = timer.kind;
        let period_ms = timer.period_ms;

        match period_ms {
            Some(period) => timer.due_ms = timer.due_ms.saturating_add(period),
            None => {
                self.timers.swap_remove(index);
            }
        }

        Some(kind)
    }

    /// Move the clock forward to `instant` without firing anything. Never
    /// moves backwards.
    pub fn advance_clock(&mut self, instant: Duration) {
        self.now_ms = self.now_ms.max(millis(instant));
    }
}

/// Whole milliseconds, saturating at `u64::MAX`.
fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
