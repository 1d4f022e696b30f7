//! Host-polled debouncing.
//!
//! The pipeline is synchronous and runtime-agnostic, so debouncing is a
//! deadline rather than a timer: `submit` records the value and restarts
//! its deadline, and the host calls `poll` from its own tick loop to
//! commit values whose deadline has passed. The debouncer itself keeps no
//! memory of past commits; redundant-commit suppression belongs to the
//! commit site (`Cell::set_if_changed`), which always compares against the
//! live target and so cannot go stale when the target changes through
//! another path.

use std::time::{Duration, Instant};

pub struct Debouncer<T> {
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new() -> Self {
        Debouncer { pending: None }
    }

    /// Stores a value to be committed once `delay` has elapsed without a
    /// newer submission. Resubmitting restarts the deadline.
    pub fn submit(&mut self, value: T, delay: Duration) {
        self.pending = Some((value, Instant::now() + delay));
    }

    /// Takes the pending value if its deadline has passed.
    pub fn poll(&mut self) -> Option<T> {
        self.poll_at(Instant::now())
    }

    pub fn poll_at(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, deadline)) if *deadline <= now => self.pending.take().map(|(v, _)| v),
            _ => None,
        }
    }
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new()
    }
}
