//! Cancellable deferred callbacks on the sequencer's clock.

use std::time::Duration;

/// Handle returned by [`Timers::schedule`], used to cancel the callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerHandle(u64);

#[derive(Debug)]
struct Pending<T> {
    handle: TimerHandle,
    due: Duration,
    action: T,
}

/// Small timer queue. Due callbacks pop in deadline order, ties in scheduling order.
#[derive(Debug)]
pub struct Timers<T> {
    next_id: u64,
    pending: Vec<Pending<T>>,
}

impl<T> Default for Timers<T> {
    fn default() -> Self {
        Self { next_id: 0, pending: Vec::new() }
    }
}

impl<T> Timers<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, now: Duration, delay: Duration, action: T) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.pending.push(Pending { handle, due: now.saturating_add(delay), action });
        handle
    }

    /// Returns true if the callback was still pending.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.handle != handle);
        self.pending.len() != before
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.iter().map(|p| p.due).min()
    }

    /// Removes and returns the earliest callback due at or before `now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<(TimerHandle, T)> {
        let index = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due <= now)
            .min_by_key(|(_, p)| (p.due, p.handle.0))
            .map(|(i, _)| i)?;
        let pending = self.pending.remove(index);
        Some((pending.handle, pending.action))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn pops_in_deadline_order() {
        let mut timers = Timers::new();
        timers.schedule(ms(0), ms(300), "late");
        timers.schedule(ms(0), ms(100), "early");
        timers.schedule(ms(0), ms(100), "early-second");

        assert!(timers.pop_due(ms(50)).is_none());
        assert_eq!(timers.pop_due(ms(300)).map(|(_, a)| a), Some("early"));
        assert_eq!(timers.pop_due(ms(300)).map(|(_, a)| a), Some("early-second"));
        assert_eq!(timers.pop_due(ms(300)).map(|(_, a)| a), Some("late"));
        assert_eq!(timers.next_deadline(), None);
    }

    #[test]
    fn cancel_removes_pending() {
        let mut timers = Timers::new();
        let handle = timers.schedule(ms(10), ms(100), 1);
        timers.schedule(ms(10), ms(200), 2);
        assert_eq!(timers.next_deadline(), Some(ms(110)));

        assert!(timers.cancel(handle));
        assert!(!timers.cancel(handle));
        assert_eq!(timers.next_deadline(), Some(ms(210)));
        assert_eq!(timers.pop_due(ms(1_000)).map(|(_, a)| a), Some(2));
    }

    #[test]
    fn huge_delay_saturates() {
        let mut timers = Timers::new();
        timers.schedule(ms(10), Duration::MAX, ());
        assert_eq!(timers.next_deadline(), Some(Duration::MAX));
        assert!(timers.pop_due(ms(10_000)).is_none());
    }
}
