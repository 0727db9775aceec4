//! This module provides the timing seam used for automatic stepping.
//!
//! A [`Scheduler`] queues one-shot ticks and hands them back once they are due. Every tick
//! carries a [`CancellationToken`]; the controller checks it before acting on the tick, so a
//! cancelled run never performs another step.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A cooperative cancellation flag shared by an auto-run and its pending ticks.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Creates a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Flags the token. Every clone observes the cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Checks if the token, or any of its clones, has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Queues delayed ticks for the run controller.
pub trait Scheduler {
    /// Arranges for a tick carrying `token` to become due after `delay`.
    fn schedule_after(&mut self, delay: Duration, token: CancellationToken);

    /// Removes and returns the earliest tick that is due, if any.
    fn next_due(&mut self) -> Option<CancellationToken>;

    /// Drops every pending tick.
    fn clear(&mut self);

    /// Returns the number of ticks still waiting.
    fn pending(&self) -> usize;
}

/// Deadline-ordered queue shared by both scheduler implementations.
#[derive(Debug, Default)]
struct TickQueue {
    ticks: VecDeque<(Duration, CancellationToken)>,
}

impl TickQueue {
    fn push(&mut self, deadline: Duration, token: CancellationToken) {
        let at = self
            .ticks
            .iter()
            .position(|(due, _)| *due > deadline)
            .unwrap_or(self.ticks.len());
        self.ticks.insert(at, (deadline, token));
    }

    fn pop_due(&mut self, now: Duration) -> Option<CancellationToken> {
        match self.ticks.front() {
            Some((due, _)) if *due <= now => self.ticks.pop_front().map(|(_, token)| token),
            _ => None,
        }
    }
}

/// A scheduler driven by the monotonic wall clock.
///
/// It never blocks; the owner's event loop calls [`Scheduler::next_due`] whenever it wakes up.
#[derive(Debug)]
pub struct IntervalScheduler {
    origin: Instant,
    queue: TickQueue,
}

impl Default for IntervalScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl IntervalScheduler {
    /// Creates an empty scheduler whose clock starts now.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            queue: TickQueue::default(),
        }
    }

    /// Returns how long until the earliest pending tick is due, if one is pending.
    pub fn time_until_next(&self) -> Option<Duration> {
        let now = self.origin.elapsed();
        self.queue
            .ticks
            .front()
            .map(|(due, _)| due.saturating_sub(now))
    }
}

impl Scheduler for IntervalScheduler {
    fn schedule_after(&mut self, delay: Duration, token: CancellationToken) {
        let deadline = self.origin.elapsed() + delay;
        self.queue.push(deadline, token);
    }

    fn next_due(&mut self) -> Option<CancellationToken> {
        self.queue.pop_due(self.origin.elapsed())
    }

    fn clear(&mut self) {
        self.queue.ticks.clear();
    }

    fn pending(&self) -> usize {
        self.queue.ticks.len()
    }
}

/// A scheduler on a virtual clock that only moves when [`VirtualScheduler::advance`] is called.
#[derive(Debug, Default)]
pub struct VirtualScheduler {
    now: Duration,
    queue: TickQueue,
}

impl VirtualScheduler {
    /// Creates an empty scheduler with its virtual clock at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the virtual clock forward.
    pub fn advance(&mut self, by: Duration) {
        self.now += by;
    }

    /// Returns the virtual time elapsed since creation.
    pub fn now(&self) -> Duration {
        self.now
    }
}

impl Scheduler for VirtualScheduler {
    fn schedule_after(&mut self, delay: Duration, token: CancellationToken) {
        self.queue.push(self.now + delay, token);
    }

    fn next_due(&mut self) -> Option<CancellationToken> {
        self.queue.pop_due(self.now)
    }

    fn clear(&mut self) {
        self.queue.ticks.clear();
    }

    fn pending(&self) -> usize {
        self.queue.ticks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_cancellation_is_shared() {
        let token = CancellationToken::new();
        let clone = token.clone();

        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn test_virtual_tick_becomes_due_after_delay() {
        let mut scheduler = VirtualScheduler::new();
        scheduler.schedule_after(Duration::from_millis(400), CancellationToken::new());

        scheduler.advance(Duration::from_millis(399));
        assert!(scheduler.next_due().is_none());
        assert_eq!(scheduler.pending(), 1);

        scheduler.advance(Duration::from_millis(1));
        assert!(scheduler.next_due().is_some());
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_ticks_come_out_in_deadline_order() {
        let mut scheduler = VirtualScheduler::new();
        let late = CancellationToken::new();
        let early = CancellationToken::new();
        early.cancel();

        scheduler.schedule_after(Duration::from_millis(20), late);
        scheduler.schedule_after(Duration::from_millis(10), early);
        scheduler.advance(Duration::from_millis(30));

        assert!(scheduler.next_due().unwrap().is_cancelled());
        assert!(!scheduler.next_due().unwrap().is_cancelled());
        assert!(scheduler.next_due().is_none());
    }

    #[test]
    fn test_clear_releases_pending_ticks() {
        let mut scheduler = VirtualScheduler::new();
        scheduler.schedule_after(Duration::ZERO, CancellationToken::new());
        scheduler.clear();

        assert_eq!(scheduler.pending(), 0);
        assert!(scheduler.next_due().is_none());
    }

    #[test]
    fn test_interval_scheduler_zero_delay_is_due() {
        let mut scheduler = IntervalScheduler::new();
        scheduler.schedule_after(Duration::ZERO, CancellationToken::new());

        assert_eq!(scheduler.time_until_next(), Some(Duration::ZERO));
        assert!(scheduler.next_due().is_some());
        assert_eq!(scheduler.time_until_next(), None);
    }
}
