//! Cancel-able deferred tasks
//!
//! A [`DeferredQueue`] holds payloads that become due after a delay measured
//! on an injectable [`Clock`]. Nothing runs on its own: the owner calls
//! [`DeferredQueue::take_due`] from its event loop and acts on what comes back.
//! This keeps timer-driven behavior deterministic under a [`ManualClock`].
//!
//! [`ManualClock`]: crate::ManualClock

use crate::{CancellationToken, Clock, SystemClock};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Unique identifier for a deferred task
pub type TaskId = u64;

/// Handle returned by [`DeferredQueue::schedule`]
///
/// Cancelling the handle (or any clone) keeps the task from ever being
/// returned by `take_due`.
#[derive(Debug, Clone)]
pub struct DeferredHandle {
    id: TaskId,
    deadline: Instant,
    token: CancellationToken,
}

impl DeferredHandle {
    /// Task identifier
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Instant at which the task becomes due
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Cancel the task
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Check if the task was cancelled
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

struct Entry<T> {
    id: TaskId,
    deadline: Instant,
    token: CancellationToken,
    payload: T,
}

/// Deadline-ordered queue of deferred payloads
///
/// Tasks with the same deadline come out in scheduling order.
///
/// # Example
///
/// ```
/// use pdf_studio_scheduler::{DeferredQueue, ManualClock};
/// use std::time::Duration;
///
/// let clock = ManualClock::new();
/// let mut queue = DeferredQueue::new(clock.clone());
///
/// let stale = queue.schedule(Duration::from_millis(300), "first");
/// queue.cancel(&stale);
/// queue.schedule(Duration::from_millis(300), "second");
///
/// clock.advance(Duration::from_millis(299));
/// assert!(queue.take_due().is_empty());
///
/// clock.advance(Duration::from_millis(1));
/// assert_eq!(queue.take_due(), vec!["second"]);
/// ```
pub struct DeferredQueue<T, C: Clock = SystemClock> {
    clock: C,
    entries: VecDeque<Entry<T>>,
    next_id: TaskId,
}

impl<T, C: Clock> DeferredQueue<T, C> {
    /// Create an empty queue timed by `clock`
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            entries: VecDeque::new(),
            next_id: 1,
        }
    }

    /// Clock this queue measures deadlines with
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Schedule `payload` to become due after `delay`
    pub fn schedule(&mut self, delay: Duration, payload: T) -> DeferredHandle {
        let id = self.next_id;
        self.next_id += 1;

        let deadline = self.clock.now() + delay;
        let token = CancellationToken::new();
        let position = self.entries.partition_point(|entry| entry.deadline <= deadline);

        self.entries.insert(
            position,
            Entry {
                id,
                deadline,
                token: token.clone(),
                payload,
            },
        );

        DeferredHandle { id, deadline, token }
    }

    /// Cancel a task and drop its payload
    ///
    /// Returns `true` if the task was still queued.
    pub fn cancel(&mut self, handle: &DeferredHandle) -> bool {
        handle.cancel();

        match self.entries.iter().position(|entry| entry.id == handle.id) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Remove every task and return how many were still live
    pub fn clear(&mut self) -> usize {
        let live = self.len();
        for entry in self.entries.drain(..) {
            entry.token.cancel();
        }
        live
    }

    /// Remove and return the payloads of all tasks whose deadline has passed
    ///
    /// Payloads are returned in deadline order. Cancelled tasks are dropped.
    pub fn take_due(&mut self) -> Vec<T> {
        let now = self.clock.now();
        let mut due = Vec::new();

        while self.entries.front().is_some_and(|entry| entry.deadline <= now) {
            if let Some(entry) = self.entries.pop_front() {
                if !entry.token.is_cancelled() {
                    due.push(entry.payload);
                }
            }
        }

        due
    }

    /// Earliest deadline among live tasks
    pub fn next_deadline(&self) -> Option<Instant> {
        self.live().map(|entry| entry.deadline).next()
    }

    /// Time until the next live task is due, zero if one is overdue
    pub fn time_until_next(&self) -> Option<Duration> {
        let now = self.clock.now();
        self.next_deadline()
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Number of live (not cancelled) tasks
    pub fn len(&self) -> usize {
        self.live().count()
    }

    /// Check if no live task is queued
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn live(&self) -> impl Iterator<Item = &Entry<T>> {
        self.entries
            .iter()
            .filter(|entry| !entry.token.is_cancelled())
    }
}

impl<T> Default for DeferredQueue<T, SystemClock> {
    fn default() -> Self {
        Self::new(SystemClock)
    }
}
