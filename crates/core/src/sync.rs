//! Debounced, coalescing persistence of the edits document
//!
//! Every mutation re-arms a deferred write on the injected clock, so a burst
//! of edits produces a single write carrying the last state. At most one write
//! is in flight; a write that becomes due while another is running waits for
//! its completion. Each scheduled snapshot carries the file it belongs to;
//! before switching files the caller takes the old file's pending state with
//! [`PersistenceSync::detach`] so it is still written. The whole document is
//! sent every time, so the last write to land wins. Failures are reported,
//! never retried, and never roll back local state.

use crate::EditError;
use doc_model::EditsDocument;
use pdf_studio_scheduler::{Clock, DeferredHandle, DeferredQueue, SystemClock};
use std::sync::Arc;
use std::time::{Duration, Instant};
use storage::{StorageError, WriteTicket};

/// Sync state shown to the user
#[derive(Debug, Clone, PartialEq)]
pub enum SyncStatus {
    /// Everything written
    Idle,

    /// A write is scheduled or waiting for the in-flight one
    Pending,

    /// A write is in flight
    Writing,

    /// The last write failed; cleared by the next successful one
    Failed(EditError),
}

/// Counters for observing coalescing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Mutations that armed the debounce timer
    pub scheduled: u64,

    /// Scheduled states superseded before they were written
    pub coalesced: u64,

    /// Writes handed to the transport
    pub started: u64,

    /// Writes that completed successfully
    pub succeeded: u64,

    /// Writes that failed
    pub failed: u64,
}

/// A document snapshot ready to be written
#[derive(Debug, Clone)]
pub struct WriteRequest {
    pub ticket: WriteTicket,

    /// File the snapshot was scheduled for
    pub file_id: String,
    pub document: Arc<EditsDocument>,
}

#[derive(Debug, Clone)]
struct Scheduled {
    file_id: String,
    document: Arc<EditsDocument>,
}

/// Debounce and single-flight control for document writes
pub struct PersistenceSync<C: Clock = SystemClock> {
    timer: DeferredQueue<(), C>,
    armed: Option<DeferredHandle>,

    /// Latest scheduled snapshot, written when the timer fires
    latest: Option<Scheduled>,

    /// Snapshot whose timer fired while another write was in flight
    ready: Option<Scheduled>,

    in_flight: Option<WriteTicket>,

    /// Writes handed off by `detach` while another was in flight
    detached: Vec<WriteTicket>,
    next_ticket: WriteTicket,
    debounce: Duration,
    last_error: Option<EditError>,
    stats: SyncStats,
}

impl<C: Clock> PersistenceSync<C> {
    /// Create a sync layer writing after `debounce` of inactivity
    pub fn new(clock: C, debounce: Duration) -> Self {
        Self {
            timer: DeferredQueue::new(clock),
            armed: None,
            latest: None,
            ready: None,
            in_flight: None,
            detached: Vec::new(),
            next_ticket: 1,
            debounce,
            last_error: None,
            stats: SyncStats::default(),
        }
    }

    /// Debounce window
    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Schedule `snapshot` of `file_id` to be written once the debounce window
    /// passes
    ///
    /// Any state scheduled earlier and not yet written is superseded, and the
    /// window restarts.
    pub fn schedule(&mut self, file_id: &str, snapshot: Arc<EditsDocument>) {
        if let Some(armed) = self.armed.take() {
            if self.timer.cancel(&armed) {
                self.stats.coalesced += 1;
            }
        }
        if self.ready.take().is_some() {
            self.stats.coalesced += 1;
        }

        self.latest = Some(Scheduled {
            file_id: file_id.to_owned(),
            document: snapshot,
        });
        self.armed = Some(self.timer.schedule(self.debounce, ()));
        self.stats.scheduled += 1;
    }

    /// Collect a write that is due and allowed to start
    ///
    /// Call from the host loop. Returns `None` while the window is still open
    /// or a write is in flight.
    pub fn poll(&mut self) -> Option<WriteRequest> {
        if !self.timer.take_due().is_empty() {
            self.armed = None;
            self.ready = self.latest.take();
        }
        self.start_ready()
    }

    /// Fire the scheduled write now instead of waiting for the window
    ///
    /// Still respects the single in-flight rule; a blocked flush is picked up
    /// by the next `poll` after the running write completes.
    pub fn flush(&mut self) -> Option<WriteRequest> {
        if let Some(armed) = self.armed.take() {
            self.timer.cancel(&armed);
            self.ready = self.latest.take();
        }
        self.start_ready()
    }

    /// Start the pending write now, even while another is in flight
    ///
    /// Used when switching files: the pending state belongs to the file being
    /// left and nothing later can supersede it.
    pub fn detach(&mut self) -> Option<WriteRequest> {
        if let Some(armed) = self.armed.take() {
            self.timer.cancel(&armed);
        }
        let scheduled = self.ready.take().or_else(|| self.latest.take())?;
        self.latest = None;

        let ticket = self.issue_ticket();
        if self.in_flight.is_none() {
            self.in_flight = Some(ticket);
        } else {
            self.detached.push(ticket);
        }
        Some(self.request(ticket, scheduled))
    }

    /// Record the outcome of the write identified by `ticket`
    pub fn complete(&mut self, ticket: WriteTicket, result: Result<(), StorageError>) {
        if self.in_flight == Some(ticket) {
            self.in_flight = None;
        } else if let Some(index) = self.detached.iter().position(|t| *t == ticket) {
            self.detached.swap_remove(index);
        } else {
            tracing::debug!(ticket, "ignoring completion of unknown write");
            return;
        }

        match result {
            Ok(()) => {
                self.stats.succeeded += 1;
                self.last_error = None;
            }
            Err(error) => {
                self.stats.failed += 1;
                tracing::warn!(ticket, %error, "edits write failed; local state kept");
                self.last_error = Some(EditError::PersistenceFailure(error.to_string()));
            }
        }
    }

    /// Forget scheduled state, e.g. when another file is opened
    ///
    /// A write already in flight still completes normally.
    pub fn reset(&mut self) {
        self.timer.clear();
        self.armed = None;
        self.latest = None;
        self.ready = None;
        self.last_error = None;
    }

    pub fn status(&self) -> SyncStatus {
        if self.in_flight.is_some() || !self.detached.is_empty() {
            SyncStatus::Writing
        } else if self.armed.is_some() || self.ready.is_some() {
            SyncStatus::Pending
        } else if let Some(error) = &self.last_error {
            SyncStatus::Failed(error.clone())
        } else {
            SyncStatus::Idle
        }
    }

    /// Check if nothing is scheduled, waiting, or in flight
    pub fn is_settled(&self) -> bool {
        self.armed.is_none()
            && self.ready.is_none()
            && self.in_flight.is_none()
            && self.detached.is_empty()
    }

    /// Ticket of the write in flight
    pub fn in_flight(&self) -> Option<WriteTicket> {
        self.in_flight
    }

    /// When the scheduled write becomes due
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timer.next_deadline()
    }

    pub fn last_error(&self) -> Option<&EditError> {
        self.last_error.as_ref()
    }

    pub fn stats(&self) -> SyncStats {
        self.stats
    }

    fn start_ready(&mut self) -> Option<WriteRequest> {
        if self.in_flight.is_some() {
            return None;
        }
        let scheduled = self.ready.take()?;

        let ticket = self.issue_ticket();
        self.in_flight = Some(ticket);
        Some(self.request(ticket, scheduled))
    }

    fn issue_ticket(&mut self) -> WriteTicket {
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        ticket
    }

    fn request(&mut self, ticket: WriteTicket, scheduled: Scheduled) -> WriteRequest {
        self.stats.started += 1;
        tracing::debug!(
            ticket,
            file_id = %scheduled.file_id,
            items = scheduled.document.item_count(),
            "starting edits write"
        );
        WriteRequest {
            ticket,
            file_id: scheduled.file_id,
            document: scheduled.document,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdf_studio_scheduler::ManualClock;

    const WINDOW: Duration = Duration::from_millis(300);
    const FILE: &str = "doc.pdf";

    fn setup() -> (ManualClock, PersistenceSync<ManualClock>) {
        let clock = ManualClock::new();
        let sync = PersistenceSync::new(clock.clone(), WINDOW);
        (clock, sync)
    }

    fn doc(version: u32) -> Arc<EditsDocument> {
        Arc::new(EditsDocument {
            version,
            ..EditsDocument::default()
        })
    }

    #[test]
    fn test_write_fires_after_quiet_window() {
        let (clock, mut sync) = setup();
        sync.schedule(FILE, doc(1));

        clock.advance(Duration::from_millis(299));
        assert!(sync.poll().is_none());
        assert_eq!(sync.status(), SyncStatus::Pending);

        clock.advance(Duration::from_millis(1));
        let request = sync.poll().expect("write should be due");
        assert_eq!(request.document.version, 1);
        assert_eq!(sync.status(), SyncStatus::Writing);
    }

    #[test]
    fn test_burst_coalesces_to_last_state() {
        let (clock, mut sync) = setup();
        for version in 1..=10 {
            sync.schedule(FILE, doc(version));
            clock.advance(Duration::from_millis(100));
            assert!(sync.poll().is_none());
        }

        clock.advance(WINDOW);
        let request = sync.poll().expect("write should be due");
        assert_eq!(request.document.version, 10);
        assert!(sync.poll().is_none());

        let stats = sync.stats();
        assert_eq!(stats.scheduled, 10);
        assert_eq!(stats.coalesced, 9);
        assert_eq!(stats.started, 1);
    }

    #[test]
    fn test_one_write_in_flight() {
        let (clock, mut sync) = setup();
        sync.schedule(FILE, doc(1));
        clock.advance(WINDOW);
        let first = sync.poll().expect("first write due");

        sync.schedule(FILE, doc(2));
        clock.advance(WINDOW);
        assert!(sync.poll().is_none(), "second write must wait");
        assert_eq!(sync.status(), SyncStatus::Writing);

        sync.complete(first.ticket, Ok(()));
        let second = sync.poll().expect("second write starts after first completes");
        assert_eq!(second.document.version, 2);
    }

    #[test]
    fn test_newer_mutation_supersedes_waiting_write() {
        let (clock, mut sync) = setup();
        sync.schedule(FILE, doc(1));
        clock.advance(WINDOW);
        let first = sync.poll().expect("first write due");

        sync.schedule(FILE, doc(2));
        clock.advance(WINDOW);
        assert!(sync.poll().is_none());
        sync.schedule(FILE, doc(3));

        sync.complete(first.ticket, Ok(()));
        assert!(sync.poll().is_none(), "window restarted by newest mutation");

        clock.advance(WINDOW);
        assert_eq!(sync.poll().map(|r| r.document.version), Some(3));
    }

    #[test]
    fn test_failure_is_reported_not_retried() {
        let (clock, mut sync) = setup();
        sync.schedule(FILE, doc(1));
        clock.advance(WINDOW);
        let request = sync.poll().expect("write due");

        sync.complete(request.ticket, Err(StorageError::Transport("offline".to_owned())));

        assert!(matches!(
            sync.status(),
            SyncStatus::Failed(EditError::PersistenceFailure(_))
        ));
        clock.advance(WINDOW * 10);
        assert!(sync.poll().is_none());
        assert_eq!(sync.stats().failed, 1);
    }

    #[test]
    fn test_success_clears_failure() {
        let (clock, mut sync) = setup();
        sync.schedule(FILE, doc(1));
        clock.advance(WINDOW);
        let first = sync.poll().expect("write due");
        sync.complete(first.ticket, Err(StorageError::Rejected("503".to_owned())));

        sync.schedule(FILE, doc(2));
        clock.advance(WINDOW);
        let second = sync.poll().expect("write due");
        sync.complete(second.ticket, Ok(()));

        assert_eq!(sync.status(), SyncStatus::Idle);
        assert!(sync.is_settled());
    }

    #[test]
    fn test_flush_skips_window() {
        let (_clock, mut sync) = setup();
        sync.schedule(FILE, doc(4));

        let request = sync.flush().expect("flush starts the write");
        assert_eq!(request.document.version, 4);
        assert!(sync.next_deadline().is_none());
    }

    #[test]
    fn test_stale_completion_is_ignored() {
        let (clock, mut sync) = setup();
        sync.schedule(FILE, doc(1));
        clock.advance(WINDOW);
        let request = sync.poll().expect("write due");

        sync.complete(request.ticket + 100, Ok(()));
        assert_eq!(sync.in_flight(), Some(request.ticket));
    }

    #[test]
    fn test_detach_hands_off_pending_state_with_its_file() {
        let (clock, mut sync) = setup();
        sync.schedule("a.pdf", doc(1));

        let request = sync.detach().expect("pending state is handed off");
        assert_eq!(request.file_id, "a.pdf");
        assert_eq!(request.document.version, 1);
        assert!(sync.next_deadline().is_none());

        clock.advance(WINDOW);
        assert!(sync.poll().is_none());
        sync.complete(request.ticket, Ok(()));
        assert!(sync.is_settled());
    }

    #[test]
    fn test_detach_bypasses_in_flight_write() {
        let (clock, mut sync) = setup();
        sync.schedule("a.pdf", doc(1));
        clock.advance(WINDOW);
        let first = sync.poll().expect("first write due");

        sync.schedule("a.pdf", doc(2));
        let detached = sync.detach().expect("pending state is handed off");
        assert_ne!(detached.ticket, first.ticket);
        assert_eq!(detached.document.version, 2);

        sync.complete(first.ticket, Ok(()));
        assert_eq!(sync.status(), SyncStatus::Writing);
        sync.complete(detached.ticket, Ok(()));
        assert!(sync.is_settled());
        assert_eq!(sync.stats().succeeded, 2);
    }
}
