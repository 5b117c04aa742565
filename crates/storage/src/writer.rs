use crate::{EditsBackend, StorageError};
use doc_model::EditsDocument;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Correlates a submitted write with its outcome.
pub type WriteTicket = u64;

#[derive(Debug, Clone)]
pub struct WriteJob {
    pub ticket: WriteTicket,
    pub file_id: String,
    pub document: Arc<EditsDocument>,
}

#[derive(Debug)]
pub struct WriteOutcome {
    pub ticket: WriteTicket,
    pub result: Result<(), StorageError>,
}

/// Dedicated thread that performs backend writes off the interaction thread.
///
/// Jobs are executed one at a time in submission order. Outcomes are queued
/// for the owner to drain with [`WriteWorker::try_outcome`] or
/// [`WriteWorker::wait_outcome`].
pub struct WriteWorker {
    jobs: Option<Sender<WriteJob>>,
    outcomes: Receiver<WriteOutcome>,
    thread: Option<JoinHandle<()>>,
}

impl WriteWorker {
    pub fn spawn<B>(backend: B) -> Result<Self, StorageError>
    where
        B: EditsBackend + 'static,
    {
        let (job_tx, job_rx) = mpsc::channel::<WriteJob>();
        let (outcome_tx, outcome_rx) = mpsc::channel();

        let thread = thread::Builder::new().name("edits-writer".to_owned()).spawn(move || {
            for job in job_rx {
                let result = backend.save(&job.file_id, &job.document);
                if let Err(error) = &result {
                    tracing::warn!(
                        ticket = job.ticket,
                        file_id = %job.file_id,
                        %error,
                        "edits write failed"
                    );
                }
                if outcome_tx.send(WriteOutcome { ticket: job.ticket, result }).is_err() {
                    break;
                }
            }
        })?;

        Ok(Self { jobs: Some(job_tx), outcomes: outcome_rx, thread: Some(thread) })
    }

    pub fn submit(&self, job: WriteJob) -> Result<(), StorageError> {
        let sender = self.jobs.as_ref().ok_or(StorageError::WorkerStopped)?;
        sender.send(job).map_err(|_| StorageError::WorkerStopped)
    }

    pub fn try_outcome(&self) -> Option<WriteOutcome> {
        self.outcomes.try_recv().ok()
    }

    pub fn wait_outcome(&self, timeout: Duration) -> Option<WriteOutcome> {
        self.outcomes.recv_timeout(timeout).ok()
    }

    /// Finish queued jobs and join the thread.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.jobs.take();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::error!("edits writer thread panicked");
            }
        }
    }
}

impl Drop for WriteWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryBackend;

    const WAIT: Duration = Duration::from_secs(5);

    fn job(ticket: WriteTicket) -> WriteJob {
        WriteJob {
            ticket,
            file_id: "doc.pdf".to_owned(),
            document: Arc::new(EditsDocument::default()),
        }
    }

    #[test]
    fn jobs_complete_in_submission_order() {
        let backend = MemoryBackend::new();
        let worker = WriteWorker::spawn(backend.clone()).expect("worker should spawn");

        worker.submit(job(1)).expect("submit should succeed");
        worker.submit(job(2)).expect("submit should succeed");

        let first = worker.wait_outcome(WAIT).expect("first outcome should arrive");
        let second = worker.wait_outcome(WAIT).expect("second outcome should arrive");
        assert_eq!((first.ticket, second.ticket), (1, 2));
        assert!(first.result.is_ok() && second.result.is_ok());

        worker.shutdown();
        assert_eq!(backend.saves().len(), 2);
    }

    #[test]
    fn failures_are_reported_not_retried() {
        let backend = MemoryBackend::new();
        backend.fail_next_saves(1);
        let worker = WriteWorker::spawn(backend.clone()).expect("worker should spawn");

        worker.submit(job(7)).expect("submit should succeed");
        let outcome = worker.wait_outcome(WAIT).expect("outcome should arrive");

        assert_eq!(outcome.ticket, 7);
        assert!(outcome.result.is_err());
        assert!(worker.try_outcome().is_none());
        assert_eq!(backend.saves().len(), 1);
    }

    #[test]
    fn shutdown_drains_queued_jobs() {
        let backend = MemoryBackend::new();
        let worker = WriteWorker::spawn(backend.clone()).expect("worker should spawn");
        for ticket in 0..5 {
            worker.submit(job(ticket)).expect("submit should succeed");
        }

        worker.shutdown();
        assert_eq!(backend.saves().len(), 5);
    }
}
