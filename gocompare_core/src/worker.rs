use crate::comparison::ComparisonEngine;
use crate::report::summary_line;
use crossbeam::channel::{self, Receiver, Sender};
use gocompare_common::{ComparisonResult, GoCompareError, ProgressEvent};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error};

/// Messages sent from a background comparison to its host
#[derive(Debug)]
pub enum WorkerMessage {
    Progress(ProgressEvent),
    Status(String),
    Finished(Result<ComparisonResult, GoCompareError>),
}

/// A comparison running on its own thread.
///
/// The host polls [`receiver`](Self::receiver) for progress and the final
/// result, and may request a stop with [`cancel`](Self::cancel).
pub struct ComparisonWorker {
    receiver: Receiver<WorkerMessage>,
    cancel: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ComparisonWorker {
    pub fn spawn(engine: ComparisonEngine, source: PathBuf, target: PathBuf) -> Self {
        Self::start(channel::unbounded(), move |sender, cancel| {
            run_worker(&engine, &source, &target, sender, cancel)
        })
    }

    /// Like [`spawn`](Self::spawn), but the worker waits once `capacity`
    /// messages are queued, so it never runs ahead of a slow host. A
    /// capacity of 0 hands over every message directly.
    pub fn spawn_with_capacity(
        engine: ComparisonEngine,
        source: PathBuf,
        target: PathBuf,
        capacity: usize,
    ) -> Self {
        Self::start(channel::bounded(capacity), move |sender, cancel| {
            run_worker(&engine, &source, &target, sender, cancel)
        })
    }

    fn start<F>(
        (sender, receiver): (Sender<WorkerMessage>, Receiver<WorkerMessage>),
        job: F,
    ) -> Self
    where
        F: FnOnce(&Sender<WorkerMessage>, &AtomicBool) + Send + 'static,
    {
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancel);

        let handle = thread::spawn(move || job(&sender, &flag));

        Self {
            receiver,
            cancel,
            handle: Some(handle),
        }
    }

    pub fn receiver(&self) -> &Receiver<WorkerMessage> {
        &self.receiver
    }

    /// Ask the running comparison to stop at the next file boundary
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    /// Drain messages until the comparison finishes and return its result
    pub fn wait(mut self) -> Result<ComparisonResult, GoCompareError> {
        let mut outcome = None;
        for message in self.receiver.iter() {
            if let WorkerMessage::Finished(result) = message {
                outcome = Some(result);
                break;
            }
        }
        self.join()?;
        outcome.unwrap_or(Err(GoCompareError::Cancelled))
    }

    fn join(&mut self) -> Result<(), GoCompareError> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };
        // Keep receiving so a worker blocked on a full channel can finish
        while !handle.is_finished() {
            let _ = self.receiver.recv_timeout(Duration::from_millis(10));
        }
        handle.join().map_err(|_| GoCompareError::WorkerPanicked)
    }
}

impl Drop for ComparisonWorker {
    fn drop(&mut self) {
        self.cancel();
        if let Err(e) = self.join() {
            error!("{}", e);
        }
    }
}

fn run_worker(
    engine: &ComparisonEngine,
    source: &Path,
    target: &Path,
    sender: &Sender<WorkerMessage>,
    cancel: &AtomicBool,
) {
    let sink = |event: &ProgressEvent| {
        let _ = sender.send(WorkerMessage::Status(event.message()));
        let _ = sender.send(WorkerMessage::Progress(event.clone()));
    };

    let result = engine.run_with_cancel(source, target, Some(&sink), Some(cancel));

    let status = match &result {
        Ok(result) => summary_line(result),
        Err(GoCompareError::Cancelled) => "Comparison stopped".to_string(),
        Err(e) => format!("Comparison failed: {}", e),
    };
    debug!("Worker done: {}", status);

    let _ = sender.send(WorkerMessage::Status(status));
    let _ = sender.send(WorkerMessage::Finished(result));
}
