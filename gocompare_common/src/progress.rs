//! Progress signalling from a running comparison to its host.
//!
//! Events are plain snapshots delivered synchronously on the engine's own
//! thread. Hosts that need to reach another thread (a UI, a terminal bar)
//! forward them themselves.

use crate::{RelativePath, Side};
use serde::Serialize;
use std::fmt;

/// Stage of a comparison run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    Enumerating(Side),
    Reconciling,
    Examining,
    Finished,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Enumerating(side) => write!(f, "Scanning {} directory", side),
            Phase::Reconciling => f.write_str("Reconciling file lists"),
            Phase::Examining => f.write_str("Examining"),
            Phase::Finished => f.write_str("Finished"),
        }
    }
}

/// Immutable snapshot of how far a run has got
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressEvent {
    pub processed: usize,
    pub total: usize,
    pub current_path: Option<RelativePath>,
    pub phase: Phase,
}

impl ProgressEvent {
    pub fn phase(phase: Phase) -> Self {
        Self {
            processed: 0,
            total: 0,
            current_path: None,
            phase,
        }
    }

    pub fn examining(processed: usize, total: usize, current_path: RelativePath) -> Self {
        Self {
            processed,
            total,
            current_path: Some(current_path),
            phase: Phase::Examining,
        }
    }

    /// Completion in the range `0.0..=100.0`; phases without a total report 0.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return if self.phase == Phase::Finished { 100.0 } else { 0.0 };
        }
        self.processed as f64 / self.total as f64 * 100.0
    }

    /// Status text for display, e.g. `Examining 3/10: docs/a.txt`
    pub fn message(&self) -> String {
        match (&self.phase, &self.current_path) {
            (Phase::Examining, Some(path)) => {
                format!("Examining {}/{}: {}", self.processed, self.total, path)
            }
            (Phase::Examining, None) => format!("Examining {}/{}", self.processed, self.total),
            (phase, _) => phase.to_string(),
        }
    }
}

/// Receiver of progress events
pub trait ProgressSink {
    fn on_event(&self, event: &ProgressEvent);
}

/// Sink that discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_event(&self, _event: &ProgressEvent) {}
}

impl<F> ProgressSink for F
where
    F: Fn(&ProgressEvent),
{
    fn on_event(&self, event: &ProgressEvent) {
        self(event)
    }
}
