//! Per-operation session state
//!
//! A session lives for exactly one orchestrator call. It tracks which stage
//! the operation is in and how many attempts it has made, and reports stage
//! changes to the diagnostic sink. Nothing survives between calls.

use std::fmt;
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::diagnostics::{DiagnosticSink, Event};
use crate::error::{Result, Stage};

/// Kind of orchestrated operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Probe,
    Enroll,
    Verify,
    CaptureAndHash,
    Download,
    Upload,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Probe => "probe",
            Self::Enroll => "enroll",
            Self::Verify => "verify",
            Self::CaptureAndHash => "capture-and-hash",
            Self::Download => "download",
            Self::Upload => "upload",
        };
        f.write_str(name)
    }
}

/// Transient state of one operation
pub struct Session<'a> {
    operation: Operation,
    stage: Option<Stage>,
    attempts: u32,
    started: Instant,
    sink: &'a dyn DiagnosticSink,
}

impl<'a> Session<'a> {
    pub fn new(operation: Operation, sink: &'a dyn DiagnosticSink) -> Self {
        debug!("Starting {}", operation);
        Self {
            operation,
            stage: None,
            attempts: 0,
            started: Instant::now(),
            sink,
        }
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// Current stage, `None` before the first [`Session::advance`]
    pub fn stage(&self) -> Option<Stage> {
        self.stage
    }

    /// Enter a new stage
    pub fn advance(&mut self, stage: Stage) {
        self.stage = Some(stage);
        self.sink.record(&Event::Phase {
            operation: self.operation,
            stage,
        });
    }

    /// Count one more attempt and return the new total
    pub fn attempt(&mut self) -> u32 {
        self.attempts += 1;
        self.attempts
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn sink(&self) -> &'a dyn DiagnosticSink {
        self.sink
    }

    /// Log the outcome and end the session
    pub fn finish<T>(self, result: &Result<T>) {
        match result {
            Ok(_) => debug!(
                "{} finished in {:?} ({} attempts)",
                self.operation,
                self.elapsed(),
                self.attempts
            ),
            Err(e) => debug!(
                "{} failed at {:?} after {:?}: {}",
                self.operation,
                self.stage,
                self.elapsed(),
                e
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::MemorySink;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_session_records_phases() {
        let sink = MemorySink::new();
        let mut session = Session::new(Operation::Enroll, &sink);

        assert_eq!(session.stage(), None);
        session.advance(Stage::FirstScan);
        session.advance(Stage::SecondScan);

        assert_eq!(session.stage(), Some(Stage::SecondScan));
        assert_eq!(
            sink.events(),
            vec![
                Event::Phase {
                    operation: Operation::Enroll,
                    stage: Stage::FirstScan
                },
                Event::Phase {
                    operation: Operation::Enroll,
                    stage: Stage::SecondScan
                },
            ]
        );
    }

    #[test]
    fn test_session_attempts() {
        let sink = MemorySink::new();
        let mut session = Session::new(Operation::Verify, &sink);

        assert_eq!(session.attempt(), 1);
        assert_eq!(session.attempt(), 2);
        assert_eq!(session.attempts(), 2);
        session.finish::<()>(&Ok(()));
    }
}
