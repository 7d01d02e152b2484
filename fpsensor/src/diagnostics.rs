//! Protocol diagnostics
//!
//! Orchestrators report what happened on the wire and at the finger through a
//! [`DiagnosticSink`]. The default sink forwards to `tracing`; tests collect
//! events with [`MemorySink`].

use fpsensor_core::{ConfirmationCode, PacketType};
use fpsensor_types::MatchScore;
use parking_lot::Mutex;
use tracing::{debug, info, trace, warn};

use crate::error::Stage;
use crate::session::Operation;

/// Something worth recording during an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    FrameSent {
        packet_type: PacketType,
        len: usize,
    },
    FrameReceived {
        packet_type: PacketType,
        len: usize,
    },

    /// Accepted under the lenient checksum policy
    ChecksumMismatch {
        expected: u16,
        received: Option<u16>,
    },
    FingerDetected {
        stage: Stage,
        polls: u32,
    },
    FingerRemoved {
        polls: u32,
    },

    /// Removal polling gave up with the finger still on the sensor
    FingerLingering {
        polls: u32,
    },

    /// Removal polling stopped because the module did not answer
    RemovalUnanswered {
        polls: u32,
    },
    QualityRejected {
        code: ConfirmationCode,
        attempt: u32,
    },

    /// Download ended short and was zero-filled
    TemplatePadded {
        received: usize,
    },
    UploadChunk {
        index: usize,
        len: usize,
        last: bool,
    },
    ModelCreated,
    MatchRetry {
        code: ConfirmationCode,
    },
    MatchFound {
        score: MatchScore,
        retried: bool,
    },
    MatchRejected {
        code: ConfirmationCode,
    },
    Phase {
        operation: Operation,
        stage: Stage,
    },
}

/// Receiver for protocol events
#[cfg_attr(test, mockall::automock)]
pub trait DiagnosticSink: Send + Sync {
    fn record(&self, event: &Event);
}

/// Forwards events to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&self, event: &Event) {
        match event {
            Event::FrameSent { packet_type, len } => trace!("-> {} ({} bytes)", packet_type, len),
            Event::FrameReceived { packet_type, len } => {
                trace!("<- {} ({} bytes)", packet_type, len)
            }
            Event::ChecksumMismatch { expected, received } => match received {
                Some(received) => warn!(
                    "Checksum mismatch: expected 0x{:04X}, received 0x{:04X}",
                    expected, received
                ),
                None => warn!("Checksum missing: expected 0x{:04X}", expected),
            },
            Event::FingerDetected { stage, polls } => {
                debug!("Finger detected for {} after {} polls", stage, polls)
            }
            Event::FingerRemoved { polls } => debug!("Finger removed after {} polls", polls),
            Event::FingerLingering { polls } => {
                warn!("Finger still present after {} removal polls", polls)
            }
            Event::RemovalUnanswered { polls } => {
                warn!("Module silent on removal poll {}, not waiting further", polls)
            }
            Event::QualityRejected { code, attempt } => {
                info!("Image rejected ({}), attempt {}", code, attempt)
            }
            Event::TemplatePadded { received } => {
                warn!("Template truncated at {} bytes, zero-filled", received)
            }
            Event::UploadChunk { index, len, last } => {
                trace!("Upload chunk {} ({} bytes, last: {})", index, len, last)
            }
            Event::ModelCreated => info!("Model created"),
            Event::MatchRetry { code } => info!("Match failed ({}), retrying once", code),
            Event::MatchFound { score, retried } => {
                info!("Match found, score {} (retried: {})", score, retried)
            }
            Event::MatchRejected { code } => info!("No match ({})", code),
            Event::Phase { operation, stage } => debug!("{}: {}", operation, stage),
        }
    }
}

/// Collects events in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<Event>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every recorded event
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    /// Drain the recorded events
    pub fn take(&self) -> Vec<Event> {
        std::mem::take(&mut *self.events.lock())
    }

    /// Count events matching a predicate
    pub fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.events.lock().iter().filter(|e| pred(e)).count()
    }

    pub fn contains(&self, event: &Event) -> bool {
        self.events.lock().contains(event)
    }
}

impl DiagnosticSink for MemorySink {
    fn record(&self, event: &Event) {
        self.events.lock().push(event.clone());
    }
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn record(&self, _event: &Event) {}
}
