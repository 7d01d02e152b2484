//! # fpsensor
//!
//! Async driver for R30x / AS608 optical fingerprint modules.
//!
//! ## Features
//!
//! - Streaming frame codec with per-byte timeouts
//! - Template download with zero-fill recovery, chunked upload
//! - Enrollment, verification and capture-and-hash orchestration
//! - SHA-256 template digests
//! - Scripted simulated module for tests
//!
//! ## Quick Start
//!
//! ```no_run
//! use fpsensor::{Scanner, Sensor};
//!
//! #[tokio::main]
//! async fn main() -> fpsensor::Result<()> {
//!     // Module behind a serial-to-TCP bridge
//!     let mut sensor = Sensor::tcp("192.168.1.50", 2000);
//!     sensor.connect().await?;
//!
//!     let scanner = Scanner::new(sensor);
//!     println!("{}", scanner.probe().await?);
//!
//!     let hashed = scanner.read_and_hash().await?;
//!     println!("Template digest: {}", hashed.digest);
//!
//!     Ok(())
//! }
//! ```
//!
//! Dropping an operation's future mid-way leaves the module part-way through
//! a command sequence; reconnect before issuing further commands.

pub mod capture;
pub mod config;
pub mod device;
pub mod diagnostics;
pub mod enroll;
pub mod error;
pub mod identity;
pub mod scanner;
pub mod sensor;
pub mod session;
pub mod sim;
pub mod transfer;
pub mod verify;

// Re-exports
pub use config::{CapturePolicy, ScannerConfig, TransferConfig};
pub use device::FingerSensorDevice;
pub use diagnostics::{DiagnosticSink, Event, MemorySink, NullSink, TracingSink};
pub use error::{Error, Result, Stage};
pub use identity::{compute_digest, digests_equal, HashedTemplate};
pub use scanner::Scanner;
pub use sensor::Sensor;
pub use sim::SimulatedSensor;
pub use transfer::Downloaded;
pub use verify::Verification;

// Re-export protocol and data types
pub use fpsensor_core::{ChecksumPolicy, ConfirmationCode, Instruction};
pub use fpsensor_transport::{ReadTimeouts, StreamTransport, TcpTransport, Transport};
pub use fpsensor_types::{Digest, MatchScore, SensorInfo, Slot, SystemParameters, Template};
