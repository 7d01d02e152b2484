//! Transport layer for the fingerprint module protocol
//!
//! The module speaks a byte stream with no framing guarantees, so the only
//! read primitive is a single byte with a timeout. [`FrameCodec`] builds
//! frames out of those reads.

pub mod codec;
pub mod error;
pub mod mock;
pub mod stream;
pub mod tcp;

pub use codec::{FrameCodec, ReadTimeouts, Received};
pub use error::{Error, Result};
pub use mock::MockTransport;
pub use stream::StreamTransport;
pub use tcp::TcpTransport;

use std::time::Duration;

use async_trait::async_trait;

/// Transport trait for different communication methods
#[async_trait]
pub trait Transport: Send {
    /// Connect to device
    async fn connect(&mut self) -> Result<()>;

    /// Disconnect from device
    async fn disconnect(&mut self) -> Result<()>;

    /// Check if connected
    fn is_connected(&self) -> bool;

    /// Send raw bytes
    async fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Read exactly one byte
    ///
    /// Returns [`Error::ReadTimeout`] if nothing arrives within `timeout`.
    /// A timeout never consumes a byte and nothing is buffered between calls.
    async fn read_byte(&mut self, timeout: Duration) -> Result<u8>;

    /// Get remote address
    fn remote_addr(&self) -> String;
}
