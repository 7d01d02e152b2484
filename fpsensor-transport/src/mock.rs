//! Scripted in-memory transport
//!
//! Feeds queued bytes to [`Transport::read_byte`] and records everything
//! written. An explicit stall, or an empty queue, makes the next read wait
//! out its timeout and fail, which is how tests simulate a module that goes
//! quiet mid-transfer.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use fpsensor_core::Frame;

use crate::{error::*, Transport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Incoming {
    Byte(u8),
    Stall,
}

/// In-memory transport for tests and simulations
#[derive(Debug, Default)]
pub struct MockTransport {
    incoming: VecDeque<Incoming>,
    written: Vec<u8>,
    connected: bool,
    reads: usize,
}

impl MockTransport {
    /// Create an empty, connected mock
    pub fn new() -> Self {
        Self {
            connected: true,
            ..Self::default()
        }
    }

    /// Queue raw bytes for reading
    pub fn push_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.incoming.extend(bytes.iter().copied().map(Incoming::Byte));
        self
    }

    /// Queue an encoded frame for reading
    pub fn push_frame(&mut self, frame: &Frame) -> &mut Self {
        self.push_bytes(&frame.encode())
    }

    /// Make the next pending read time out
    pub fn push_stall(&mut self) -> &mut Self {
        self.incoming.push_back(Incoming::Stall);
        self
    }

    /// Bytes still queued for reading
    pub fn pending(&self) -> usize {
        self.incoming
            .iter()
            .filter(|item| matches!(item, Incoming::Byte(_)))
            .count()
    }

    /// Everything sent so far
    pub fn written(&self) -> &[u8] {
        &self.written
    }

    /// Drain everything sent so far
    pub fn take_written(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.written)
    }

    /// Number of successful byte reads
    pub fn reads(&self) -> usize {
        self.reads
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn connect(&mut self) -> Result<()> {
        if self.connected {
            return Err(Error::AlreadyConnected);
        }
        self.connected = true;
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        self.connected = false;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn send(&mut self, data: &[u8]) -> Result<()> {
        if !self.connected {
            return Err(Error::NotConnected);
        }
        self.written.extend_from_slice(data);
        Ok(())
    }

    async fn read_byte(&mut self, timeout: Duration) -> Result<u8> {
        if !self.connected {
            return Err(Error::NotConnected);
        }

        match self.incoming.pop_front() {
            Some(Incoming::Byte(byte)) => {
                self.reads += 1;
                Ok(byte)
            }
            Some(Incoming::Stall) | None => {
                tokio::time::sleep(timeout).await;
                Err(Error::ReadTimeout)
            }
        }
    }

    fn remote_addr(&self) -> String {
        "mock".to_string()
    }
}
