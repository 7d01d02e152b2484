//! Transport over any async byte stream
//!
//! Serial port crates for tokio hand out a stream implementing
//! `AsyncRead + AsyncWrite`; wrap it here to talk to the module.

use std::io::ErrorKind;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;
use tracing::{debug, trace};

use crate::{error::*, Transport};

/// Byte-stream transport (UART, USB-serial, pipes)
pub struct StreamTransport<S> {
    stream: S,
    name: String,
    open: bool,
}

impl<S> StreamTransport<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Wrap an already opened stream
    pub fn new(stream: S, name: impl Into<String>) -> Self {
        Self {
            stream,
            name: name.into(),
            open: true,
        }
    }

    /// Unwrap the underlying stream
    pub fn into_inner(self) -> S {
        self.stream
    }
}

#[async_trait]
impl<S> Transport for StreamTransport<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn connect(&mut self) -> Result<()> {
        // The stream is opened by the caller; connecting only re-arms it
        self.open = true;
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        if self.open {
            debug!("Closing stream {}...", self.name);
            let _ = self.stream.shutdown().await;
            self.open = false;
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.open
    }

    async fn send(&mut self, data: &[u8]) -> Result<()> {
        if !self.open {
            return Err(Error::NotConnected);
        }

        trace!("Sending {} bytes: {:02X?}", data.len(), &data[..data.len().min(16)]);

        self.stream.write_all(data).await?;
        self.stream.flush().await?;

        Ok(())
    }

    async fn read_byte(&mut self, wait: Duration) -> Result<u8> {
        if !self.open {
            return Err(Error::NotConnected);
        }

        match timeout(wait, self.stream.read_u8()).await {
            Err(_) => Err(Error::ReadTimeout),
            Ok(Ok(byte)) => Ok(byte),
            Ok(Err(e)) if e.kind() == ErrorKind::UnexpectedEof => Err(Error::ConnectionClosed),
            Ok(Err(e)) => Err(Error::Io(e)),
        }
    }

    fn remote_addr(&self) -> String {
        self.name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_stream_read_byte() {
        let (local, mut remote) = tokio::io::duplex(64);
        let mut transport = StreamTransport::new(local, "duplex");

        remote.write_all(&[0xEF, 0x01]).await.unwrap();

        let wait = Duration::from_millis(100);
        assert_eq!(transport.read_byte(wait).await.unwrap(), 0xEF);
        assert_eq!(transport.read_byte(wait).await.unwrap(), 0x01);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stream_read_timeout() {
        let (local, _remote) = tokio::io::duplex(64);
        let mut transport = StreamTransport::new(local, "duplex");

        let result = transport.read_byte(Duration::from_millis(100)).await;
        assert!(matches!(result, Err(Error::ReadTimeout)));
    }

    #[tokio::test]
    async fn test_stream_closed_remote() {
        let (local, remote) = tokio::io::duplex(64);
        let mut transport = StreamTransport::new(local, "duplex");
        drop(remote);

        let result = transport.read_byte(Duration::from_millis(100)).await;
        assert!(matches!(result, Err(Error::ConnectionClosed)));
    }

    #[tokio::test]
    async fn test_stream_send() {
        let (local, mut remote) = tokio::io::duplex(64);
        let mut transport = StreamTransport::new(local, "duplex");

        transport.send(&[1, 2, 3]).await.unwrap();

        let mut buf = [0u8; 3];
        remote.read_exact(&mut buf).await.unwrap();
        assert_eq!(buf, [1, 2, 3]);
    }

    #[tokio::test]
    async fn test_stream_disconnect() {
        let (local, _remote) = tokio::io::duplex(64);
        let mut transport = StreamTransport::new(local, "duplex");

        transport.disconnect().await.unwrap();

        assert!(!transport.is_connected());
        assert!(matches!(transport.send(&[0]).await, Err(Error::NotConnected)));
    }
}
