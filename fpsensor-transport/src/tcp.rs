//! TCP transport for serial bridges
//!
//! Reaches a module wired to a serial-to-network bridge (ser2net, ESP-Link
//! and similar) that forwards raw UART bytes over a TCP socket. Once the
//! socket is open, byte I/O is delegated to [`StreamTransport`].

use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::{lookup_host, TcpStream};
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::{error::*, StreamTransport, Transport};

/// Default time allowed for the TCP handshake with the bridge
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// TCP transport to a serial bridge
pub struct TcpTransport {
    host: String,
    port: u16,
    resolved: Option<SocketAddr>,
    link: Option<StreamTransport<TcpStream>>,
    connect_timeout: Duration,
}

impl TcpTransport {
    /// Create a transport for `host:port`; nothing is opened until `connect`
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            resolved: None,
            link: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Set the bridge handshake timeout
    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    fn target(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    async fn socket_addr(&mut self) -> Result<SocketAddr> {
        if let Some(resolved) = self.resolved {
            return Ok(resolved);
        }

        let target = self.target();
        let mut candidates = lookup_host(target.as_str())
            .await
            .map_err(|e| Error::InvalidAddress(format!("{}: {}", target, e)))?;

        let resolved = candidates
            .next()
            .ok_or_else(|| Error::InvalidAddress(format!("{} did not resolve", target)))?;

        self.resolved = Some(resolved);
        Ok(resolved)
    }

    fn link(&mut self) -> Result<&mut StreamTransport<TcpStream>> {
        self.link.as_mut().ok_or(Error::NotConnected)
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn connect(&mut self) -> Result<()> {
        if self.link.is_some() {
            return Err(Error::AlreadyConnected);
        }

        let addr = self.socket_addr().await?;
        debug!("Opening serial bridge {}", addr);

        let socket = match timeout(self.connect_timeout, TcpStream::connect(addr)).await {
            Ok(socket) => socket?,
            Err(_) => return Err(Error::ConnectionTimeout),
        };

        // Command frames are a dozen bytes; send them without coalescing
        socket.set_nodelay(true)?;

        self.link = Some(StreamTransport::new(socket, addr.to_string()));
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        if let Some(mut link) = self.link.take() {
            debug!("Closing serial bridge {}", self.target());
            link.disconnect().await?;
        }

        self.resolved = None;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.link.as_ref().is_some_and(|link| link.is_connected())
    }

    async fn send(&mut self, data: &[u8]) -> Result<()> {
        self.link()?.send(data).await
    }

    async fn read_byte(&mut self, wait: Duration) -> Result<u8> {
        let result = self.link()?.read_byte(wait).await;

        if matches!(result, Err(Error::ConnectionClosed)) {
            warn!("Serial bridge {} hung up", self.target());
            self.link = None;
        }
        result
    }

    fn remote_addr(&self) -> String {
        match self.resolved {
            Some(addr) => addr.to_string(),
            None => self.target(),
        }
    }
}

impl Drop for TcpTransport {
    fn drop(&mut self) {
        if self.link.is_some() {
            warn!("Serial bridge {} dropped without disconnect", self.target());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[test]
    fn test_new_is_idle() {
        let transport = TcpTransport::new("192.168.1.50", 2000);

        assert!(!transport.is_connected());
        assert_eq!(transport.remote_addr(), "192.168.1.50:2000");
    }

    #[tokio::test]
    async fn test_unresolvable_host() {
        let mut transport = TcpTransport::new("invalid..address", 2000)
            .with_connect_timeout(Duration::from_millis(100));

        assert!(transport.connect().await.is_err());
        assert!(!transport.is_connected());
    }

    #[tokio::test]
    async fn test_io_before_connect() {
        let mut transport = TcpTransport::new("127.0.0.1", 2000);

        let read = transport.read_byte(Duration::from_millis(10)).await;
        assert!(matches!(read, Err(Error::NotConnected)));
        assert!(matches!(transport.send(&[0]).await, Err(Error::NotConnected)));
    }

    #[tokio::test]
    async fn test_bridge_round_trip() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let bridge = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 2];
            socket.read_exact(&mut buf).await.unwrap();
            socket.write_all(&[buf[0] ^ 0xFF]).await.unwrap();
        });

        let mut transport = TcpTransport::new("127.0.0.1", port);
        transport.connect().await.unwrap();
        assert!(matches!(transport.connect().await, Err(Error::AlreadyConnected)));

        transport.send(&[0x0F, 0x00]).await.unwrap();
        assert_eq!(transport.read_byte(Duration::from_secs(1)).await.unwrap(), 0xF0);

        bridge.await.unwrap();

        // the bridge task has dropped its socket
        let closed = transport.read_byte(Duration::from_secs(1)).await;
        assert!(matches!(closed, Err(Error::ConnectionClosed)));
        assert!(!transport.is_connected());
    }
}
