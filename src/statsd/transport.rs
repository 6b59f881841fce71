use std::cell::OnceCell;
use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, ToSocketAddrs, UdpSocket};

/// A datagram sink owned by a single thread.
///
/// The destination is passed on every send, so host or port changes made on
/// the client take effect without replacing the transport.
pub trait Transport {
    /// Sends `payload` as one datagram to `host:port`.
    ///
    /// # Errors
    /// Returns the underlying I/O error when the destination cannot be
    /// resolved or the datagram cannot be written.
    fn send_to(&self, payload: &[u8], host: &str, port: u16) -> io::Result<usize>;
}

/// Creates the per-thread transports of a client.
///
/// This is the socket acquisition point. Tests replace it to capture
/// datagrams in memory.
pub trait TransportFactory: Send + Sync {
    /// Builds a fresh transport for the calling thread.
    ///
    /// # Errors
    /// Returns an I/O error when the transport cannot be created. The client
    /// does not cache failures and retries on the next send.
    fn create(&self) -> io::Result<Box<dyn Transport + Send>>;
}

/// Factory for [`UdpTransport`], the default transport of a client.
#[derive(Debug, Default, Clone, Copy)]
pub struct UdpTransportFactory;

impl TransportFactory for UdpTransportFactory {
    fn create(&self) -> io::Result<Box<dyn Transport + Send>> {
        Ok(Box::new(UdpTransport::default()))
    }
}

/// UDP transport that resolves the destination on each send.
///
/// One socket per address family is bound lazily on an unspecified local
/// address, so the same transport reaches both IPv4 and IPv6 collectors.
#[derive(Debug, Default)]
pub struct UdpTransport {
    v4: OnceCell<UdpSocket>,
    v6: OnceCell<UdpSocket>,
}

impl UdpTransport {
    fn socket_for(&self, destination: &SocketAddr) -> io::Result<&UdpSocket> {
        let (cell, bind_addr) = match destination {
            SocketAddr::V4(_) => (&self.v4, SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))),
            SocketAddr::V6(_) => (&self.v6, SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0))),
        };
        if let Some(sock) = cell.get() {
            return Ok(sock);
        }
        let sock = UdpSocket::bind(bind_addr)?;
        Ok(cell.get_or_init(|| sock))
    }
}

impl Transport for UdpTransport {
    fn send_to(&self, payload: &[u8], host: &str, port: u16) -> io::Result<usize> {
        let destination = (host, port).to_socket_addrs()?.next().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                format!("{host}:{port} did not resolve to any address"),
            )
        })?;
        self.socket_for(&destination)?.send_to(payload, destination)
    }
}
