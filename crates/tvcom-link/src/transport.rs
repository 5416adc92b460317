//! Transport endpoints: where frames are written and replies are read.
//!
//! Two real endpoints exist, a local serial device and a TCP serial
//! bridge, plus the mock endpoint in [`crate::mock`] for tests. All of
//! them are plain blocking streams with a per-read time window; deadline
//! bookkeeping lives in the link manager, not here.

use std::fmt;
use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LinkError, LinkResult};

/// Default baud rate for serial peers.
pub const DEFAULT_BAUD: u32 = 9600;

/// Address of a peer the link can dial.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeerAddress {
    /// A local serial device.
    Serial {
        path: String,
        #[serde(default = "default_baud")]
        baud: u32,
    },
    /// A TCP bridge in front of the serial line.
    Tcp { host: String, port: u16 },
}

fn default_baud() -> u32 {
    DEFAULT_BAUD
}

impl PeerAddress {
    /// A serial peer.
    pub fn serial(path: impl Into<String>, baud: u32) -> Self {
        PeerAddress::Serial {
            path: path.into(),
            baud,
        }
    }

    /// A TCP peer.
    pub fn tcp(host: impl Into<String>, port: u16) -> Self {
        PeerAddress::Tcp {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for PeerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeerAddress::Serial { path, baud } => write!(f, "{path}@{baud}"),
            PeerAddress::Tcp { host, port } => write!(f, "{host}:{port}"),
        }
    }
}

/// A blocking byte stream with a per-read time window.
///
/// `recv` returns `Ok(0)` when the peer closed the stream; a window that
/// elapses without data surfaces as an I/O error of kind `TimedOut` or
/// `WouldBlock`, which the link manager classifies against its deadline.
pub trait Transport: Send {
    /// Write the whole frame.
    fn send(&mut self, frame: &[u8]) -> io::Result<()>;

    /// Read available bytes into `buf`, waiting at most `window`.
    fn recv(&mut self, buf: &mut [u8], window: Duration) -> io::Result<usize>;
}

/// A local serial device.
pub struct SerialTransport {
    port: Box<dyn serialport::SerialPort>,
}

impl SerialTransport {
    /// Open `path` at `baud`, with `timeout` as the initial read window.
    pub fn open(path: &str, baud: u32, timeout: Duration) -> io::Result<Self> {
        let port = serialport::new(path, baud)
            .timeout(timeout)
            .open()
            .map_err(io::Error::from)?;
        Ok(SerialTransport { port })
    }
}

impl Transport for SerialTransport {
    fn send(&mut self, frame: &[u8]) -> io::Result<()> {
        self.port.write_all(frame)?;
        self.port.flush()
    }

    fn recv(&mut self, buf: &mut [u8], window: Duration) -> io::Result<usize> {
        self.port.set_timeout(window).map_err(io::Error::from)?;
        self.port.read(buf)
    }
}

/// A TCP connection to a serial bridge.
pub struct TcpTransport {
    stream: TcpStream,
}

impl TcpTransport {
    /// Connect to `host:port`, bounding the attempt by `timeout`.
    pub fn connect(host: &str, port: u16, timeout: Duration) -> io::Result<Self> {
        let mut last_err = None;
        for addr in (host, port).to_socket_addrs()? {
            match TcpStream::connect_timeout(&addr, timeout) {
                Ok(stream) => {
                    // Frames are tiny; do not let them sit in Nagle buffers.
                    stream.set_nodelay(true)?;
                    return Ok(TcpTransport { stream });
                }
                Err(err) => last_err = Some(err),
            }
        }
        Err(last_err.unwrap_or_else(|| {
            io::Error::new(io::ErrorKind::AddrNotAvailable, "no addresses resolved")
        }))
    }
}

impl Transport for TcpTransport {
    fn send(&mut self, frame: &[u8]) -> io::Result<()> {
        self.stream.write_all(frame)?;
        self.stream.flush()
    }

    fn recv(&mut self, buf: &mut [u8], window: Duration) -> io::Result<usize> {
        self.stream.set_read_timeout(Some(window))?;
        self.stream.read(buf)
    }
}

/// Opens transports for peers.
///
/// The link manager owns one dialer; tests substitute
/// [`crate::mock::MockDialer`].
pub trait Dialer: Send + Sync {
    /// Open a fresh transport to `peer`, bounding the attempt by `timeout`.
    fn dial(&self, peer: &PeerAddress, timeout: Duration) -> LinkResult<Box<dyn Transport>>;
}

/// Dials real endpoints: serial devices and TCP bridges.
#[derive(Debug, Default)]
pub struct StandardDialer;

impl Dialer for StandardDialer {
    fn dial(&self, peer: &PeerAddress, timeout: Duration) -> LinkResult<Box<dyn Transport>> {
        debug!(peer = %peer, "dialing");
        let transport: io::Result<Box<dyn Transport>> = match peer {
            PeerAddress::Serial { path, baud } => {
                SerialTransport::open(path, *baud, timeout).map(|t| Box::new(t) as _)
            }
            PeerAddress::Tcp { host, port } => {
                TcpTransport::connect(host, *port, timeout).map(|t| Box::new(t) as _)
            }
        };
        transport.map_err(|source| LinkError::Connect {
            peer: peer.clone(),
            source,
        })
    }
}
