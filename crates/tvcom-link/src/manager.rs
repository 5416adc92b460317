//! The lock-guarded link: at most one live transport per manager.
//!
//! The transport is established lazily on first use, reused while the peer
//! stays the same, replaced (old closed first) when the peer changes, and
//! dropped after any transport failure so the next command starts from a
//! clean dial.
//!
//! All I/O goes through a [`LinkSession`], which holds the slot mutex. A
//! caller that keeps one session for a whole logical command gets the
//! serialization the wire demands: two commands can never interleave their
//! exchanges, because the second cannot lock the slot until the first is
//! done.

use std::io;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, MutexGuard};
use tracing::{debug, trace, warn};

use crate::error::{LinkError, LinkResult};
use crate::transport::{Dialer, PeerAddress, StandardDialer, Transport};

/// Default for both link timeouts.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeouts applied by the link layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkConfig {
    /// Ceiling for transport establishment.
    pub connect_timeout: Duration,
    /// Deadline for one full reply, measured from the end of the write.
    pub response_timeout: Duration,
}

impl Default for LinkConfig {
    fn default() -> Self {
        LinkConfig {
            connect_timeout: DEFAULT_TIMEOUT,
            response_timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// The held transport plus the peer it is bound to.
struct ActiveLink {
    peer: PeerAddress,
    transport: Box<dyn Transport>,
}

impl ActiveLink {
    /// One write-then-read cycle: send the frame, then read exactly
    /// `expect` reply bytes against the deadline.
    fn exchange(&mut self, frame: &[u8], expect: usize, timeout: Duration) -> LinkResult<Vec<u8>> {
        trace!(
            peer = %self.peer,
            frame = %String::from_utf8_lossy(frame).trim_end(),
            "sending frame"
        );
        self.transport.send(frame)?;

        let deadline = Instant::now() + timeout;
        let mut reply = vec![0u8; expect];
        let mut filled = 0;

        while filled < expect {
            let window = deadline.saturating_duration_since(Instant::now());
            if window.is_zero() {
                return Err(deadline_outcome(filled, expect, timeout));
            }
            match self.transport.recv(&mut reply[filled..], window) {
                Ok(0) => return Err(LinkError::NoResponse),
                Ok(n) => filled += n,
                Err(err) if window_elapsed(&err) => {
                    return Err(deadline_outcome(filled, expect, timeout))
                }
                Err(err) => return Err(LinkError::Io(err)),
            }
        }

        trace!(peer = %self.peer, bytes = filled, "reply complete");
        Ok(reply)
    }
}

/// Classify a deadline expiry: nothing at all is a timeout, a partial fill
/// is a short response.
fn deadline_outcome(filled: usize, expect: usize, timeout: Duration) -> LinkError {
    if filled == 0 {
        LinkError::Timeout { after: timeout }
    } else {
        LinkError::ShortResponse {
            expected: expect,
            actual: filled,
        }
    }
}

fn window_elapsed(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
    )
}

/// Owns the single transport slot and the dialer that fills it.
pub struct LinkManager {
    dialer: Box<dyn Dialer>,
    config: LinkConfig,
    slot: Mutex<Option<ActiveLink>>,
}

impl LinkManager {
    /// Create a manager around a dialer.
    pub fn new(dialer: Box<dyn Dialer>, config: LinkConfig) -> Self {
        LinkManager {
            dialer,
            config,
            slot: Mutex::new(None),
        }
    }

    /// Manager over the standard serial/TCP dialer.
    pub fn standard(config: LinkConfig) -> Self {
        LinkManager::new(Box::new(StandardDialer), config)
    }

    /// Lock the transport slot for one logical command.
    ///
    /// Hold the returned session across every exchange of the command,
    /// including the status query of a relative adjustment.
    pub fn session(&self) -> LinkSession<'_> {
        LinkSession {
            slot: self.slot.lock(),
            dialer: self.dialer.as_ref(),
            config: self.config,
        }
    }

    /// The peer of the currently held transport, if any.
    pub fn current_peer(&self) -> Option<PeerAddress> {
        self.slot.lock().as_ref().map(|link| link.peer.clone())
    }
}

/// Exclusive use of the link for one logical command.
///
/// Dropping the session releases the lock; the transport itself stays in
/// the slot for the next command unless an exchange failed.
pub struct LinkSession<'a> {
    slot: MutexGuard<'a, Option<ActiveLink>>,
    dialer: &'a dyn Dialer,
    config: LinkConfig,
}

impl LinkSession<'_> {
    /// One exchange against `peer`: reuse or (re)dial, write the frame,
    /// read exactly `expect` reply bytes.
    ///
    /// Any transport-level failure drops the held transport so the next
    /// command re-establishes cleanly instead of reading a desynchronized
    /// stream.
    pub fn exchange(
        &mut self,
        peer: &PeerAddress,
        frame: &[u8],
        expect: usize,
    ) -> LinkResult<Vec<u8>> {
        let mut link = self.checkout(peer)?;
        match link.exchange(frame, expect, self.config.response_timeout) {
            Ok(reply) => {
                *self.slot = Some(link);
                Ok(reply)
            }
            Err(err) => {
                warn!(peer = %peer, error = %err, "exchange failed, discarding link");
                Err(err)
            }
        }
    }

    /// Take a transport for `peer` out of the slot: reuse the held one when
    /// the peer matches, otherwise close it first and dial afresh.
    fn checkout(&mut self, peer: &PeerAddress) -> LinkResult<ActiveLink> {
        match self.slot.take() {
            Some(link) if link.peer == *peer => {
                trace!(peer = %peer, "reusing link");
                Ok(link)
            }
            stale => {
                if let Some(stale) = stale {
                    debug!(old = %stale.peer, new = %peer, "peer changed, closing link");
                    drop(stale);
                }
                let transport = self.dialer.dial(peer, self.config.connect_timeout)?;
                Ok(ActiveLink {
                    peer: peer.clone(),
                    transport,
                })
            }
        }
    }
}
