//! Scripted in-memory transport for exercising the link layer.
//!
//! A [`MockDialer`] hands out one [`MockTransport`] per dial, each driven
//! by a script: either a fixed queue of [`MockReply`] values consumed one
//! per sent frame, or a responder closure that inspects the frame and
//! decides the reply. Every dial, send, receive, and close is recorded in
//! a shared [`Journal`] so tests can assert on ordering and interleaving,
//! not just on final results.

use std::collections::VecDeque;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::error::{LinkError, LinkResult};
use crate::transport::{Dialer, PeerAddress, Transport};

/// One observable action taken by a mock transport or dialer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// A transport was established to the peer.
    Dialed(PeerAddress),
    /// A frame was written to the transport.
    Sent(Vec<u8>),
    /// A chunk of reply bytes was read from the transport.
    Received(Vec<u8>),
    /// The transport to the peer was dropped.
    Closed(PeerAddress),
}

/// Shared, append-only record of everything the mocks did.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    events: Arc<Mutex<Vec<LinkEvent>>>,
}

impl Journal {
    pub fn new() -> Self {
        Journal::default()
    }

    pub fn record(&self, event: LinkEvent) {
        self.events.lock().push(event);
    }

    /// Snapshot of all events in order.
    pub fn events(&self) -> Vec<LinkEvent> {
        self.events.lock().clone()
    }

    /// Just the sent frames, in order.
    pub fn sent_frames(&self) -> Vec<Vec<u8>> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                LinkEvent::Sent(frame) => Some(frame.clone()),
                _ => None,
            })
            .collect()
    }

    /// Drop all recorded events.
    pub fn clear(&self) {
        self.events.lock().clear();
    }

    /// How many transports were established.
    pub fn dial_count(&self) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|event| matches!(event, LinkEvent::Dialed(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

/// What the scripted device does after receiving one frame.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Serve these bytes, then go quiet.
    Frame(Vec<u8>),
    /// Never produce a byte; reads report an elapsed window.
    Silence,
    /// Close the connection without replying.
    Hangup,
    /// Serve these bytes, then close the connection.
    HangupAfter(Vec<u8>),
}

/// Closure form of a script: inspects the sent frame, picks the reply.
pub type Responder = dyn Fn(&[u8]) -> MockReply + Send + Sync;

enum MockScript {
    Queue(VecDeque<MockReply>),
    Responder(Arc<Responder>),
}

enum ReplyState {
    Idle,
    Serving {
        bytes: Vec<u8>,
        pos: usize,
        hangup_after: bool,
    },
    Silent,
    HungUp,
}

/// One scripted connection, as handed out by [`MockDialer::dial`].
pub struct MockTransport {
    peer: PeerAddress,
    journal: Journal,
    script: MockScript,
    state: ReplyState,
}

impl Transport for MockTransport {
    fn send(&mut self, frame: &[u8]) -> io::Result<()> {
        self.journal.record(LinkEvent::Sent(frame.to_vec()));
        let reply = match &mut self.script {
            MockScript::Queue(queue) => queue.pop_front(),
            MockScript::Responder(respond) => Some(respond(frame)),
        };
        self.state = match reply {
            Some(MockReply::Frame(bytes)) => ReplyState::Serving {
                bytes,
                pos: 0,
                hangup_after: false,
            },
            Some(MockReply::HangupAfter(bytes)) => ReplyState::Serving {
                bytes,
                pos: 0,
                hangup_after: true,
            },
            // An exhausted queue behaves like a device that stopped talking.
            Some(MockReply::Silence) | None => ReplyState::Silent,
            Some(MockReply::Hangup) => ReplyState::HungUp,
        };
        Ok(())
    }

    fn recv(&mut self, buf: &mut [u8], _window: Duration) -> io::Result<usize> {
        if let ReplyState::Serving {
            bytes,
            pos,
            hangup_after,
        } = &mut self.state
        {
            let n = buf.len().min(bytes.len() - *pos);
            buf[..n].copy_from_slice(&bytes[*pos..*pos + n]);
            *pos += n;
            let drained = *pos == bytes.len();
            let hangup = *hangup_after;
            self.journal.record(LinkEvent::Received(buf[..n].to_vec()));
            if drained {
                self.state = if hangup {
                    ReplyState::HungUp
                } else {
                    ReplyState::Idle
                };
            }
            return Ok(n);
        }
        match self.state {
            ReplyState::HungUp => Ok(0),
            _ => Err(io::Error::new(
                io::ErrorKind::TimedOut,
                "mock window elapsed",
            )),
        }
    }
}

impl Drop for MockTransport {
    fn drop(&mut self) {
        self.journal.record(LinkEvent::Closed(self.peer.clone()));
    }
}

/// Dialer whose transports follow pre-loaded scripts, one per dial.
#[derive(Clone)]
pub struct MockDialer {
    journal: Journal,
    scripts: Arc<Mutex<VecDeque<MockScript>>>,
}

impl MockDialer {
    pub fn new(journal: Journal) -> Self {
        MockDialer {
            journal,
            scripts: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Queue a script for the next dial: one reply per expected frame.
    pub fn push_script<I>(&self, replies: I)
    where
        I: IntoIterator<Item = MockReply>,
    {
        self.scripts
            .lock()
            .push_back(MockScript::Queue(replies.into_iter().collect()));
    }

    /// Queue a responder-driven script for the next dial.
    pub fn push_responder<F>(&self, respond: F)
    where
        F: Fn(&[u8]) -> MockReply + Send + Sync + 'static,
    {
        self.scripts
            .lock()
            .push_back(MockScript::Responder(Arc::new(respond)));
    }
}

impl Dialer for MockDialer {
    fn dial(&self, peer: &PeerAddress, _timeout: Duration) -> LinkResult<Box<dyn Transport>> {
        let script = self
            .scripts
            .lock()
            .pop_front()
            .ok_or_else(|| LinkError::Connect {
                peer: peer.clone(),
                source: io::Error::new(io::ErrorKind::ConnectionRefused, "mock dialer exhausted"),
            })?;
        self.journal.record(LinkEvent::Dialed(peer.clone()));
        Ok(Box::new(MockTransport {
            peer: peer.clone(),
            journal: self.journal.clone(),
            script,
            state: ReplyState::Idle,
        }))
    }
}
