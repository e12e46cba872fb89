//! Per-connection session state and the registry the tick thread drains.
//!
//! A session's inbound queue is a single-producer/single-consumer channel:
//! the socket reader task is the only producer, the tick thread the only
//! consumer. The outbound queue is the mirror image, drained only by the
//! socket writer task. The session struct itself is owned by the tick
//! thread; the channels are the only state shared across threads.

use std::fmt::Display;
use std::net::SocketAddr;

use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::{mpsc, watch};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Reference point established at handshake time. All relative coordinates
/// in later commands are offsets from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub world: String,
}

/// Channel ends handed over by the network layer when a connection is
/// accepted.
#[derive(Debug)]
pub struct SessionChannels {
    /// Raw request lines from the reader task.
    pub inbound: mpsc::UnboundedReceiver<String>,
    /// Reply lines to the writer task.
    pub outbound: mpsc::UnboundedSender<String>,
    /// Close signal observed by both I/O tasks.
    pub stop: watch::Sender<bool>,
}

/// Server-side state for one client connection.
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    peer: SocketAddr,
    origin: Option<Origin>,
    player: Option<String>,
    build_radius: i32,
    running: bool,
    pending_removal: bool,
    inbound: mpsc::UnboundedReceiver<String>,
    outbound: mpsc::UnboundedSender<String>,
    stop: watch::Sender<bool>,
}

impl Session {
    pub fn new(id: SessionId, peer: SocketAddr, channels: SessionChannels) -> Self {
        Self {
            id,
            peer,
            origin: None,
            player: None,
            build_radius: 0,
            running: true,
            pending_removal: false,
            inbound: channels.inbound,
            outbound: channels.outbound,
            stop: channels.stop,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    pub fn origin(&self) -> Option<&Origin> {
        self.origin.as_ref()
    }

    pub fn set_origin(&mut self, origin: Origin) {
        self.origin = Some(origin);
    }

    pub fn player(&self) -> Option<&str> {
        self.player.as_deref()
    }

    pub fn set_player(&mut self, name: &str) {
        self.player = Some(name.to_string());
    }

    pub fn build_radius(&self) -> i32 {
        self.build_radius
    }

    pub fn set_build_radius(&mut self, radius: i32) {
        self.build_radius = radius;
    }

    pub fn running(&self) -> bool {
        self.running
    }

    pub fn pending_removal(&self) -> bool {
        self.pending_removal
    }

    /// Enqueue a reply for delivery.
    ///
    /// Once teardown has started only error replies still go out; everything
    /// else is silently dropped so a closing session cannot keep generating
    /// traffic, while the client can still observe the failure reason.
    pub fn send(&self, value: impl Display) {
        let line = value.to_string();
        if self.pending_removal && !protocol::is_error(&line) {
            return;
        }
        // Send fails only when the writer task is already gone.
        let _ = self.outbound.send(line);
    }

    /// Start teardown: stop accepting work, signal both I/O tasks.
    ///
    /// The outbound sender stays alive so error replies queued after this
    /// point are still delivered; it is dropped when the registry removes
    /// the session, which lets the writer task drain and exit.
    pub fn begin_close(&mut self) {
        if !self.pending_removal {
            tracing::debug!(session = %self.id, peer = %self.peer, "closing session");
        }
        self.running = false;
        self.pending_removal = true;
        let _ = self.stop.send(true);
    }

    /// Pop the next queued request line, if any.
    ///
    /// Observing a closed inbound channel means the reader task has stopped
    /// (end of stream or I/O error); the session is then no longer running,
    /// but any lines buffered before the close have already been returned.
    pub fn poll_line(&mut self) -> Option<String> {
        match self.inbound.try_recv() {
            Ok(line) => Some(line),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                if self.running {
                    tracing::debug!(session = %self.id, peer = %self.peer, "reader stopped");
                }
                self.running = false;
                None
            }
        }
    }

    /// Number of request lines currently buffered.
    pub fn queued_lines(&self) -> usize {
        self.inbound.len()
    }
}

/// Active-session collection, owned by the host integration layer and shared
/// between the listener (insert) and the tick driver (drain/remove) behind a
/// mutex.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Vec<Session>,
    next_id: u64,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate_id(&mut self) -> SessionId {
        let id = SessionId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn insert(&mut self, session: Session) {
        self.sessions.push(session);
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Visit every session, dropping those for which `keep` returns false.
    /// Dropping a session releases its outbound sender, which lets the
    /// writer task flush any remaining replies and close the socket.
    pub fn retain_sessions(&mut self, keep: impl FnMut(&mut Session) -> bool) {
        self.sessions.retain_mut(keep);
    }

    /// Begin teardown on every session (host shutdown).
    pub fn close_all(&mut self) {
        for session in &mut self.sessions {
            session.begin_close();
        }
    }
}
