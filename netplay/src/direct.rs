use std::sync::mpsc;

use proto::PeerMessage;
use tracing::debug;

use crate::transport::{decode_all, encode, Transport, TransportError, TransportKind};

/// Point-to-point transport with no relay in between.
///
/// Mirrors what a relay would deliver: paddle moves and ball snapshots go to
/// the peer only, every other message is also echoed back to the sender.
pub struct DirectTransport {
    to_peer: mpsc::Sender<Vec<u8>>,
    to_self: mpsc::Sender<Vec<u8>>,
    inbox: mpsc::Receiver<Vec<u8>>,
    closed: bool,
}

impl DirectTransport {
    /// Two transports wired to each other
    pub fn pair() -> (Self, Self) {
        let (a_tx, a_rx) = mpsc::channel();
        let (b_tx, b_rx) = mpsc::channel();

        let a = Self {
            to_peer: b_tx.clone(),
            to_self: a_tx.clone(),
            inbox: a_rx,
            closed: false,
        };
        let b = Self {
            to_peer: a_tx,
            to_self: b_tx,
            inbox: b_rx,
            closed: false,
        };
        (a, b)
    }

    fn echoes(msg: &PeerMessage) -> bool {
        !matches!(msg, PeerMessage::PaddleMove { .. } | PeerMessage::BallState(_))
    }
}

impl Transport for DirectTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Direct
    }

    fn send(&mut self, msg: &PeerMessage) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        let frame = encode(msg)?;
        if Self::echoes(msg) {
            self.to_self
                .send(frame.clone())
                .map_err(|_| TransportError::Closed)?;
        }
        self.to_peer.send(frame).map_err(|_| TransportError::Closed)
    }

    fn drain(&mut self) -> Vec<PeerMessage> {
        if self.closed {
            return Vec::new();
        }
        decode_all(self.inbox.try_iter().collect::<Vec<_>>())
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Ok(frame) = encode(&PeerMessage::OpponentDisconnected) {
            // Peer may already be gone
            let _ = self.to_peer.send(frame);
        }
        debug!("direct transport closed");
    }
}

impl Drop for DirectTransport {
    fn drop(&mut self) {
        self.close();
    }
}
