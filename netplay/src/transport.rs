//! Transport abstraction between the sync session and the network
//!
//! A session only ever sends and drains [`PeerMessage`]s; how they reach the
//! other peer is up to the transport. Two are provided: [`RelayTransport`]
//! routes through a room relay, [`DirectTransport`] is a point-to-point pair.
//!
//! [`RelayTransport`]: crate::RelayTransport
//! [`DirectTransport`]: crate::DirectTransport

use proto::PeerMessage;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Relay,
    Direct,
}

impl TransportKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TransportKind::Relay => "relay",
            TransportKind::Direct => "direct",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("failed to encode message: {0}")]
    Encode(postcard::Error),

    #[error("transport closed")]
    Closed,

    #[error("not in a room")]
    NotInRoom,
}

/// Message pipe to the opponent
pub trait Transport {
    fn kind(&self) -> TransportKind;

    /// Queue a message for delivery. Never blocks.
    fn send(&mut self, msg: &PeerMessage) -> Result<(), TransportError>;

    /// Everything received since the last drain, in arrival order
    fn drain(&mut self) -> Vec<PeerMessage>;

    /// Leave; the opponent is told we disconnected
    fn close(&mut self);
}

pub(crate) fn encode(msg: &PeerMessage) -> Result<Vec<u8>, TransportError> {
    msg.to_bytes().map_err(TransportError::Encode)
}

/// Decode received frames, dropping any that fail
pub(crate) fn decode_all(frames: impl IntoIterator<Item = Vec<u8>>) -> Vec<PeerMessage> {
    frames
        .into_iter()
        .filter_map(|frame| match PeerMessage::from_bytes(&frame) {
            Ok(msg) => Some(msg),
            Err(e) => {
                warn!(len = frame.len(), error = %e, "dropping undecodable frame");
                None
            }
        })
        .collect()
}
