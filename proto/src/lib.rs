//! Peer-to-peer protocol for online Pong
//!
//! Uses postcard for efficient binary serialization. Every message is sent
//! to the room; there is no sequencing and the last message wins.

use postcard::{from_bytes, to_allocvec};

/// Host's ball, copied verbatim to the guest
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BallState {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub speed: f32,
    pub size: f32,
}

impl BallState {
    fn is_finite(&self) -> bool {
        [self.x, self.y, self.vx, self.vy, self.speed, self.size]
            .iter()
            .all(|v| v.is_finite())
    }
}

// ============================================================================
// Peer Messages
// ============================================================================

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum PeerMessage {
    /// Sender's paddle moved. `player_number`: 1 = top, 2 = bottom
    PaddleMove {
        player_number: u8,
        x: f32,
        direction: i8,
    },

    /// Host ball snapshot, sent every tick while playing
    BallState(BallState),

    /// Host score, sent every tick
    Score { score1: u32, score2: u32 },

    /// Game finished. Receivers treat repeats as idempotent
    GameOver { winner: u8 },

    /// Host asks both peers to reset
    Restart,

    /// The other peer left the room
    OpponentDisconnected,
}

/// Message kinds as the transport names them when subscribing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    OpponentPaddleMove,
    GameStateSync,
    ScoreSync,
    GameOverSync,
    GameRestart,
    OpponentDisconnected,
}

impl MessageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageKind::OpponentPaddleMove => "OpponentPaddleMove",
            MessageKind::GameStateSync => "GameStateSync",
            MessageKind::ScoreSync => "ScoreSync",
            MessageKind::GameOverSync => "GameOverSync",
            MessageKind::GameRestart => "GameRestart",
            MessageKind::OpponentDisconnected => "OpponentDisconnected",
        }
    }
}

// ============================================================================
// Serialization Helpers
// ============================================================================

impl PeerMessage {
    pub fn kind(&self) -> MessageKind {
        match self {
            PeerMessage::PaddleMove { .. } => MessageKind::OpponentPaddleMove,
            PeerMessage::BallState(_) => MessageKind::GameStateSync,
            PeerMessage::Score { .. } => MessageKind::ScoreSync,
            PeerMessage::GameOver { .. } => MessageKind::GameOverSync,
            PeerMessage::Restart => MessageKind::GameRestart,
            PeerMessage::OpponentDisconnected => MessageKind::OpponentDisconnected,
        }
    }

    /// Fields a receiver can safely apply: finite coordinates and player
    /// numbers of 1 or 2. Anything else is dropped by the receiver.
    pub fn is_well_formed(&self) -> bool {
        match self {
            PeerMessage::PaddleMove {
                player_number,
                x,
                direction,
            } => matches!(player_number, 1 | 2) && x.is_finite() && (-1..=1).contains(direction),
            PeerMessage::BallState(ball) => ball.is_finite(),
            PeerMessage::GameOver { winner } => matches!(winner, 1 | 2),
            PeerMessage::Score { .. } | PeerMessage::Restart | PeerMessage::OpponentDisconnected => {
                true
            }
        }
    }

    /// Serialize message to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, postcard::Error> {
        to_allocvec(self)
    }

    /// Deserialize message from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, postcard::Error> {
        from_bytes(bytes)
    }
}
