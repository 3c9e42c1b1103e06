//! In-process room relay
//!
//! Owns the room registry and a frame outbox per connected peer. Peers talk
//! to it through [`RelayTransport`]; the hub decides who receives what.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use proto::{BallState, PeerMessage};
use tracing::{debug, info, warn};

use crate::lobby::{GameReady, PeerId, RoomError, RoomRegistry};
use crate::transport::{decode_all, encode, Transport, TransportError, TransportKind};

/// Last ball snapshot a room's host pushed through the relay
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StoredState {
    pub ball: BallState,
    pub updated_by: PeerId,
}

#[derive(Debug, Default)]
pub struct RelayHub {
    registry: RoomRegistry,
    outboxes: HashMap<PeerId, VecDeque<Vec<u8>>>,
    states: HashMap<String, StoredState>,
    next_peer: u64,
}

impl RelayHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::new()))
    }

    pub fn connect(&mut self) -> PeerId {
        self.next_peer += 1;
        let peer = PeerId(self.next_peer);
        self.outboxes.insert(peer, VecDeque::new());
        debug!(?peer, "peer connected");
        peer
    }

    pub fn create_room(&mut self, peer: PeerId, room_id: &str) -> Result<u8, RoomError> {
        self.registry.create(room_id, peer)
    }

    pub fn join_room(&mut self, peer: PeerId, room_id: &str) -> Result<u8, RoomError> {
        self.registry.join(room_id, peer)
    }

    pub fn take_game_ready(&mut self, peer: PeerId) -> Option<GameReady> {
        self.registry.take_game_ready(peer)
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    pub fn stored_state(&self, room_id: &str) -> Option<StoredState> {
        self.states.get(room_id).copied()
    }

    /// Deliver a message from `from` to the peers that should see it:
    ///
    /// - `PaddleMove` and `BallState` go to the other occupant only
    /// - `Score` and `GameOver` go to everyone, sender included
    /// - `Restart` goes to everyone, but only when the host sent it
    ///
    /// Paddle moves are stamped with the sender's registered player number.
    pub fn route(&mut self, from: PeerId, msg: &PeerMessage) -> Result<(), TransportError> {
        let Some(room) = self.registry.room_of(from) else {
            return Err(TransportError::NotInRoom);
        };
        let room_id = room.id.clone();
        let others: Vec<PeerId> = room.others(from).collect();
        let everyone: Vec<PeerId> = room.occupants().collect();
        let is_host = room.host == from;
        let player_number = room.player_number(from);

        let (msg, recipients) = match msg {
            PeerMessage::PaddleMove { x, direction, .. } => {
                let Some(player_number) = player_number else {
                    return Err(TransportError::NotInRoom);
                };
                let stamped = PeerMessage::PaddleMove {
                    player_number,
                    x: *x,
                    direction: *direction,
                };
                (stamped, others)
            }
            PeerMessage::BallState(ball) => {
                self.states.insert(
                    room_id,
                    StoredState {
                        ball: *ball,
                        updated_by: from,
                    },
                );
                (msg.clone(), others)
            }
            PeerMessage::Score { .. } | PeerMessage::GameOver { .. } => (msg.clone(), everyone),
            PeerMessage::Restart if is_host => (PeerMessage::Restart, everyone),
            PeerMessage::Restart => {
                debug!(peer = ?from, "restart from non-host ignored");
                return Ok(());
            }
            PeerMessage::OpponentDisconnected => {
                warn!(peer = ?from, "peers may not announce disconnects");
                return Ok(());
            }
        };

        let frame = encode(&msg)?;
        for peer in recipients {
            self.push(peer, frame.clone());
        }
        Ok(())
    }

    /// Drop a peer: its room-mates hear `OpponentDisconnected`, then the
    /// room forgets it
    pub fn disconnect(&mut self, peer: PeerId) {
        if let Some(room) = self.registry.room_of(peer) {
            let others: Vec<PeerId> = room.others(peer).collect();
            match encode(&PeerMessage::OpponentDisconnected) {
                Ok(frame) => {
                    for other in others {
                        self.push(other, frame.clone());
                    }
                }
                Err(e) => warn!(error = %e, "could not encode disconnect notice"),
            }
        }

        if let Ok(departure) = self.registry.leave(peer) {
            if departure.room_closed {
                self.states.remove(&departure.room_id);
            }
        }
        self.outboxes.remove(&peer);
        info!(?peer, "peer disconnected");
    }

    pub fn take_outbox(&mut self, peer: PeerId) -> Vec<Vec<u8>> {
        self.outboxes
            .get_mut(&peer)
            .map(|outbox| outbox.drain(..).collect())
            .unwrap_or_default()
    }

    fn push(&mut self, peer: PeerId, frame: Vec<u8>) {
        if let Some(outbox) = self.outboxes.get_mut(&peer) {
            outbox.push_back(frame);
        }
    }
}

/// A peer's connection to a shared [`RelayHub`]
pub struct RelayTransport {
    hub: Rc<RefCell<RelayHub>>,
    peer: PeerId,
    closed: bool,
}

impl RelayTransport {
    /// Register a new peer with the hub
    pub fn connect(hub: &Rc<RefCell<RelayHub>>) -> Self {
        let peer = hub.borrow_mut().connect();
        Self {
            hub: Rc::clone(hub),
            peer,
            closed: false,
        }
    }

    pub fn peer(&self) -> PeerId {
        self.peer
    }

    pub fn create_room(&self, room_id: &str) -> Result<u8, RoomError> {
        self.hub.borrow_mut().create_room(self.peer, room_id)
    }

    pub fn join_room(&self, room_id: &str) -> Result<u8, RoomError> {
        self.hub.borrow_mut().join_room(self.peer, room_id)
    }

    pub fn take_game_ready(&self) -> Option<GameReady> {
        self.hub.borrow_mut().take_game_ready(self.peer)
    }
}

impl Transport for RelayTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Relay
    }

    fn send(&mut self, msg: &PeerMessage) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        self.hub.borrow_mut().route(self.peer, msg)
    }

    fn drain(&mut self) -> Vec<PeerMessage> {
        if self.closed {
            return Vec::new();
        }
        let frames = self.hub.borrow_mut().take_outbox(self.peer);
        decode_all(frames)
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.hub.borrow_mut().disconnect(self.peer);
        }
    }
}

impl Drop for RelayTransport {
    fn drop(&mut self) {
        self.close();
    }
}
