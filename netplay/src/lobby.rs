use std::collections::HashMap;

use game_core::GameRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Opaque identity of a connected peer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PeerId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    #[error("room {0} already exists")]
    AlreadyExists(String),

    #[error("room {0} does not exist")]
    NotFound(String),

    #[error("room {0} is full")]
    Full(String),

    #[error("peer {0:?} is not in a room")]
    NotInRoom(PeerId),

    #[error("peer {0:?} is already in a room")]
    AlreadyInRoom(PeerId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomStatus {
    /// One occupant, waiting for an opponent
    Waiting,
    /// Both slots filled
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub peer: PeerId,
    pub player_number: u8,
}

#[derive(Debug, Clone)]
pub struct Room {
    pub id: String,
    pub host: PeerId,
    pub slots: Vec<Slot>,
    pub status: RoomStatus,
    ready_seen: Vec<PeerId>,
}

impl Room {
    pub fn contains(&self, peer: PeerId) -> bool {
        self.slots.iter().any(|slot| slot.peer == peer)
    }

    pub fn player_number(&self, peer: PeerId) -> Option<u8> {
        self.slots
            .iter()
            .find(|slot| slot.peer == peer)
            .map(|slot| slot.player_number)
    }

    /// Occupants other than `peer`
    pub fn others(&self, peer: PeerId) -> impl Iterator<Item = PeerId> + '_ {
        self.slots
            .iter()
            .map(|slot| slot.peer)
            .filter(move |other| *other != peer)
    }

    pub fn occupants(&self) -> impl Iterator<Item = PeerId> + '_ {
        self.slots.iter().map(|slot| slot.peer)
    }

    fn slot_peer(&self, player_number: u8) -> Option<PeerId> {
        self.slots
            .iter()
            .find(|slot| slot.player_number == player_number)
            .map(|slot| slot.peer)
    }
}

/// Both players are connected; fired once per peer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameReady {
    pub room_id: String,
    pub player1: PeerId,
    pub player2: PeerId,
}

/// Result of a peer leaving its room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    pub room_id: String,
    /// Peers still in the room, to be told their opponent left
    pub remaining: Vec<PeerId>,
    pub room_closed: bool,
}

/// All rooms, keyed by room id
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: HashMap<String, Room>,
    membership: HashMap<PeerId, String>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a room with the caller as host and player 1
    pub fn create(&mut self, room_id: &str, peer: PeerId) -> Result<u8, RoomError> {
        if self.membership.contains_key(&peer) {
            return Err(RoomError::AlreadyInRoom(peer));
        }
        if self.rooms.contains_key(room_id) {
            return Err(RoomError::AlreadyExists(room_id.to_string()));
        }

        self.rooms.insert(
            room_id.to_string(),
            Room {
                id: room_id.to_string(),
                host: peer,
                slots: vec![Slot {
                    peer,
                    player_number: 1,
                }],
                status: RoomStatus::Waiting,
                ready_seen: Vec::new(),
            },
        );
        self.membership.insert(peer, room_id.to_string());
        info!(room = room_id, ?peer, "room created");
        Ok(1)
    }

    /// Take the free slot in an existing room. Returns the assigned player number.
    pub fn join(&mut self, room_id: &str, peer: PeerId) -> Result<u8, RoomError> {
        if self.membership.contains_key(&peer) {
            return Err(RoomError::AlreadyInRoom(peer));
        }
        let room = self
            .rooms
            .get_mut(room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.to_string()))?;
        if room.slots.len() >= 2 {
            return Err(RoomError::Full(room_id.to_string()));
        }

        let player_number = if room.slot_peer(2).is_none() { 2 } else { 1 };
        room.slots.push(Slot {
            peer,
            player_number,
        });
        room.slots.sort_by_key(|slot| slot.player_number);
        room.status = RoomStatus::Ready;
        self.membership.insert(peer, room_id.to_string());
        info!(room = room_id, ?peer, player_number, "room joined");
        Ok(player_number)
    }

    /// Remove the peer from its room. Empty rooms are deleted; otherwise the
    /// host slot passes to whoever is left.
    pub fn leave(&mut self, peer: PeerId) -> Result<Departure, RoomError> {
        let room_id = self
            .membership
            .remove(&peer)
            .ok_or(RoomError::NotInRoom(peer))?;

        let Some(room) = self.rooms.get_mut(&room_id) else {
            return Err(RoomError::NotFound(room_id));
        };
        room.slots.retain(|slot| slot.peer != peer);
        room.ready_seen.retain(|seen| *seen != peer);

        let remaining: Vec<PeerId> = room.occupants().collect();
        let room_closed = remaining.is_empty();
        if room_closed {
            self.rooms.remove(&room_id);
            info!(room = %room_id, "room closed");
        } else {
            room.status = RoomStatus::Waiting;
            if room.host == peer {
                room.host = remaining[0];
            }
            info!(room = %room_id, ?peer, "peer left room");
        }

        Ok(Departure {
            room_id,
            remaining,
            room_closed,
        })
    }

    /// `Some` the first time this peer observes both slots filled
    pub fn take_game_ready(&mut self, peer: PeerId) -> Option<GameReady> {
        let room_id = self.membership.get(&peer)?;
        let room = self.rooms.get_mut(room_id)?;
        if room.status != RoomStatus::Ready || room.ready_seen.contains(&peer) {
            return None;
        }
        let player1 = room.slot_peer(1)?;
        let player2 = room.slot_peer(2)?;

        room.ready_seen.push(peer);
        Some(GameReady {
            room_id: room.id.clone(),
            player1,
            player2,
        })
    }

    pub fn room(&self, room_id: &str) -> Option<&Room> {
        self.rooms.get(room_id)
    }

    pub fn room_of(&self, peer: PeerId) -> Option<&Room> {
        self.membership
            .get(&peer)
            .and_then(|room_id| self.rooms.get(room_id))
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// A code no open room is using yet. Gives up after a handful of
    /// collisions and returns the last draw.
    pub fn fresh_code(&self, rng: &mut GameRng) -> String {
        let mut code = generate_room_code(rng);
        for _ in 0..16 {
            if !self.rooms.contains_key(&code) {
                break;
            }
            code = generate_room_code(rng);
        }
        code
    }
}

/// Five characters from A-Z and 0-9
pub fn generate_room_code(rng: &mut GameRng) -> String {
    const CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    (0..5)
        .map(|_| {
            let idx = rng.0.gen_range(0..CHARS.len());
            CHARS[idx] as char
        })
        .collect()
}
