use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::map::Aabb;
use crate::resources::GameRng;

/// Which goal a paddle guards. Player 1 is the top paddle, player 2 the bottom one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Top,
    Bottom,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Top, Side::Bottom];

    /// Player number on the wire (1 = top, 2 = bottom)
    pub fn number(self) -> u8 {
        match self {
            Side::Top => 1,
            Side::Bottom => 2,
        }
    }

    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Side::Top),
            2 => Some(Side::Bottom),
            _ => None,
        }
    }

    pub fn opponent(self) -> Self {
        match self {
            Side::Top => Side::Bottom,
            Side::Bottom => Side::Top,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Side::Top => 0,
            Side::Bottom => 1,
        }
    }
}

/// Paddle component. Y is fixed by side; only X moves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paddle {
    pub side: Side,
    pub x: f32, // left edge
    pub y: f32, // top edge
    pub width: f32,
    pub height: f32,
    pub velocity: f32, // last displacement / max per-tick speed, in [-1, 1]
}

impl Paddle {
    pub fn new(side: Side, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            side,
            x,
            y,
            width,
            height,
            velocity: 0.0,
        }
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// Ball component - the pong ball
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    pub speed: f32, // target magnitude, not necessarily |vel|
    pub size: f32,  // diameter
}

impl Ball {
    pub fn new(pos: Vec2, vel: Vec2, speed: f32, size: f32) -> Self {
        Self {
            pos,
            vel,
            speed,
            size,
        }
    }

    pub fn radius(&self) -> f32 {
        self.size / 2.0
    }

    /// A velocity the integrator can use: finite and not at rest
    pub fn has_valid_velocity(&self) -> bool {
        self.vel.is_finite() && self.vel != Vec2::ZERO
    }

    /// Recenter with a fresh diagonal serve at the given speed
    pub fn serve(&mut self, center: Vec2, speed: f32, rng: &mut GameRng) {
        self.pos = center;
        self.vel = serve_velocity(speed, rng);
        self.speed = speed;
    }
}

/// Random diagonal serve: each component is independently ±speed.
pub fn serve_velocity(speed: f32, rng: &mut GameRng) -> Vec2 {
    let mut vx = speed * rng.sign();
    let mut vy = speed * rng.sign();
    // A sign draw never yields zero, but the serve must always move
    if vx == 0.0 {
        vx = speed.abs();
    }
    if vy == 0.0 {
        vy = speed.abs();
    }
    Vec2::new(vx, vy)
}

/// Shape of an obstacle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Circular; swallows the ball when it falls substantially inside
    Hole { radius: f32 },
    /// Axis-aligned rectangle; reflects the ball
    Pole { width: f32, height: f32 },
}

/// A hole or pole on the field. Positions are centers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    pub pos: Vec2,
    pub permanent: bool,
    pub id: Option<u32>, // set for temporary obstacles so they can be despawned
}

impl Obstacle {
    pub fn hole(pos: Vec2, radius: f32) -> Self {
        Self {
            kind: ObstacleKind::Hole { radius },
            pos,
            permanent: true,
            id: None,
        }
    }

    pub fn pole(pos: Vec2, width: f32, height: f32) -> Self {
        Self {
            kind: ObstacleKind::Pole { width, height },
            pos,
            permanent: true,
            id: None,
        }
    }

    /// Mark as a temporary obstacle with the given identity
    pub fn temporary(mut self, id: u32) -> Self {
        self.permanent = false;
        self.id = Some(id);
        self
    }

    pub fn is_hole(&self) -> bool {
        matches!(self.kind, ObstacleKind::Hole { .. })
    }

    pub fn bounds(&self) -> Aabb {
        match self.kind {
            ObstacleKind::Hole { radius } => {
                Aabb::from_center_size(self.pos, Vec2::splat(radius * 2.0))
            }
            ObstacleKind::Pole { width, height } => {
                Aabb::from_center_size(self.pos, Vec2::new(width, height))
            }
        }
    }

    /// Holes are drawn only once the rally has started; they collide regardless.
    pub fn is_visible(&self, hit_count: u32) -> bool {
        !self.is_hole() || hit_count > 0
    }
}

/// Despawn deadline for temporary obstacles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lifetime {
    pub despawn_at_ms: u64,
}

impl Lifetime {
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms >= self.despawn_at_ms
    }
}
