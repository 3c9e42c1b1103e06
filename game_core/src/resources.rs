use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::components::Side;

/// Match phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameState {
    /// Waiting for a serve; the ball does not move
    #[default]
    Ready,
    Playing,
    Paused,
    /// Terminal until the engine is reset
    GameOver,
}

/// Game score tracking
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Score {
    pub score1: u32, // top player
    pub score2: u32, // bottom player
}

impl Score {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, side: Side) {
        match side {
            Side::Top => self.score1 += 1,
            Side::Bottom => self.score2 += 1,
        }
    }

    pub fn get(&self, side: Side) -> u32 {
        match side {
            Side::Top => self.score1,
            Side::Bottom => self.score2,
        }
    }

    pub fn has_winner(&self, win_score: u32) -> Option<Side> {
        if self.score1 >= win_score {
            Some(Side::Top)
        } else if self.score2 >= win_score {
            Some(Side::Bottom)
        } else {
            None
        }
    }
}

/// Random number generator shared by every randomized rule
pub struct GameRng(pub rand::rngs::StdRng);

impl GameRng {
    pub fn new(seed: u64) -> Self {
        Self(rand::rngs::StdRng::seed_from_u64(seed))
    }

    /// +1.0 or -1.0 with equal odds
    pub fn sign(&mut self) -> f32 {
        if self.0.gen_bool(0.5) {
            1.0
        } else {
            -1.0
        }
    }

    /// True with probability `p` (clamped to [0, 1], NaN never fires)
    pub fn chance(&mut self, p: f64) -> bool {
        if p.is_nan() {
            return false;
        }
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Uniform in [0, 1)
    pub fn unit(&mut self) -> f32 {
        self.0.gen::<f32>()
    }

    /// Uniform in [min, max); degenerate ranges collapse to `min`
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        if max > min {
            self.0.gen_range(min..max)
        } else {
            min
        }
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::new(12345)
    }
}

/// Events that occurred during the last ball update
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Events {
    pub paddle_hit: Option<Side>,
    pub wall_hit: bool,
    pub pole_hit: bool,
    pub hole_absorbed: bool,
    pub velocity_recovered: bool,
    pub speed_increased: bool,
    pub goal: Option<Side>, // side that scored
}

impl Events {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
