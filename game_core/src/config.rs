use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::components::Side;
use crate::params::Params;

/// Rejected configuration values
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("canvas must have a positive size, got {width}x{height}")]
    InvalidCanvas { width: f32, height: f32 },

    #[error("paddle width {paddle} does not fit a canvas {canvas} wide")]
    PaddleTooWide { paddle: f32, canvas: f32 },

    #[error("{name} must be positive and finite, got {value}")]
    InvalidValue { name: &'static str, value: f32 },

    #[error("win score must be at least 1")]
    ZeroWinScore,

    #[error("speed increase interval must be at least 1 hit")]
    ZeroSpeedInterval,

    #[error("obstacle spawn interval must be at least 1 ms")]
    ZeroSpawnInterval,

    #[error("obstacle safe zone is empty on a {width}x{height} canvas")]
    EmptySafeZone { width: f32, height: f32 },
}

/// Timers and odds for the dynamic obstacle spawner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnerConfig {
    pub permanent_obstacles: usize,
    pub spawn_interval_ms: u64,
    pub lifetime_ms: u64,
    pub max_temporary: usize,
    pub initial_delay_ms: u64,
    pub spawn_chance: f64,
    pub hole_chance: f64,
    pub spawn_on_score: bool,
    pub score_spawn_chance: f64,
    pub score_spawn_delay_ms: u64,
    pub placement_attempts: u32,
    pub min_spacing: f32,
    pub paddle_band: f32,
    pub side_margin: f32,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            permanent_obstacles: Params::PERMANENT_OBSTACLES,
            spawn_interval_ms: Params::OBSTACLE_SPAWN_INTERVAL_MS,
            lifetime_ms: Params::OBSTACLE_LIFETIME_MS,
            max_temporary: Params::MAX_TEMPORARY_OBSTACLES,
            initial_delay_ms: Params::OBSTACLE_INITIAL_DELAY_MS,
            spawn_chance: Params::OBSTACLE_SPAWN_CHANCE,
            hole_chance: Params::OBSTACLE_HOLE_CHANCE,
            spawn_on_score: true,
            score_spawn_chance: Params::SCORE_SPAWN_CHANCE,
            score_spawn_delay_ms: Params::SCORE_SPAWN_DELAY_MS,
            placement_attempts: Params::PLACEMENT_ATTEMPTS,
            min_spacing: Params::OBSTACLE_MIN_SPACING,
            paddle_band: Params::OBSTACLE_PADDLE_BAND,
            side_margin: Params::OBSTACLE_SIDE_MARGIN,
        }
    }
}

/// Game configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub paddle_width: f32,
    pub paddle_height: f32,
    pub paddle_speed: f32,
    pub paddle_margin: f32,
    pub ball_size: f32,
    pub ball_initial_speed: f32,
    pub ball_speed_increment: f32,
    pub ball_max_speed: f32,
    pub win_score: u32,
    pub speed_increase_interval: u32,
    pub obstacles_enabled: bool,
    pub hole_radius: f32,
    pub pole_width: f32,
    pub pole_height: f32,
    pub spawner: SpawnerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            canvas_width: Params::CANVAS_WIDTH,
            canvas_height: Params::CANVAS_HEIGHT,
            paddle_width: Params::PADDLE_WIDTH,
            paddle_height: Params::PADDLE_HEIGHT,
            paddle_speed: Params::PADDLE_SPEED,
            paddle_margin: Params::PADDLE_MARGIN,
            ball_size: Params::BALL_SIZE,
            ball_initial_speed: Params::BALL_INITIAL_SPEED,
            ball_speed_increment: Params::BALL_SPEED_INCREMENT,
            ball_max_speed: Params::BALL_MAX_SPEED,
            win_score: Params::WIN_SCORE,
            speed_increase_interval: Params::SPEED_INCREASE_INTERVAL,
            obstacles_enabled: true,
            hole_radius: Params::HOLE_RADIUS,
            pole_width: Params::POLE_WIDTH,
            pole_height: Params::POLE_HEIGHT,
            spawner: SpawnerConfig::default(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default tuning on a canvas of the given size
    pub fn with_canvas(width: f32, height: f32) -> Self {
        Self {
            canvas_width: width,
            canvas_height: height,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let (width, height) = (self.canvas_width, self.canvas_height);
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(ConfigError::InvalidCanvas { width, height });
        }
        if self.paddle_width > width {
            return Err(ConfigError::PaddleTooWide {
                paddle: self.paddle_width,
                canvas: width,
            });
        }

        let positive = [
            ("paddle_width", self.paddle_width),
            ("paddle_height", self.paddle_height),
            ("paddle_speed", self.paddle_speed),
            ("ball_size", self.ball_size),
            ("ball_initial_speed", self.ball_initial_speed),
            ("ball_max_speed", self.ball_max_speed),
            ("hole_radius", self.hole_radius),
            ("pole_width", self.pole_width),
            ("pole_height", self.pole_height),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidValue { name, value });
            }
        }
        if !(self.ball_speed_increment.is_finite() && self.ball_speed_increment >= 0.0) {
            return Err(ConfigError::InvalidValue {
                name: "ball_speed_increment",
                value: self.ball_speed_increment,
            });
        }

        if self.win_score == 0 {
            return Err(ConfigError::ZeroWinScore);
        }
        if self.speed_increase_interval == 0 {
            return Err(ConfigError::ZeroSpeedInterval);
        }
        if self.spawner.spawn_interval_ms == 0 {
            return Err(ConfigError::ZeroSpawnInterval);
        }

        let (min, max) = self.obstacle_zone();
        if min.x >= max.x || min.y >= max.y {
            return Err(ConfigError::EmptySafeZone { width, height });
        }

        Ok(())
    }

    /// Canvas center, where every serve starts
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.canvas_width / 2.0, self.canvas_height / 2.0)
    }

    /// Fixed Y (top edge) of the paddle guarding the given side
    pub fn paddle_y(&self, side: Side) -> f32 {
        match side {
            Side::Top => self.paddle_margin,
            Side::Bottom => self.canvas_height - self.paddle_margin - self.paddle_height,
        }
    }

    /// Centered starting X (left edge) for either paddle
    pub fn paddle_start_x(&self) -> f32 {
        self.canvas_width / 2.0 - self.paddle_width / 2.0
    }

    /// Clamp paddle X to canvas bounds
    pub fn clamp_paddle_x(&self, x: f32) -> f32 {
        x.min(self.canvas_width - self.paddle_width).max(0.0)
    }

    /// Region where obstacle centers may be placed: clear of the paddle
    /// bands at both goals and of the side walls.
    pub fn obstacle_zone(&self) -> (Vec2, Vec2) {
        let margin = self.spawner.side_margin;
        let band = self.spawner.paddle_band;
        (
            Vec2::new(margin, band),
            Vec2::new(self.canvas_width - margin, self.canvas_height - band),
        )
    }
}
