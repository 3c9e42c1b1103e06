/// Game tuning parameters for top/bottom Pong
#[derive(Debug, Clone, Copy)]
pub struct Params;

impl Params {
    // Canvas
    pub const CANVAS_WIDTH: f32 = 800.0;
    pub const CANVAS_HEIGHT: f32 = 600.0;

    // Paddle
    pub const PADDLE_WIDTH: f32 = 100.0;
    pub const PADDLE_HEIGHT: f32 = 15.0;
    pub const PADDLE_SPEED: f32 = 8.0; // units per tick
    pub const PADDLE_MARGIN: f32 = 20.0; // distance from the goal edge

    // Ball
    pub const BALL_SIZE: f32 = 12.0; // diameter
    pub const BALL_INITIAL_SPEED: f32 = 1.0; // slow serve so nobody concedes instantly
    pub const BALL_SPEED_INCREMENT: f32 = 0.08;
    pub const BALL_MAX_SPEED: f32 = 15.0;

    // Rules
    pub const WIN_SCORE: u32 = 5;
    pub const SPEED_INCREASE_INTERVAL: u32 = 20; // paddle hits per speed step

    // Paddle deflection
    pub const MAX_BOUNCE_ANGLE: f32 = std::f32::consts::PI / 3.0; // ±60° across the paddle
    pub const MAX_SPIN_ANGLE: f32 = std::f32::consts::PI / 6.0; // ±30° from paddle motion
    pub const MAX_TOTAL_ANGLE: f32 = std::f32::consts::PI / 2.4; // ~±75°
    pub const ENGLISH_THRESHOLD: f32 = 0.5;
    pub const ENGLISH_FACTOR: f32 = 0.5;

    // Obstacles
    pub const HOLE_RADIUS: f32 = 30.0;
    pub const POLE_WIDTH: f32 = 10.0;
    pub const POLE_HEIGHT: f32 = 60.0;

    // Dynamic obstacle spawning (milliseconds)
    pub const PERMANENT_OBSTACLES: usize = 2;
    pub const OBSTACLE_SPAWN_INTERVAL_MS: u64 = 8_000;
    pub const OBSTACLE_LIFETIME_MS: u64 = 12_000;
    pub const MAX_TEMPORARY_OBSTACLES: usize = 3;
    pub const OBSTACLE_INITIAL_DELAY_MS: u64 = 5_000;
    pub const OBSTACLE_SPAWN_CHANCE: f64 = 0.7;
    pub const OBSTACLE_HOLE_CHANCE: f64 = 0.4;
    pub const SCORE_SPAWN_CHANCE: f64 = 0.5;
    pub const SCORE_SPAWN_DELAY_MS: u64 = 1_000;
    pub const PLACEMENT_ATTEMPTS: u32 = 50;
    pub const OBSTACLE_MIN_SPACING: f32 = 80.0;
    pub const OBSTACLE_PADDLE_BAND: f32 = 100.0; // kept clear in front of each paddle
    pub const OBSTACLE_SIDE_MARGIN: f32 = 40.0;

    // AI
    pub const AI_DEAD_ZONE: f32 = 5.0;
    pub const AI_INACCURACY_SCALE: f32 = 50.0;
}
