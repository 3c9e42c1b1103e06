use hecs::{Entity, World};
use tracing::{debug, info};

use crate::systems::*;
use crate::{
    create_ball, create_paddle, Ball, Config, ConfigError, Events, GameRng, GameState, Obstacle,
    Paddle, Score, Side,
};

/// Copy of everything a renderer or network layer needs from one tick.
/// Owns its data; changing it never reaches back into the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameSnapshot {
    pub ball: Ball,
    pub paddle1: Paddle,
    pub paddle2: Paddle,
    pub score1: u32,
    pub score2: u32,
    pub state: GameState,
    pub winner: Option<Side>,
    pub hit_count: u32,
}

impl GameSnapshot {
    pub fn paddle(&self, side: Side) -> &Paddle {
        match side {
            Side::Top => &self.paddle1,
            Side::Bottom => &self.paddle2,
        }
    }
}

/// Top/bottom Pong simulation. One `update_ball` call is one fixed step.
pub struct GameEngine {
    config: Config,
    world: World,
    ball: Entity,
    paddles: [Entity; 2],
    score: Score,
    hit_count: u32,
    state: GameState,
    winner: Option<Side>,
    events: Events,
    rng: GameRng,
}

impl GameEngine {
    /// Default tuning on the given canvas, seeded with the default RNG
    pub fn new(canvas_width: f32, canvas_height: f32) -> Self {
        Self::build(
            Config::with_canvas(canvas_width, canvas_height),
            GameRng::default(),
        )
    }

    pub fn with_config(config: Config, rng: GameRng) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config, rng))
    }

    fn build(config: Config, rng: GameRng) -> Self {
        let mut engine = Self {
            config,
            world: World::new(),
            ball: Entity::DANGLING,
            paddles: [Entity::DANGLING; 2],
            score: Score::new(),
            hit_count: 0,
            state: GameState::Ready,
            winner: None,
            events: Events::new(),
            rng,
        };
        engine.reset();
        engine
    }

    /// Fresh serve, centered paddles, zeroed scores, `Ready`
    pub fn reset(&mut self) {
        self.world.clear();

        let mut ball = Ball::new(
            self.config.center(),
            glam::Vec2::ZERO,
            self.config.ball_initial_speed,
            self.config.ball_size,
        );
        ball.serve(
            self.config.center(),
            self.config.ball_initial_speed,
            &mut self.rng,
        );
        self.ball = create_ball(&mut self.world, ball);

        for side in Side::BOTH {
            let paddle = Paddle::new(
                side,
                self.config.paddle_start_x(),
                self.config.paddle_y(side),
                self.config.paddle_width,
                self.config.paddle_height,
            );
            self.paddles[side.index()] = create_paddle(&mut self.world, paddle);
        }

        self.score = Score::new();
        self.hit_count = 0;
        self.state = GameState::Ready;
        self.winner = None;
        self.events.clear();
        debug!("engine reset");
    }

    /// Serve: `Ready` to `Playing`, ignored from any other state
    pub fn start(&mut self) {
        if self.state == GameState::Ready {
            settle_paddles(&mut self.world);
            self.state = GameState::Playing;
            info!("ball in play");
        }
    }

    /// Toggle between `Playing` and `Paused`
    pub fn pause(&mut self) {
        self.state = match self.state {
            GameState::Playing => GameState::Paused,
            GameState::Paused => GameState::Playing,
            other => other,
        };
        settle_paddles(&mut self.world);
    }

    pub fn update_paddle(&mut self, side: Side, direction: i8) {
        move_paddle(&mut self.world, side, direction, &self.config);
    }

    /// Advance the ball one step against the given obstacles.
    /// Only paddle spin is cleared unless `Playing`.
    pub fn update_ball(&mut self, obstacles: &[Obstacle]) {
        self.events.clear();
        if self.state != GameState::Playing {
            settle_paddles(&mut self.world);
            return;
        }

        if recover_ball_velocity(&mut self.world, &self.config, &mut self.rng) {
            self.events.velocity_recovered = true;
            debug!("recovered invalid ball velocity");
        }
        move_ball(&mut self.world);
        check_walls(&mut self.world, &self.config, &mut self.events);

        if self.config.obstacles_enabled
            && check_obstacles(&mut self.world, obstacles, &mut self.events)
        {
            serve_ball(&mut self.world, &self.config, &mut self.rng);
            settle_paddles(&mut self.world);
            self.state = GameState::Ready;
            debug!("ball fell into a hole");
            return;
        }

        check_paddles(
            &mut self.world,
            &self.config,
            &mut self.hit_count,
            &mut self.events,
        );
        if self.events.speed_increased {
            debug!(hits = self.hit_count, speed = self.ball().speed, "ball sped up");
        }

        if let Some(side) = check_goals(
            &mut self.world,
            &self.config,
            &mut self.score,
            &mut self.events,
            &mut self.rng,
        ) {
            debug!(
                scorer = side.number(),
                score1 = self.score.score1,
                score2 = self.score.score2,
                "goal"
            );
            self.check_game_over();
        }

        settle_paddles(&mut self.world);
    }

    fn check_game_over(&mut self) {
        match self.score.has_winner(self.config.win_score) {
            Some(winner) => {
                self.state = GameState::GameOver;
                self.winner = Some(winner);
                info!(winner = winner.number(), "game over");
            }
            None => self.state = GameState::Ready,
        }
    }

    pub fn get_state(&self) -> GameSnapshot {
        GameSnapshot {
            ball: self.ball(),
            paddle1: self.paddle(Side::Top),
            paddle2: self.paddle(Side::Bottom),
            score1: self.score.score1,
            score2: self.score.score2,
            state: self.state,
            winner: self.winner,
            hit_count: self.hit_count,
        }
    }

    pub fn ball(&self) -> Ball {
        self.world
            .get::<&Ball>(self.ball)
            .map(|ball| *ball)
            .unwrap_or_else(|_| {
                Ball::new(
                    self.config.center(),
                    glam::Vec2::ZERO,
                    self.config.ball_initial_speed,
                    self.config.ball_size,
                )
            })
    }

    pub fn paddle(&self, side: Side) -> Paddle {
        self.world
            .get::<&Paddle>(self.paddles[side.index()])
            .map(|paddle| *paddle)
            .unwrap_or_else(|_| {
                Paddle::new(
                    side,
                    self.config.paddle_start_x(),
                    self.config.paddle_y(side),
                    self.config.paddle_width,
                    self.config.paddle_height,
                )
            })
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn winner(&self) -> Option<Side> {
        self.winner
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn hit_count(&self) -> u32 {
        self.hit_count
    }

    /// Events recorded by the last `update_ball`
    pub fn events(&self) -> &Events {
        &self.events
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // Remote state. These writes come from the authoritative peer and skip
    // physics and clamping.

    /// Overwrite the ball wholesale with a remote snapshot
    pub fn apply_ball_snapshot(&mut self, ball: Ball) {
        if let Ok(mut current) = self.world.get::<&mut Ball>(self.ball) {
            *current = ball;
        }
    }

    pub fn set_paddle_x_unclamped(&mut self, side: Side, x: f32) {
        if let Ok(mut paddle) = self.world.get::<&mut Paddle>(self.paddles[side.index()]) {
            paddle.x = x;
        }
    }

    pub fn set_scores(&mut self, score1: u32, score2: u32) {
        self.score = Score { score1, score2 };
    }

    pub fn apply_game_over(&mut self, winner: Side) {
        if self.state != GameState::GameOver {
            info!(winner = winner.number(), "game over from remote");
        }
        self.state = GameState::GameOver;
        self.winner = Some(winner);
    }

    /// Pause regardless of the current state; a finished game stays finished
    pub fn force_pause(&mut self) {
        if self.state != GameState::GameOver {
            self.state = GameState::Paused;
        }
    }
}
