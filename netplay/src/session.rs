//! Host/guest online session
//!
//! The host runs the physics and pushes ball, score and game-over to the
//! guest. The guest only steers its own paddle and mirrors whatever the host
//! sends; there is no sequencing or smoothing, the last message wins.

use game_core::{
    Ball, Config, ConfigError, GameMode, GameState, Match, ResultReporter, Side, TickInput,
};
use glam::Vec2;
use proto::{BallState, PeerMessage};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::transport::{Transport, TransportKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// Room creator, player 1, top paddle, authoritative
    Host,
    /// Joiner, player 2, bottom paddle
    Guest,
}

impl Role {
    /// Room creator is player 1 and hosts
    pub fn from_player_number(player_number: u8) -> Option<Self> {
        match player_number {
            1 => Some(Role::Host),
            2 => Some(Role::Guest),
            _ => None,
        }
    }

    pub fn side(self) -> Side {
        match self {
            Role::Host => Side::Top,
            Role::Guest => Side::Bottom,
        }
    }

    pub fn player_number(self) -> u8 {
        self.side().number()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub room_id: String,
    pub player_name: String,
    pub opponent_name: String,
}

pub fn ball_to_wire(ball: &Ball) -> BallState {
    BallState {
        x: ball.pos.x,
        y: ball.pos.y,
        vx: ball.vel.x,
        vy: ball.vel.y,
        speed: ball.speed,
        size: ball.size,
    }
}

pub fn ball_from_wire(state: &BallState) -> Ball {
    Ball::new(
        Vec2::new(state.x, state.y),
        Vec2::new(state.vx, state.vy),
        state.speed,
        state.size,
    )
}

/// One peer's end of an online game
pub struct Session {
    role: Role,
    room_id: String,
    game: Match,
    transport: Box<dyn Transport>,
    last_paddle_x: f32,
    game_over_sent: bool,
    active: bool,
}

impl Session {
    pub fn new(
        role: Role,
        session: SessionConfig,
        config: Config,
        transport: Box<dyn Transport>,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        let (top, bottom) = match role {
            Role::Host => (session.player_name, session.opponent_name),
            Role::Guest => (session.opponent_name, session.player_name),
        };
        let game = Match::new(config, GameMode::Online(role.side()), seed)?.with_players(top, bottom);
        let last_paddle_x = game.engine().paddle(role.side()).x;

        info!(
            room = %session.room_id,
            ?role,
            transport = transport.kind().as_str(),
            "session opened"
        );

        Ok(Self {
            role,
            room_id: session.room_id,
            game,
            transport,
            last_paddle_x,
            game_over_sent: false,
            active: true,
        })
    }

    pub fn with_reporter(mut self, reporter: impl ResultReporter + 'static) -> Self {
        self.game = self.game.with_reporter(reporter);
        self
    }

    /// Lay out the obstacle field. Only the host owns one.
    pub fn begin(&mut self, now_ms: u64) {
        if self.role == Role::Host {
            self.game.begin(now_ms);
        }
    }

    pub fn start(&mut self) {
        self.game.engine_mut().start();
    }

    /// One tick: apply what arrived, move our paddle, and on the host step
    /// the ball and publish the result
    pub fn tick(&mut self, direction: i8, now_ms: u64) {
        if !self.active {
            return;
        }

        for msg in self.transport.drain() {
            self.apply(msg, now_ms);
            if !self.active {
                return;
            }
        }

        let side = self.role.side();
        let input = match side {
            Side::Top => TickInput {
                top: direction,
                bottom: 0,
            },
            Side::Bottom => TickInput {
                top: 0,
                bottom: direction,
            },
        };
        self.game.steer(input);

        let x = self.game.engine().paddle(side).x;
        if x != self.last_paddle_x {
            let direction = if x > self.last_paddle_x { 1 } else { -1 };
            self.last_paddle_x = x;
            self.send(PeerMessage::PaddleMove {
                player_number: side.number(),
                x,
                direction,
            });
        }

        if self.role == Role::Host {
            self.publish(now_ms);
        }
        self.game.report_if_finished();
    }

    fn publish(&mut self, now_ms: u64) {
        self.game.simulate(now_ms);
        let engine = self.game.engine();

        let ball = (engine.state() == GameState::Playing).then(|| ball_to_wire(&engine.ball()));
        let score = engine.score();
        let winner = match engine.state() {
            GameState::GameOver => engine.winner(),
            _ => None,
        };

        if let Some(ball) = ball {
            self.send(PeerMessage::BallState(ball));
        }
        self.send(PeerMessage::Score {
            score1: score.score1,
            score2: score.score2,
        });
        if let Some(winner) = winner {
            if !self.game_over_sent {
                self.game_over_sent = true;
                self.send(PeerMessage::GameOver {
                    winner: winner.number(),
                });
            }
        }
    }

    /// Apply one message from the other peer. Malformed messages are dropped.
    pub fn apply(&mut self, msg: PeerMessage, now_ms: u64) {
        if !msg.is_well_formed() {
            warn!(kind = msg.kind().as_str(), "dropping malformed message");
            return;
        }

        let own = self.role.side();
        match msg {
            PeerMessage::PaddleMove { player_number, x, .. } => {
                match Side::from_number(player_number) {
                    Some(side) if side != own => {
                        self.game.engine_mut().set_paddle_x_unclamped(side, x);
                    }
                    _ => debug!(player_number, "ignoring move for our own paddle"),
                }
            }
            PeerMessage::BallState(state) => {
                if self.role == Role::Guest {
                    self.game.engine_mut().apply_ball_snapshot(ball_from_wire(&state));
                }
            }
            PeerMessage::Score { score1, score2 } => {
                if self.role == Role::Guest {
                    self.game.engine_mut().set_scores(score1, score2);
                }
            }
            PeerMessage::GameOver { winner } => {
                if self.role == Role::Guest {
                    if let Some(winner) = Side::from_number(winner) {
                        self.game.engine_mut().apply_game_over(winner);
                    }
                }
            }
            PeerMessage::Restart => self.restart(now_ms),
            PeerMessage::OpponentDisconnected => {
                info!(room = %self.room_id, "opponent disconnected");
                self.game.engine_mut().force_pause();
                self.game.shutdown();
                self.active = false;
            }
        }
    }

    fn restart(&mut self, now_ms: u64) {
        match self.role {
            Role::Host => self.game.restart(now_ms),
            Role::Guest => self.game.reset(),
        }
        self.game_over_sent = false;
        self.last_paddle_x = self.game.engine().paddle(self.role.side()).x;
        info!(room = %self.room_id, "game restarted");
    }

    /// Ask both peers to reset. Only the host may; returns whether the
    /// request went out.
    pub fn request_restart(&mut self) -> bool {
        if self.role != Role::Host {
            warn!("only the host can restart");
            return false;
        }
        self.send(PeerMessage::Restart)
    }

    /// Leave the room and stop every timer
    pub fn leave(&mut self) {
        if !self.active {
            return;
        }
        self.transport.close();
        self.game.shutdown();
        self.active = false;
        info!(room = %self.room_id, "left session");
    }

    fn send(&mut self, msg: PeerMessage) -> bool {
        match self.transport.send(&msg) {
            Ok(()) => true,
            Err(e) => {
                warn!(kind = msg.kind().as_str(), error = %e, "send failed");
                false
            }
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn transport_kind(&self) -> TransportKind {
        self.transport.kind()
    }

    pub fn game(&self) -> &Match {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut Match {
        &mut self.game
    }
}
