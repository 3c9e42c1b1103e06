use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    AiController, Config, ConfigError, Difficulty, GameEngine, GameRng, GameState, Obstacle,
    ObstacleSpawner, Side,
};

/// How the two paddles are driven
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMode {
    /// Both paddles from local input
    TwoPlayer,
    /// Local player at the bottom, AI at the top
    VsAi(Difficulty),
    /// One local paddle; the other arrives over the network
    Online(Side),
}

impl GameMode {
    /// Name recorded with results
    pub fn label(&self) -> &'static str {
        match self {
            GameMode::TwoPlayer => "2player",
            GameMode::VsAi(_) => "ai",
            GameMode::Online(_) => "online",
        }
    }

    /// Sides steered by local input
    pub fn local_sides(&self) -> &'static [Side] {
        match self {
            GameMode::TwoPlayer => &Side::BOTH,
            GameMode::VsAi(_) => &[Side::Bottom],
            GameMode::Online(Side::Top) => &[Side::Top],
            GameMode::Online(Side::Bottom) => &[Side::Bottom],
        }
    }
}

/// Directional intent per paddle for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub top: i8,
    pub bottom: i8,
}

impl TickInput {
    pub fn get(&self, side: Side) -> i8 {
        match side {
            Side::Top => self.top,
            Side::Bottom => self.bottom,
        }
    }
}

/// One finished game from a single player's point of view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    pub player_name: String,
    pub won: bool,
    pub final_score: u32,
    pub opponent_name: String,
    pub mode: String,
}

/// Receives finished games. Fire-and-forget; nothing flows back.
pub trait ResultReporter {
    fn report(&mut self, result: &GameResult);
}

impl<R: ResultReporter> ResultReporter for Rc<RefCell<R>> {
    fn report(&mut self, result: &GameResult) {
        self.borrow_mut().report(result);
    }
}

/// Engine, obstacle field and optional AI wired together for one mode
pub struct Match {
    mode: GameMode,
    engine: GameEngine,
    spawner: ObstacleSpawner,
    ai: Option<AiController>,
    rng: GameRng,
    names: [String; 2],
    reporter: Option<Box<dyn ResultReporter>>,
    reported: bool,
}

impl Match {
    pub fn new(config: Config, mode: GameMode, seed: u64) -> Result<Self, ConfigError> {
        let spawner = ObstacleSpawner::new(&config);
        let engine = GameEngine::with_config(config, GameRng::new(seed))?;
        let ai = match mode {
            GameMode::VsAi(difficulty) => Some(AiController::new(difficulty)),
            _ => None,
        };
        let names = match mode {
            GameMode::VsAi(difficulty) => [format!("AI ({})", difficulty.as_str()), "Player".to_string()],
            _ => ["Player 1".to_string(), "Player 2".to_string()],
        };

        Ok(Self {
            mode,
            engine,
            spawner,
            ai,
            rng: GameRng::new(seed.wrapping_add(1)),
            names,
            reporter: None,
            reported: false,
        })
    }

    pub fn with_players(mut self, top: impl Into<String>, bottom: impl Into<String>) -> Self {
        self.names = [top.into(), bottom.into()];
        self
    }

    pub fn with_reporter(mut self, reporter: impl ResultReporter + 'static) -> Self {
        self.reporter = Some(Box::new(reporter));
        self
    }

    /// Lay out the obstacle field and start its timers
    pub fn begin(&mut self, now_ms: u64) {
        if self.engine.config().obstacles_enabled {
            self.spawner.begin_game(now_ms, &mut self.rng);
        }
        info!(mode = self.mode.label(), "match started");
    }

    /// Apply local input to the paddles this mode lets the player steer.
    /// Zero intents are skipped.
    pub fn steer(&mut self, input: TickInput) {
        for &side in self.mode.local_sides() {
            let direction = input.get(side);
            if direction != 0 {
                self.engine.update_paddle(side, direction);
            }
        }
    }

    /// Let the AI move the top paddle. Only acts while the ball is in play.
    pub fn drive_ai(&mut self, now_ms: u64) {
        let Some(ai) = self.ai.as_mut() else {
            return;
        };
        if self.engine.state() != GameState::Playing {
            return;
        }

        let snapshot = self.engine.get_state();
        let config = self.engine.config();
        let direction = ai.get_movement(
            &snapshot.ball,
            &snapshot.paddle1,
            config.canvas_width,
            config.canvas_height,
            true,
            now_ms,
            &mut self.rng,
        );
        if direction != 0 {
            self.engine.update_paddle(Side::Top, direction);
        }
    }

    /// Advance obstacle timers and the ball by one step
    pub fn simulate(&mut self, now_ms: u64) {
        self.spawner.update(now_ms, &mut self.rng);

        let obstacles = self.spawner.obstacles();
        self.engine.update_ball(&obstacles);

        if self.engine.events().goal.is_some() {
            self.spawner.on_score_change(now_ms, &mut self.rng);
        }
        self.report_if_finished();
    }

    /// One full local tick: input, AI, physics
    pub fn tick(&mut self, input: TickInput, now_ms: u64) {
        self.steer(input);
        self.drive_ai(now_ms);
        self.simulate(now_ms);
    }

    /// Report the result once per game, for every locally controlled side
    pub fn report_if_finished(&mut self) {
        if self.reported || self.engine.state() != GameState::GameOver {
            return;
        }
        let Some(winner) = self.engine.winner() else {
            return;
        };
        self.reported = true;

        let score = self.engine.score();
        info!(
            winner = winner.number(),
            score1 = score.score1,
            score2 = score.score2,
            "match finished"
        );

        let Some(reporter) = self.reporter.as_mut() else {
            return;
        };
        for &side in self.mode.local_sides() {
            reporter.report(&GameResult {
                player_name: self.names[side.index()].clone(),
                won: winner == side,
                final_score: score.get(side),
                opponent_name: self.names[side.opponent().index()].clone(),
                mode: self.mode.label().to_string(),
            });
        }
    }

    /// Back to 0-0 in `Ready`; the obstacle field is left alone
    pub fn reset(&mut self) {
        self.engine.reset();
        self.reported = false;
    }

    /// Fresh game with a new obstacle field
    pub fn restart(&mut self, now_ms: u64) {
        self.reset();
        self.begin(now_ms);
    }

    /// Stop every timer; the match does nothing further until `restart`
    pub fn shutdown(&mut self) {
        self.spawner.cancel();
        info!(mode = self.mode.label(), "match shut down");
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        if let Some(ai) = self.ai.as_mut() {
            ai.set_difficulty(difficulty);
            self.mode = GameMode::VsAi(difficulty);
        }
    }

    pub fn obstacles(&self) -> Vec<Obstacle> {
        self.spawner.obstacles()
    }

    /// Obstacles to draw. Holes stay hidden until the first paddle hit but
    /// still collide.
    pub fn visible_obstacles(&self) -> Vec<Obstacle> {
        let hits = self.engine.hit_count();
        self.spawner
            .obstacles()
            .into_iter()
            .filter(|obstacle| obstacle.is_visible(hits))
            .collect()
    }

    pub fn spawner(&self) -> &ObstacleSpawner {
        &self.spawner
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn engine(&self) -> &GameEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut GameEngine {
        &mut self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[derive(Default)]
    struct Collected(Vec<GameResult>);

    impl ResultReporter for Collected {
        fn report(&mut self, result: &GameResult) {
            self.0.push(result.clone());
        }
    }

    fn quiet_config() -> Config {
        let mut config = Config::new();
        config.obstacles_enabled = false;
        config
    }

    /// Put the ball one step from the top goal line
    fn shoot_at_top(game: &mut Match) {
        let engine = game.engine_mut();
        let mut ball = engine.ball();
        ball.pos = Vec2::new(400.0, 1.0);
        ball.vel = Vec2::new(0.0, -2.0);
        engine.apply_ball_snapshot(ball);
    }

    #[test]
    fn test_mode_labels() {
        assert_eq!(GameMode::TwoPlayer.label(), "2player");
        assert_eq!(GameMode::VsAi(Difficulty::Hard).label(), "ai");
        assert_eq!(GameMode::Online(Side::Top).label(), "online");
    }

    #[test]
    fn test_steer_only_local_sides() {
        let mut game = Match::new(quiet_config(), GameMode::VsAi(Difficulty::Easy), 1).expect("valid");
        let start = game.engine().paddle(Side::Top).x;

        game.steer(TickInput { top: 1, bottom: -1 });

        assert_eq!(game.engine().paddle(Side::Top).x, start, "AI owns the top paddle");
        assert_eq!(game.engine().paddle(Side::Bottom).x, start - 8.0);
    }

    #[test]
    fn test_ai_idle_until_playing() {
        let mut game = Match::new(quiet_config(), GameMode::VsAi(Difficulty::Hard), 1).expect("valid");
        let start = game.engine().paddle(Side::Top).x;
        let mut ball = game.engine().ball();
        ball.vel = Vec2::new(0.0, -1.0);
        ball.pos = Vec2::new(100.0, 300.0);
        game.engine_mut().apply_ball_snapshot(ball);

        game.drive_ai(0);
        assert_eq!(game.engine().paddle(Side::Top).x, start);

        game.engine_mut().start();
        game.drive_ai(0);
        assert!(game.engine().paddle(Side::Top).x < start, "AI chases the ball left");
    }

    #[test]
    fn test_result_reported_once() {
        let collected = Rc::new(RefCell::new(Collected::default()));
        let mut game = Match::new(quiet_config(), GameMode::VsAi(Difficulty::Medium), 1)
            .expect("valid")
            .with_players("CPU", "alice")
            .with_reporter(collected.clone());
        game.begin(0);
        game.engine_mut().set_scores(1, 4);
        game.engine_mut().start();
        shoot_at_top(&mut game);

        game.simulate(16);
        game.simulate(32);
        game.report_if_finished();

        let results = &collected.borrow().0;
        assert_eq!(results.len(), 1, "Exactly one report per game");
        assert_eq!(
            results[0],
            GameResult {
                player_name: "alice".into(),
                won: true,
                final_score: 5,
                opponent_name: "CPU".into(),
                mode: "ai".into(),
            }
        );
    }

    #[test]
    fn test_two_player_reports_both_sides() {
        let collected = Rc::new(RefCell::new(Collected::default()));
        let mut game = Match::new(quiet_config(), GameMode::TwoPlayer, 1)
            .expect("valid")
            .with_reporter(collected.clone());
        game.engine_mut().set_scores(0, 4);
        game.engine_mut().start();
        shoot_at_top(&mut game);

        game.tick(TickInput::default(), 0);

        let results = &collected.borrow().0;
        assert_eq!(results.len(), 2);
        assert!(results.iter().any(|r| r.player_name == "Player 2" && r.won));
        assert!(results.iter().any(|r| r.player_name == "Player 1" && !r.won));
    }

    #[test]
    fn test_restart_rearms_reporting() {
        let collected = Rc::new(RefCell::new(Collected::default()));
        let mut game = Match::new(quiet_config(), GameMode::Online(Side::Bottom), 1)
            .expect("valid")
            .with_reporter(collected.clone());

        for now in [0, 1000] {
            game.restart(now);
            game.engine_mut().set_scores(0, 4);
            game.engine_mut().start();
            shoot_at_top(&mut game);
            game.simulate(now);
        }
        assert_eq!(collected.borrow().0.len(), 2);
    }

    #[test]
    fn test_begin_lays_out_obstacles_and_shutdown_stops_timers() {
        let mut game = Match::new(Config::new(), GameMode::TwoPlayer, 3).expect("valid");
        game.begin(0);
        assert_eq!(game.obstacles().len(), 2);
        assert!(game.spawner().is_running());

        game.shutdown();
        assert!(!game.spawner().is_running());
    }

    #[test]
    fn test_holes_hidden_until_first_hit() {
        let mut game = Match::new(Config::new(), GameMode::TwoPlayer, 3).expect("valid");
        game.begin(0);
        let visible = game.visible_obstacles();
        assert_eq!(visible.len(), 1, "Only the pole shows before any hit");
        assert!(!visible[0].is_hole());

        // Straight into the bottom paddle's center
        let engine = game.engine_mut();
        engine.start();
        let mut ball = engine.ball();
        ball.pos = Vec2::new(400.0, 560.0);
        ball.vel = Vec2::new(0.0, ball.speed);
        engine.apply_ball_snapshot(ball);
        game.simulate(16);

        assert_eq!(game.engine().hit_count(), 1);
        assert_eq!(game.visible_obstacles(), game.obstacles());
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut config = Config::new();
        config.canvas_width = -1.0;
        assert!(Match::new(config, GameMode::TwoPlayer, 1).is_err());
    }

    #[test]
    fn test_set_difficulty_updates_mode() {
        let mut game = Match::new(quiet_config(), GameMode::VsAi(Difficulty::Easy), 1).expect("valid");
        game.set_difficulty(Difficulty::Hard);
        assert_eq!(game.mode(), GameMode::VsAi(Difficulty::Hard));

        let mut two = Match::new(quiet_config(), GameMode::TwoPlayer, 1).expect("valid");
        two.set_difficulty(Difficulty::Hard);
        assert_eq!(two.mode(), GameMode::TwoPlayer, "No AI to retune");
    }
}
