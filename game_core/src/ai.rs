use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{Ball, GameRng, Paddle, Params};

/// AI skill level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// Unrecognized names fall back to `Medium`
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "easy" => Difficulty::Easy,
            "hard" => Difficulty::Hard,
            _ => Difficulty::Medium,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn reaction_delay_ms(self) -> u64 {
        match self {
            Difficulty::Easy => 150,
            Difficulty::Medium => 80,
            Difficulty::Hard => 30,
        }
    }

    /// Fraction in [0, 1]; lower means a wider random miss
    pub fn prediction_accuracy(self) -> f32 {
        match self {
            Difficulty::Easy => 0.6,
            Difficulty::Medium => 0.8,
            Difficulty::Hard => 0.95,
        }
    }
}

/// Mirror `x` back into `[0, width]` as if it bounced off both walls
pub fn reflect_into_bounds(x: f32, width: f32) -> f32 {
    if !x.is_finite() || width.is_nan() || width <= 0.0 {
        return width.max(0.0) / 2.0;
    }
    let period = 2.0 * width;
    let folded = x.rem_euclid(period);
    if folded > width {
        period - folded
    } else {
        folded
    }
}

/// Drives one paddle toward where the ball is expected to arrive
#[derive(Debug, Clone)]
pub struct AiController {
    difficulty: Difficulty,
    reaction_delay_ms: u64,
    prediction_accuracy: f32,
    last_update_ms: Option<u64>,
}

impl Default for AiController {
    fn default() -> Self {
        Self::new(Difficulty::default())
    }
}

impl AiController {
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            reaction_delay_ms: difficulty.reaction_delay_ms(),
            prediction_accuracy: difficulty.prediction_accuracy(),
            last_update_ms: None,
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
        self.reaction_delay_ms = difficulty.reaction_delay_ms();
        self.prediction_accuracy = difficulty.prediction_accuracy();
    }

    /// Where the ball should cross `paddle_y`, with a difficulty-scaled miss.
    pub fn predict_ball_x(
        &self,
        ball: &Ball,
        paddle_y: f32,
        canvas_width: f32,
        rng: &mut GameRng,
    ) -> f32 {
        if ball.vel.y == 0.0 {
            return canvas_width / 2.0;
        }

        let time_to_reach = (ball.pos.y - paddle_y).abs() / ball.vel.y.abs();
        let predicted = reflect_into_bounds(ball.pos.x + ball.vel.x * time_to_reach, canvas_width);

        let spread = (1.0 - self.prediction_accuracy) * Params::AI_INACCURACY_SCALE;
        let offset = (rng.unit() - 0.5) * spread;

        (predicted + offset).min(canvas_width).max(0.0)
    }

    /// Movement intent in {-1, 0, 1} for the paddle this controller drives.
    /// Reads the ball and paddle without changing them.
    #[allow(clippy::too_many_arguments)]
    pub fn get_movement(
        &mut self,
        ball: &Ball,
        paddle: &Paddle,
        canvas_width: f32,
        _canvas_height: f32,
        is_top_paddle: bool,
        now_ms: u64,
        rng: &mut GameRng,
    ) -> i8 {
        if ball.vel.y == 0.0 || ball.vel.y.is_nan() {
            return 0;
        }

        let approaching = if is_top_paddle {
            ball.vel.y < 0.0
        } else {
            ball.vel.y > 0.0
        };
        let paddle_center = paddle.center_x();

        if !approaching {
            let center = canvas_width / 2.0;
            if (paddle_center - center).abs() < Params::AI_DEAD_ZONE {
                return 0;
            }
            return if paddle_center < center { 1 } else { -1 };
        }

        let target = self.predict_ball_x(ball, paddle.y, canvas_width, rng);

        if let Some(last) = self.last_update_ms {
            if now_ms.saturating_sub(last) < self.reaction_delay_ms {
                return 0;
            }
        }
        self.last_update_ms = Some(now_ms);

        let distance = target - paddle_center;
        trace!(target_x = target, distance, "ai tracking");
        if distance.abs() < Params::AI_DEAD_ZONE {
            0
        } else if distance > 0.0 {
            1
        } else {
            -1
        }
    }
}
