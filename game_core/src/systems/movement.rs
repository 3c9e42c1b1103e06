use hecs::World;

use crate::components::{serve_velocity, Ball, Paddle, Side};
use crate::config::Config;
use crate::resources::GameRng;

/// Slide one paddle by `direction * paddle_speed`, clamped to the canvas.
/// Records the realized displacement ratio used for spin.
pub fn move_paddle(world: &mut World, side: Side, direction: i8, config: &Config) {
    let step = f32::from(direction.signum()) * config.paddle_speed;

    for (_entity, paddle) in world.query_mut::<&mut Paddle>() {
        if paddle.side != side {
            continue;
        }
        let old_x = paddle.x;
        paddle.x = config.clamp_paddle_x(paddle.x + step);
        paddle.velocity = if config.paddle_speed > 0.0 {
            ((paddle.x - old_x) / config.paddle_speed).clamp(-1.0, 1.0)
        } else {
            0.0
        };
    }
}

/// Spin only lasts for the tick in which the paddle moved
pub fn settle_paddles(world: &mut World) {
    for (_entity, paddle) in world.query_mut::<&mut Paddle>() {
        paddle.velocity = 0.0;
    }
}

/// Advance the ball one fixed step
pub fn move_ball(world: &mut World) {
    for (_entity, ball) in world.query_mut::<&mut Ball>() {
        ball.pos += ball.vel;
    }
}

/// Replace a stalled or NaN velocity with a fresh serve direction.
/// Returns true if the ball needed recovering.
pub fn recover_ball_velocity(world: &mut World, config: &Config, rng: &mut GameRng) -> bool {
    let mut recovered = false;
    for (_entity, ball) in world.query_mut::<&mut Ball>() {
        if !ball.has_valid_velocity() {
            ball.vel = serve_velocity(config.ball_initial_speed, rng);
            ball.speed = config.ball_initial_speed;
            recovered = true;
        }
    }
    recovered
}

/// Recenter the ball with a fresh serve
pub fn serve_ball(world: &mut World, config: &Config, rng: &mut GameRng) {
    for (_entity, ball) in world.query_mut::<&mut Ball>() {
        ball.serve(config.center(), config.ball_initial_speed, rng);
    }
}
