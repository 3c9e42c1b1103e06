use glam::Vec2;
use hecs::World;

use crate::{Aabb, Ball, Config, Events, Obstacle, ObstacleKind, Paddle, Params, Side};

/// Reflect the ball off the left/right walls, keeping it `size` away from them
pub fn check_walls(world: &mut World, config: &Config, events: &mut Events) {
    for (_entity, ball) in world.query_mut::<&mut Ball>() {
        let min_x = ball.size;
        let max_x = config.canvas_width - ball.size;
        if ball.pos.x <= min_x || ball.pos.x >= max_x {
            ball.vel.x = -ball.vel.x;
            ball.pos.x = ball.pos.x.min(max_x).max(min_x);
            events.wall_hit = true;
        }
    }
}

/// Ball has fallen in: its center is deeper than one ball radius inside the rim
pub fn ball_in_hole(ball: &Ball, center: Vec2, radius: f32) -> bool {
    ball.pos.distance(center) < radius - ball.radius()
}

/// Bounce the ball off an axis-aligned pole.
///
/// The edge with the smallest penetration is treated as the contact normal.
/// Equal overlaps resolve in left, right, top, bottom order. Returns true on
/// contact.
pub fn resolve_pole(ball: &mut Ball, pole: &Aabb) -> bool {
    let r = ball.radius();
    let ball_box = Aabb::from_center_size(ball.pos, Vec2::splat(ball.size));
    if !ball_box.touches(pole) {
        return false;
    }
    let (left, right) = (pole.min.x, pole.max.x);
    let (top, bottom) = (pole.min.y, pole.max.y);

    let overlap_left = (ball.pos.x + r) - left;
    let overlap_right = right - (ball.pos.x - r);
    let overlap_top = (ball.pos.y + r) - top;
    let overlap_bottom = bottom - (ball.pos.y - r);
    let min_overlap = overlap_left
        .min(overlap_right)
        .min(overlap_top)
        .min(overlap_bottom);

    if min_overlap == overlap_left {
        ball.vel.x = -ball.vel.x;
        ball.pos.x = left - r;
    } else if min_overlap == overlap_right {
        ball.vel.x = -ball.vel.x;
        ball.pos.x = right + r;
    } else if min_overlap == overlap_top {
        ball.vel.y = -ball.vel.y;
        ball.pos.y = top - r;
    } else {
        ball.vel.y = -ball.vel.y;
        ball.pos.y = bottom + r;
    }
    true
}

/// Resolve the ball against every obstacle in order.
/// Returns true as soon as the ball drops into a hole; later obstacles are skipped.
pub fn check_obstacles(world: &mut World, obstacles: &[Obstacle], events: &mut Events) -> bool {
    for (_entity, ball) in world.query_mut::<&mut Ball>() {
        for obstacle in obstacles {
            match obstacle.kind {
                ObstacleKind::Hole { radius } => {
                    if ball_in_hole(ball, obstacle.pos, radius) {
                        events.hole_absorbed = true;
                        return true;
                    }
                }
                ObstacleKind::Pole { .. } => {
                    if resolve_pole(ball, &obstacle.bounds()) {
                        events.pole_hit = true;
                    }
                }
            }
        }
    }
    false
}

/// Ball's leading edge is inside the paddle's band, it overlaps the paddle
/// horizontally, and it is travelling toward that paddle's goal.
pub fn paddle_intercepts(ball: &Ball, paddle: &Paddle) -> bool {
    let r = ball.radius();
    let overlaps_x = ball.pos.x + r >= paddle.left() && ball.pos.x - r <= paddle.right();
    if !overlaps_x {
        return false;
    }

    match paddle.side {
        Side::Top => {
            let edge = ball.pos.y - r;
            ball.vel.y < 0.0 && edge <= paddle.bottom() && edge >= paddle.top()
        }
        Side::Bottom => {
            let edge = ball.pos.y + r;
            ball.vel.y > 0.0 && edge >= paddle.top() && edge <= paddle.bottom()
        }
    }
}

/// Send the ball back off a paddle at the ball's scalar speed.
///
/// Where the ball lands sets the base angle; a sliding paddle adds spin.
pub fn deflect_off_paddle(ball: &mut Ball, paddle: &Paddle) {
    let hit_pos = (ball.pos.x - paddle.x) / paddle.width;
    let angle = (hit_pos - 0.5) * Params::MAX_BOUNCE_ANGLE
        + paddle.velocity * Params::MAX_SPIN_ANGLE;
    let angle = angle.clamp(-Params::MAX_TOTAL_ANGLE, Params::MAX_TOTAL_ANGLE);

    // Away from the paddle that was hit
    let away = match paddle.side {
        Side::Top => 1.0,
        Side::Bottom => -1.0,
    };
    ball.vel = Vec2::new(angle.sin() * ball.speed, away * angle.cos() * ball.speed);

    if paddle.velocity.abs() > Params::ENGLISH_THRESHOLD {
        ball.vel.x += paddle.velocity * Params::ENGLISH_FACTOR;
    }
}

/// Step the scalar speed up (capped) and rescale the velocity to match.
/// Returns false when already at the cap.
pub fn increase_ball_speed(ball: &mut Ball, config: &Config) -> bool {
    if ball.speed >= config.ball_max_speed {
        return false;
    }
    ball.speed = (ball.speed + config.ball_speed_increment).min(config.ball_max_speed);

    let current = ball.vel.length();
    if current > 0.0 {
        ball.vel *= ball.speed / current;
    }
    true
}

/// Top paddle first, then bottom
pub fn check_paddles(world: &mut World, config: &Config, hit_count: &mut u32, events: &mut Events) {
    let mut paddles: Vec<Paddle> = world
        .query::<&Paddle>()
        .iter()
        .map(|(_e, paddle)| *paddle)
        .collect();
    paddles.sort_by_key(|paddle| paddle.side.index());

    let interval = config.speed_increase_interval.max(1);

    for (_entity, ball) in world.query_mut::<&mut Ball>() {
        for paddle in &paddles {
            if !paddle_intercepts(ball, paddle) {
                continue;
            }
            deflect_off_paddle(ball, paddle);
            events.paddle_hit = Some(paddle.side);

            *hit_count += 1;
            if *hit_count % interval == 0 && increase_ball_speed(ball, config) {
                events.speed_increased = true;
            }
        }
    }
}
