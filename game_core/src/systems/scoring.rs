use crate::{Ball, Config, Events, GameRng, Score, Side};
use hecs::World;

/// Check if the ball left through a goal line.
/// Awards the point, re-serves from center and returns the scoring side.
pub fn check_goals(
    world: &mut World,
    config: &Config,
    score: &mut Score,
    events: &mut Events,
    rng: &mut GameRng,
) -> Option<Side> {
    let mut scorer = None;
    for (_entity, ball) in world.query_mut::<&mut Ball>() {
        // Past the top goal line: the bottom player scores, and vice versa
        let side = if ball.pos.y < 0.0 {
            Side::Bottom
        } else if ball.pos.y > config.canvas_height {
            Side::Top
        } else {
            continue;
        };

        score.increment(side);
        events.goal = Some(side);
        ball.serve(config.center(), config.ball_initial_speed, rng);
        scorer = Some(side);
    }
    scorer
}
