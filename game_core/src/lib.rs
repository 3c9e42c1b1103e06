pub mod ai;
pub mod components;
pub mod config;
pub mod driver;
pub mod engine;
pub mod leaderboard;
pub mod map;
pub mod params;
pub mod resources;
pub mod spawner;
pub mod systems;

pub use ai::*;
pub use components::*;
pub use config::*;
pub use driver::*;
pub use engine::*;
pub use leaderboard::*;
pub use map::*;
pub use params::*;
pub use resources::*;
pub use spawner::*;

use hecs::World;

/// Helper to create a paddle entity
pub fn create_paddle(world: &mut World, paddle: Paddle) -> hecs::Entity {
    world.spawn((paddle,))
}

/// Helper to create the ball entity
pub fn create_ball(world: &mut World, ball: Ball) -> hecs::Entity {
    world.spawn((ball,))
}
