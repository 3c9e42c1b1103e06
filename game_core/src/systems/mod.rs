pub mod collision;
pub mod gc;
pub mod movement;
pub mod scoring;

pub use collision::*;
pub use gc::*;
pub use movement::*;
pub use scoring::*;
