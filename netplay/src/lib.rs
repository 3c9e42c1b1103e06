//! Online play: rooms, transports and the host/guest sync session

pub mod direct;
pub mod lobby;
pub mod relay;
pub mod session;
pub mod transport;

pub use direct::*;
pub use lobby::*;
pub use relay::*;
pub use session::*;
pub use transport::*;
