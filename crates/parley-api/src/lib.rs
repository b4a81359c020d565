pub mod board;
pub mod error;
pub mod hub;
pub mod middleware;

pub use board::{BoardState, BoardStateInner, board_router};
pub use error::ApiError;
pub use hub::{HubState, HubStateInner, hub_router};
