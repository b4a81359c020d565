pub mod board;
pub mod filter;
pub mod reply;
pub mod store;
pub mod sweep;

pub use board::{Board, BoardConfig, BoardError};
pub use filter::{ContentFilter, WordListFilter};
pub use store::{MessageLog, SqliteLog};
