//! Room lifecycle - session actors and the room directory

pub mod directory;
pub mod session;

pub use directory::RoomDirectory;
pub use session::{Room, RoomCommand, RoomHandle};

use thiserror::Error;

/// Why a join request was turned down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum JoinError {
    #[error("room not found")]
    RoomNotFound,
    #[error("room is full")]
    RoomFull,
}
