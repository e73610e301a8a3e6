//! Wire protocol message definitions
//! These are the line-delimited JSON types for client-server communication

use serde::{Deserialize, Serialize};

use crate::game::player::PlayerState;

/// Player actions applied on the next simulation tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Swing the stick at the ball
    Hit,
    /// Sink toward the arena center
    Dodge,
}

/// Messages sent from client to server
///
/// Every message is one JSON object per line with a `{"type", "data"}`
/// envelope; `data` is `{}` when a message carries nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ClientMsg {
    /// Open a new room; the creator takes slot 0
    CreateRoom { player_name: String },

    /// Join an existing room by its 4-character code
    JoinRoom {
        room_id: String,
        player_name: String,
    },

    /// Hit or dodge
    PlayerAction { action: Action },

    /// Leave the current room
    LeaveRoom {},
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ServerMsg {
    /// Room opened; the creator is seated at slot 0
    RoomCreated {
        room_id: String,
        player_id: u8,
        players_count: usize,
    },

    /// Join confirmed, with the assigned slot
    RoomJoined {
        room_id: String,
        player_id: u8,
        players_count: usize,
    },

    /// Join refused: the room is at capacity or already playing
    RoomFull {},

    /// Join refused: no live room has this code
    RoomNotFound {},

    /// Lobby roster changed
    RoomUpdate {
        room_id: String,
        players_count: usize,
        max_players: usize,
        player_names: Vec<String>,
    },

    /// All four slots are filled; the round begins
    GameStart {},

    /// Per-tick authoritative state snapshot
    GameState {
        players: Vec<PlayerSnapshot>,
        ball: BallSnapshot,
        game_over: bool,
    },

    /// Round finished; `winner_id` is null on a draw
    GameOver { winner_id: Option<u8> },

    /// A participant left a running game
    PlayerLeft { player_id: u8 },
}

/// Per-player entry in a `game_state` snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub id: u8,
    pub x: f64,
    pub y: f64,
    /// Wire state code, see the [`PlayerState`] conversions below
    pub state: u8,
    /// Stick deflection in degrees
    pub stick_angle: f64,
    pub color: [u8; 3],
}

/// Ball entry in a `game_state` snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BallSnapshot {
    pub x: f64,
    pub y: f64,
    pub is_active: bool,
    pub spawn_timer: f64,
}

/// Raised when a snapshot carries an unknown state code
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown player state code {0}")]
pub struct UnknownStateCode(pub u8);

// The numeric codes are a frozen wire contract; everything inside the
// simulation uses the enum only.
impl From<PlayerState> for u8 {
    fn from(state: PlayerState) -> u8 {
        match state {
            PlayerState::Standing => 1,
            PlayerState::Dodging => 2,
            PlayerState::Swinging => 3,
            PlayerState::Eliminated => 4,
            PlayerState::FlyingOff => 5,
        }
    }
}

impl TryFrom<u8> for PlayerState {
    type Error = UnknownStateCode;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(PlayerState::Standing),
            2 => Ok(PlayerState::Dodging),
            3 => Ok(PlayerState::Swinging),
            4 => Ok(PlayerState::Eliminated),
            5 => Ok(PlayerState::FlyingOff),
            other => Err(UnknownStateCode(other)),
        }
    }
}
