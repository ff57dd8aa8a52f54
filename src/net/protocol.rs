use serde::{Deserialize, Serialize};

use crate::game::state::{EntitySnapshot, Player, PlayerId, SessionId};
use crate::util::rect::Rect;

/// Messages from client to server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClientMessage {
    /// Start a new session and join it
    CreateGame,
    /// Join an existing session by id (case-insensitive)
    JoinGame { id: String },
    /// Leave the named session
    LeaveGame { id: String },
    /// Mark this player ready for the first wave
    Ready,
    /// Fire a bullet
    Click,
    /// Horizontal mouse movement since the last event
    MouseMove { dx: f32 },
}

/// Messages from server to client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ServerMessage {
    /// Session created; the creator is already joined
    GameCreated { id: SessionId },
    GameJoined { id: SessionId },
    /// The join was refused. Echoes the normalized id when the session is
    /// unknown and the id as sent when it is malformed.
    JoinFailed { id: String },
    /// Full entity state, once per tick
    UpdateEntities(EntitySnapshot),
    RemovePlayer { player_id: PlayerId },
    /// 1-based wave number
    BeginWave { wave: u32 },
    /// A bomb killed `player`
    Death { id: PlayerId, player: Player },
    /// Last player died
    Gameover,
    /// An enemy was destroyed at `position`
    Explosion { position: Rect },
}

impl ServerMessage {
    /// Short name for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            ServerMessage::GameCreated { .. } => "game_created",
            ServerMessage::GameJoined { .. } => "game_joined",
            ServerMessage::JoinFailed { .. } => "join_failed",
            ServerMessage::UpdateEntities(_) => "update_entities",
            ServerMessage::RemovePlayer { .. } => "remove_player",
            ServerMessage::BeginWave { .. } => "begin_wave",
            ServerMessage::Death { .. } => "death",
            ServerMessage::Gameover => "gameover",
            ServerMessage::Explosion { .. } => "explosion",
        }
    }
}

/// Encode a message using bincode
/// Uses legacy config for fixed-size integers (compatible with the browser client)
pub fn encode<T: Serialize>(message: &T) -> Result<Vec<u8>, EncodeError> {
    bincode::serde::encode_to_vec(message, bincode::config::legacy())
        .map_err(|e| EncodeError(e.to_string()))
}

/// Decode a message using bincode
pub fn decode<T: for<'de> Deserialize<'de>>(data: &[u8]) -> Result<T, DecodeError> {
    bincode::serde::decode_from_slice(data, bincode::config::legacy())
        .map(|(msg, _)| msg)
        .map_err(|e| DecodeError(e.to_string()))
}

#[derive(Debug, thiserror::Error)]
#[error("Encode error: {0}")]
pub struct EncodeError(String);

#[derive(Debug, thiserror::Error)]
#[error("Decode error: {0}")]
pub struct DecodeError(String);
