use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Messages decoded from a client websocket frame. The transport layer tags
/// each with the room/player identity it was received on before dispatching.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    RoomRequest { player_name: PlayerName },
    JoinRequest { player_name: PlayerName, room_id: RoomId },
    StartRequest,
    WordRequest { word: String },
    Guess { guess: String },
    CanvasData { data: serde_json::Value },
}

/// Messages emitted by the game core, serialized as-is onto the socket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    RoomAnswer { player_name: PlayerName, room: RoomView },
    JoinAnswer { player_name: PlayerName, room: RoomView },
    Error { error: ErrorKind },
    State { room: RoomView },
    Timer { time: u64 },
    Log(LogEntry),
    ChooseWord { words: Vec<String> },
    DrawWord { word: String },
}

/// One entry of a room's chat/system feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub log_type: LogType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_name: Option<PlayerName>,
    pub text: String,
}

impl LogEntry {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            log_type: LogType::System,
            player_name: None,
            text: text.into(),
        }
    }

    pub fn player(name: PlayerName, text: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            log_type: LogType::Player,
            player_name: Some(name),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogType {
    System,
    Player,
}

/// The seven phases of a room's turn cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TurnState {
    Inactive,
    StartOfRound,
    ChoosingWord,
    Drawing,
    EndOfTurn,
    ShowTurnScore,
    ShowGameScore,
}

/// Room snapshot safe to send to every member. Built from an explicit field
/// allowlist: the current word, the drawer's word choices and connection
/// handles have no representation here at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomView {
    pub id: RoomId,
    pub players: Vec<PlayerView>,
    pub round: u32,
    pub max_rounds: u32,
    pub state: TurnState,
    pub canvas_data: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seconds_remaining: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub name: PlayerName,
    pub is_drawer: bool,
    pub score: Score,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub total: u32,
    pub turn: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    RoomNotFound,
    NameTaken,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::RoomNotFound => write!(f, "no such room"),
            ErrorKind::NameTaken => write!(f, "name already taken in this room"),
        }
    }
}

impl std::error::Error for ErrorKind {}

/// An opaque room identifier, assigned by the server at creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomId(String);

impl RoomId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct RoomIdError(String);

impl fmt::Display for RoomIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for RoomIdError {}

impl FromStr for RoomId {
    type Err = RoomIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.len() > 64 {
            return Err(RoomIdError("invalid room id".to_string()));
        }
        if !trimmed.chars().all(|c| c.is_ascii_graphic()) {
            return Err(RoomIdError("invalid room id".to_string()));
        }
        Ok(RoomId(trimmed.to_string()))
    }
}

impl TryFrom<String> for RoomId {
    type Error = RoomIdError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<RoomId> for String {
    fn from(r: RoomId) -> Self {
        r.0
    }
}

impl AsRef<str> for RoomId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A validated display name. Unique within a room (case-sensitive) and used
/// as the player's identity key for the connection's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlayerName(String);

impl PlayerName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone)]
pub struct PlayerNameError(String);

impl fmt::Display for PlayerNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for PlayerNameError {}

impl FromStr for PlayerName {
    type Err = PlayerNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(PlayerNameError("name must not be empty".to_string()));
        }
        if trimmed.chars().count() > 24 {
            return Err(PlayerNameError(
                "name must be at most 24 characters".to_string(),
            ));
        }
        if trimmed.chars().any(char::is_control) {
            return Err(PlayerNameError(
                "name must not contain control characters".to_string(),
            ));
        }
        Ok(PlayerName(trimmed.to_string()))
    }
}

impl TryFrom<String> for PlayerName {
    type Error = PlayerNameError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<PlayerName> for String {
    fn from(n: PlayerName) -> Self {
        n.0
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for PlayerName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
