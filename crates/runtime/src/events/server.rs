//! Typed server events.
//!
//! The transport decodes each wire message exactly once into a
//! [`ServerEvent`]; nothing past that boundary sees untyped key/value maps.
use serde::{Deserialize, Serialize};

use dbot_core::{Direction, Point};

/// Loosely typed value carried by `update` messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateValue {
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
}

impl UpdateValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            UpdateValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, UpdateValue::Null)
    }
}

/// Per-player attribute pushed by `playerUpdate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerField {
    /// Authoritative tile position, sent on map join and after corrections.
    Coords(Point),
    Level(u32),
    Other { key: String, value: UpdateValue },
}

/// A player announced by the sign-in broadcasts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerData {
    pub username: String,
    pub coords: Option<Point>,
}

impl PlayerData {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            coords: None,
        }
    }

    pub fn at(username: impl Into<String>, coords: Point) -> Self {
        Self {
            username: username.into(),
            coords: Some(coords),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub channel: String,
    pub username: String,
    pub contents: String,
}

/// Server-pushed events consumed by a bot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServerEvent {
    Connected,
    SignedIn,
    PlayerSignedIn(PlayerData),
    PlayerPreviouslySignedIn(Vec<PlayerData>),
    PlayerSignedOut {
        username: String,
    },
    /// This bot entered `map`; its coordinates follow as a player update.
    JoinMap {
        map: String,
    },
    /// This bot left its current map.
    LeaveMap,
    PlayerLeftMap {
        username: String,
    },
    /// A player on this bot's map moved one tile.
    MovePlayer {
        username: String,
        direction: Direction,
    },
    /// This bot's last move was rejected.
    Bonk,
    /// This bot stepped on a transport tile at `point`.
    Transport {
        point: Point,
    },
    Update {
        key: String,
        value: UpdateValue,
    },
    PlayerUpdate {
        username: String,
        field: PlayerField,
    },
    /// The player-select window opened on `username`.
    SelectPlayer {
        username: String,
    },
    /// An invite was sent from the player-select window.
    InvitePlayer {
        username: String,
    },
    /// Party roster snapshot.
    Party {
        party_id: u64,
        members: Vec<String>,
    },
    Message(ChatMessage),
    StartBattle,
    LeaveBattle,
}

impl ServerEvent {
    /// Short label used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::Connected => "connected",
            ServerEvent::SignedIn => "signed_in",
            ServerEvent::PlayerSignedIn(_) => "player_signed_in",
            ServerEvent::PlayerPreviouslySignedIn(_) => "player_previously_signed_in",
            ServerEvent::PlayerSignedOut { .. } => "player_signed_out",
            ServerEvent::JoinMap { .. } => "join_map",
            ServerEvent::LeaveMap => "leave_map",
            ServerEvent::PlayerLeftMap { .. } => "player_left_map",
            ServerEvent::MovePlayer { .. } => "move_player",
            ServerEvent::Bonk => "bonk",
            ServerEvent::Transport { .. } => "transport",
            ServerEvent::Update { .. } => "update",
            ServerEvent::PlayerUpdate { .. } => "player_update",
            ServerEvent::SelectPlayer { .. } => "select_player",
            ServerEvent::InvitePlayer { .. } => "invite_player",
            ServerEvent::Party { .. } => "party",
            ServerEvent::Message(_) => "message",
            ServerEvent::StartBattle => "start_battle",
            ServerEvent::LeaveBattle => "leave_battle",
        }
    }
}
