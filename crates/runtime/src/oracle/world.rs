//! Bot-local mirror of the world as the server has described it.
use std::collections::{BTreeSet, HashMap};

use dbot_core::{Location, Point};

use crate::events::{PlayerData, PlayerField, ServerEvent, UpdateValue};

const UNKNOWN_MAP: &str = "<unknown>";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlayerState {
    pub coords: Option<Point>,
    pub level: Option<u32>,
}

/// Players, maps and client variables known to one bot.
#[derive(Clone, Debug)]
pub struct WorldState {
    me: String,
    players: HashMap<String, PlayerState>,
    players_in_map: BTreeSet<String>,
    current_map: Option<String>,
    last_map: Option<String>,
    vars: HashMap<String, UpdateValue>,
    in_battle: bool,
}

impl WorldState {
    pub fn new(me: impl Into<String>) -> Self {
        Self {
            me: me.into(),
            players: HashMap::new(),
            players_in_map: BTreeSet::new(),
            current_map: None,
            last_map: None,
            vars: HashMap::new(),
            in_battle: false,
        }
    }

    pub fn me(&self) -> &str {
        &self.me
    }

    /// Current map, falling back to the last one while between maps.
    pub fn map(&self) -> &str {
        self.current_map
            .as_deref()
            .or(self.last_map.as_deref())
            .unwrap_or(UNKNOWN_MAP)
    }

    pub fn current_map(&self) -> Option<&str> {
        self.current_map.as_deref()
    }

    pub fn position(&self) -> Option<Point> {
        self.player_position(&self.me)
    }

    pub fn location(&self) -> Option<Location> {
        let map = self.current_map.as_deref()?;
        Some(Location::new(map, self.position()?))
    }

    pub fn player(&self, username: &str) -> Option<&PlayerState> {
        self.players.get(username)
    }

    pub fn player_position(&self, username: &str) -> Option<Point> {
        self.players.get(username)?.coords
    }

    pub fn is_logged_in(&self, username: &str) -> bool {
        self.players.contains_key(username)
    }

    /// Another player last seen on this bot's map.
    pub fn is_in_map(&self, username: &str) -> bool {
        self.players_in_map.contains(username)
    }

    pub fn players_in_map(&self) -> impl Iterator<Item = &str> {
        self.players_in_map.iter().map(String::as_str)
    }

    pub fn var(&self, key: &str) -> Option<&UpdateValue> {
        self.vars.get(key)
    }

    pub fn in_battle(&self) -> bool {
        self.in_battle
    }

    pub fn add_player(&mut self, player: &PlayerData) {
        let state = self.players.entry(player.username.clone()).or_default();
        if player.coords.is_some() {
            state.coords = player.coords;
        }
    }

    pub fn remove_player(&mut self, username: &str) {
        self.players.remove(username);
        self.players_in_map.remove(username);
    }

    /// Teleports a player, e.g. when this bot arrives on a new map.
    pub fn set_coords(&mut self, username: &str, point: Point) {
        self.players.entry(username.to_string()).or_default().coords = Some(point);
    }

    /// Applies a one-tile move. Returns the new position, or `None` when the
    /// player or its coordinates are unknown.
    pub fn apply_move(&mut self, username: &str, direction: dbot_core::Direction) -> Option<Point> {
        let Some(player) = self.players.get_mut(username) else {
            tracing::warn!("missing player moved: {username}");
            return None;
        };
        let Some(coords) = player.coords.as_mut() else {
            tracing::warn!("player without coordinates moved: {username}");
            return None;
        };
        *coords = coords.step(direction);
        Some(*coords)
    }

    pub fn join_map(&mut self, map: &str) {
        if let Some(current) = &self.current_map {
            tracing::warn!("joined {map} without leaving {current}");
        }
        self.current_map = Some(map.to_string());
        self.players_in_map.clear();
    }

    pub fn leave_map(&mut self) {
        self.last_map = self.current_map.take();
        self.players_in_map.clear();
    }

    /// Keeps the mirror in sync with one server event.
    pub fn observe(&mut self, event: &ServerEvent) {
        match event {
            ServerEvent::PlayerSignedIn(player) => self.add_player(player),
            ServerEvent::PlayerPreviouslySignedIn(players) => {
                for player in players {
                    self.add_player(player);
                }
            }
            ServerEvent::PlayerSignedOut { username } => self.remove_player(username),
            ServerEvent::JoinMap { map } => self.join_map(map),
            ServerEvent::LeaveMap => self.leave_map(),
            ServerEvent::PlayerLeftMap { username } => {
                self.players_in_map.remove(username);
            }
            ServerEvent::MovePlayer {
                username,
                direction,
            } => {
                self.apply_move(username, *direction);
            }
            ServerEvent::PlayerUpdate { username, field } => {
                let Some(player) = self.players.get_mut(username) else {
                    tracing::warn!("update for missing player: {username}");
                    return;
                };
                match field {
                    PlayerField::Coords(point) => player.coords = Some(*point),
                    PlayerField::Level(level) => player.level = Some(*level),
                    PlayerField::Other { .. } => {}
                }
                if *username != self.me {
                    self.players_in_map.insert(username.clone());
                }
            }
            ServerEvent::Update { key, value } => {
                self.vars.insert(key.clone(), value.clone());
            }
            ServerEvent::StartBattle => self.in_battle = true,
            ServerEvent::LeaveBattle => self.in_battle = false,
            _ => {}
        }
    }
}
