//! In-process stand-in for the game server.
//!
//! [`SimulatedServer`] keeps players on character grids (`.` floor, anything
//! else wall) and answers bot commands the way the real server does: a held
//! key moves the avatar one tile per [`tick`](SimulatedServer::tick) and is
//! confirmed with `MovePlayer`, walking into a wall answers `Bonk`, and
//! transport tiles move the avatar to another map. Tile clicks, the party
//! invite windows and chat are modelled closely enough for party formation.
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use dbot_core::{Direction, Location, Point};
use tokio::task::JoinHandle;

use crate::api::{Result, RuntimeError};
use crate::events::{
    ChatMessage, OutboundCommand, PlayerData, PlayerField, ServerEvent, UpdateValue,
};
use crate::oracle::{PARTY_PROMPT_KEY, UiPositions};
use crate::transport::Transport;

/// One map of the simulated world.
#[derive(Clone, Debug, Default)]
pub struct SimMap {
    name: String,
    floor: HashSet<Point>,
    transports: HashMap<Point, Location>,
}

impl SimMap {
    /// Reads a grid where row `y` is line `y` and `.` marks floor.
    pub fn parse(name: impl Into<String>, grid: &str) -> Self {
        let mut floor = HashSet::new();
        for (y, line) in grid.lines().enumerate() {
            for (x, cell) in line.chars().enumerate() {
                if cell == '.' {
                    floor.insert(Point::new(x as i32, y as i32));
                }
            }
        }
        Self {
            name: name.into(),
            floor,
            transports: HashMap::new(),
        }
    }

    pub fn with_transport(mut self, point: Point, destination: Location) -> Self {
        self.transports.insert(point, destination);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_floor(&self, point: Point) -> bool {
        self.floor.contains(&point)
    }

    pub fn floor(&self) -> impl Iterator<Item = Point> + '_ {
        self.floor.iter().copied()
    }

    pub fn transport_at(&self, point: Point) -> Option<&Location> {
        self.transports.get(&point)
    }
}

#[derive(Debug)]
struct SimPlayer {
    location: Location,
    held: Option<Direction>,
    inbox: VecDeque<ServerEvent>,
    selected: Option<String>,
    prompted_by: Option<String>,
}

#[derive(Debug, Default)]
pub struct SimulatedServer {
    maps: HashMap<String, SimMap>,
    players: BTreeMap<String, SimPlayer>,
    parties: BTreeMap<u64, Vec<String>>,
    next_party_id: u64,
}

impl SimulatedServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_map(mut self, map: SimMap) -> Self {
        self.add_map(map);
        self
    }

    pub fn add_map(&mut self, map: SimMap) {
        self.maps.insert(map.name.clone(), map);
    }

    pub fn map(&self, name: &str) -> Option<&SimMap> {
        self.maps.get(name)
    }

    pub fn location_of(&self, name: &str) -> Option<&Location> {
        self.players.get(name).map(|player| &player.location)
    }

    /// Party `name` belongs to, leader first.
    pub fn party_of(&self, name: &str) -> Option<&[String]> {
        self.parties
            .values()
            .find(|members| members.iter().any(|member| member == name))
            .map(Vec::as_slice)
    }

    fn send(&mut self, name: &str, event: ServerEvent) {
        if let Some(player) = self.players.get_mut(name) {
            player.inbox.push_back(event);
        }
    }

    fn names_on(&self, map: &str) -> Vec<String> {
        self.players
            .iter()
            .filter(|(_, player)| player.location.map == map)
            .map(|(name, _)| name.clone())
            .collect()
    }

    fn broadcast_on(&mut self, map: &str, event: ServerEvent) {
        for name in self.names_on(map) {
            self.send(&name, event.clone());
        }
    }

    /// Signs a player in at `location`.
    pub fn connect(&mut self, name: &str, location: Location) {
        let others: Vec<PlayerData> = self
            .players
            .keys()
            .map(|other| PlayerData::new(other.as_str()))
            .collect();
        let neighbors = self.names_on(&location.map);

        for other in self.players.keys().cloned().collect::<Vec<_>>() {
            self.send(&other, ServerEvent::PlayerSignedIn(PlayerData::new(name)));
        }
        for other in &neighbors {
            self.send(
                other,
                ServerEvent::PlayerUpdate {
                    username: name.to_string(),
                    field: PlayerField::Coords(location.point),
                },
            );
        }

        let mut inbox = VecDeque::from([
            ServerEvent::Connected,
            ServerEvent::SignedIn,
            ServerEvent::PlayerPreviouslySignedIn(others),
            ServerEvent::PlayerSignedIn(PlayerData::at(name, location.point)),
        ]);
        inbox.extend(self.arrival_events(name, &location, &neighbors));
        self.players.insert(
            name.to_string(),
            SimPlayer {
                location,
                held: None,
                inbox,
                selected: None,
                prompted_by: None,
            },
        );
    }

    /// What a player sees on entering `location.map`.
    fn arrival_events(
        &self,
        name: &str,
        location: &Location,
        neighbors: &[String],
    ) -> Vec<ServerEvent> {
        let mut events = vec![
            ServerEvent::JoinMap {
                map: location.map.clone(),
            },
            ServerEvent::PlayerUpdate {
                username: name.to_string(),
                field: PlayerField::Coords(location.point),
            },
        ];
        for other in neighbors.iter().filter(|other| *other != name) {
            if let Some(player) = self.players.get(other) {
                events.push(ServerEvent::PlayerUpdate {
                    username: other.clone(),
                    field: PlayerField::Coords(player.location.point),
                });
            }
        }
        events
    }

    pub fn disconnect(&mut self, name: &str) {
        if self.players.remove(name).is_none() {
            return;
        }
        for members in self.parties.values_mut() {
            members.retain(|member| member != name);
        }
        self.parties.retain(|_, members| members.len() > 1);
        for other in self.players.keys().cloned().collect::<Vec<_>>() {
            self.send(
                &other,
                ServerEvent::PlayerSignedOut {
                    username: name.to_string(),
                },
            );
        }
    }

    /// Takes the events queued for `name`.
    pub fn drain_events(&mut self, name: &str) -> Vec<ServerEvent> {
        self.players
            .get_mut(name)
            .map(|player| player.inbox.drain(..).collect())
            .unwrap_or_default()
    }

    fn next_event(&mut self, name: &str) -> Option<ServerEvent> {
        self.players.get_mut(name)?.inbox.pop_front()
    }

    /// Applies one command from `name`.
    pub fn apply(&mut self, name: &str, command: OutboundCommand) {
        let Some(player) = self.players.get_mut(name) else {
            tracing::warn!("command from unknown player {name}: {command:?}");
            return;
        };
        match command {
            OutboundCommand::KeyDown(direction) => player.held = Some(direction),
            OutboundCommand::KeyUp(direction) => {
                if player.held == Some(direction) {
                    player.held = None;
                }
            }
            OutboundCommand::Click { x, y } => self.click(name, (x, y)),
            OutboundCommand::Chat { channel, message } => {
                let event = ServerEvent::Message(ChatMessage {
                    channel,
                    username: name.to_string(),
                    contents: message,
                });
                for other in self.players.keys().cloned().collect::<Vec<_>>() {
                    self.send(&other, event.clone());
                }
            }
            OutboundCommand::Logout => self.disconnect(name),
            OutboundCommand::SignIn { .. } => {}
        }
    }

    fn click(&mut self, name: &str, at: (i32, i32)) {
        let Some(player) = self.players.get_mut(name) else {
            return;
        };

        if let Some(selected) = player.selected.clone() {
            if at == UiPositions::PARTY_INVITE {
                player.selected = None;
                self.send(
                    name,
                    ServerEvent::InvitePlayer {
                        username: selected.clone(),
                    },
                );
                if let Some(invitee) = self.players.get_mut(&selected) {
                    invitee.prompted_by = Some(name.to_string());
                }
                self.send(
                    &selected,
                    ServerEvent::Update {
                        key: PARTY_PROMPT_KEY.to_string(),
                        value: UpdateValue::Text(name.to_string()),
                    },
                );
                return;
            }
            if at == UiPositions::PLAYER_SELECT_EXIT {
                player.selected = None;
                return;
            }
        }

        if let Some(inviter) = player.prompted_by.clone()
            && (at == UiPositions::ACCEPT_INVITE || at == UiPositions::DECLINE_INVITE)
        {
            player.prompted_by = None;
            self.send(
                name,
                ServerEvent::Update {
                    key: PARTY_PROMPT_KEY.to_string(),
                    value: UpdateValue::Null,
                },
            );
            if at == UiPositions::ACCEPT_INVITE {
                self.join_party(&inviter, name);
            }
            return;
        }

        let origin = player.location.clone();
        let (dx, dy) = (at.0 - 150, at.1 - 120);
        if dx.rem_euclid(16) != 0 || dy.rem_euclid(16) != 0 {
            tracing::debug!("{name} clicked nothing at {at:?}");
            return;
        }
        let tile = Point::new(origin.point.x + dx / 16, origin.point.y + dy / 16);
        let target = self
            .players
            .iter()
            .find(|(other, player)| {
                other.as_str() != name && player.location == Location::new(origin.map.as_str(), tile)
            })
            .map(|(other, _)| other.clone());
        if let Some(target) = target {
            if let Some(player) = self.players.get_mut(name) {
                player.selected = Some(target.clone());
            }
            self.send(name, ServerEvent::SelectPlayer { username: target });
        }
    }

    fn join_party(&mut self, leader: &str, member: &str) {
        for members in self.parties.values_mut() {
            members.retain(|name| name != member);
        }
        let id = match self
            .parties
            .iter()
            .find(|(_, members)| members.first().map(String::as_str) == Some(leader))
            .map(|(id, _)| *id)
        {
            Some(id) => id,
            None => {
                self.next_party_id += 1;
                self.parties.insert(self.next_party_id, vec![leader.to_string()]);
                self.next_party_id
            }
        };
        let Some(members) = self.parties.get_mut(&id) else {
            return;
        };
        if members.len() >= dbot_core::ExplorationConfig::MAX_PARTY_SIZE {
            tracing::warn!("party {id} is full, {member} cannot join");
            return;
        }
        members.push(member.to_string());
        let members = members.clone();
        for name in &members {
            self.send(
                name,
                ServerEvent::Party {
                    party_id: id,
                    members: members.clone(),
                },
            );
        }
    }

    /// Moves every avatar with a held key by one tile.
    pub fn tick(&mut self) {
        let moving: Vec<(String, Direction)> = self
            .players
            .iter()
            .filter_map(|(name, player)| player.held.map(|direction| (name.clone(), direction)))
            .collect();

        for (name, direction) in moving {
            let Some(player) = self.players.get(&name) else {
                continue;
            };
            let from = player.location.clone();
            let to = from.point.step(direction);
            let Some(map) = self.maps.get(&from.map) else {
                tracing::warn!("{name} is on unknown map {}", from.map);
                continue;
            };

            if let Some(destination) = map.transport_at(to).cloned() {
                self.transport(&name, &from, destination);
            } else if map.is_floor(to) {
                if let Some(player) = self.players.get_mut(&name) {
                    player.location.point = to;
                }
                self.broadcast_on(
                    &from.map,
                    ServerEvent::MovePlayer {
                        username: name.clone(),
                        direction,
                    },
                );
            } else {
                if let Some(player) = self.players.get_mut(&name) {
                    player.held = None;
                }
                self.send(&name, ServerEvent::Bonk);
            }
        }
    }

    fn transport(&mut self, name: &str, from: &Location, destination: Location) {
        if let Some(player) = self.players.get_mut(name) {
            player.held = None;
            player.location = destination.clone();
        }
        self.send(name, ServerEvent::LeaveMap);
        for other in self.names_on(&from.map) {
            self.send(
                &other,
                ServerEvent::PlayerLeftMap {
                    username: name.to_string(),
                },
            );
        }
        let neighbors = self.names_on(&destination.map);
        for other in neighbors.iter().filter(|other| *other != name) {
            self.send(
                other,
                ServerEvent::PlayerUpdate {
                    username: name.to_string(),
                    field: PlayerField::Coords(destination.point),
                },
            );
        }
        for event in self.arrival_events(name, &destination, &neighbors) {
            self.send(name, event);
        }
    }
}

fn lock(server: &Mutex<SimulatedServer>) -> Result<MutexGuard<'_, SimulatedServer>> {
    server
        .lock()
        .map_err(|_| RuntimeError::Transport("simulator lock poisoned".to_string()))
}

/// Advances `server` every `period` until the task is aborted.
pub fn spawn_ticker(server: Arc<Mutex<SimulatedServer>>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            match lock(&server) {
                Ok(mut server) => server.tick(),
                Err(e) => {
                    tracing::error!("simulator stopped: {}", e);
                    break;
                }
            }
        }
    })
}

/// A bot's connection to a shared [`SimulatedServer`].
pub struct SimConnection {
    server: Arc<Mutex<SimulatedServer>>,
    name: String,
}

impl SimConnection {
    /// Signs `name` in at `location` and returns its connection.
    pub fn connect(
        server: Arc<Mutex<SimulatedServer>>,
        name: impl Into<String>,
        location: Location,
    ) -> Result<Self> {
        let name = name.into();
        lock(&server)?.connect(&name, location);
        Ok(Self { server, name })
    }
}

#[async_trait]
impl Transport for SimConnection {
    fn try_next_event(&mut self) -> Result<Option<ServerEvent>> {
        Ok(lock(&self.server)?.next_event(&self.name))
    }

    async fn send(&mut self, command: OutboundCommand) -> Result<()> {
        lock(&self.server)?.apply(&self.name, command);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOM: &str = "\
#####
#...#
#.#.#
#####";

    fn server() -> SimulatedServer {
        let mut server = SimulatedServer::new().with_map(
            SimMap::parse("room", ROOM)
                .with_transport(Point::new(3, 3), Location::new("hall", Point::new(0, 0))),
        );
        server.add_map(SimMap::parse("hall", "."));
        server.connect("alpha", Location::new("room", Point::new(1, 1)));
        server.drain_events("alpha");
        server
    }

    #[test]
    fn held_key_moves_one_tile_per_tick() {
        let mut server = server();
        server.apply("alpha", OutboundCommand::KeyDown(Direction::Right));
        server.tick();
        server.tick();
        assert_eq!(
            server.location_of("alpha").map(|l| l.point),
            Some(Point::new(3, 1))
        );
        assert_eq!(
            server.drain_events("alpha"),
            vec![
                ServerEvent::MovePlayer {
                    username: "alpha".to_string(),
                    direction: Direction::Right
                };
                2
            ]
        );
    }

    #[test]
    fn walls_bonk_and_release_the_key() {
        let mut server = server();
        server.apply("alpha", OutboundCommand::KeyDown(Direction::Up));
        server.tick();
        server.tick();
        assert_eq!(server.drain_events("alpha"), vec![ServerEvent::Bonk]);
    }

    #[test]
    fn transport_tiles_change_maps() {
        let mut server = server();
        server.apply("alpha", OutboundCommand::KeyDown(Direction::Right));
        server.tick();
        server.tick();
        server.apply("alpha", OutboundCommand::KeyDown(Direction::Down));
        server.tick();
        assert_eq!(
            server.location_of("alpha"),
            Some(&Location::new("room", Point::new(3, 2)))
        );
        server.drain_events("alpha");
        server.tick();

        assert_eq!(
            server.location_of("alpha"),
            Some(&Location::new("hall", Point::new(0, 0)))
        );
        let events = server.drain_events("alpha");
        assert_eq!(events.first(), Some(&ServerEvent::LeaveMap));
        assert!(events.contains(&ServerEvent::JoinMap {
            map: "hall".to_string()
        }));
    }

    #[test]
    fn invite_and_accept_form_a_party() {
        let mut server = server();
        server.connect("beta", Location::new("room", Point::new(2, 1)));
        server.drain_events("alpha");
        server.drain_events("beta");

        server.apply("alpha", OutboundCommand::Click { x: 166, y: 120 });
        assert_eq!(
            server.drain_events("alpha"),
            vec![ServerEvent::SelectPlayer {
                username: "beta".to_string()
            }]
        );
        let (x, y) = UiPositions::PARTY_INVITE;
        server.apply("alpha", OutboundCommand::Click { x, y });
        assert!(server.drain_events("beta").contains(&ServerEvent::Update {
            key: PARTY_PROMPT_KEY.to_string(),
            value: UpdateValue::Text("alpha".to_string()),
        }));

        let (x, y) = UiPositions::ACCEPT_INVITE;
        server.apply("beta", OutboundCommand::Click { x, y });
        assert_eq!(
            server.party_of("beta"),
            Some(&["alpha".to_string(), "beta".to_string()][..])
        );
    }
}
