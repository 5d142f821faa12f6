//! One automated player: world mirror, locomotion, action queue.
//!
//! The bot never performs I/O. Server events go in through
//! [`Bot::handle_event`], time advances through [`Bot::step`], and the commands
//! both produce pile up until [`Bot::drain_commands`] hands them to whoever
//! owns the transport (normally the [`Runner`](crate::Runner)).
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use dbot_core::{Location, Party, Point};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::actions::{Action, ActionContext, ExplorationAction, GotoAction, PartyFormationAction};
use crate::announce::PeerReport;
use crate::api::Result;
use crate::commands::{ChatCommand, HELLO_MESSAGES};
use crate::config::RuntimeConfig;
use crate::events::{OutboundCommand, Outbox, ServerEvent};
use crate::locomotion::LocomotionController;
use crate::oracle::{MapRouter, StaticRouter, UiPositions, UiState, WorldState};
use crate::repository::{CollisionRepository, CollisionStore, FileCollisionRepository};

/// Sign-in details sent when the server greets us.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Everything an action may borrow, kept apart from the action queue so both
/// can be borrowed at once.
struct BotCore {
    config: RuntimeConfig,
    world: WorldState,
    ui: UiState,
    party: Party,
    locomotion: LocomotionController,
    outbox: Outbox,
    maps: CollisionStore,
    router: Arc<dyn MapRouter>,
    rng: StdRng,
    friends: Vec<String>,
    admins: Vec<String>,
    credentials: Option<Credentials>,
    logging_out: bool,
    stopped_at_leave_map: bool,
}

impl BotCore {
    fn context(&mut self, now: Instant) -> ActionContext<'_> {
        ActionContext {
            config: &self.config,
            world: &self.world,
            ui: &self.ui,
            party: &self.party,
            locomotion: &mut self.locomotion,
            outbox: &mut self.outbox,
            maps: &mut self.maps,
            router: self.router.as_ref(),
            rng: &mut self.rng,
            now,
        }
    }

    fn say(&mut self, message: impl Into<String>) {
        self.outbox.say(&self.config.report_channel, message);
    }
}

pub struct Bot {
    core: BotCore,
    actions: VecDeque<Box<dyn Action>>,
}

impl Bot {
    pub fn builder(name: impl Into<String>) -> BotBuilder {
        BotBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        self.core.world.me()
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.core.config
    }

    pub fn world(&self) -> &WorldState {
        &self.core.world
    }

    pub fn ui(&self) -> &UiState {
        &self.core.ui
    }

    pub fn party(&self) -> &Party {
        &self.core.party
    }

    pub fn locomotion(&self) -> &LocomotionController {
        &self.core.locomotion
    }

    pub fn maps(&mut self) -> &mut CollisionStore {
        &mut self.core.maps
    }

    pub fn current_action(&self) -> Option<&dyn Action> {
        self.actions.front().map(|action| action.as_ref())
    }

    pub fn action_count(&self) -> usize {
        self.actions.len()
    }

    pub fn is_logging_out(&self) -> bool {
        self.core.logging_out
    }

    pub fn pending_commands(&self) -> &[OutboundCommand] {
        self.core.outbox.pending()
    }

    /// Takes every command queued since the last drain.
    pub fn drain_commands(&mut self) -> Vec<OutboundCommand> {
        self.core.outbox.drain()
    }

    /// Bots from the roster that are online, this one included, sorted.
    pub fn logged_in_bots(&self) -> Vec<String> {
        let world = &self.core.world;
        let mut bots: Vec<String> = self
            .core
            .friends
            .iter()
            .filter(|name| world.is_logged_in(name))
            .cloned()
            .collect();
        bots.push(self.name().to_string());
        bots.sort();
        bots.dedup();
        bots
    }

    pub fn say(&mut self, message: impl Into<String>) {
        self.core.say(message);
    }

    /// Clicks the tile (`x`, `y`) relative to the avatar.
    pub fn click_at_tile(&mut self, x: i32, y: i32) {
        match self.core.world.position() {
            Some(me) => self.core.outbox.click(UiPositions::tile(me, x, y)),
            None => tracing::warn!("cannot click ({x}, {y}) without a known position"),
        }
    }

    // ===== entry points =====

    /// Appends an action; it runs once everything ahead of it completes.
    pub fn add_action(&mut self, action: Box<dyn Action>) {
        tracing::info!("queued action {}", action.name());
        self.actions.push_back(action);
    }

    /// Drops every queued action, running each one's cleanup.
    pub fn clear_actions(&mut self) {
        let now = Instant::now();
        while let Some(mut action) = self.actions.pop_front() {
            tracing::info!("cancelled action {} in {}", action.name(), action.state_name());
            action.cleanup(&mut self.core.context(now));
        }
    }

    /// Replaces the locomotion queue with raw way-points.
    pub fn goto(&mut self, points: impl IntoIterator<Item = Point>) {
        self.core.locomotion.goto(points);
    }

    /// Walks way-points in order, planning each hop over known terrain.
    pub fn travel(&mut self, points: impl IntoIterator<Item = Point>) {
        self.add_action(Box::new(GotoAction::new(points)));
    }

    /// Explores the current map, or `focus_map` if given.
    pub fn start_exploration(&mut self, focus_map: Option<String>) {
        let action = match focus_map {
            Some(map) => ExplorationAction::focused(map),
            None => ExplorationAction::new(),
        };
        self.add_action(Box::new(action));
    }

    /// Works toward a party of exactly `names`.
    pub fn join_party<S: Into<String>>(&mut self, names: impl IntoIterator<Item = S>) {
        self.core.party.set_target(names);
        if self.core.party.target() == [self.name().to_string()] {
            self.say("I'm solo");
            return;
        }
        self.add_action(Box::new(PartyFormationAction::new()));
    }

    /// Joins the group of three this bot falls into among online bots.
    pub fn party_up(&mut self, exclude: &[&str]) {
        let logged_in = self.logged_in_bots();
        let group = self
            .core
            .party
            .identify_party(logged_in.iter().map(String::as_str), exclude);
        self.join_party(group);
    }

    /// Halts motion and abandons every action.
    pub fn stop(&mut self) {
        self.core.locomotion.clear_goto(&mut self.core.outbox);
        self.clear_actions();
    }

    pub fn report_peer_bonk(&mut self, map: &str, point: Point) {
        self.report_peer(PeerReport::Bonked {
            at: Location::new(map, point),
        });
    }

    pub fn report_peer_transport(&mut self, from: Location, to: Location) {
        self.report_peer(PeerReport::Transported { from, to });
    }

    fn report_peer(&mut self, report: PeerReport) {
        let Some(action) = self.actions.front_mut() else {
            tracing::debug!("ignoring {report}: no action running");
            return;
        };
        action.on_peer_report(&report, &mut self.core.context(Instant::now()));
    }

    /// Lines up the bots on this map in rows of three below `source`.
    ///
    /// Returns `false` when `source`'s position is unknown.
    pub fn assemble(&mut self, source: &str) -> bool {
        let Some(anchor) = self.core.world.player_position(source) else {
            tracing::warn!("cannot assemble on {source}: position unknown");
            return false;
        };
        let bots: Vec<String> = self
            .logged_in_bots()
            .into_iter()
            .filter(|name| name == self.name() || self.core.world.is_in_map(name))
            .collect();
        let Some(index) = bots.iter().position(|name| name == self.name()) else {
            return false;
        };
        let index = index as i32;
        let dx = index % 3 - 1;
        let dy = 2 + index / 3;
        self.goto([
            Point::new(anchor.x + dx, anchor.y + dy + 1),
            Point::new(anchor.x + dx, anchor.y + dy),
        ]);
        true
    }

    pub fn logout(&mut self) {
        tracing::info!("logging out");
        self.stop();
        self.core.outbox.push(OutboundCommand::Logout);
        self.core.logging_out = true;
    }

    /// Admins and friends may drive the bot over chat.
    pub fn is_admin(&self, name: &str) -> bool {
        self.core.admins.iter().chain(&self.core.friends).any(|admin| admin == name)
    }

    fn run_command(&mut self, command: ChatCommand, source: &str, channel: &str) {
        tracing::debug!("{source} asked for {command}");
        match command {
            ChatCommand::Hello => {
                let index = self.core.rng.random_range(0..HELLO_MESSAGES.len());
                self.core.outbox.say(channel, HELLO_MESSAGES[index]);
            }
            ChatCommand::Where => {
                let reply = match self.core.world.location() {
                    Some(location) => format!("I'm at {} {}", location.map, location.point),
                    None => "I don't know where I am".to_string(),
                };
                self.core.outbox.say(channel, reply);
            }
            ChatCommand::Stop => self.stop(),
            ChatCommand::Goto(_)
                if self.core.party.in_party() && !self.core.party.leader_is_me() =>
            {
                tracing::debug!("only the party leader walks on command");
            }
            ChatCommand::Goto(Some(point)) => self.travel([point]),
            ChatCommand::Goto(None) => self.core.outbox.say(channel, "I can't go there"),
            ChatCommand::PartyUp => self.party_up(&[source]),
            ChatCommand::Logout => self.logout(),
            ChatCommand::Assemble => {
                if self.core.party.in_party() {
                    tracing::warn!("cannot assemble while in a party");
                } else if !self.assemble(source) {
                    tracing::warn!("cannot assemble on {source}");
                }
            }
            ChatCommand::Map => self.start_exploration(None),
            ChatCommand::Peer(report) => self.report_peer(report),
        }
    }

    // ===== event and tick handling =====

    /// Applies one server event to the bot and then to its current action.
    pub fn handle_event(&mut self, event: ServerEvent) {
        tracing::trace!("event {}", event.name());
        self.core.world.observe(&event);
        self.core.ui.observe(&event);

        let core = &mut self.core;
        match &event {
            ServerEvent::Connected => {
                if let Some(credentials) = &core.credentials {
                    core.outbox.push(OutboundCommand::SignIn {
                        email: credentials.email.clone(),
                        password: credentials.password.clone(),
                    });
                }
            }
            ServerEvent::SignedIn => tracing::info!("signed in as {}", core.world.me()),
            ServerEvent::JoinMap { map } => {
                if core.stopped_at_leave_map && self.actions.is_empty() {
                    core.say(format!("stopped at {map}"));
                }
                core.stopped_at_leave_map = false;
            }
            ServerEvent::LeaveMap => {
                if core.locomotion.clear_goto(&mut core.outbox) {
                    core.stopped_at_leave_map = true;
                }
            }
            ServerEvent::PlayerSignedOut { username } => core.party.player_left(username),
            ServerEvent::MovePlayer {
                username,
                direction,
            } if *username == core.world.me() && !core.world.in_battle() => {
                if let Some(position) = core.world.position() {
                    core.locomotion
                        .on_move_player(*direction, position, &mut core.outbox);
                }
            }
            ServerEvent::Bonk if !core.world.in_battle() => {
                core.locomotion.on_bonk(&mut core.outbox);
            }
            ServerEvent::Party { members, .. } => {
                if members.iter().any(|name| name == core.world.me()) {
                    core.party.update_party(members.iter().cloned());
                }
            }
            ServerEvent::StartBattle => core.locomotion.stop_moving(&mut core.outbox),
            _ => {}
        }

        if let ServerEvent::Message(message) = &event
            && message.username != self.name()
            && let Some(command) = ChatCommand::parse(
                &message.contents,
                &self.core.config.command_prompt,
                self.name(),
            )
        {
            if command.admin_only() && !self.is_admin(&message.username) {
                tracing::info!("ignoring {command} from non-admin {}", message.username);
            } else {
                self.run_command(command, &message.username, &message.channel);
            }
        }

        if let Some(action) = self.actions.front_mut() {
            action.on_event(&event, &mut self.core.context(Instant::now()));
        }
    }

    /// One action tick: advance locomotion, then the current action.
    ///
    /// Nothing moves during battle.
    pub fn step(&mut self, now: Instant) {
        if self.core.world.in_battle() {
            return;
        }
        let position = self.core.world.position();
        self.core.locomotion.step(position, &mut self.core.outbox);

        let Some(action) = self.actions.front_mut() else {
            return;
        };
        let mut ctx = self.core.context(now);
        if action.step(&mut ctx) {
            tracing::info!("action {} complete", action.name());
            action.cleanup(&mut ctx);
            self.actions.pop_front();
        }
    }
}

/// Builder for [`Bot`].
pub struct BotBuilder {
    name: String,
    config: RuntimeConfig,
    repository: Option<Arc<dyn CollisionRepository>>,
    router: Option<Arc<dyn MapRouter>>,
    rng: Option<StdRng>,
    friends: Vec<String>,
    admins: Vec<String>,
    credentials: Option<Credentials>,
}

impl BotBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: RuntimeConfig::default(),
            repository: None,
            router: None,
            rng: None,
            friends: Vec::new(),
            admins: Vec::new(),
            credentials: None,
        }
    }

    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Where collision maps are read and written. Defaults to
    /// `<data_dir>/<name>_maps` on disk.
    pub fn repository(mut self, repository: Arc<dyn CollisionRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Defaults to [`StaticRouter::town`].
    pub fn router(mut self, router: Arc<dyn MapRouter>) -> Self {
        self.router = Some(router);
        self
    }

    /// Fixes the frontier-picking randomness, for reproducible runs.
    pub fn seed(mut self, seed: u64) -> Self {
        self.rng = Some(StdRng::seed_from_u64(seed));
        self
    }

    /// Other bots of the same operator; their chat hints are trusted.
    pub fn friends<S: Into<String>>(mut self, friends: impl IntoIterator<Item = S>) -> Self {
        self.friends = friends.into_iter().map(Into::into).collect();
        self
    }

    /// Operators allowed to issue every chat command.
    pub fn admins<S: Into<String>>(mut self, admins: impl IntoIterator<Item = S>) -> Self {
        self.admins = admins.into_iter().map(Into::into).collect();
        self
    }

    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn build(self) -> Result<Bot> {
        let repository: Arc<dyn CollisionRepository> = match self.repository {
            Some(repository) => repository,
            None => Arc::new(FileCollisionRepository::new(
                self.config.maps_dir(&self.name),
            )?),
        };
        let router: Arc<dyn MapRouter> = match self.router {
            Some(router) => router,
            None => Arc::new(StaticRouter::town()),
        };
        let rng = self.rng.unwrap_or_else(StdRng::from_os_rng);

        Ok(Bot {
            core: BotCore {
                locomotion: LocomotionController::new(self.config.near_threshold),
                config: self.config,
                world: WorldState::new(self.name.as_str()),
                ui: UiState::new(),
                party: Party::new(self.name),
                outbox: Outbox::new(),
                maps: CollisionStore::new(repository),
                router,
                rng,
                friends: self.friends,
                admins: self.admins,
                credentials: self.credentials,
                logging_out: false,
                stopped_at_leave_map: false,
            },
            actions: VecDeque::new(),
        })
    }
}
