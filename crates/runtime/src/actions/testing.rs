//! Stand-alone bot internals for driving one action in unit tests.
use std::sync::Arc;
use std::time::{Duration, Instant};

use dbot_core::{CollisionMap, Party, Point};
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::{Action, ActionContext};
use crate::announce::PeerReport;
use crate::config::RuntimeConfig;
use crate::events::{OutboundCommand, Outbox, ServerEvent};
use crate::locomotion::LocomotionController;
use crate::oracle::{StaticRouter, UiState, WorldState};
use crate::repository::{CollisionStore, InMemoryCollisionRepo};

pub(crate) struct Harness {
    pub config: RuntimeConfig,
    pub world: WorldState,
    pub ui: UiState,
    pub party: Party,
    pub locomotion: LocomotionController,
    pub outbox: Outbox,
    pub maps: CollisionStore,
    pub router: StaticRouter,
    pub rng: StdRng,
    pub now: Instant,
}

impl Harness {
    pub fn new(me: &str) -> Self {
        let config = RuntimeConfig::default();
        Self {
            locomotion: LocomotionController::new(config.near_threshold),
            config,
            world: WorldState::new(me),
            ui: UiState::new(),
            party: Party::new(me),
            outbox: Outbox::new(),
            maps: CollisionStore::new(Arc::new(InMemoryCollisionRepo::new())),
            router: StaticRouter::new(),
            rng: StdRng::seed_from_u64(7),
            now: Instant::now(),
        }
    }

    pub fn with_map(mut self, map: CollisionMap) -> Self {
        self.maps = CollisionStore::new(Arc::new(InMemoryCollisionRepo::with_maps([map])));
        self
    }

    /// Puts `name` at `point`, joining `map` first when it is this bot.
    pub fn place_player(&mut self, name: &str, map: &str, point: Point) {
        if name == self.world.me() && self.world.current_map() != Some(map) {
            if self.world.current_map().is_some() {
                self.world.leave_map();
            }
            self.world.join_map(map);
        }
        self.world.set_coords(name, point);
    }

    pub fn place(&mut self, map: &str, point: Point) {
        let me = self.world.me().to_string();
        self.place_player(&me, map, point);
    }

    pub fn advance(&mut self, by: Duration) {
        self.now += by;
    }

    pub fn context(&mut self) -> ActionContext<'_> {
        ActionContext {
            config: &self.config,
            world: &self.world,
            ui: &self.ui,
            party: &self.party,
            locomotion: &mut self.locomotion,
            outbox: &mut self.outbox,
            maps: &mut self.maps,
            router: &self.router,
            rng: &mut self.rng,
            now: self.now,
        }
    }

    pub fn step(&mut self, action: &mut dyn Action) -> bool {
        action.step(&mut self.context())
    }

    pub fn event(&mut self, action: &mut dyn Action, event: ServerEvent) {
        self.world.observe(&event);
        self.ui.observe(&event);
        action.on_event(&event, &mut self.context());
    }

    pub fn peer_report(&mut self, action: &mut dyn Action, report: &PeerReport) {
        action.on_peer_report(report, &mut self.context());
    }

    pub fn said(&self, message: &str) -> bool {
        self.outbox.pending().iter().any(
            |command| matches!(command, OutboundCommand::Chat { message: m, .. } if m == message),
        )
    }

    pub fn clicks(&mut self) -> Vec<(i32, i32)> {
        self.outbox
            .drain()
            .into_iter()
            .filter_map(|command| match command {
                OutboundCommand::Click { x, y } => Some((x, y)),
                _ => None,
            })
            .collect()
    }
}
