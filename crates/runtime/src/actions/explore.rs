//! Frontier exploration of the current (or a focus) map.
//!
//! The bot repeatedly picks an unknown cell bordering known open ground,
//! walks at it, and classifies it from where it ends up: on the cell (open),
//! one short (blocked), or somewhere else entirely (transport). Peers exploring
//! the same map share their findings over chat, which both fills in this bot's
//! map and strikes those cells from its queue.
use std::collections::HashSet;

use dbot_core::{CollisionState, Location, Point, condense, find_path, reachable_frontier};
use rand::Rng;

use super::{Action, ActionContext, ActionState, StateCell};
use crate::announce::PeerReport;
use crate::events::ServerEvent;

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ExploreState {
    Idle,
    SelectingDestination,
    Walking,
    /// Heading back to the focus map.
    Correcting,
    Complete,
}

impl ActionState for ExploreState {
    const INITIAL: Self = ExploreState::Idle;

    fn is_complete(self) -> bool {
        self == ExploreState::Complete
    }
}

pub struct ExplorationAction {
    state: StateCell<ExploreState>,
    focus_map: Option<String>,
    destination: Option<Location>,
    /// Candidate frontier cells, all on `queue_map`.
    queue: Vec<Point>,
    queue_map: Option<String>,
    /// Candidates that could not be planned to from `stalled_at`.
    unplannable: HashSet<Point>,
    stalled_at: Option<Location>,
}

impl ExplorationAction {
    /// Explores whichever map the bot is on.
    pub fn new() -> Self {
        Self {
            state: StateCell::new(),
            focus_map: None,
            destination: None,
            queue: Vec::new(),
            queue_map: None,
            unplannable: HashSet::new(),
            stalled_at: None,
        }
    }

    /// Explores `map`, routing back to it whenever the bot ends up elsewhere.
    pub fn focused(map: impl Into<String>) -> Self {
        Self {
            focus_map: Some(map.into()),
            ..Self::new()
        }
    }

    pub fn state(&self) -> ExploreState {
        self.state.get()
    }

    pub fn destination(&self) -> Option<&Location> {
        self.destination.as_ref()
    }

    pub fn queue(&self) -> &[Point] {
        &self.queue
    }

    fn set_state(&mut self, next: ExploreState, ctx: &ActionContext<'_>) {
        self.state.set(next, ctx.party.target_role());
    }

    /// Rebuilds the queue from the current frontier. Returns `true` when the
    /// frontier is not empty but none of it can be planned to from here.
    fn refresh(&mut self, map: &str, from: Point, ctx: &mut ActionContext<'_>) -> bool {
        let frontier = reachable_frontier(ctx.maps.get(map), from);
        let found = frontier.len();
        self.queue = frontier
            .into_iter()
            .filter(|point| !self.unplannable.contains(point))
            .collect();
        self.queue_map = Some(map.to_string());
        tracing::debug!("refreshed frontier of {map}: {} cells", self.queue.len());
        found > 0 && self.queue.is_empty()
    }

    fn finish(&mut self, map: &str, stuck: bool, ctx: &mut ActionContext<'_>) {
        if stuck {
            tracing::warn!("no frontier cell of {map} can be planned to");
            ctx.say(format!("I'm stuck in {map}"));
        } else {
            ctx.say(format!("{map} map complete."));
        }
        self.set_state(ExploreState::Complete, ctx);
    }

    fn nearest(&self, from: Point) -> Option<Point> {
        self.queue.iter().copied().min_by_key(|point| point.manhattan(from))
    }

    fn select_destination(&mut self, ctx: &mut ActionContext<'_>) {
        let Some(Location { map, point: position }) = ctx.location() else {
            tracing::debug!("waiting for a position before exploring");
            return;
        };

        if let Some(focus) = self.focus_map.clone()
            && focus != map
        {
            match ctx.router.route_to_map(&Location::new(map.as_str(), position), &focus) {
                Some(route) => {
                    tracing::info!("routing from {map} back to {focus}");
                    ctx.locomotion.goto(route);
                    self.set_state(ExploreState::Correcting, ctx);
                }
                None => {
                    ctx.say(format!("I'm stuck in {map}"));
                    self.set_state(ExploreState::Complete, ctx);
                }
            }
            return;
        }

        if self.queue_map.as_deref() != Some(map.as_str()) {
            self.queue.clear();
        }
        let here = Location::new(map.as_str(), position);
        if self.stalled_at.as_ref() != Some(&here) {
            self.unplannable.clear();
            self.stalled_at = None;
        }

        let mut pick_random = false;
        let mut stuck = false;
        if self.queue.len() < ctx.config.exploration.refresh_threshold {
            stuck = self.refresh(&map, position, ctx);
            pick_random = true;
        }
        if self.queue.is_empty() {
            self.finish(&map, stuck, ctx);
            return;
        }

        let next = if pick_random {
            self.queue[ctx.rng.random_range(0..self.queue.len())]
        } else {
            let mut next = self.nearest(position);
            if let Some(candidate) = next
                && candidate.manhattan(position) > ctx.config.exploration.distance_threshold
            {
                stuck = self.refresh(&map, position, ctx);
                next = self.nearest(position);
            }
            match next {
                Some(point) => point,
                None => {
                    self.finish(&map, stuck, ctx);
                    return;
                }
            }
        };

        match find_path(ctx.maps.get(&map), position, next) {
            Some(path) => {
                tracing::debug!("exploring {map}{next}");
                self.destination = Some(Location::new(map, next));
                ctx.locomotion.goto(condense(&path));
                self.set_state(ExploreState::Walking, ctx);
            }
            None => {
                self.unplannable.insert(next);
                self.stalled_at = Some(here);
                self.queue.retain(|point| *point != next);
            }
        }
    }

    fn settle(&mut self, ctx: &mut ActionContext<'_>) {
        if !ctx.locomotion.is_still() {
            return;
        }
        let Some(destination) = self.destination.clone() else {
            // Resolved by someone else while we walked.
            self.set_state(ExploreState::SelectingDestination, ctx);
            return;
        };
        let (Some(map), Some(position)) = (ctx.world.current_map(), ctx.position()) else {
            tracing::warn!("settled without a known location");
            self.set_state(ExploreState::SelectingDestination, ctx);
            return;
        };
        let end = Location::new(map, position);

        if end == destination {
            ctx.maps.get(&destination.map).classify(destination.point, false);
            self.resolved(&destination.map, destination.point, ctx);
        } else if end.map != destination.map {
            ctx.maps
                .get(&destination.map)
                .record_transport(destination.point, end.clone());
            let report = PeerReport::Transported {
                from: destination.clone(),
                to: end,
            };
            ctx.say(report.announcement(&ctx.config.command_prompt));
            self.resolved(&destination.map, destination.point, ctx);
        } else if end.point.manhattan(destination.point) == 1 {
            ctx.maps.get(&destination.map).classify(destination.point, true);
            let report = PeerReport::Bonked {
                at: destination.clone(),
            };
            ctx.say(report.announcement(&ctx.config.command_prompt));
            self.resolved(&destination.map, destination.point, ctx);
        } else {
            tracing::error!("ended at {end} while heading for {destination}");
            self.destination = None;
        }
        self.set_state(ExploreState::SelectingDestination, ctx);
    }

    /// Strikes `point` off every pending list; stops walking if it was ours.
    fn resolved(&mut self, map: &str, point: Point, ctx: &mut ActionContext<'_>) {
        if self.queue_map.as_deref() == Some(map) {
            self.queue.retain(|candidate| *candidate != point);
        }
        if self
            .destination
            .as_ref()
            .is_some_and(|destination| destination.map == map && destination.point == point)
        {
            self.destination = None;
            ctx.locomotion.clear_goto(ctx.outbox);
        }
        if ctx.config.frequent_saves
            && let Err(error) = ctx.maps.save_map(map)
        {
            tracing::error!("failed to save {map}: {error}");
        }
    }

    fn is_exploring(&self, map: &str) -> bool {
        !self.state.is_complete()
            && (self.queue_map.as_deref() == Some(map)
                || self.destination.as_ref().is_some_and(|d| d.map == map))
    }
}

impl Default for ExplorationAction {
    fn default() -> Self {
        Self::new()
    }
}

impl Action for ExplorationAction {
    fn name(&self) -> &'static str {
        "explore"
    }

    fn state_name(&self) -> String {
        self.state.get().to_string()
    }

    fn step(&mut self, ctx: &mut ActionContext<'_>) -> bool {
        match self.state.get() {
            ExploreState::Idle => self.set_state(ExploreState::SelectingDestination, ctx),
            ExploreState::SelectingDestination => self.select_destination(ctx),
            ExploreState::Walking => self.settle(ctx),
            ExploreState::Correcting => {
                if ctx.locomotion.is_still() {
                    self.set_state(ExploreState::SelectingDestination, ctx);
                }
            }
            ExploreState::Complete => {}
        }
        self.state.is_complete()
    }

    fn cleanup(&mut self, ctx: &mut ActionContext<'_>) {
        if let Err(error) = ctx.maps.save() {
            tracing::error!("failed to save collision maps: {error}");
        }
    }

    fn on_event(&mut self, event: &ServerEvent, ctx: &mut ActionContext<'_>) {
        let ServerEvent::MovePlayer { username, .. } = event else {
            return;
        };
        let (Some(map), Some(point)) = (ctx.world.current_map(), ctx.world.player_position(username))
        else {
            return;
        };
        if !self.is_exploring(map) {
            return;
        }
        let map = map.to_string();
        if ctx.maps.get(&map).state_of(point) != CollisionState::Transport {
            ctx.maps.get(&map).classify(point, false);
        }
        self.resolved(&map, point, ctx);
    }

    fn on_peer_report(&mut self, report: &PeerReport, ctx: &mut ActionContext<'_>) {
        match report {
            PeerReport::Bonked { at } => {
                if !self.is_exploring(&at.map) {
                    return;
                }
                ctx.maps.get(&at.map).classify(at.point, true);
                self.resolved(&at.map, at.point, ctx);
            }
            PeerReport::Transported { from, to } => {
                if !self.is_exploring(&from.map) {
                    return;
                }
                ctx.maps
                    .get(&from.map)
                    .record_transport(from.point, to.clone());
                self.resolved(&from.map, from.point, ctx);
            }
        }
    }
}
