use std::time::Instant;

use dbot_core::{Location, Party, Point, find_path, condense};
use rand::rngs::StdRng;

use crate::config::RuntimeConfig;
use crate::events::Outbox;
use crate::locomotion::LocomotionController;
use crate::oracle::{MapRouter, UiOracle, UiPositions, WorldState};
use crate::repository::CollisionStore;

/// Bot state lent to an action for the duration of one call.
pub struct ActionContext<'a> {
    pub config: &'a RuntimeConfig,
    pub world: &'a WorldState,
    pub ui: &'a dyn UiOracle,
    pub party: &'a Party,
    pub locomotion: &'a mut LocomotionController,
    pub outbox: &'a mut Outbox,
    pub maps: &'a mut CollisionStore,
    pub router: &'a dyn MapRouter,
    pub rng: &'a mut StdRng,
    pub now: Instant,
}

impl ActionContext<'_> {
    pub fn me(&self) -> &str {
        self.world.me()
    }

    pub fn position(&self) -> Option<Point> {
        self.world.position()
    }

    pub fn location(&self) -> Option<Location> {
        self.world.location()
    }

    /// Posts `message` on the report channel.
    pub fn say(&mut self, message: impl Into<String>) {
        self.outbox.say(&self.config.report_channel, message);
    }

    /// Clicks the tile (`x`, `y`) relative to the avatar.
    pub fn click_at_tile(&mut self, x: i32, y: i32) {
        match self.position() {
            Some(me) => self.outbox.click(UiPositions::tile(me, x, y)),
            None => tracing::warn!("cannot click ({x}, {y}) without a known position"),
        }
    }

    /// Way-points from the current position to `to` over known open cells.
    ///
    /// Falls back to heading straight for `to` when no path is known, so the
    /// locomotion layer can still feel its way there.
    pub fn plan_route(&mut self, to: Point) -> Vec<Point> {
        let (Some(from), Some(map)) = (self.position(), self.world.current_map()) else {
            return vec![to];
        };
        match find_path(self.maps.get(map), from, to) {
            Some(path) => condense(&path),
            None => vec![to],
        }
    }
}
