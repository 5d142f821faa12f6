//! Walking a list of way-points, planning each hop over known terrain.
use std::collections::VecDeque;

use dbot_core::{Point, Role};

use super::{Action, ActionContext, ActionState, StateCell};

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum GotoState {
    Planning,
    Walking,
    Complete,
}

impl ActionState for GotoState {
    const INITIAL: Self = GotoState::Planning;

    fn is_complete(self) -> bool {
        self == GotoState::Complete
    }
}

pub struct GotoAction {
    state: StateCell<GotoState>,
    waypoints: VecDeque<Point>,
    current: Option<Point>,
}

impl GotoAction {
    pub fn new(waypoints: impl IntoIterator<Item = Point>) -> Self {
        Self {
            state: StateCell::new(),
            waypoints: waypoints.into_iter().collect(),
            current: None,
        }
    }

    pub fn state(&self) -> GotoState {
        self.state.get()
    }

    pub fn remaining(&self) -> usize {
        self.waypoints.len()
    }

    fn set_state(&mut self, next: GotoState) {
        // Travel has no role-specific states.
        self.state.set(next, Role::Leader);
    }

    fn plan(&mut self, ctx: &mut ActionContext<'_>) {
        let Some(next) = self.waypoints.pop_front() else {
            self.set_state(GotoState::Complete);
            return;
        };
        let route = ctx.plan_route(next);
        tracing::debug!("heading for {next} via {} way-points", route.len());
        ctx.locomotion.goto(route);
        self.current = Some(next);
        self.set_state(GotoState::Walking);
    }

    fn walk(&mut self, ctx: &mut ActionContext<'_>) {
        if !ctx.locomotion.is_still() {
            return;
        }
        match (self.current, ctx.position()) {
            (Some(target), Some(position)) if target == position => {
                self.set_state(GotoState::Planning);
            }
            (Some(target), _) => {
                let map = ctx.world.map().to_string();
                ctx.say(format!("I can't reach {map} {} {}", target.x, target.y));
                self.waypoints.clear();
                self.set_state(GotoState::Complete);
            }
            (None, _) => self.set_state(GotoState::Planning),
        }
    }
}

impl Action for GotoAction {
    fn name(&self) -> &'static str {
        "goto"
    }

    fn state_name(&self) -> String {
        self.state.get().to_string()
    }

    fn step(&mut self, ctx: &mut ActionContext<'_>) -> bool {
        match self.state.get() {
            GotoState::Planning => self.plan(ctx),
            GotoState::Walking => self.walk(ctx),
            GotoState::Complete => {}
        }
        self.state.is_complete()
    }

    fn cleanup(&mut self, ctx: &mut ActionContext<'_>) {
        if !self.state.is_complete() {
            ctx.locomotion.clear_goto(ctx.outbox);
        }
    }
}
