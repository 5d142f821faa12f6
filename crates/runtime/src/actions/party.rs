//! Grouping bots into the party named by [`Party::target`](dbot_core::Party::target).
//!
//! The target's first (sorted) member leads: it waits for each missing member
//! to come within a tile, selects them and sends an invite. Everyone else
//! walks up beside the leader and accepts the leader's invite, declining any
//! other. Both sides finish once the server-confirmed roster matches.
use std::collections::HashMap;
use std::time::Instant;

use dbot_core::{Point, Role};

use super::{Action, ActionContext, ActionState, StateCell};
use crate::oracle::{UiPositions, UiScreen};

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum PartyState {
    None,
    // leader
    Waiting,
    Selecting,
    // follower
    Moving,
    Awaiting,
    Accepted,
    Complete,
}

impl ActionState for PartyState {
    const INITIAL: Self = PartyState::None;

    fn is_complete(self) -> bool {
        self == PartyState::Complete
    }

    fn allowed_for(self, role: Role) -> bool {
        match self {
            PartyState::None | PartyState::Complete => true,
            PartyState::Waiting | PartyState::Selecting => role == Role::Leader,
            PartyState::Moving | PartyState::Awaiting | PartyState::Accepted => {
                role == Role::Follower
            }
        }
    }
}

#[derive(Default)]
pub struct PartyFormationAction {
    state: StateCell<PartyState>,
    last_invite: HashMap<String, Instant>,
    selecting_since: Option<Instant>,
}

impl PartyFormationAction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PartyState {
        self.state.get()
    }

    fn set_state(&mut self, next: PartyState, ctx: &ActionContext<'_>) {
        self.state.set(next, ctx.party.target_role());
    }

    /// Tile beside the leader reserved for this bot.
    fn flank(ctx: &ActionContext<'_>) -> Option<Point> {
        let leader = ctx.party.target_leader()?;
        let Some(at) = ctx.world.player_position(leader) else {
            tracing::debug!("waiting to see leader {leader}");
            return None;
        };
        let dx = if ctx.party.target_position() == Some(1) { -1 } else { 1 };
        Some(Point::new(at.x + dx, at.y))
    }

    fn head_for_leader(&mut self, ctx: &mut ActionContext<'_>) -> bool {
        let Some(flank) = Self::flank(ctx) else {
            return false;
        };
        let route = ctx.plan_route(flank);
        ctx.locomotion.goto(route);
        true
    }

    fn wait_for_members(&mut self, ctx: &mut ActionContext<'_>) {
        let Some(me) = ctx.position() else {
            return;
        };
        let (party, world) = (ctx.party, ctx.world);
        for name in party.target() {
            if name == party.me() || party.players().contains(name) {
                continue;
            }
            let Some(at) = world.player_position(name) else {
                tracing::warn!("missing party member: {name}");
                continue;
            };
            if !at.is_near(me) {
                tracing::trace!("{name} is not near yet");
                continue;
            }
            if let Some(last) = self.last_invite.get(name)
                && ctx.now.duration_since(*last) < ctx.config.invite_cooldown
            {
                continue;
            }

            tracing::info!("selecting {name} at {at}");
            self.last_invite.insert(name.clone(), ctx.now);
            self.selecting_since = Some(ctx.now);
            ctx.click_at_tile(at.x, at.y);
            self.set_state(PartyState::Selecting, ctx);
            return;
        }
    }

    fn select(&mut self, ctx: &mut ActionContext<'_>) {
        if ctx.ui.screen() == UiScreen::PlayerSelect {
            let selected = ctx.ui.target();
            if ctx.party.target().iter().any(|name| name == selected) {
                tracing::info!("inviting {selected}");
                ctx.outbox.click(UiPositions::PARTY_INVITE);
            } else {
                tracing::warn!("selected {selected}, who is not in the party target");
                ctx.outbox.click(UiPositions::PLAYER_SELECT_EXIT);
            }
            self.set_state(PartyState::Waiting, ctx);
        } else if self
            .selecting_since
            .is_none_or(|since| ctx.now.duration_since(since) > ctx.config.select_timeout)
        {
            tracing::info!("player select never opened");
            self.set_state(PartyState::Waiting, ctx);
        }
    }

    fn approach(&mut self, ctx: &mut ActionContext<'_>) {
        if !ctx.locomotion.is_still() {
            return;
        }
        let leader_near = ctx
            .party
            .target_leader()
            .and_then(|leader| ctx.world.player_position(leader))
            .zip(ctx.position())
            .is_some_and(|(leader, me)| leader.is_near(me));
        if leader_near {
            self.set_state(PartyState::Awaiting, ctx);
        } else {
            self.head_for_leader(ctx);
        }
    }

    fn answer_prompt(&mut self, ctx: &mut ActionContext<'_>) {
        if ctx.ui.screen() != UiScreen::PartyPrompt {
            return;
        }
        let source = ctx.ui.source();
        if Some(source) == ctx.party.target_leader() {
            tracing::info!("accepting invite from {source}");
            ctx.outbox.click(UiPositions::ACCEPT_INVITE);
            self.set_state(PartyState::Accepted, ctx);
        } else {
            tracing::warn!("declining invite from {source}");
            ctx.outbox.click(UiPositions::DECLINE_INVITE);
        }
    }
}

impl Action for PartyFormationAction {
    fn name(&self) -> &'static str {
        "party"
    }

    fn state_name(&self) -> String {
        self.state.get().to_string()
    }

    fn step(&mut self, ctx: &mut ActionContext<'_>) -> bool {
        if self.state.is_complete() {
            return true;
        }
        if ctx.party.is_complete() {
            if ctx.party.target_role() == Role::Leader {
                ctx.say("ready!");
            }
            self.set_state(PartyState::Complete, ctx);
            return true;
        }

        match (self.state.get(), ctx.party.target_role()) {
            (PartyState::None, Role::Leader) => self.set_state(PartyState::Waiting, ctx),
            (PartyState::None, Role::Follower) => {
                if self.head_for_leader(ctx) {
                    self.set_state(PartyState::Moving, ctx);
                }
            }
            (PartyState::Waiting, _) => self.wait_for_members(ctx),
            (PartyState::Selecting, _) => self.select(ctx),
            (PartyState::Moving, _) => self.approach(ctx),
            (PartyState::Awaiting, _) => self.answer_prompt(ctx),
            (PartyState::Accepted, _) | (PartyState::Complete, _) => {}
        }
        self.state.is_complete()
    }
}
