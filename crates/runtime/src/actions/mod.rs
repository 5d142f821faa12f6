//! Resumable multi-step behaviors.
//!
//! An [`Action`] is stepped once per action tick until it reports completion,
//! then retired with [`Action::cleanup`]. Each action keeps its progress in a
//! [`StateCell`] over its own state enum; the cell refuses (by panicking) any
//! transition out of the terminal state and any state illegal for the bot's
//! party role. Actions never own bot internals: everything they may touch is
//! lent to them per call through an [`ActionContext`].
mod context;
mod explore;
mod goto;
mod party;
#[cfg(test)]
mod testing;

use std::fmt;

use dbot_core::Role;

use crate::announce::PeerReport;
use crate::events::ServerEvent;

pub use context::ActionContext;
pub use explore::{ExplorationAction, ExploreState};
pub use goto::{GotoAction, GotoState};
pub use party::{PartyFormationAction, PartyState};

/// State enum of one action type.
pub trait ActionState: Copy + Eq + fmt::Debug + fmt::Display {
    const INITIAL: Self;

    fn is_complete(self) -> bool;

    /// Whether a bot playing `role` may enter this state.
    fn allowed_for(self, _role: Role) -> bool {
        true
    }
}

/// Current state of an action, guarded against illegal transitions.
#[derive(Debug, Clone)]
pub struct StateCell<S: ActionState> {
    state: S,
}

impl<S: ActionState> StateCell<S> {
    pub fn new() -> Self {
        Self {
            state: S::INITIAL,
        }
    }

    pub fn get(&self) -> S {
        self.state
    }

    pub fn is_complete(&self) -> bool {
        self.state.is_complete()
    }

    /// Moves to `next`.
    ///
    /// # Panics
    ///
    /// If the action is already complete, or `next` is not a state a bot in
    /// `role` may enter. The current state is left untouched in both cases.
    pub fn set(&mut self, next: S, role: Role) {
        assert!(
            !self.state.is_complete(),
            "action already complete, refusing {next}"
        );
        assert!(next.allowed_for(role), "{role} given {next} state");
        if next != self.state {
            tracing::debug!("new action state: {next}");
        }
        self.state = next;
    }
}

impl<S: ActionState> Default for StateCell<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// A steppable unit of work owned by a bot.
pub trait Action: Send {
    fn name(&self) -> &'static str;

    /// Current state, for logs and status reports.
    fn state_name(&self) -> String;

    /// Runs the handler for the current state. Returns `true` once complete.
    fn step(&mut self, ctx: &mut ActionContext<'_>) -> bool;

    /// Called exactly once when the action leaves the bot's queue, whether it
    /// completed or was cancelled.
    fn cleanup(&mut self, _ctx: &mut ActionContext<'_>) {}

    /// Observes a server event after the bot's own bookkeeping ran.
    fn on_event(&mut self, _event: &ServerEvent, _ctx: &mut ActionContext<'_>) {}

    /// Absorbs terrain another bot announced.
    fn on_peer_report(&mut self, _report: &PeerReport, _ctx: &mut ActionContext<'_>) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{AssertUnwindSafe, catch_unwind};

    #[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
    enum Door {
        Closed,
        Knocking,
        Open,
    }

    impl ActionState for Door {
        const INITIAL: Self = Door::Closed;

        fn is_complete(self) -> bool {
            self == Door::Open
        }

        fn allowed_for(self, role: Role) -> bool {
            !(self == Door::Knocking && role == Role::Leader)
        }
    }

    #[test]
    fn cell_starts_in_initial_state() {
        let cell: StateCell<Door> = StateCell::new();
        assert_eq!(cell.get(), Door::Closed);
        assert!(!cell.is_complete());
    }

    #[test]
    fn illegal_role_panics_before_mutating() {
        let mut cell: StateCell<Door> = StateCell::new();
        let result = catch_unwind(AssertUnwindSafe(|| cell.set(Door::Knocking, Role::Leader)));
        assert!(result.is_err());
        assert_eq!(cell.get(), Door::Closed);

        cell.set(Door::Knocking, Role::Follower);
        assert_eq!(cell.get(), Door::Knocking);
    }

    #[test]
    #[should_panic(expected = "already complete")]
    fn complete_is_terminal() {
        let mut cell: StateCell<Door> = StateCell::new();
        cell.set(Door::Open, Role::Follower);
        cell.set(Door::Closed, Role::Follower);
    }
}
