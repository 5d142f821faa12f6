//! Runtime for cooperating game bots.
//!
//! This crate turns the pure grid model of `dbot-core` into bots that walk,
//! explore and group up by reacting to server events and emitting synthetic
//! input. Consumers build a [`Bot`], hand it a [`Transport`] and drive it with
//! a [`Runner`].
//!
//! Modules are organized by responsibility:
//! - [`bot`] owns one player's state and action queue
//! - [`commands`] parses chat commands from operators and peers
//! - [`actions`] hosts the resumable behaviors (explore, party, goto)
//! - [`locomotion`] turns way-points into held direction keys
//! - [`events`] defines the typed inbound events and outbound commands
//! - [`oracle`] mirrors world and UI state for the actions to read
//! - [`repository`] persists collision maps
//! - [`runner`] and [`transport`] bind a bot to a connection
//! - [`sim`] is an in-process server for rehearsals and tests
pub mod actions;
pub mod announce;
pub mod api;
pub mod bot;
pub mod commands;
pub mod config;
pub mod events;
pub mod locomotion;
pub mod oracle;
pub mod repository;
pub mod runner;
pub mod sim;
pub mod transport;

pub use actions::{
    Action, ActionContext, ActionState, ExplorationAction, ExploreState, GotoAction, GotoState,
    PartyFormationAction, PartyState, StateCell,
};
pub use announce::PeerReport;
pub use api::{Result, RuntimeError};
pub use bot::{Bot, BotBuilder, Credentials};
pub use commands::ChatCommand;
pub use config::RuntimeConfig;
pub use events::{ChatMessage, OutboundCommand, Outbox, PlayerData, PlayerField, ServerEvent};
pub use locomotion::{LocomotionController, StepOutcome};
pub use oracle::{MapRouter, StaticRouter, UiOracle, UiPositions, UiScreen, UiState, WorldState};
pub use repository::{
    CollisionRepository, CollisionStore, FileCollisionRepository, InMemoryCollisionRepo,
    RepositoryError,
};
pub use runner::Runner;
pub use sim::{SimConnection, SimMap, SimulatedServer, spawn_ticker};
pub use transport::{ChannelTransport, Transport, TransportPeer};
