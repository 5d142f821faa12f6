//! Read-side views the actions consult.
//!
//! [`WorldState`] mirrors players and maps as reported by the server,
//! [`UiState`] tracks which game window is open, and [`MapRouter`] knows the
//! fixed exits between maps. None of them emit commands.
mod router;
mod ui;
mod world;

pub use router::{MapRouter, StaticRouter};
pub use ui::{PARTY_PROMPT_KEY, UiOracle, UiPositions, UiScreen, UiState};
pub use world::{PlayerState, WorldState};
