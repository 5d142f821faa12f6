//! Grid, collision and party rules shared by every bot process.
//!
//! `dbot-core` is the pure half of the bot: it knows how a map is learned
//! ([`CollisionMap`]), how to move across what has been learned
//! ([`pathing`]), and how a party is composed ([`Party`]). Nothing in this
//! crate touches the network, the filesystem or the clock; the runtime crate
//! owns those concerns and feeds observations in.
pub mod collision;
pub mod config;
pub mod party;
pub mod pathing;
pub mod types;

pub use collision::{CollisionMap, CollisionState, Recorded};
pub use config::ExplorationConfig;
pub use party::{Party, Role};
pub use pathing::{condense, find_path, reachable_frontier};
pub use types::{Axis, Direction, Location, Point};
