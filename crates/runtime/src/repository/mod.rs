//! Repository layer for learned terrain.
//!
//! Repositories persist [`dbot_core::CollisionMap`]s between runs and across
//! bot processes. [`CollisionStore`] sits in front of one and caches the maps
//! a bot is working on.

mod error;
mod file;
mod memory;
mod store;
mod traits;
pub mod types;

pub use error::{RepositoryError, Result};
pub use file::FileCollisionRepository;
pub use memory::InMemoryCollisionRepo;
pub use store::CollisionStore;
pub use traits::CollisionRepository;
pub use types::{CollisionMapFile, decode_location, encode_location};
