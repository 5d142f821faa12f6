//! In-memory repository implementations.

mod collision;

pub use collision::InMemoryCollisionRepo;
