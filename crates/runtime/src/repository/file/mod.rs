//! File-based repository implementations.

mod collision;

pub use collision::FileCollisionRepository;
