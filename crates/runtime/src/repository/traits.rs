//! Repository contract for persisting learned collision maps.

use dbot_core::CollisionMap;

use crate::repository::Result;

/// Durable storage for collision maps, one entry per map name.
///
/// Several bot processes may point at the same storage. There is no locking:
/// the last save of a map wins.
pub trait CollisionRepository: Send + Sync {
    /// Save a map under its own name.
    fn save(&self, map: &CollisionMap) -> Result<()>;

    /// Load a map by name. `Ok(None)` means it was never saved.
    fn load(&self, name: &str) -> Result<Option<CollisionMap>>;

    /// Check if a map has been saved.
    fn exists(&self, name: &str) -> bool;

    /// List all saved map names.
    fn list_maps(&self) -> Result<Vec<String>> {
        Ok(vec![])
    }
}
