//! In-memory CollisionRepository implementation for tests and rehearsals.

use std::collections::HashMap;
use std::sync::RwLock;

use dbot_core::CollisionMap;

use crate::repository::{CollisionRepository, RepositoryError, Result};

/// In-memory implementation of CollisionRepository.
pub struct InMemoryCollisionRepo {
    maps: RwLock<HashMap<String, CollisionMap>>,
}

impl InMemoryCollisionRepo {
    /// Create a new empty in-memory repository.
    pub fn new() -> Self {
        Self {
            maps: RwLock::new(HashMap::new()),
        }
    }

    /// Create with maps that are already known.
    pub fn with_maps(maps: impl IntoIterator<Item = CollisionMap>) -> Self {
        let maps = maps
            .into_iter()
            .map(|map| (map.name().to_string(), map))
            .collect();
        Self {
            maps: RwLock::new(maps),
        }
    }
}

impl Default for InMemoryCollisionRepo {
    fn default() -> Self {
        Self::new()
    }
}

impl CollisionRepository for InMemoryCollisionRepo {
    fn save(&self, map: &CollisionMap) -> Result<()> {
        let mut maps = self
            .maps
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        maps.insert(map.name().to_string(), map.clone());
        Ok(())
    }

    fn load(&self, name: &str) -> Result<Option<CollisionMap>> {
        let maps = self
            .maps
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(maps.get(name).cloned())
    }

    fn exists(&self, name: &str) -> bool {
        self.maps
            .read()
            .map(|maps| maps.contains_key(name))
            .unwrap_or(false)
    }

    fn list_maps(&self) -> Result<Vec<String>> {
        let maps = self
            .maps
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let mut names: Vec<String> = maps.keys().cloned().collect();
        names.sort_unstable();
        Ok(names)
    }
}
