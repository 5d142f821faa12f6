//! Per-bot cache of collision maps in front of a [`CollisionRepository`].
use std::collections::HashMap;
use std::sync::Arc;

use dbot_core::CollisionMap;

use super::{CollisionRepository, Result};

/// Owns the maps one bot has touched, loading each lazily on first use.
pub struct CollisionStore {
    repository: Arc<dyn CollisionRepository>,
    maps: HashMap<String, CollisionMap>,
}

impl CollisionStore {
    pub fn new(repository: Arc<dyn CollisionRepository>) -> Self {
        Self {
            repository,
            maps: HashMap::new(),
        }
    }

    /// Returns the named map: cached, else loaded, else freshly created.
    ///
    /// Never fails. A map that cannot be read is logged and started over.
    pub fn get(&mut self, name: &str) -> &mut CollisionMap {
        let repository = &self.repository;
        self.maps
            .entry(name.to_string())
            .or_insert_with(|| load_or_create(repository.as_ref(), name))
    }

    /// The named map if it is already in memory.
    pub fn peek(&self, name: &str) -> Option<&CollisionMap> {
        self.maps.get(name)
    }

    pub fn loaded(&self) -> impl Iterator<Item = &str> {
        self.maps.keys().map(String::as_str)
    }

    /// Writes every cached map back to the repository.
    pub fn save(&self) -> Result<()> {
        for map in self.maps.values() {
            self.repository.save(map)?;
        }
        Ok(())
    }

    pub fn save_map(&self, name: &str) -> Result<()> {
        match self.maps.get(name) {
            Some(map) => self.repository.save(map),
            None => Ok(()),
        }
    }

    /// Drops a cached map so the next `get` reloads it from storage.
    pub fn evict(&mut self, name: &str) -> Option<CollisionMap> {
        self.maps.remove(name)
    }
}

fn load_or_create(repository: &dyn CollisionRepository, name: &str) -> CollisionMap {
    match repository.load(name) {
        Ok(Some(map)) => map,
        Ok(None) => {
            tracing::info!("no saved map for {name}, starting a new one");
            CollisionMap::new(name)
        }
        Err(error) => {
            tracing::warn!("failed to load map {name}: {error}; starting a new one");
            CollisionMap::new(name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryCollisionRepo;
    use dbot_core::{CollisionState, Point};

    #[test]
    fn get_creates_then_caches() {
        let repo = Arc::new(InMemoryCollisionRepo::new());
        let mut store = CollisionStore::new(repo.clone());

        store.get("town").classify(Point::new(1, 1), false);
        assert_eq!(
            store.get("town").state_of(Point::new(1, 1)),
            CollisionState::Open
        );
        assert!(!repo.exists("town"));

        store.save().unwrap();
        assert!(repo.exists("town"));
    }

    #[test]
    fn evicted_map_reloads_from_storage() {
        let repo = Arc::new(InMemoryCollisionRepo::new());
        let mut store = CollisionStore::new(repo);

        store.get("cave").classify(Point::new(0, 0), true);
        store.save_map("cave").unwrap();
        store.get("cave").classify(Point::new(0, 1), true);
        store.evict("cave");

        let cave = store.get("cave");
        assert_eq!(cave.state_of(Point::new(0, 0)), CollisionState::Blocked);
        assert_eq!(cave.state_of(Point::new(0, 1)), CollisionState::Unknown);
    }
}
