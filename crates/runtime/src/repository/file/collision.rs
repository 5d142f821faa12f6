//! File-based CollisionRepository implementation.

use std::fs;
use std::path::{Path, PathBuf};

use dbot_core::CollisionMap;

use crate::repository::types::CollisionMapFile;
use crate::repository::{CollisionRepository, RepositoryError, Result};

/// File-based implementation of CollisionRepository.
///
/// Stores each map as `{name}.json` (pretty-printed [`CollisionMapFile`]) so
/// that bots sharing a directory can pick up each other's progress and
/// operators can inspect maps by hand.
pub struct FileCollisionRepository {
    base_dir: PathBuf,
}

impl FileCollisionRepository {
    /// Create a new file-based collision repository.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir).map_err(RepositoryError::Io)?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Get the path to a map file.
    fn map_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(format!("{name}.json"))
    }
}

impl CollisionRepository for FileCollisionRepository {
    fn save(&self, map: &CollisionMap) -> Result<()> {
        let path = self.map_path(map.name());
        let temp_path = path.with_extension("json.tmp");

        let json = serde_json::to_string_pretty(&CollisionMapFile::from(map))?;

        // Write to temp file
        fs::write(&temp_path, json).map_err(RepositoryError::Io)?;

        // Atomic rename
        fs::rename(&temp_path, &path).map_err(RepositoryError::Io)?;

        tracing::info!(
            "saved {} ({} cells) to {}",
            map.name(),
            map.known_count(),
            path.display()
        );

        Ok(())
    }

    fn load(&self, name: &str) -> Result<Option<CollisionMap>> {
        let path = self.map_path(name);

        if !path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&path).map_err(RepositoryError::Io)?;
        let file: CollisionMapFile = serde_json::from_str(&json)?;
        if file.name != name {
            tracing::warn!("{} holds map {:?}", path.display(), file.name);
        }
        let map = CollisionMap::try_from(file)?;

        tracing::info!(
            "loaded {} ({} cells) from {}",
            name,
            map.known_count(),
            path.display()
        );

        Ok(Some(map))
    }

    fn exists(&self, name: &str) -> bool {
        self.map_path(name).exists()
    }

    fn list_maps(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();

        let entries = fs::read_dir(&self.base_dir).map_err(RepositoryError::Io)?;

        for entry in entries {
            let entry = entry.map_err(RepositoryError::Io)?;
            let path = entry.path();

            if let Some(filename) = path.file_name().and_then(|s| s.to_str())
                && let Some(name) = filename.strip_suffix(".json")
            {
                names.push(name.to_string());
            }
        }

        names.sort_unstable();
        Ok(names)
    }
}
