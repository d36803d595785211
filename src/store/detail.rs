//! Detail Store: one raw HTML document per entity
//!
//! Documents are keyed by the entity's derived filename
//! (`detail_<ordinal>_<sanitized-name>.html`). Existence of that file is the
//! crawl's definition of "this entity is done" - the planner and auditor
//! both probe it.

use crate::state::EntityRef;
use crate::store::paths;
use crate::Result;
use std::path::{Path, PathBuf};

/// Filesystem-backed store for raw entity detail documents
#[derive(Debug, Clone)]
pub struct DetailStore {
    dir: PathBuf,
}

impl DetailStore {
    /// Opens the store, creating the directory if needed
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Returns the directory holding the detail documents
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Derived path of an entity's detail document
    pub fn path_for(&self, entity: &EntityRef) -> PathBuf {
        self.dir.join(paths::detail_filename(entity.id, &entity.name))
    }

    /// Pure existence probe; no content validation
    pub fn exists(&self, entity: &EntityRef) -> bool {
        self.path_for(entity).exists()
    }

    /// Persists an entity's raw document, replacing any prior content
    pub fn save(&self, entity: &EntityRef, raw_document: &str) -> Result<PathBuf> {
        let path = self.path_for(entity);
        std::fs::write(&path, raw_document)?;
        Ok(path)
    }

    /// Loads an entity's raw document
    ///
    /// Returns an `Io` error with kind `NotFound` when the entity has no
    /// persisted document.
    pub fn load(&self, entity: &EntityRef) -> Result<String> {
        Ok(std::fs::read_to_string(self.path_for(entity))?)
    }
}
