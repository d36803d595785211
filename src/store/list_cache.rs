//! List cache: the persisted entity list
//!
//! The freshly scraped entity list is written to a JSON array on disk before
//! any detail fetching starts, so a crash right after list acquisition never
//! forces the list page to be re-scraped. A present cache file is read once
//! and trusted verbatim.

use crate::state::EntityRef;
use crate::Result;
use std::path::Path;

/// Returns true if a cached list file is present
pub fn exists(path: &Path) -> bool {
    path.exists()
}

/// Reads the cached entity list
///
/// Ordinals are (re)assigned from array position, which is the durable
/// identity the stores key on.
pub fn read(path: &Path) -> Result<Vec<EntityRef>> {
    let content = std::fs::read_to_string(path)?;
    let mut entities: Vec<EntityRef> = serde_json::from_str(&content)?;
    for (i, entity) in entities.iter_mut().enumerate() {
        entity.id = i;
    }
    Ok(entities)
}

/// Persists the entity list as a pretty-printed JSON array
pub fn write(path: &Path, entities: &[EntityRef]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(entities)?;
    std::fs::write(path, json)?;
    Ok(())
}
