//! Integrity auditing of persisted crawl state
//!
//! The auditor compares an expected entity list against what is actually on
//! disk, probing the same derived paths the stores write to (via
//! `store::paths`). Its report drives the decision to re-run the fetch loop;
//! the per-entity planner then makes that re-run cheap by skipping whatever
//! is already present.

use crate::state::EntityRef;
use crate::store::paths;
use std::path::PathBuf;

/// Result of scanning persisted state against an expected entity list
///
/// Each category carries the ordinals of the entities it found wanting, so
/// callers get the missing subset directly rather than just a count.
#[derive(Debug, Clone, Default)]
pub struct IntegrityReport {
    /// Entities whose list record lacks a name or source URL
    pub missing_basic_data: Vec<usize>,

    /// Entities with an icon URL but no icon file on disk
    pub missing_icons: Vec<usize>,

    /// Entities without a persisted detail document
    pub missing_details: Vec<usize>,
}

impl IntegrityReport {
    /// True iff every category is empty
    pub fn is_complete(&self) -> bool {
        self.missing_basic_data.is_empty()
            && self.missing_icons.is_empty()
            && self.missing_details.is_empty()
    }
}

/// Scans the data and icons directories for completeness
#[derive(Debug, Clone)]
pub struct Auditor {
    data_dir: PathBuf,
    icons_dir: PathBuf,
}

impl Auditor {
    pub fn new(data_dir: impl Into<PathBuf>, icons_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            icons_dir: icons_dir.into(),
        }
    }

    /// Audits persisted state against the expected entity list
    ///
    /// Read-only; each entity is judged independently. Entities without an
    /// icon URL are not expected to have an icon on disk.
    pub fn audit(&self, expected: &[EntityRef]) -> IntegrityReport {
        let mut report = IntegrityReport::default();

        for entity in expected {
            if !entity.has_basic_data() {
                report.missing_basic_data.push(entity.id);
            }

            if let Some(icon_url) = &entity.icon_url {
                if !self.icon_path(entity, icon_url).exists() {
                    report.missing_icons.push(entity.id);
                }
            }

            if !self.detail_path(entity).exists() {
                report.missing_details.push(entity.id);
            }
        }

        tracing::info!(
            "Integrity audit: {} missing basic data, {} missing icons, {} missing details",
            report.missing_basic_data.len(),
            report.missing_icons.len(),
            report.missing_details.len()
        );

        report
    }

    fn detail_path(&self, entity: &EntityRef) -> PathBuf {
        self.data_dir
            .join(paths::detail_filename(entity.id, &entity.name))
    }

    fn icon_path(&self, entity: &EntityRef, icon_url: &str) -> PathBuf {
        self.icons_dir
            .join(paths::asset_filename(&entity.name, icon_url))
    }
}
