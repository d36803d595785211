//! Entity identity and per-run accounting types

use serde::{Deserialize, Serialize};

/// One catalog entity as discovered on the list page
///
/// The pairing of `id` (0-based ordinal position within the list) and the
/// sanitized `name` is the durable identity used to derive filenames; names
/// alone are not guaranteed unique by the source. Immutable once the list is
/// acquired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    /// Ordinal position within the entity list (0-based, stable per list)
    #[serde(default)]
    pub id: usize,

    /// Human-readable name from the list page
    pub name: String,

    /// Absolute URL of the entity's detail page
    #[serde(rename = "url")]
    pub source_url: String,

    /// Absolute URL of the entity's list-page icon, when present
    #[serde(rename = "iconUrl", default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

impl EntityRef {
    /// Returns true if the required basic fields are present
    pub fn has_basic_data(&self) -> bool {
        !self.name.is_empty() && !self.source_url.is_empty()
    }
}

/// Outcome of visiting one entity during the fetch loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityOutcome {
    /// Detail document already on disk; nothing fetched
    Skipped,

    /// Detail document fetched and persisted this run
    Fetched,

    /// All attempts failed; the entity stays incomplete
    Failed,
}

/// Accounting for one crawl run
///
/// Built up as the fetch loop advances and returned from the orchestrator.
/// Used only for progress reporting; completeness decisions always come from
/// the filesystem, never from these counters.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Number of entities in the acquired list
    pub total_entities: usize,

    /// Entities fetched this run
    pub fetched: usize,

    /// Entities skipped because their detail document already existed
    pub skipped: usize,

    /// Entities whose fetch failed permanently this run
    pub failed: usize,

    /// Description of the most recent per-entity failure, if any
    pub last_error: Option<String>,
}

impl RunSummary {
    pub fn new(total_entities: usize) -> Self {
        Self {
            total_entities,
            ..Default::default()
        }
    }

    /// Records one entity outcome
    pub fn record(&mut self, outcome: EntityOutcome) {
        match outcome {
            EntityOutcome::Skipped => self.skipped += 1,
            EntityOutcome::Fetched => self.fetched += 1,
            EntityOutcome::Failed => self.failed += 1,
        }
    }

    /// Number of entities visited so far
    pub fn processed(&self) -> usize {
        self.fetched + self.skipped + self.failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(id: usize, name: &str) -> EntityRef {
        EntityRef {
            id,
            name: name.to_string(),
            source_url: format!("https://example.com/card/{}", id),
            icon_url: None,
        }
    }

    #[test]
    fn test_has_basic_data() {
        assert!(entity(0, "Haunted Kimono").has_basic_data());

        let mut nameless = entity(1, "");
        assert!(!nameless.has_basic_data());

        nameless.name = "Named".to_string();
        nameless.source_url = String::new();
        assert!(!nameless.has_basic_data());
    }

    #[test]
    fn test_entity_json_roundtrip() {
        let original = EntityRef {
            id: 2,
            name: "Rogue Scrapper".to_string(),
            source_url: "https://example.com/card/rogue-scrapper".to_string(),
            icon_url: Some("https://example.com/img/rogue.png".to_string()),
        };

        let json = serde_json::to_string(&original).unwrap();
        // Wire names match the cached list format
        assert!(json.contains("\"url\""));
        assert!(json.contains("\"iconUrl\""));

        let parsed: EntityRef = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_entity_json_missing_icon() {
        let json = r#"{"id":0,"name":"Banner Saga","url":"https://example.com/card/banner"}"#;
        let parsed: EntityRef = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.icon_url, None);
    }

    #[test]
    fn test_run_summary_record() {
        let mut summary = RunSummary::new(5);
        summary.record(EntityOutcome::Skipped);
        summary.record(EntityOutcome::Fetched);
        summary.record(EntityOutcome::Fetched);
        summary.record(EntityOutcome::Failed);

        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.fetched, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.processed(), 4);
        assert_eq!(summary.total_entities, 5);
    }
}
