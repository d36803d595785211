//! Shared filename derivation for persisted artifacts
//!
//! The Detail Store, Asset Store, and Integrity Auditor all derive paths
//! through this module. Keeping the derivation in one place is what lets the
//! auditor's existence probes agree with what the stores actually wrote.

use std::path::Path;

/// Fallback extension for assets whose URL carries none
const DEFAULT_ASSET_EXT: &str = "png";

/// Replaces every non-alphanumeric character with `_`
///
/// This is the canonical name sanitizer for everything written to disk.
/// Distinct inputs can collide after sanitization; the ordinal embedded in
/// detail filenames keeps those unique, while asset filenames accept the
/// collision (first write wins).
pub fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}

/// Filename of an entity's persisted detail document
///
/// The 0-based ordinal is embedded so same-named entities in one list cannot
/// share a file.
pub fn detail_filename(ordinal: usize, name: &str) -> String {
    format!("detail_{}_{}.html", ordinal, sanitize(name))
}

/// Filename of a downloaded asset
///
/// The extension comes from the URL path with the query string stripped,
/// falling back to `.png`; inline SVG data URLs always get `.svg`.
pub fn asset_filename(base_name: &str, source_url: &str) -> String {
    if source_url.starts_with("data:image/svg+xml") {
        return format!("{}.svg", sanitize(base_name));
    }
    format!("{}.{}", sanitize(base_name), url_extension(source_url))
}

/// Extracts a content-bearing stem from an asset URL
///
/// Takes the last path segment, drops any query string and resolution
/// suffix (everything after `@`), and sanitizes the rest. Stable across
/// runs because it ignores the volatile parts of the URL.
pub fn url_file_stem(source_url: &str) -> Option<String> {
    let without_query = source_url.split(['?', '#']).next().unwrap_or("");
    let segment = without_query.rsplit('/').next()?;
    let stem = segment.split('@').next().unwrap_or(segment);
    // Drop the extension from the stem; it is re-derived at filename time
    let stem = stem.rsplit_once('.').map(|(s, _)| s).unwrap_or(stem);
    if stem.is_empty() {
        return None;
    }
    Some(sanitize(stem))
}

/// Extension of the URL's path component, query stripped, default `png`
fn url_extension(source_url: &str) -> String {
    let without_query = source_url.split(['?', '#']).next().unwrap_or("");
    Path::new(without_query)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or(DEFAULT_ASSET_EXT)
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("Haunted Kimono"), "Haunted_Kimono");
        assert_eq!(sanitize("Jules' Cafe"), "Jules__Cafe");
        assert_eq!(sanitize("plain"), "plain");
        assert_eq!(sanitize(""), "");
    }

    #[test]
    fn test_detail_filename() {
        assert_eq!(
            detail_filename(0, "Haunted Kimono"),
            "detail_0_Haunted_Kimono.html"
        );
        assert_eq!(detail_filename(12, "Viper"), "detail_12_Viper.html");
    }

    #[test]
    fn test_detail_filename_same_name_distinct_ordinals() {
        assert_ne!(detail_filename(3, "Twin"), detail_filename(4, "Twin"));
    }

    #[test]
    fn test_asset_filename_strips_query() {
        assert_eq!(
            asset_filename("Viper", "https://cdn.example.com/img/viper.webp?w=256"),
            "Viper.webp"
        );
    }

    #[test]
    fn test_asset_filename_default_extension() {
        assert_eq!(
            asset_filename("Viper", "https://cdn.example.com/img/viper"),
            "Viper.png"
        );
    }

    #[test]
    fn test_asset_filename_inline_svg() {
        assert_eq!(
            asset_filename("Crest", "data:image/svg+xml,%3Csvg%3E%3C/svg%3E"),
            "Crest.svg"
        );
    }

    #[test]
    fn test_asset_filename_sanitizes_base() {
        assert_eq!(
            asset_filename("Rogue Scrapper", "https://x.test/a.png"),
            "Rogue_Scrapper.png"
        );
    }

    #[test]
    fn test_url_file_stem() {
        assert_eq!(
            url_file_stem("https://cdn.example.com/img/viper_card.png@2x?v=3"),
            Some("viper_card".to_string())
        );
        assert_eq!(
            url_file_stem("https://cdn.example.com/img/axe.png"),
            Some("axe".to_string())
        );
        assert_eq!(url_file_stem("https://cdn.example.com/"), None);
    }

    #[test]
    fn test_url_file_stem_stable_across_query_changes() {
        let a = url_file_stem("https://cdn.example.com/img/axe.png?v=1");
        let b = url_file_stem("https://cdn.example.com/img/axe.png?v=99");
        assert_eq!(a, b);
    }
}
