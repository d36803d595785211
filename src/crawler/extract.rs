//! Markup extraction
//!
//! Turns raw catalog markup into crawl inputs: entity links from the list
//! page, and asset references from a detail page. [`DetailExtractor`] is a
//! trait so the orchestrator never depends on a concrete selector set; the
//! bundled [`CardExtractor`] covers the catalog's card layout.

use crate::state::EntityRef;
use crate::store::paths;
use crate::{GrimoireError, Result};
use scraper::{Html, Selector};
use url::Url;

/// An image referenced by a detail page, not yet downloaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRef {
    /// Absolute URL (or inline data URL) of the image
    pub source_url: String,

    /// Desired filename stem, derived from entity name and URL path segment
    pub file_stem: String,
}

/// Everything extracted from one detail page
#[derive(Debug, Clone)]
pub struct ExtractedDetail {
    /// Images to hand to the asset store, in document order
    pub assets: Vec<AssetRef>,

    /// The raw document, persisted as-is by the detail store
    pub raw_html: String,
}

/// Extracts assets from a fetched detail document
pub trait DetailExtractor: Send + Sync {
    fn extract(&self, entity: &EntityRef, html: &str) -> Result<ExtractedDetail>;
}

/// Parses the list page into an ordered entity list
///
/// Entities are `a[href*="/card/"]` anchors; the name comes from the
/// anchor's `h3`, the icon from its `img` if present. Records missing a name
/// or link are dropped. Ordinals are assigned by document order.
pub fn parse_entity_list(html: &str, base_url: &str) -> Result<Vec<EntityRef>> {
    let document = Html::parse_document(html);
    let base = Url::parse(base_url)?;

    let card_selector = selector(r#"a[href*="/card/"]"#, base_url)?;
    let name_selector = selector("h3", base_url)?;
    let icon_selector = selector("img", base_url)?;

    let mut entities = Vec::new();
    for card in document.select(&card_selector) {
        let name = card
            .select(&name_selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        let href = card.value().attr("href").unwrap_or_default();
        if name.is_empty() || href.is_empty() {
            continue;
        }

        let source_url = match absolutize(&base, href) {
            Some(url) => url,
            None => continue,
        };

        let icon_url = card
            .select(&icon_selector)
            .next()
            .and_then(|img| img.value().attr("src"))
            .and_then(|src| {
                if src.starts_with("data:") {
                    Some(src.to_string())
                } else {
                    absolutize(&base, src)
                }
            });

        entities.push(EntityRef {
            id: entities.len(),
            name,
            source_url,
            icon_url,
        });
    }

    Ok(entities)
}

/// Default extractor for the catalog's card detail layout
///
/// Collects the `og:image` card art plus every inline `img`, naming each
/// asset `<entity>_<url-stem>` so distinct images of one entity never
/// collide while re-runs derive identical names.
#[derive(Debug, Clone, Default)]
pub struct CardExtractor;

impl DetailExtractor for CardExtractor {
    fn extract(&self, entity: &EntityRef, html: &str) -> Result<ExtractedDetail> {
        if html.trim().is_empty() {
            return Err(GrimoireError::Extract {
                url: entity.source_url.clone(),
                message: "empty document".to_string(),
            });
        }

        let document = Html::parse_document(html);
        let mut assets = Vec::new();

        // Card art advertised for link previews
        if let Ok(selector) = Selector::parse(r#"meta[property="og:image"]"#) {
            if let Some(content) = document
                .select(&selector)
                .next()
                .and_then(|el| el.value().attr("content"))
            {
                if !content.is_empty() {
                    assets.push(AssetRef {
                        source_url: content.to_string(),
                        file_stem: format!("{}_card", entity.name),
                    });
                }
            }
        }

        // Inline images (portraits, item icons, option art)
        if let Ok(selector) = Selector::parse("img[src]") {
            for img in document.select(&selector) {
                let src = img.value().attr("src").unwrap_or_default();
                if src.is_empty() {
                    continue;
                }
                if !src.starts_with("http") && !src.starts_with("data:image/svg+xml") {
                    continue;
                }
                let stem = if src.starts_with("data:image/svg+xml") {
                    format!("{}_inline", entity.name)
                } else {
                    match paths::url_file_stem(src) {
                        Some(stem) => format!("{}_{}", entity.name, stem),
                        None => continue,
                    }
                };
                let asset = AssetRef {
                    source_url: src.to_string(),
                    file_stem: stem,
                };
                if !assets.contains(&asset) {
                    assets.push(asset);
                }
            }
        }

        Ok(ExtractedDetail {
            assets,
            raw_html: html.to_string(),
        })
    }
}

fn selector(css: &str, url: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| GrimoireError::Extract {
        url: url.to_string(),
        message: format!("bad selector '{}': {}", css, e),
    })
}

fn absolutize(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    match base.join(href) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Some(url.to_string()),
        _ => None,
    }
}
