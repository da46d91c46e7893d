// src/config/catalog.rs
//! # Feed Catalog
//!
//! The static tables the watcher runs against: which feeds to poll, which
//! keywords make an item relevant, and which geographic sectors an item can be
//! pinned to.
//!
//! - Built-in seed via `Catalog::default_seed()`.
//! - Optional TOML override (`$BORDERADAR_CATALOG_PATH`).
//! - Keywords are trimmed, lowercased and de-duplicated on load; declaration
//!   order is kept because sector matching is first-match-wins.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::ingest::types::Source;
use crate::sector::Sector;

pub const ENV_CATALOG_PATH: &str = "BORDERADAR_CATALOG_PATH";

/// Immutable lookup tables, built once at process start.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Catalog {
    pub sources: Vec<Source>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub sectors: Vec<Sector>,
}

impl Catalog {
    /// Parse a TOML catalog document and normalize its keyword lists.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let raw: Catalog = toml::from_str(s).context("parsing catalog toml")?;
        Ok(raw.normalized())
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading catalog from {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// $BORDERADAR_CATALOG_PATH if set (must exist), otherwise the built-in seed.
    pub fn load_default() -> Result<Self> {
        match std::env::var(ENV_CATALOG_PATH) {
            Ok(p) if !p.trim().is_empty() => {
                let pb = PathBuf::from(p.trim());
                if !pb.exists() {
                    return Err(anyhow!(
                        "{ENV_CATALOG_PATH} points to non-existent path {}",
                        pb.display()
                    ));
                }
                Self::load_from_file(&pb)
            }
            _ => Ok(Self::default_seed()),
        }
    }

    /// Built-in sources, relevance keywords, and the three border sectors.
    pub fn default_seed() -> Self {
        let sources = [
            ("Reuters", "https://www.reuters.com/world/rss"),
            ("AP", "https://apnews.com/hub/asia-pacific?format=rss"),
            ("Al Jazeera", "https://www.aljazeera.com/xml/rss/all.xml"),
            ("BBC", "http://feeds.bbci.co.uk/news/world/rss.xml"),
        ]
        .into_iter()
        .map(|(name, url)| Source::new(name, url))
        .collect();

        let keywords = [
            "border",
            "clash",
            "air strike",
            "airstrike",
            "rocket",
            "drone",
            "artillery",
            "fired",
            "clashes",
            "flee",
            "evacuate",
            "killed",
            "injured",
            "shelling",
            "strike",
            "attack",
            "troop",
            "military",
        ]
        .into_iter()
        .map(str::to_string)
        .collect();

        let sectors = vec![
            Sector::new(
                "preah_vihear",
                "Preah Vihear / Oddar Meanchey",
                13.833,
                103.5,
                &["preah vihear", "oddar meanchey"],
            ),
            Sector::new("surin", "Surin / Sisaket", 14.8, 103.5, &["surin", "sisaket"]),
            Sector::new(
                "battambang",
                "Battambang / Banteay",
                13.1,
                103.1,
                &["battambang", "banteay"],
            ),
        ];

        Self {
            sources,
            keywords,
            sectors,
        }
    }

    fn normalized(mut self) -> Self {
        self.keywords = clean_list(self.keywords);
        for s in &mut self.sectors {
            s.keywords = clean_list(std::mem::take(&mut s.keywords));
        }
        self
    }
}

/// Trim + lowercase + drop empties + de-dup, keeping first-seen order.
fn clean_list(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for it in items {
        let t = it.trim().to_lowercase();
        if !t.is_empty() && !out.contains(&t) {
            out.push(t);
        }
    }
    out
}
