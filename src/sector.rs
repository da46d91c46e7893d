//! sector.rs — keyword-based mapping of news text to a named border sector.

use serde::{Deserialize, Serialize};

/// A named geographic zone with map coordinates and trigger keywords.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sector {
    pub id: String,
    pub name: String,
    #[serde(alias = "lat")]
    pub latitude: f64,
    #[serde(alias = "lon")]
    pub longitude: f64,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl Sector {
    pub fn new(id: &str, name: &str, latitude: f64, longitude: f64, keywords: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            latitude,
            longitude,
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    /// Google Maps search link centered on the sector.
    pub fn map_url(&self) -> String {
        format!(
            "https://www.google.com/maps/search/?api=1&query={},{}",
            self.latitude, self.longitude
        )
    }

    fn matches(&self, lower: &str) -> bool {
        self.keywords.iter().any(|k| lower.contains(k.as_str()))
    }
}

/// First sector (declaration order) with a keyword contained in `text`.
pub fn classify<'a>(text: &str, sectors: &'a [Sector]) -> Option<&'a Sector> {
    let lower = text.to_lowercase();
    sectors.iter().find(|s| s.matches(&lower))
}
