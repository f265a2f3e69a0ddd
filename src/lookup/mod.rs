//! Country name suggestions
//!
//! Lookups are best effort: a blank query, a network failure or an
//! unexpected response all degrade to an empty suggestion list.

mod client;
mod error;

pub use client::{LookupConfig, RestCountriesClient};
pub use error::LookupError;

use async_trait::async_trait;
use serde_json::Value;

/// Source of country-name suggestions
#[async_trait]
pub trait CountryLookup: Send + Sync {
    /// Country common names matching `query`.
    async fn search(&self, query: &str) -> Result<Vec<String>, LookupError>;

    /// Like `search`, but never fails. Blank queries return immediately.
    async fn suggest(&self, query: &str) -> Vec<String> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        match self.search(query).await {
            Ok(names) => names,
            Err(e) => {
                log::warn!("Country lookup for {:?} failed: {}", query, e);
                Vec::new()
            }
        }
    }
}

/// Extract `name.common` from every entry of a JSON array.
///
/// Anything that is not an array yields no names; entries without a string
/// `name.common` are skipped.
pub fn parse_country_names(body: &Value) -> Vec<String> {
    let Some(entries) = body.as_array() else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| entry.get("name")?.get("common")?.as_str())
        .map(str::to_string)
        .collect()
}

/// Offline lookup over a fixed list of names
#[derive(Clone, Debug, Default)]
pub struct StaticCountries {
    names: Vec<String>,
}

impl StaticCountries {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// A small built-in list, enough to demo the form without a network.
    pub fn builtin() -> Self {
        Self::new([
            "Argentina",
            "Australia",
            "Bangladesh",
            "Bhutan",
            "Brazil",
            "Canada",
            "China",
            "Egypt",
            "France",
            "Germany",
            "India",
            "Indonesia",
            "Italy",
            "Japan",
            "Kenya",
            "Malaysia",
            "Maldives",
            "Mexico",
            "Nepal",
            "Netherlands",
            "New Zealand",
            "Nigeria",
            "Pakistan",
            "Singapore",
            "South Africa",
            "Spain",
            "Sri Lanka",
            "Thailand",
            "United Arab Emirates",
            "United Kingdom",
            "United States",
        ])
    }
}

#[async_trait]
impl CountryLookup for StaticCountries {
    async fn search(&self, query: &str) -> Result<Vec<String>, LookupError> {
        let needle = query.to_lowercase();
        Ok(self
            .names
            .iter()
            .filter(|name| name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }
}
