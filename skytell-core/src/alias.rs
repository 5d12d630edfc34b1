//! Shortcuts for informal place names ("la", "nyc", ...).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Target of an alias: a city and, usually, its country code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alias {
    pub city: String,
    #[serde(default)]
    pub country: Option<String>,
}

impl Alias {
    pub fn new(city: &str, country: Option<&str>) -> Self {
        Self {
            city: city.to_string(),
            country: country.map(str::to_string),
        }
    }

    /// Query sent to the geocoder to obtain the alias coordinates.
    pub fn geocode_query(&self) -> String {
        match &self.country {
            Some(cc) => format!("{},{}", self.city, cc),
            None => self.city.clone(),
        }
    }
}

const BUILTIN: &[(&str, &str, &str)] = &[
    ("la", "Los Angeles", "US"),
    ("l.a.", "Los Angeles", "US"),
    ("nyc", "New York", "US"),
    ("sf", "San Francisco", "US"),
    ("bay area", "San Francisco", "US"),
    ("dc", "Washington", "US"),
    ("d.c.", "Washington", "US"),
];

/// Alias lookup table. Keys are stored trimmed and lowercased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasTable {
    entries: BTreeMap<String, Alias>,
}

impl Default for AliasTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl AliasTable {
    pub fn empty() -> Self {
        Self { entries: BTreeMap::new() }
    }

    pub fn builtin() -> Self {
        let mut table = Self::empty();
        for (key, city, country) in BUILTIN {
            table.insert(key, Alias::new(city, Some(country)));
        }
        table
    }

    /// Built-in entries overlaid with `extra`; entries in `extra` win.
    pub fn with_extra<'a>(extra: impl IntoIterator<Item = (&'a String, &'a Alias)>) -> Self {
        let mut table = Self::builtin();
        for (key, alias) in extra {
            table.insert(key, alias.clone());
        }
        table
    }

    pub fn insert(&mut self, key: &str, alias: Alias) {
        self.entries.insert(normalize(key), alias);
    }

    pub fn lookup(&self, input: &str) -> Option<&Alias> {
        self.entries.get(&normalize(input))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Alias)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn normalize(key: &str) -> String {
    key.trim().to_lowercase()
}
