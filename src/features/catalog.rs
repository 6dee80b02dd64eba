// Game system catalog
// Loaded once at startup, read-only afterwards

use regex::{Regex, RegexBuilder};
use std::collections::{BTreeMap, HashMap};
use tracing::warn;

use crate::models::game_system::{SystemCatalogEntry, SystemId};

/// Systems known to the dice service, keyed by id.
/// Iteration is in ascending id order, so name lookups are deterministic
/// even if two systems share a display name.
#[derive(Debug, Default)]
pub struct GameSystemCatalog {
    systems: BTreeMap<SystemId, SystemCatalogEntry>,
    patterns: HashMap<SystemId, Regex>,
}

impl GameSystemCatalog {
    pub fn from_entries(entries: impl IntoIterator<Item = SystemCatalogEntry>) -> Self {
        let mut systems = BTreeMap::new();
        let mut patterns = HashMap::new();

        for entry in entries {
            if !entry.command_pattern.is_empty() {
                match RegexBuilder::new(&entry.command_pattern)
                    .case_insensitive(true)
                    .build()
                {
                    Ok(re) => {
                        patterns.insert(entry.id.clone(), re);
                    }
                    Err(e) => warn!("Unusable command pattern for {}: {}", entry.id, e),
                }
            }
            systems.insert(entry.id.clone(), entry);
        }

        Self { systems, patterns }
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    pub fn by_id(&self, id: &str) -> Option<&SystemCatalogEntry> {
        self.systems.get(id)
    }

    /// Case-insensitive name match, lowest id wins on duplicates
    pub fn by_name(&self, name: &str) -> Option<&SystemCatalogEntry> {
        let needle = name.to_lowercase();
        self.systems
            .values()
            .find(|entry| entry.name.to_lowercase() == needle)
    }

    /// Resolve user input: exact id first, then display name
    pub fn resolve(&self, system_ref: &str) -> Option<&SystemCatalogEntry> {
        self.by_id(system_ref).or_else(|| self.by_name(system_ref))
    }

    /// Whether `content` looks like a roll command for `id`
    pub fn matches_command(&self, id: &str, content: &str) -> bool {
        self.patterns
            .get(id)
            .map(|re| re.is_match(content))
            .unwrap_or(false)
    }

    /// Up to `limit` entries whose id or name contains `query`, for autocomplete
    pub fn search(&self, query: &str, limit: usize) -> Vec<&SystemCatalogEntry> {
        let needle = query.to_lowercase();
        self.systems
            .values()
            .filter(|entry| {
                needle.is_empty()
                    || entry.id.to_lowercase().contains(&needle)
                    || entry.name.to_lowercase().contains(&needle)
            })
            .take(limit)
            .collect()
    }
}
