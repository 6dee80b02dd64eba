// In-memory roll settings for every guild
//
// Values are Arc<GuildConfig> snapshots. Readers clone the Arc and never see a
// half-applied change; writers hold the guild's map entry for the whole
// read-modify-write, so two mutations of one guild cannot interleave.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::Arc;

use crate::features::resolution;
use crate::models::settings::{
    ChannelId, GuildConfig, GuildId, MutationOutcome, RollSetting, StoredSettings,
};

#[derive(Debug, Default)]
pub struct SettingsStore {
    guilds: DashMap<GuildId, Arc<GuildConfig>>,
}

impl SettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_stored(stored: StoredSettings) -> Self {
        let guilds = stored
            .into_iter()
            .map(|(id, guild)| (id, Arc::new(GuildConfig::from_stored(id, guild))))
            .collect();
        Self { guilds }
    }

    pub fn to_stored(&self) -> StoredSettings {
        self.guilds
            .iter()
            .map(|entry| (*entry.key(), entry.value().to_stored()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.guilds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guilds.is_empty()
    }

    /// Current snapshot for a guild
    pub fn get(&self, guild: GuildId) -> Option<Arc<GuildConfig>> {
        self.guilds.get(&guild).map(|entry| Arc::clone(entry.value()))
    }

    /// Effective setting for a channel; guilds never configured resolve to the default
    pub fn effective(&self, guild: GuildId, channel: Option<ChannelId>) -> RollSetting {
        match self.get(guild) {
            Some(config) => resolution::get_effective(&config, channel),
            None => RollSetting::default(),
        }
    }

    /// Run a mutation against the guild's current config and publish the result.
    /// Unknown guilds are mutated from an empty config and only inserted when
    /// the mutation applies.
    pub fn update<F>(&self, guild: GuildId, mutate: F) -> MutationOutcome<Arc<GuildConfig>>
    where
        F: FnOnce(&GuildConfig) -> MutationOutcome,
    {
        match self.guilds.entry(guild) {
            Entry::Occupied(mut entry) => match mutate(entry.get()) {
                MutationOutcome::Applied(next) => {
                    let next = Arc::new(next);
                    entry.insert(Arc::clone(&next));
                    MutationOutcome::Applied(next)
                }
                MutationOutcome::NoChange => MutationOutcome::NoChange,
            },
            Entry::Vacant(entry) => match mutate(&GuildConfig::new(guild)) {
                MutationOutcome::Applied(next) => {
                    let next = Arc::new(next);
                    entry.insert(Arc::clone(&next));
                    MutationOutcome::Applied(next)
                }
                MutationOutcome::NoChange => MutationOutcome::NoChange,
            },
        }
    }

    /// Bot joined a guild. Returns true if a new entry was created.
    pub fn guild_joined(&self, guild: GuildId) -> bool {
        match self.guilds.entry(guild) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(Arc::new(GuildConfig::new(guild)));
                true
            }
        }
    }

    /// Bot left a guild
    pub fn guild_left(&self, guild: GuildId) -> bool {
        self.guilds.remove(&guild).is_some()
    }

    /// A channel was deleted
    pub fn channel_deleted(&self, guild: GuildId, channel: ChannelId) -> bool {
        self.update(guild, |config| resolution::remove_channel(config, channel))
            .is_applied()
    }

    /// Drop guilds the bot is no longer a member of. Returns how many were removed.
    pub fn retain_guilds(&self, member_of: &HashSet<GuildId>) -> usize {
        let before = self.guilds.len();
        self.guilds.retain(|id, _| member_of.contains(id));
        before - self.guilds.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::catalog::tests::sample_catalog;
    use std::thread;

    #[test]
    fn test_unknown_guild_effective_is_default() {
        let store = SettingsStore::new();
        assert_eq!(store.effective(5, Some(1)), RollSetting::default());
        assert!(store.get(5).is_none());
    }

    #[test]
    fn test_no_change_does_not_create_entry() {
        let store = SettingsStore::new();
        let outcome = store.update(5, |c| resolution::set_guild_message_roll(c, true));
        assert_eq!(outcome, MutationOutcome::NoChange);
        assert!(store.is_empty());
    }

    #[test]
    fn test_update_publishes_new_snapshot() {
        let catalog = sample_catalog();
        let store = SettingsStore::new();
        let before = store.update(5, |c| resolution::set_guild_default_system(&catalog, c, "DiceBot"));
        let before = before.applied().unwrap();

        let held = store.get(5).unwrap();
        let after = store
            .update(5, |c| resolution::set_guild_message_roll(c, true))
            .applied()
            .unwrap();

        assert!(!held.guild.message_roll_enabled);
        assert!(!before.guild.message_roll_enabled);
        assert!(after.guild.message_roll_enabled);
        assert!(store.effective(5, Some(9)).message_roll_enabled);
    }

    #[test]
    fn test_membership_notifications() {
        let catalog = sample_catalog();
        let store = SettingsStore::new();
        assert!(store.guild_joined(1));
        assert!(!store.guild_joined(1));

        let _ = store.update(1, |c| resolution::set_channel_default_system(&catalog, c, 3, Some("CoC")));
        assert!(store.channel_deleted(1, 3));
        assert!(!store.channel_deleted(1, 3));
        assert!(!store.channel_deleted(2, 3));

        assert!(store.guild_left(1));
        assert!(!store.guild_left(1));
    }

    #[test]
    fn test_retain_guilds() {
        let store = SettingsStore::new();
        for id in [1, 2, 3] {
            store.guild_joined(id);
        }
        let removed = store.retain_guilds(&HashSet::from([2]));
        assert_eq!(removed, 2);
        assert!(store.get(2).is_some());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_stored_round_trip() {
        let catalog = sample_catalog();
        let store = SettingsStore::new();
        let _ = store.update(1, |c| resolution::set_guild_default_system(&catalog, c, "DiceBot"));
        let _ = store.update(1, |c| resolution::set_channel_message_roll(c, 8, true));

        let reloaded = SettingsStore::from_stored(store.to_stored());
        assert_eq!(reloaded.get(1), store.get(1));
    }

    #[test]
    fn test_loaded_file_saves_unchanged() {
        let raw = r#"{"7":{"guild":{"default":"DiceBot","message_roll":true},
            "channel":{"1":{"default":null,"message_roll":false}}}}"#;
        let stored: StoredSettings = serde_json::from_str(raw).unwrap();
        let store = SettingsStore::from_stored(stored.clone());

        assert_eq!(store.to_stored(), stored);
        assert!(!store.effective(7, Some(1)).message_roll_enabled);
    }

    #[test]
    fn test_concurrent_writers_do_not_lose_updates() {
        let catalog = sample_catalog();
        let store = Arc::new(SettingsStore::new());
        let _ = store.update(1, |c| resolution::set_guild_default_system(&catalog, c, "DiceBot"));

        let handles: Vec<_> = (0..8u64)
            .map(|n| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for i in 0..50u64 {
                        let channel = n * 1000 + i;
                        let _ = store.update(1, |c| resolution::set_channel_message_roll(c, channel, true));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.get(1).unwrap().channels.len(), 8 * 50);
    }
}
