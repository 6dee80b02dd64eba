// Roll settings per guild and per channel
// Serialized shape matches guild_settings.json

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::game_system::SystemId;

pub type GuildId = u64;
pub type ChannelId = u64;

/// Default game system plus the triggerless-roll switch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollSetting {
    #[serde(rename = "default")]
    pub default_system: Option<SystemId>,
    #[serde(rename = "message_roll", default)]
    pub message_roll_enabled: bool,
}

impl RollSetting {
    pub fn new(default_system: Option<SystemId>, message_roll_enabled: bool) -> Self {
        Self {
            default_system,
            message_roll_enabled,
        }
    }

    /// A channel row in this state says nothing the guild row doesn't
    pub fn is_redundant(&self) -> bool {
        self.default_system.is_none() && !self.message_roll_enabled
    }
}

/// Guild row plus per-channel overrides.
/// Treated as immutable once published to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildConfig {
    pub guild_id: GuildId,
    pub guild: RollSetting,
    pub channels: BTreeMap<ChannelId, RollSetting>,
}

impl GuildConfig {
    pub fn new(guild_id: GuildId) -> Self {
        Self {
            guild_id,
            guild: RollSetting::default(),
            channels: BTreeMap::new(),
        }
    }

    pub fn channel(&self, channel: ChannelId) -> Option<&RollSetting> {
        self.channels.get(&channel)
    }

    /// Rows are kept as written so a load then save reproduces the file
    pub(crate) fn from_stored(guild_id: GuildId, stored: StoredGuild) -> Self {
        Self {
            guild_id,
            guild: stored.guild,
            channels: stored.channel,
        }
    }

    pub(crate) fn to_stored(&self) -> StoredGuild {
        StoredGuild {
            guild: self.guild.clone(),
            channel: self.channels.clone(),
        }
    }
}

/// Result of a settings mutation.
/// `NoChange` covers both "invalid input" and "already set"; neither is committed.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum MutationOutcome<T = GuildConfig> {
    Applied(T),
    NoChange,
}

impl<T> MutationOutcome<T> {
    pub fn is_applied(&self) -> bool {
        matches!(self, MutationOutcome::Applied(_))
    }
}

#[cfg(test)]
impl<T> MutationOutcome<T> {
    pub fn applied(self) -> Option<T> {
        match self {
            MutationOutcome::Applied(value) => Some(value),
            MutationOutcome::NoChange => None,
        }
    }
}

/// On-disk shape of one guild entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredGuild {
    #[serde(default)]
    pub guild: RollSetting,
    #[serde(default)]
    pub channel: BTreeMap<ChannelId, RollSetting>,
}

/// On-disk shape of the whole store, keyed by guild id
pub type StoredSettings = BTreeMap<GuildId, StoredGuild>;
