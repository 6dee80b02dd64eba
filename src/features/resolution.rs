// Effective-setting resolution and the settings mutation rules
//
// Every mutation is a pure function from the current GuildConfig to either a
// freshly built GuildConfig or NoChange. Channel rows that no longer say
// anything beyond the guild row are pruned before a config is returned.

use crate::features::catalog::GameSystemCatalog;
use crate::models::game_system::SystemId;
use crate::models::settings::{ChannelId, GuildConfig, MutationOutcome, RollSetting};

/// Setting that governs `channel`, or the guild itself when `channel` is `None`.
/// A channel row's system falls back to the guild's when unset; its
/// message-roll flag is taken as stored.
pub fn get_effective(config: &GuildConfig, channel: Option<ChannelId>) -> RollSetting {
    match channel.and_then(|c| config.channel(c)) {
        Some(row) => RollSetting {
            default_system: row
                .default_system
                .clone()
                .or_else(|| config.guild.default_system.clone()),
            message_roll_enabled: row.message_roll_enabled,
        },
        None => config.guild.clone(),
    }
}

fn resolve_id(catalog: &GameSystemCatalog, system_ref: &str) -> Option<SystemId> {
    catalog.resolve(system_ref).map(|entry| entry.id.clone())
}

fn finish(mut config: GuildConfig) -> MutationOutcome {
    config.channels.retain(|_, row| !row.is_redundant());
    MutationOutcome::Applied(config)
}

/// Replace the guild default. `system_ref` is an id or a display name.
pub fn set_guild_default_system(
    catalog: &GameSystemCatalog,
    config: &GuildConfig,
    system_ref: &str,
) -> MutationOutcome {
    let Some(id) = resolve_id(catalog, system_ref) else {
        return MutationOutcome::NoChange;
    };
    if config.guild.default_system.as_deref() == Some(id.as_str()) {
        return MutationOutcome::NoChange;
    }

    let mut next = config.clone();
    next.guild.default_system = Some(id);
    finish(next)
}

/// Set (`Some`) or clear (`None`) the channel's own default system
pub fn set_channel_default_system(
    catalog: &GameSystemCatalog,
    config: &GuildConfig,
    channel: ChannelId,
    system_ref: Option<&str>,
) -> MutationOutcome {
    match system_ref {
        Some(system_ref) => {
            let Some(id) = resolve_id(catalog, system_ref) else {
                return MutationOutcome::NoChange;
            };
            let effective = get_effective(config, Some(channel));
            if effective.default_system.as_deref() == Some(id.as_str()) {
                return MutationOutcome::NoChange;
            }

            let mut next = config.clone();
            next.channels.entry(channel).or_default().default_system = Some(id);
            finish(next)
        }
        None => {
            let Some(row) = config.channel(channel) else {
                return MutationOutcome::NoChange;
            };
            if row.default_system.is_none() {
                return MutationOutcome::NoChange;
            }

            let mut next = config.clone();
            if row.message_roll_enabled {
                next.channels.insert(channel, RollSetting::new(None, true));
            } else {
                next.channels.remove(&channel);
            }
            finish(next)
        }
    }
}

/// Toggle message-roll for the whole guild. Enabling needs a guild default.
pub fn set_guild_message_roll(config: &GuildConfig, enabled: bool) -> MutationOutcome {
    if config.guild.message_roll_enabled == enabled {
        return MutationOutcome::NoChange;
    }
    if enabled && config.guild.default_system.is_none() {
        return MutationOutcome::NoChange;
    }

    let mut next = config.clone();
    next.guild.message_roll_enabled = enabled;
    finish(next)
}

/// Toggle message-roll for one channel
pub fn set_channel_message_roll(
    config: &GuildConfig,
    channel: ChannelId,
    enabled: bool,
) -> MutationOutcome {
    let mut next = config.clone();

    match config.channel(channel) {
        Some(row) => {
            if row.message_roll_enabled == enabled {
                return MutationOutcome::NoChange;
            }
            if enabled && row.default_system.is_none() && config.guild.default_system.is_none() {
                return MutationOutcome::NoChange;
            }
            if !enabled && row.default_system.is_none() {
                // The row only existed to carry the flag
                next.channels.remove(&channel);
            } else {
                next.channels.insert(
                    channel,
                    RollSetting::new(row.default_system.clone(), enabled),
                );
            }
        }
        None => {
            if !enabled || config.guild.default_system.is_none() {
                return MutationOutcome::NoChange;
            }
            next.channels.insert(channel, RollSetting::new(None, true));
        }
    }

    finish(next)
}

/// Drop everything stored for a deleted channel
pub fn remove_channel(config: &GuildConfig, channel: ChannelId) -> MutationOutcome {
    if config.channel(channel).is_none() {
        return MutationOutcome::NoChange;
    }
    let mut next = config.clone();
    next.channels.remove(&channel);
    finish(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::catalog::tests::sample_catalog;

    const GUILD: u64 = 1;
    const CH: u64 = 42;

    fn guild_with(default: Option<&str>, message_roll: bool) -> GuildConfig {
        let mut config = GuildConfig::new(GUILD);
        config.guild = RollSetting::new(default.map(str::to_string), message_roll);
        config
    }

    fn row(default: Option<&str>, message_roll: bool) -> RollSetting {
        RollSetting::new(default.map(str::to_string), message_roll)
    }

    fn applied(outcome: MutationOutcome) -> GuildConfig {
        match outcome {
            MutationOutcome::Applied(config) => config,
            MutationOutcome::NoChange => panic!("expected Applied, got NoChange"),
        }
    }

    // ---- get_effective ----

    #[test]
    fn test_effective_without_row_is_guild() {
        let config = guild_with(Some("DiceBot"), true);
        assert_eq!(get_effective(&config, Some(CH)), config.guild);
        assert_eq!(get_effective(&config, None), config.guild);
    }

    #[test]
    fn test_effective_row_inherits_system_but_not_flag() {
        let mut config = guild_with(Some("DiceBot"), true);
        config.channels.insert(CH, row(None, true));
        config.channels.insert(7, row(Some("Cthulhu7th"), false));

        assert_eq!(get_effective(&config, Some(CH)), row(Some("DiceBot"), true));
        assert_eq!(get_effective(&config, Some(7)), row(Some("Cthulhu7th"), false));
    }

    // ---- set_guild_default_system ----

    #[test]
    fn test_guild_default_by_name() {
        let catalog = sample_catalog();
        let config = guild_with(None, false);
        let next = applied(set_guild_default_system(&catalog, &config, "coc"));
        assert_eq!(next.guild.default_system.as_deref(), Some("Cthulhu7th"));
        assert_eq!(config.guild.default_system, None);
    }

    #[test]
    fn test_guild_default_unknown_is_no_change() {
        let catalog = sample_catalog();
        let config = guild_with(None, false);
        assert_eq!(
            set_guild_default_system(&catalog, &config, "Nope"),
            MutationOutcome::NoChange
        );
    }

    #[test]
    fn test_guild_default_same_is_no_change() {
        let catalog = sample_catalog();
        let config = guild_with(Some("DiceBot"), false);
        assert_eq!(
            set_guild_default_system(&catalog, &config, "DiceBot"),
            MutationOutcome::NoChange
        );
        assert_eq!(
            set_guild_default_system(&catalog, &config, "dice bot"),
            MutationOutcome::NoChange
        );
    }

    #[test]
    fn test_guild_default_keeps_channel_rows() {
        let catalog = sample_catalog();
        let mut config = guild_with(Some("DiceBot"), false);
        config.channels.insert(CH, row(Some("Cthulhu7th"), true));
        let next = applied(set_guild_default_system(&catalog, &config, "SwordWorld2.5"));
        assert_eq!(next.channel(CH), Some(&row(Some("Cthulhu7th"), true)));
    }

    // ---- set_channel_default_system ----

    #[test]
    fn test_channel_default_without_guild_default() {
        let catalog = sample_catalog();
        let config = guild_with(None, false);
        let next = applied(set_channel_default_system(&catalog, &config, CH, Some("CoC")));
        assert_eq!(next.channel(CH), Some(&row(Some("Cthulhu7th"), false)));
    }

    #[test]
    fn test_channel_default_equal_to_inherited_is_no_change() {
        let catalog = sample_catalog();
        let config = guild_with(Some("DiceBot"), false);
        assert_eq!(
            set_channel_default_system(&catalog, &config, CH, Some("DiceBot")),
            MutationOutcome::NoChange
        );
    }

    #[test]
    fn test_channel_default_keeps_flag() {
        let catalog = sample_catalog();
        let mut config = guild_with(Some("DiceBot"), false);
        config.channels.insert(CH, row(None, true));
        let next = applied(set_channel_default_system(&catalog, &config, CH, Some("Cthulhu7th")));
        assert_eq!(next.channel(CH), Some(&row(Some("Cthulhu7th"), true)));
    }

    #[test]
    fn test_channel_default_unknown_is_no_change() {
        let catalog = sample_catalog();
        let config = guild_with(None, false);
        assert_eq!(
            set_channel_default_system(&catalog, &config, CH, Some("Nope")),
            MutationOutcome::NoChange
        );
    }

    #[test]
    fn test_clear_keeps_row_with_flag() {
        let catalog = sample_catalog();
        let mut config = guild_with(None, false);
        config.channels.insert(CH, row(Some("Cthulhu7th"), true));
        let next = applied(set_channel_default_system(&catalog, &config, CH, None));
        assert_eq!(next.channel(CH), Some(&row(None, true)));
    }

    #[test]
    fn test_clear_prunes_row_without_flag() {
        let catalog = sample_catalog();
        let mut config = guild_with(Some("DiceBot"), false);
        config.channels.insert(CH, row(Some("Cthulhu7th"), false));
        let next = applied(set_channel_default_system(&catalog, &config, CH, None));
        assert!(next.channels.is_empty());
    }

    #[test]
    fn test_clear_twice_is_no_change() {
        let catalog = sample_catalog();
        for flag in [true, false] {
            let mut config = guild_with(Some("DiceBot"), false);
            config.channels.insert(CH, row(Some("Cthulhu7th"), flag));
            let once = applied(set_channel_default_system(&catalog, &config, CH, None));
            assert_eq!(
                set_channel_default_system(&catalog, &once, CH, None),
                MutationOutcome::NoChange
            );
        }
    }

    #[test]
    fn test_clear_missing_row_is_no_change() {
        let catalog = sample_catalog();
        let config = guild_with(Some("DiceBot"), false);
        assert_eq!(
            set_channel_default_system(&catalog, &config, CH, None),
            MutationOutcome::NoChange
        );
    }

    // ---- set_guild_message_roll ----

    #[test]
    fn test_guild_message_roll_needs_default() {
        let config = guild_with(None, false);
        assert_eq!(set_guild_message_roll(&config, true), MutationOutcome::NoChange);

        let config = guild_with(Some("DiceBot"), false);
        let next = applied(set_guild_message_roll(&config, true));
        assert!(next.guild.message_roll_enabled);
    }

    #[test]
    fn test_guild_message_roll_same_value_is_no_change() {
        let config = guild_with(Some("DiceBot"), true);
        assert_eq!(set_guild_message_roll(&config, true), MutationOutcome::NoChange);
        let config = guild_with(None, false);
        assert_eq!(set_guild_message_roll(&config, false), MutationOutcome::NoChange);
    }

    #[test]
    fn test_guild_message_roll_disable() {
        let config = guild_with(Some("DiceBot"), true);
        let next = applied(set_guild_message_roll(&config, false));
        assert!(!next.guild.message_roll_enabled);
        assert_eq!(next.guild.default_system.as_deref(), Some("DiceBot"));
    }

    // ---- set_channel_message_roll ----

    #[test]
    fn test_channel_enable_without_row_needs_guild_default() {
        let config = guild_with(None, false);
        assert_eq!(set_channel_message_roll(&config, CH, true), MutationOutcome::NoChange);

        let config = guild_with(Some("DiceBot"), false);
        let next = applied(set_channel_message_roll(&config, CH, true));
        assert_eq!(next.channel(CH), Some(&row(None, true)));
        assert_eq!(get_effective(&next, Some(CH)), row(Some("DiceBot"), true));
    }

    #[test]
    fn test_channel_disable_without_row_is_no_change() {
        let config = guild_with(Some("DiceBot"), true);
        assert_eq!(set_channel_message_roll(&config, CH, false), MutationOutcome::NoChange);
    }

    #[test]
    fn test_channel_disable_prunes_flag_only_row() {
        let mut config = guild_with(Some("DiceBot"), false);
        config.channels.insert(CH, row(None, true));
        let next = applied(set_channel_message_roll(&config, CH, false));
        assert!(next.channel(CH).is_none());
    }

    #[test]
    fn test_channel_disable_keeps_row_with_system() {
        let mut config = guild_with(None, false);
        config.channels.insert(CH, row(Some("Cthulhu7th"), true));
        let next = applied(set_channel_message_roll(&config, CH, false));
        assert_eq!(next.channel(CH), Some(&row(Some("Cthulhu7th"), false)));
    }

    #[test]
    fn test_channel_toggle_same_value_is_no_change() {
        let mut config = guild_with(None, false);
        config.channels.insert(CH, row(Some("Cthulhu7th"), true));
        assert_eq!(set_channel_message_roll(&config, CH, true), MutationOutcome::NoChange);

        config.channels.insert(CH, row(Some("Cthulhu7th"), false));
        assert_eq!(set_channel_message_roll(&config, CH, false), MutationOutcome::NoChange);
        let next = applied(set_channel_message_roll(&config, CH, true));
        assert_eq!(next.channel(CH), Some(&row(Some("Cthulhu7th"), true)));
    }

    // ---- remove_channel ----

    #[test]
    fn test_remove_channel() {
        let mut config = guild_with(Some("DiceBot"), false);
        config.channels.insert(CH, row(Some("Cthulhu7th"), true));
        let next = applied(remove_channel(&config, CH));
        assert!(next.channels.is_empty());
        assert_eq!(remove_channel(&next, CH), MutationOutcome::NoChange);
    }

    #[test]
    fn test_mutations_never_leave_redundant_rows() {
        let catalog = sample_catalog();
        let mut config = guild_with(Some("DiceBot"), false);
        let steps: Vec<Box<dyn Fn(&GuildConfig) -> MutationOutcome + '_>> = vec![
            Box::new(|c: &GuildConfig| set_channel_message_roll(c, CH, true)),
            Box::new(|c: &GuildConfig| set_channel_default_system(&catalog, c, CH, Some("CoC"))),
            Box::new(|c: &GuildConfig| set_channel_message_roll(c, CH, false)),
            Box::new(|c: &GuildConfig| set_channel_default_system(&catalog, c, CH, None)),
            Box::new(|c: &GuildConfig| set_guild_message_roll(c, true)),
        ];
        for step in steps {
            if let MutationOutcome::Applied(next) = step(&config) {
                assert!(next.channels.values().all(|r| !r.is_redundant()));
                config = next;
            }
        }
        assert!(config.channels.is_empty());
        assert!(config.guild.message_roll_enabled);
    }
}
