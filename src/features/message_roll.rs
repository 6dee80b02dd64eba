// Message roll - roll plain chat messages that look like dice commands
// Only active where the effective setting turns it on

use poise::serenity_prelude as serenity;
use tracing::{debug, error, warn};

use crate::features::catalog::GameSystemCatalog;
use crate::models::settings::RollSetting;
use crate::utils::formatters::roll_embed;
use crate::Data;

/// System to roll `content` with, if this message should be rolled at all
pub fn message_roll_system<'a>(
    catalog: &GameSystemCatalog,
    setting: &'a RollSetting,
    content: &str,
) -> Option<&'a str> {
    if !setting.message_roll_enabled {
        return None;
    }
    let system = setting.default_system.as_deref()?;
    let content = content.trim();
    if content.is_empty() || !catalog.matches_command(system, content) {
        return None;
    }
    Some(system)
}

/// Channel notice posted after a secret roll
fn secret_notice(delivered: bool) -> &'static str {
    if delivered {
        "🎲 Secret dice rolled. The result was sent to you by DM."
    } else {
        "🎲 Secret dice rolled, but the result could not be sent. Please open your DMs."
    }
}

/// Handle message roll on message create
pub async fn handle_message_roll(
    ctx: &serenity::Context,
    msg: &serenity::Message,
    data: &Data,
) -> Result<(), anyhow::Error> {
    if msg.author.bot {
        return Ok(());
    }
    let Some(guild_id) = msg.guild_id else {
        return Ok(());
    };

    let setting = data
        .settings
        .effective(guild_id.get(), Some(msg.channel_id.get()));
    let Some(system) = message_roll_system(&data.catalog, &setting, &msg.content) else {
        return Ok(());
    };

    let command = msg.content.trim();
    let roll = match data.bcdice.roll(system, command).await {
        Ok(Some(roll)) => roll,
        Ok(None) => {
            debug!("Message in {} matched {} but did not roll", msg.channel_id, system);
            return Ok(());
        }
        Err(e) => {
            error!("Message roll failed for {} `{}`: {}", system, command, e);
            return Ok(());
        }
    };

    let author_name = msg
        .member
        .as_ref()
        .and_then(|m| m.nick.clone())
        .or_else(|| msg.author.global_name.clone())
        .unwrap_or_else(|| msg.author.name.clone());
    let embed = roll_embed(&author_name, &msg.author.face(), system, &roll);
    let no_ping = serenity::CreateAllowedMentions::new().replied_user(false);

    if roll.is_secret {
        // Secret results go to the roller only
        let delivered = match msg
            .author
            .direct_message(ctx, serenity::CreateMessage::new().embed(embed))
            .await
        {
            Ok(_) => true,
            Err(e) => {
                warn!("Could not DM secret roll to {}: {}", msg.author.id, e);
                false
            }
        };
        msg.channel_id
            .send_message(
                &ctx.http,
                serenity::CreateMessage::new()
                    .content(secret_notice(delivered))
                    .reference_message(msg)
                    .allowed_mentions(no_ping),
            )
            .await?;
    } else {
        msg.channel_id
            .send_message(
                &ctx.http,
                serenity::CreateMessage::new()
                    .embed(embed)
                    .reference_message(msg)
                    .allowed_mentions(no_ping),
            )
            .await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::catalog::tests::sample_catalog;

    fn setting(system: Option<&str>, enabled: bool) -> RollSetting {
        RollSetting::new(system.map(str::to_string), enabled)
    }

    #[test]
    fn test_rolls_matching_message() {
        let catalog = sample_catalog();
        let s = setting(Some("Cthulhu7th"), true);
        assert_eq!(message_roll_system(&catalog, &s, "CC<=60 spot hidden"), Some("Cthulhu7th"));
        assert_eq!(message_roll_system(&catalog, &s, "  1d100  "), Some("Cthulhu7th"));
    }

    #[test]
    fn test_ignores_when_disabled() {
        let catalog = sample_catalog();
        let s = setting(Some("Cthulhu7th"), false);
        assert_eq!(message_roll_system(&catalog, &s, "CC<=60"), None);
    }

    #[test]
    fn test_ignores_without_system() {
        let catalog = sample_catalog();
        let s = setting(None, true);
        assert_eq!(message_roll_system(&catalog, &s, "1d100"), None);
    }

    #[test]
    fn test_ignores_ordinary_chat() {
        let catalog = sample_catalog();
        let s = setting(Some("DiceBot"), true);
        assert_eq!(message_roll_system(&catalog, &s, "good morning"), None);
        assert_eq!(message_roll_system(&catalog, &s, "   "), None);
    }

    #[test]
    fn test_secret_notice_reports_failed_dm() {
        assert!(secret_notice(true).contains("sent to you"));
        assert!(secret_notice(false).contains("could not be sent"));
        assert_ne!(secret_notice(true), secret_notice(false));
    }
}
