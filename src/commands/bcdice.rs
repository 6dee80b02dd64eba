// BCDice settings commands - default game system and message roll

use poise::serenity_prelude as serenity;
use tracing::{error, info};

use crate::commands::helpers::{autocomplete_system, guild_scope, send_error};
use crate::features::resolution;
use crate::models::settings::MutationOutcome;
use crate::utils::config::colors;
use crate::utils::formatters::{on_off, success_embed, system_label, truncate, EMBED_DESCRIPTION_LIMIT};
use crate::{Context, Error};

/// Where a setting applies
#[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
pub enum SetMode {
    #[name = "Server"]
    Server,
    #[name = "Channel"]
    Channel,
}

impl SetMode {
    fn label(&self) -> &'static str {
        match self {
            SetMode::Server => "server",
            SetMode::Channel => "channel",
        }
    }
}

/// Configure BCDice for this server
#[poise::command(
    slash_command,
    guild_only,
    subcommands("set_default", "remove_default", "message_roll", "settings", "help"),
    subcommand_required
)]
pub async fn bcdice(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Set the default game system used by /roll
#[poise::command(slash_command, rename = "set-default", required_permissions = "MANAGE_CHANNELS")]
pub async fn set_default(
    ctx: Context<'_>,
    #[description = "Where to apply the setting"] mode: SetMode,
    #[description = "Game system id or name"]
    #[autocomplete = "autocomplete_system"]
    system: String,
) -> Result<(), Error> {
    let Some((guild_id, channel_id)) = guild_scope(ctx) else {
        send_error(ctx, "This command can only be used in a server.").await?;
        return Ok(());
    };
    let data = ctx.data();
    let system = system.trim();

    let outcome = match mode {
        SetMode::Server => data.settings.update(guild_id, |config| {
            resolution::set_guild_default_system(&data.catalog, config, system)
        }),
        SetMode::Channel => data.settings.update(guild_id, |config| {
            resolution::set_channel_default_system(&data.catalog, config, channel_id, Some(system))
        }),
    };

    match outcome {
        MutationOutcome::Applied(_) => {
            data.persist_settings().await;
            // Applied implies the reference resolved
            let id = data
                .catalog
                .resolve(system)
                .map(|entry| entry.id.as_str())
                .unwrap_or(system);
            info!("Guild {}: {} default system -> {}", guild_id, mode.label(), id);

            let embed = success_embed(
                "Settings updated",
                &format!("The {} default game system is now `{}`.", mode.label(), id),
            );
            ctx.send(poise::CreateReply::default().embed(embed)).await?;
        }
        MutationOutcome::NoChange => {
            send_error(ctx, "That game system does not exist or is already the current setting.").await?;
        }
    }

    Ok(())
}

/// Remove this channel's own default game system
#[poise::command(slash_command, rename = "remove-default", required_permissions = "MANAGE_CHANNELS")]
pub async fn remove_default(ctx: Context<'_>) -> Result<(), Error> {
    let Some((guild_id, channel_id)) = guild_scope(ctx) else {
        send_error(ctx, "This command can only be used in a server.").await?;
        return Ok(());
    };
    let data = ctx.data();

    let outcome = data.settings.update(guild_id, |config| {
        resolution::set_channel_default_system(&data.catalog, config, channel_id, None)
    });

    match outcome {
        MutationOutcome::Applied(_) => {
            data.persist_settings().await;
            info!("Guild {}: channel {} default system cleared", guild_id, channel_id);
            let embed = success_embed(
                "Settings updated",
                "This channel's default game system was removed. The server default applies again.",
            );
            ctx.send(poise::CreateReply::default().embed(embed)).await?;
        }
        MutationOutcome::NoChange => {
            send_error(ctx, "This channel has no default game system of its own.").await?;
        }
    }

    Ok(())
}

/// Turn rolling without a command on or off
#[poise::command(slash_command, rename = "message-roll", required_permissions = "MANAGE_CHANNELS")]
pub async fn message_roll(
    ctx: Context<'_>,
    #[description = "Where to apply the setting"] mode: SetMode,
    #[description = "Roll plain messages that look like dice commands"] enable: bool,
) -> Result<(), Error> {
    let Some((guild_id, channel_id)) = guild_scope(ctx) else {
        send_error(ctx, "This command can only be used in a server.").await?;
        return Ok(());
    };
    let data = ctx.data();

    let outcome = match mode {
        SetMode::Server => data
            .settings
            .update(guild_id, |config| resolution::set_guild_message_roll(config, enable)),
        SetMode::Channel => data.settings.update(guild_id, |config| {
            resolution::set_channel_message_roll(config, channel_id, enable)
        }),
    };

    match outcome {
        MutationOutcome::Applied(_) => {
            data.persist_settings().await;
            info!("Guild {}: {} message roll -> {}", guild_id, mode.label(), enable);
            let embed = success_embed(
                "Settings updated",
                &format!("Message roll for this {} is now {}.", mode.label(), on_off(enable)),
            );
            ctx.send(poise::CreateReply::default().embed(embed)).await?;
        }
        MutationOutcome::NoChange => {
            send_error(ctx, "No default game system is set, or this is already the current setting.").await?;
        }
    }

    Ok(())
}

/// Show the BCDice settings for this server and channel
#[poise::command(slash_command)]
pub async fn settings(ctx: Context<'_>) -> Result<(), Error> {
    let Some((guild_id, channel_id)) = guild_scope(ctx) else {
        send_error(ctx, "This command can only be used in a server.").await?;
        return Ok(());
    };
    let data = ctx.data();

    let config = data.settings.get(guild_id);
    let guild = config.as_ref().map(|c| c.guild.clone()).unwrap_or_default();
    let channel_row = config.as_ref().and_then(|c| c.channel(channel_id).cloned());
    let effective = data.settings.effective(guild_id, Some(channel_id));

    let channel_text = match channel_row {
        Some(row) => format!(
            "System: {}\nMessage roll: {}",
            system_label(row.default_system.as_deref()),
            on_off(row.message_roll_enabled)
        ),
        None => "No override".to_string(),
    };

    let embed = serenity::CreateEmbed::new()
        .title("BCDice Settings")
        .field(
            "Server",
            format!(
                "System: {}\nMessage roll: {}",
                system_label(guild.default_system.as_deref()),
                on_off(guild.message_roll_enabled)
            ),
            true,
        )
        .field("This channel", channel_text, true)
        .field(
            "Effective here",
            format!(
                "System: {}\nMessage roll: {}",
                system_label(effective.default_system.as_deref()),
                on_off(effective.message_roll_enabled)
            ),
            false,
        )
        .color(colors::INFO);

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;

    Ok(())
}

/// Show the help text of a game system
#[poise::command(slash_command)]
pub async fn help(
    ctx: Context<'_>,
    #[description = "Game system (defaults to this channel's setting)"]
    #[autocomplete = "autocomplete_system"]
    system: Option<String>,
) -> Result<(), Error> {
    let Some((guild_id, channel_id)) = guild_scope(ctx) else {
        send_error(ctx, "This command can only be used in a server.").await?;
        return Ok(());
    };
    let data = ctx.data();

    let system_id = match system.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(system_ref) => data.catalog.resolve(system_ref).map(|e| e.id.clone()),
        None => data.settings.effective(guild_id, Some(channel_id)).default_system,
    };
    let Some(entry) = system_id.as_deref().and_then(|id| data.catalog.by_id(id)) else {
        send_error(ctx, "The game system does not exist or none is set for this channel.").await?;
        return Ok(());
    };

    ctx.defer_ephemeral().await?;
    let help_text = match data.bcdice.help_message(&entry.id).await {
        Ok(text) => text,
        Err(e) => {
            error!("Failed to fetch help for {}: {}", entry.id, e);
            send_error(ctx, "The dice service is not available right now.").await?;
            return Ok(());
        }
    };

    let embed = serenity::CreateEmbed::new()
        .title(&entry.name)
        .description(truncate(&help_text, EMBED_DESCRIPTION_LIMIT))
        .footer(serenity::CreateEmbedFooter::new(&entry.id))
        .color(colors::INFO);
    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;

    Ok(())
}
