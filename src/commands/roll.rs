// Roll command - roll dice with a game system

use tracing::{error, info};

use crate::commands::helpers::{autocomplete_system, author_display_name, guild_scope, send_error};
use crate::utils::formatters::roll_embed;
use crate::{Context, Error};

/// Secret rolls are requested with an `S` prefix, e.g. `S1D100`
fn is_secret_command(command: &str) -> bool {
    command.starts_with(['S', 's'])
}

/// Roll dice
#[poise::command(slash_command, guild_only)]
pub async fn roll(
    ctx: Context<'_>,
    #[description = "Dice command, e.g. 2D6+1 or CC<=50"] command: String,
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
        Some(system_ref) => match data.catalog.resolve(system_ref) {
            Some(entry) => entry.id.clone(),
            None => {
                send_error(ctx, &format!("Game system `{}` does not exist.", system_ref)).await?;
                return Ok(());
            }
        },
        None => match data.settings.effective(guild_id, Some(channel_id)).default_system {
            Some(id) => id,
            None => {
                send_error(ctx, "No game system is set for this channel. Pass `system` or use `/bcdice set-default`.").await?;
                return Ok(());
            }
        },
    };

    let command = command.trim();
    // Acknowledge before calling the dice service; secret rolls stay private
    if is_secret_command(command) {
        ctx.defer_ephemeral().await?;
    } else {
        ctx.defer().await?;
    }

    let roll = match data.bcdice.roll(&system_id, command).await {
        Ok(Some(roll)) => roll,
        Ok(None) => {
            send_error(ctx, &format!("`{}` could not be rolled with `{}`.", command, system_id)).await?;
            return Ok(());
        }
        Err(e) => {
            error!("Roll failed for {} `{}`: {}", system_id, command, e);
            send_error(ctx, "The dice service is not available right now.").await?;
            return Ok(());
        }
    };

    info!("{} rolled `{}` with {} in {}", ctx.author().name, command, system_id, channel_id);

    let author_name = author_display_name(ctx).await;
    let embed = roll_embed(&author_name, &ctx.author().face(), &system_id, &roll);
    ctx.send(
        poise::CreateReply::default()
            .embed(embed)
            .ephemeral(roll.is_secret),
    )
    .await?;

    Ok(())
}
