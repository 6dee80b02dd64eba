// Shared helpers for slash commands

use poise::serenity_prelude as serenity;

use crate::utils::formatters::{error_embed, truncate};
use crate::{Context, Error};

/// Reply with an ephemeral error embed
pub async fn send_error(ctx: Context<'_>, message: &str) -> Result<(), Error> {
    ctx.send(
        poise::CreateReply::default()
            .embed(error_embed(message))
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

/// Guild and channel ids of the invocation, or None outside a guild
pub fn guild_scope(ctx: Context<'_>) -> Option<(u64, u64)> {
    ctx.guild_id()
        .map(|guild| (guild.get(), ctx.channel_id().get()))
}

/// Display name of the invoking user, preferring the server nickname
pub async fn author_display_name(ctx: Context<'_>) -> String {
    match ctx.author_member().await {
        Some(member) => member.display_name().to_string(),
        None => ctx.author().name.clone(),
    }
}

/// Autocomplete game systems by id or name
pub async fn autocomplete_system<'a>(
    ctx: Context<'a>,
    partial: &'a str,
) -> impl Iterator<Item = serenity::AutocompleteChoice> + 'a {
    let choices: Vec<_> = ctx
        .data()
        .catalog
        .search(partial.trim(), 25)
        .into_iter()
        .map(|entry| {
            let label = truncate(&format!("{} ({})", entry.name, entry.id), 100);
            serenity::AutocompleteChoice::new(label, entry.id.clone())
        })
        .collect();

    choices.into_iter()
}
