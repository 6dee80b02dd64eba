// Formatting utilities

use poise::serenity_prelude as serenity;

use crate::models::roll::RollResult;
use crate::utils::config::colors;

/// Discord rejects embed descriptions longer than this
pub const EMBED_DESCRIPTION_LIMIT: usize = 4096;

/// Truncate string to at most `max_chars` characters, with ellipsis
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Embed for a finished roll: who rolled, the result text, and the system used
pub fn roll_embed(
    author_name: &str,
    author_icon: &str,
    system_id: &str,
    roll: &RollResult,
) -> serenity::CreateEmbed {
    let color = if roll.is_decisive {
        colors::DECISIVE
    } else {
        colors::PRIMARY
    };

    serenity::CreateEmbed::new()
        .author(serenity::CreateEmbedAuthor::new(author_name).icon_url(author_icon))
        .description(truncate(&roll.text, EMBED_DESCRIPTION_LIMIT))
        .footer(serenity::CreateEmbedFooter::new(system_id))
        .color(color)
        .timestamp(serenity::Timestamp::now())
}

pub fn error_embed(message: &str) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title("Error")
        .description(message)
        .color(colors::ERROR)
}

pub fn success_embed(title: &str, message: &str) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title(title)
        .description(message)
        .color(colors::SUCCESS)
}

/// Human label for an optional system id
pub fn system_label(system: Option<&str>) -> String {
    system
        .map(|id| format!("`{}`", id))
        .unwrap_or_else(|| "Not set".to_string())
}

pub fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "ON"
    } else {
        "OFF"
    }
}
