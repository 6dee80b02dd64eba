// Help command - show usage guide

use poise::serenity_prelude as serenity;
use crate::{Context, Error};
use crate::utils::config::colors;

/// Show help and usage guide
#[poise::command(slash_command)]
pub async fn help(ctx: Context<'_>) -> Result<(), Error> {
    let systems = ctx.data().catalog.len();

    let embed = serenity::CreateEmbed::new()
        .title("🎲 BCDice Bot - Help")
        .description(format!("Dice rolling powered by BCDice ({} game systems available)", systems))
        .color(colors::PRIMARY)
        .field(
            "🎲 Rolling",
            "`/roll command:2D6` - Roll with this channel's game system\n\
            `/roll command:CC<=50 system:Cthulhu7th` - Roll with a specific system",
            false,
        )
        .field(
            "⚙️ Default System",
            "`/bcdice set-default` - Set the server or channel default\n\
            `/bcdice remove-default` - Remove this channel's own default",
            false,
        )
        .field(
            "💬 Message Roll",
            "`/bcdice message-roll` - Roll plain messages like `1D100` without a command",
            false,
        )
        .field(
            "📖 Info",
            "`/bcdice settings` - Show current settings\n\
            `/bcdice help` - Show the help text of a game system",
            false,
        )
        .footer(serenity::CreateEmbedFooter::new(
            "Rust Edition • Built with Serenity & Poise",
        ));

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true)).await?;

    Ok(())
}
