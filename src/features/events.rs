// Gateway event handling
// Keeps the settings store in step with guild/channel lifecycle and
// forwards messages to message roll

use poise::serenity_prelude as serenity;
use tracing::{error, info};

use crate::features::message_roll::handle_message_roll;
use crate::{Data, Error};

pub async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Message { new_message } => {
            if let Err(e) = handle_message_roll(ctx, new_message, data).await {
                error!("Message roll error: {:?}", e);
            }
        }
        serenity::FullEvent::GuildCreate { guild, is_new } => {
            // Fires for every guild on startup too; only brand-new joins are saved
            if data.settings.guild_joined(guild.id.get()) && is_new.unwrap_or(false) {
                info!("Joined guild {} ({})", guild.name, guild.id);
                data.persist_settings().await;
            }
        }
        serenity::FullEvent::GuildDelete { incomplete, .. } => {
            // An unavailable guild is an outage, not a removal
            if !incomplete.unavailable && data.settings.guild_left(incomplete.id.get()) {
                info!("Left guild {}, settings removed", incomplete.id);
                data.persist_settings().await;
            }
        }
        serenity::FullEvent::ChannelDelete { channel, .. } => {
            if data
                .settings
                .channel_deleted(channel.guild_id.get(), channel.id.get())
            {
                info!("Channel {} deleted, override removed", channel.id);
                data.persist_settings().await;
            }
        }
        _ => {}
    }

    Ok(())
}
