// BCDice Bot - Rust Edition
// Discord dice bot backed by the BCDice API

mod api;
mod commands;
mod features;
mod models;
mod utils;

use std::collections::HashSet;
use std::env;
use std::sync::Arc;

use anyhow::Context as _;
use poise::serenity_prelude as serenity;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::bcdice::BcDiceClient;
use crate::features::catalog::GameSystemCatalog;
use crate::features::settings_store::SettingsStore;
use crate::utils::config::BotConfig;
use crate::utils::storage::SettingsFile;

/// User data shared across all commands
pub struct Data {
    pub bcdice: Arc<BcDiceClient>,
    pub catalog: Arc<GameSystemCatalog>,
    pub settings: Arc<SettingsStore>,
    pub settings_file: Arc<SettingsFile>,
}

impl Data {
    /// Write the current settings to disk; failures are logged, not returned
    pub async fn persist_settings(&self) {
        if let Err(e) = self.settings_file.save(&self.settings).await {
            error!("Failed to save settings: {}", e);
        }
    }
}

// Manual Debug impl since BcDiceClient doesn't impl Debug
impl std::fmt::Debug for Data {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Data")
            .field("bcdice", &self.bcdice.base_url())
            .field("catalog", &self.catalog.len())
            .field("settings", &self.settings.len())
            .finish()
    }
}

type Error = Box<dyn std::error::Error + Send + Sync>;
type Context<'a> = poise::Context<'a, Data, Error>;

/// Register all slash commands
fn get_commands() -> Vec<poise::Command<Data, Error>> {
    vec![
        commands::roll::roll(),
        commands::bcdice::bcdice(),
        commands::help::help(),
    ]
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            env::var("RUST_LOG").unwrap_or_else(|_| "bcdice_bot=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = BotConfig::from_env()?;

    info!("Starting BCDice Bot (Rust Edition)...");

    // Build HTTP client for API calls
    let http_client = reqwest::Client::builder()
        .user_agent("BCDice-Bot/1.0")
        .build()
        .context("Failed to create HTTP client")?;

    // The catalog is fetched once, before any request is served
    let bcdice = Arc::new(BcDiceClient::new(http_client, &config.bcdice_url));
    let catalog = Arc::new(bcdice.load_catalog().await);

    let settings_file = Arc::new(SettingsFile::new(config.settings_path()));
    let settings = Arc::new(settings_file.load_store().await);
    info!(
        "Settings loaded for {} guilds from {}",
        settings.len(),
        settings_file.path().display()
    );

    // Setup framework
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: get_commands(),
            event_handler: |ctx, event, framework, data| {
                Box::pin(features::events::event_handler(ctx, event, framework, data))
            },
            on_error: |error| {
                Box::pin(async move {
                    match error {
                        poise::FrameworkError::Command { error, ctx, .. } => {
                            error!("Command error: {:?}", error);
                            let _ = ctx
                                .send(
                                    poise::CreateReply::default()
                                        .embed(utils::formatters::error_embed(
                                            "An unexpected error occurred.",
                                        ))
                                        .ephemeral(true),
                                )
                                .await;
                        }
                        err => {
                            if let Err(e) = poise::builtins::on_error(err).await {
                                error!("Framework error: {:?}", e);
                            }
                        }
                    }
                })
            },
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                info!("Bot is ready! Registering commands...");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                info!("Commands registered successfully!");

                let data = Data {
                    bcdice,
                    catalog,
                    settings,
                    settings_file,
                };

                // Forget guilds the bot was removed from while offline
                let member_of: HashSet<u64> = ready.guilds.iter().map(|g| g.id.get()).collect();
                let removed = data.settings.retain_guilds(&member_of);
                if removed > 0 {
                    warn!("Dropped settings of {} guilds the bot is no longer in", removed);
                    data.persist_settings().await;
                }

                Ok(data)
            })
        })
        .build();

    // MESSAGE_CONTENT is privileged; message roll needs it enabled in the Developer Portal
    let intents = serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT;

    let mut client = serenity::ClientBuilder::new(&config.discord_token, intents)
        .framework(framework)
        .await
        .context("Failed to create client")?;

    // Run with graceful shutdown
    let shard_manager = client.shard_manager.clone();

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to register Ctrl+C handler: {}", e);
            return;
        }
        info!("Shutting down...");
        shard_manager.shutdown_all().await;
    });

    if let Err(why) = client.start().await {
        error!("Client error: {:?}", why);
    }

    info!("Goodbye!");
    Ok(())
}
