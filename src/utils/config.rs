// Centralized configuration for the dice bot

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

/// File name of the persisted settings inside `data_dir`
pub const SETTINGS_FILE: &str = "guild_settings.json";

/// Runtime configuration loaded from the environment (after `.env`)
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub discord_token: String,
    /// BCDice API base URL, without trailing slash
    pub bcdice_url: String,
    pub data_dir: PathBuf,
}

impl BotConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let discord_token = lookup("DISCORD_TOKEN")
            .filter(|v| !v.trim().is_empty())
            .context("DISCORD_TOKEN must be set")?;
        let bcdice_url = lookup("BCDICE_URL")
            .filter(|v| !v.trim().is_empty())
            .context("BCDICE_URL must be set")?;
        let data_dir = lookup("DATA_DIR").unwrap_or_else(|| "data".to_string());

        Ok(Self {
            discord_token,
            bcdice_url: bcdice_url.trim().trim_end_matches('/').to_string(),
            data_dir: PathBuf::from(data_dir),
        })
    }

    pub fn settings_path(&self) -> PathBuf {
        self.data_dir.join(SETTINGS_FILE)
    }
}

/// Discord embed colors
pub mod colors {
    pub const PRIMARY: u32 = 0x00bfff;
    pub const SUCCESS: u32 = 0x2ecc71;
    pub const ERROR: u32 = 0xff0000;
    pub const INFO: u32 = 0x3498db;
    /// Critical / fumble results
    pub const DECISIVE: u32 = 0xf1c40f;
}
