// BCDice API client
// Game system list/detail and dice rolls over the v2 REST endpoints

use reqwest::Client;
use tracing::{debug, error, info, warn};

use crate::api::response::decode_roll;
use crate::features::catalog::GameSystemCatalog;
use crate::models::game_system::{GameSystemList, SystemCatalogEntry};
use crate::models::roll::RollResult;

#[derive(Debug, thiserror::Error)]
pub enum BcDiceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("BCDice returned status {0}")]
    Status(u16),
    #[error("Invalid JSON from BCDice: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unknown game system: {0}")]
    UnknownSystem(String),
}

pub struct BcDiceClient {
    client: Client,
    base_url: String,
}

impl BcDiceClient {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the list of systems and then every detail record.
    /// Any failure aborts the whole fetch.
    pub async fn fetch_catalog(&self) -> Result<GameSystemCatalog, BcDiceError> {
        let response = self
            .client
            .get(format!("{}/v2/game_system", self.base_url))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(BcDiceError::Status(response.status().as_u16()));
        }

        let list: GameSystemList = serde_json::from_str(&response.text().await?)?;
        let mut entries = Vec::with_capacity(list.game_system.len());
        for summary in list.game_system {
            entries.push(self.fetch_system(&summary.id).await?);
        }

        Ok(GameSystemCatalog::from_entries(entries))
    }

    /// Startup wrapper around `fetch_catalog`: failures leave an empty catalog
    /// so the bot still comes up, only without any systems.
    pub async fn load_catalog(&self) -> GameSystemCatalog {
        match self.fetch_catalog().await {
            Ok(catalog) => {
                info!("Loaded {} game systems", catalog.len());
                if catalog.is_empty() {
                    warn!("BCDice reported no game systems");
                }
                catalog
            }
            Err(e) => {
                error!("Failed to load game systems from {}: {}", self.base_url, e);
                warn!("Continuing with an empty game system catalog");
                GameSystemCatalog::default()
            }
        }
    }

    /// `GET /v2/game_system/{id}`
    pub async fn fetch_system(&self, id: &str) -> Result<SystemCatalogEntry, BcDiceError> {
        let response = self
            .client
            .get(format!("{}/v2/game_system/{}", self.base_url, id))
            .send()
            .await?;

        if response.status() == 404 {
            return Err(BcDiceError::UnknownSystem(id.to_string()));
        }
        if !response.status().is_success() {
            return Err(BcDiceError::Status(response.status().as_u16()));
        }

        let entry: SystemCatalogEntry = serde_json::from_str(&response.text().await?)?;
        Ok(entry)
    }

    /// Help text is fetched fresh rather than served from the catalog
    pub async fn help_message(&self, id: &str) -> Result<String, BcDiceError> {
        Ok(self.fetch_system(id).await?.help_message)
    }

    /// `POST /v2/game_system/{id}/roll`.
    /// `Ok(None)` means the service answered but the payload was not a usable roll,
    /// which includes commands the system does not understand.
    pub async fn roll(&self, id: &str, command: &str) -> Result<Option<RollResult>, BcDiceError> {
        let response = self
            .client
            .post(format!("{}/v2/game_system/{}/roll", self.base_url, id))
            .form(&[("command", command)])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let roll = decode_roll(&body);

        if roll.is_none() {
            debug!("Rejected roll response ({}) for {} `{}`: {}", status, id, command, body);
        }

        Ok(roll)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trimmed() {
        let client = BcDiceClient::new(Client::new(), "https://bcdice.example.org/");
        assert_eq!(client.base_url(), "https://bcdice.example.org");
    }

    #[test]
    fn test_game_system_list_shape() {
        let body = r#"{"game_system":[{"id":"DiceBot","name":"DiceBot","sort_key":"*たいすほっと"},
            {"id":"Cthulhu7th","name":"新クトゥルフ神話TRPG","sort_key":"しんくとうるふ"}]}"#;
        let list: GameSystemList = serde_json::from_str(body).unwrap();
        let ids: Vec<_> = list.game_system.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["DiceBot", "Cthulhu7th"]);
    }

    #[test]
    fn test_detail_shape() {
        let body = r#"{"ok":true,"id":"DiceBot","name":"DiceBot","sort_key":"*たいすほっと",
            "command_pattern":"^S?([+\\-(]*\\d+|\\d+B\\d+)","help_message":"【ダイスボット】"}"#;
        let entry: SystemCatalogEntry = serde_json::from_str(body).unwrap();
        assert_eq!(entry.id, "DiceBot");
        assert_eq!(entry.help_message, "【ダイスボット】");
        assert!(entry.command_pattern.starts_with("^S?"));
    }
}
