// Game system metadata published by the BCDice API

use serde::{Deserialize, Serialize};

/// Identifier of a game system as understood by the dice service (e.g. `"Cthulhu7th"`)
pub type SystemId = String;

/// One entry of the game system catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemCatalogEntry {
    pub id: SystemId,
    pub name: String,
    #[serde(default)]
    pub help_message: String,
    /// Pattern checked against plain chat messages when message-roll is on
    #[serde(default)]
    pub command_pattern: String,
}

/// Body of `GET /v2/game_system`
#[derive(Debug, Deserialize)]
pub struct GameSystemList {
    pub game_system: Vec<GameSystemSummary>,
}

/// List rows only need to carry the id; the detail record is fetched separately
#[derive(Debug, Deserialize)]
pub struct GameSystemSummary {
    pub id: SystemId,
}
