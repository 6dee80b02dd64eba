// Data models shared by the engine, the store and the dice service client
pub mod game_system;
pub mod roll;
pub mod settings;
