// Bot features: settings engine, catalog and gateway-driven behaviour
pub mod catalog;
pub mod events;
pub mod message_roll;
pub mod resolution;
pub mod settings_store;
