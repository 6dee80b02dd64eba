// Slash commands
pub mod bcdice;
pub mod help;
pub mod helpers;
pub mod roll;
