// Clients for external services
pub mod bcdice;
pub mod response;
