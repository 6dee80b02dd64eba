// Utility functions module
pub mod config;
pub mod formatters;
pub mod storage;
