/// Database configuration and connection management
pub mod database;

/// Cycle settings and seed plan loading from config.toml
pub mod cycle;
