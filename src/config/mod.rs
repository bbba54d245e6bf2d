/// Database configuration and connection management
pub mod database;

/// Reference data seeding from config.toml
pub mod seed;

/// Application settings loaded from config.toml
pub mod settings;

pub use settings::{AppConfig, ReferencePolicy};
