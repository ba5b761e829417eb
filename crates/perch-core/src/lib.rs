pub mod config;
pub mod error;

pub use config::{CacheConfig, Config, EbirdConfig, ValidationResult};
pub use error::{ApiError, AppError, ConfigError};

use anyhow::Result;

/// Initialize the core application
pub fn init() -> Result<()> {
    // Initialize tracing/logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Perch core initialized");
    Ok(())
}
