use crate::error::ConfigError;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{Config, DatabaseConfig, ServerConfig};

/// Loads the application configuration from the `config.toml` file.
///
/// The file is optional: when it is missing, every setting falls back to its
/// default (see `settings.rs`). Database credentials are never stored here;
/// the connection URL comes from the `DATABASE_URL` environment variable.
pub fn load_config() -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::with_name("config.toml").required(false))
        .build()?;

    let config = builder.try_deserialize::<Config>()?;

    Ok(config)
}
