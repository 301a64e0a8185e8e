use crate::error::ConfigError;
use crate::settings::Settings;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::{DatabaseSettings, LoggingSettings};

/// The file read by [`load_config`].
pub const CONFIG_FILE: &str = "sequel.toml";
/// Environment overrides use this prefix, e.g. `SEQUEL__DATABASE__URL`.
pub const ENV_PREFIX: &str = "SEQUEL";

/// Loads the configuration from `sequel.toml` (optional), the environment
/// and `.env`.
pub fn load_config() -> Result<Settings, ConfigError> {
    load_config_from(CONFIG_FILE)
}

/// Loads the configuration from the given file (optional), then applies
/// `SEQUEL__*` environment overrides and validates the result.
pub fn load_config_from(path: impl AsRef<Path>) -> Result<Settings, ConfigError> {
    // A missing .env file is fine, the variables may come from the environment.
    dotenvy::dotenv().ok();

    let builder = config::Config::builder()
        .add_source(config::File::from(path.as_ref()).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let mut settings = builder.try_deserialize::<Settings>()?;
    if settings.database.url.is_empty() {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            settings.database.url = url;
        }
    }

    settings.validate()?;
    Ok(settings)
}
