//! # nametag-config
//!
//! TOML configuration types, loading and validation for nametag.
//!
//! Single source of truth for `NametagConfig` and its sections. Depends only
//! on `nametag-paths`.

mod loading;
mod validation;

pub mod errors;
pub mod types;

pub use errors::ConfigError;
pub use loading::{load_config_file, load_hierarchy, merge_configs};
pub use types::{
    DEFAULT_TEAM_NAME_PREFIX, LogFormat, LoggingConfig, MAX_TEAM_NAME_LEN, NametagConfig,
    TeamsConfig,
};
pub use validation::{MAX_NAME_PREFIX_LEN, validate_config};

impl NametagConfig {
    /// Load configuration from the hierarchy of config files.
    ///
    /// See [`loading::load_hierarchy`] for details.
    pub fn load_hierarchy() -> Result<Self, ConfigError> {
        loading::load_hierarchy()
    }

    /// Load a single config file on top of the defaults and validate it.
    pub fn load_from_path(path: &std::path::Path) -> Result<Self, ConfigError> {
        let config = merge_configs(Self::default(), loading::load_config_file(path)?);
        validation::validate_config(&config)?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// See [`validation::validate_config`] for details.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validation::validate_config(self)
    }
}
