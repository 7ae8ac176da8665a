//! Configuration validation logic.

use crate::errors::ConfigError;
use crate::types::{MAX_TEAM_NAME_LEN, NametagConfig};

/// Longest accepted team name prefix. Leaves room for the ten digits of
/// `u32::MAX` inside the host's team name limit.
pub const MAX_NAME_PREFIX_LEN: usize = MAX_TEAM_NAME_LEN - 10;

/// Validate a NametagConfig, returning an error if any values are invalid.
///
/// # Validation Rules
///
/// - Team name prefix must be non-empty ASCII alphanumeric
/// - Team name prefix must not end in a digit (ids are appended to it)
/// - Team name prefix must be at most [`MAX_NAME_PREFIX_LEN`] characters
/// - Logging filter, if set, must be non-empty
pub fn validate_config(config: &NametagConfig) -> Result<(), ConfigError> {
    let prefix = config.teams.name_prefix();

    if prefix.is_empty() {
        return Err(ConfigError::InvalidConfiguration {
            message: "teams.name_prefix must not be empty".to_string(),
        });
    }

    if !prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ConfigError::InvalidConfiguration {
            message: format!(
                "Invalid teams.name_prefix '{}': only ASCII letters and digits are allowed",
                prefix
            ),
        });
    }

    if prefix.ends_with(|c: char| c.is_ascii_digit()) {
        return Err(ConfigError::InvalidConfiguration {
            message: format!(
                "Invalid teams.name_prefix '{}': must not end in a digit",
                prefix
            ),
        });
    }

    if prefix.len() > MAX_NAME_PREFIX_LEN {
        return Err(ConfigError::InvalidConfiguration {
            message: format!(
                "Invalid teams.name_prefix '{}': at most {} characters",
                prefix, MAX_NAME_PREFIX_LEN
            ),
        });
    }

    if let Some(ref filter) = config.logging.filter
        && filter.trim().is_empty()
    {
        return Err(ConfigError::InvalidConfiguration {
            message: "logging.filter must not be empty when set".to_string(),
        });
    }

    Ok(())
}
