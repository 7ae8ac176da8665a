//! Configuration type definitions.
//!
//! Loaded from `~/.nametag/config.toml` and `./.nametag/config.toml`. Every
//! field is optional in the file; accessors supply the defaults so that
//! merging can tell "unset" apart from "set to the default".

use serde::{Deserialize, Serialize};

/// Team name prefix used when none is configured.
pub const DEFAULT_TEAM_NAME_PREFIX: &str = "NTP";

/// Longest team name the host accepts.
pub const MAX_TEAM_NAME_LEN: usize = 16;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NametagConfig {
    /// `[teams]` section.
    #[serde(default)]
    pub teams: TeamsConfig,

    /// `[logging]` section.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// `[teams]` section: how managed teams are named.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamsConfig {
    /// Prefix prepended to every managed team's integer id.
    /// Default: `"NTP"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_prefix: Option<String>,
}

impl TeamsConfig {
    /// Returns the team name prefix, defaulting to `"NTP"`.
    pub fn name_prefix(&self) -> &str {
        self.name_prefix
            .as_deref()
            .unwrap_or(DEFAULT_TEAM_NAME_PREFIX)
    }

    /// Merge two team configs. Override takes precedence for set fields.
    pub fn merge(base: &Self, override_config: &Self) -> Self {
        Self {
            name_prefix: override_config
                .name_prefix
                .clone()
                .or(base.name_prefix.clone()),
        }
    }
}

/// Output format for structured logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

/// `[logging]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log line format. Default: `json`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<LogFormat>,

    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    /// Default: `"info"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,

    /// Append logs to `~/.nametag/logs/nametag.log` instead of stderr.
    /// Default: `false`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_file: Option<bool>,
}

impl LoggingConfig {
    pub fn format(&self) -> LogFormat {
        self.format.unwrap_or_default()
    }

    pub fn filter(&self) -> &str {
        self.filter.as_deref().unwrap_or("info")
    }

    pub fn to_file(&self) -> bool {
        self.to_file.unwrap_or(false)
    }

    /// Merge two logging configs. Override takes precedence for set fields.
    pub fn merge(base: &Self, override_config: &Self) -> Self {
        Self {
            format: override_config.format.or(base.format),
            filter: override_config.filter.clone().or(base.filter.clone()),
            to_file: override_config.to_file.or(base.to_file),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_missing() {
        let config: NametagConfig = toml::from_str("").unwrap();
        assert_eq!(config.teams.name_prefix(), "NTP");
        assert_eq!(config.logging.format(), LogFormat::Json);
        assert_eq!(config.logging.filter(), "info");
        assert!(!config.logging.to_file());
    }

    #[test]
    fn test_partial_toml() {
        let config: NametagConfig = toml::from_str(
            r#"
[teams]
name_prefix = "TAG"

[logging]
format = "pretty"
"#,
        )
        .unwrap();
        assert_eq!(config.teams.name_prefix(), "TAG");
        assert_eq!(config.logging.format(), LogFormat::Pretty);
        assert!(config.logging.filter.is_none());
    }

    #[test]
    fn test_unset_fields_are_not_serialized() {
        let toml_str = toml::to_string(&NametagConfig::default()).unwrap();
        assert!(!toml_str.contains("name_prefix"));
        assert!(!toml_str.contains("format"));
    }

    #[test]
    fn test_logging_merge_prefers_override() {
        let base = LoggingConfig {
            format: Some(LogFormat::Pretty),
            filter: Some("debug".to_string()),
            to_file: Some(true),
        };
        let override_config = LoggingConfig {
            format: None,
            filter: Some("warn".to_string()),
            to_file: None,
        };
        let merged = LoggingConfig::merge(&base, &override_config);
        assert_eq!(merged.format(), LogFormat::Pretty);
        assert_eq!(merged.filter(), "warn");
        assert!(merged.to_file());
    }
}
