//! Configuration loading and merging logic.
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded in the following order (later sources override earlier ones):
//! 1. **Hardcoded defaults** - Built-in fallback values
//! 2. **User config** - `~/.nametag/config.toml` (global user preferences)
//! 3. **Project config** - `./.nametag/config.toml` (project-specific overrides)
//! 4. **CLI arguments** - Command-line flags (highest priority)

use std::fs;
use std::path::Path;

use nametag_paths::NametagPaths;

use crate::errors::ConfigError;
use crate::types::{LoggingConfig, NametagConfig, TeamsConfig};
use crate::validation::validate_config;

/// Load configuration from the hierarchy of config files.
///
/// # Errors
///
/// Returns an error if a present file fails to parse or the merged result
/// fails validation. Missing config files are not errors.
pub fn load_hierarchy() -> Result<NametagConfig, ConfigError> {
    let project_root = std::env::current_dir()?;
    match NametagPaths::resolve() {
        Ok(paths) => load_hierarchy_at(Some(&paths), &project_root),
        Err(e) => {
            tracing::warn!(
                event = "config.loading.home_dir_unavailable",
                error = %e,
            );
            load_hierarchy_at(None, &project_root)
        }
    }
}

/// Hierarchy load against explicit locations.
pub(crate) fn load_hierarchy_at(
    paths: Option<&NametagPaths>,
    project_root: &Path,
) -> Result<NametagConfig, ConfigError> {
    let mut config = NametagConfig::default();

    if let Some(paths) = paths {
        config = merge_optional(config, &paths.user_config())?;
    }
    config = merge_optional(config, &NametagPaths::project_config(project_root))?;

    validate_config(&config)?;

    Ok(config)
}

/// Merge the file at `path` over `base`. A missing file leaves `base` as is.
fn merge_optional(base: NametagConfig, path: &Path) -> Result<NametagConfig, ConfigError> {
    match load_config_file(path) {
        Ok(file_config) => {
            tracing::debug!(
                event = "config.loading.file_loaded",
                path = %path.display()
            );
            Ok(merge_configs(base, file_config))
        }
        Err(e) if e.is_file_not_found() => Ok(base),
        Err(e) => Err(e),
    }
}

/// Load a configuration file from the given path without validating it.
pub fn load_config_file(path: &Path) -> Result<NametagConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
        source: std::io::Error::new(e.kind(), format!("'{}': {}", path.display(), e)),
    })?;
    toml::from_str(&content).map_err(|e| ConfigError::ConfigParseError {
        message: format!("'{}': {}", path.display(), e),
    })
}

/// Merge two configurations, with override_config taking precedence.
///
/// Optional fields in the override replace base values only if present.
pub fn merge_configs(base: NametagConfig, override_config: NametagConfig) -> NametagConfig {
    NametagConfig {
        teams: TeamsConfig::merge(&base.teams, &override_config.teams),
        logging: LoggingConfig::merge(&base.logging, &override_config.logging),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LogFormat;
    use std::path::PathBuf;

    fn write_config(dir: &Path, content: &str) -> PathBuf {
        fs::create_dir_all(dir).unwrap();
        let path = dir.join("config.toml");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_config_file_missing_is_not_found() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = load_config_file(&dir.path().join("nope.toml")).unwrap_err();
        assert!(err.is_file_not_found());
    }

    #[test]
    fn test_load_config_file_parse_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_config(dir.path(), "[teams\nname_prefix = 1");
        let err = load_config_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ConfigParseError { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn test_hierarchy_without_files_uses_defaults() {
        let home = tempfile::TempDir::new().unwrap();
        let project = tempfile::TempDir::new().unwrap();
        let paths = NametagPaths::from_dir(home.path().join(".nametag"));

        let config = load_hierarchy_at(Some(&paths), project.path()).unwrap();
        assert_eq!(config, NametagConfig::default());
    }

    #[test]
    fn test_project_config_overrides_user_config() {
        let home = tempfile::TempDir::new().unwrap();
        let project = tempfile::TempDir::new().unwrap();
        let paths = NametagPaths::from_dir(home.path().join(".nametag"));

        write_config(
            paths.nametag_dir(),
            r#"
[teams]
name_prefix = "USR"

[logging]
format = "pretty"
filter = "debug"
"#,
        );
        write_config(
            &project.path().join(".nametag"),
            r#"
[teams]
name_prefix = "PRJ"
"#,
        );

        let config = load_hierarchy_at(Some(&paths), project.path()).unwrap();
        assert_eq!(config.teams.name_prefix(), "PRJ");
        // Unset in project config, kept from user config
        assert_eq!(config.logging.format(), LogFormat::Pretty);
        assert_eq!(config.logging.filter(), "debug");
    }

    #[test]
    fn test_hierarchy_rejects_invalid_merged_config() {
        let project = tempfile::TempDir::new().unwrap();
        write_config(
            &project.path().join(".nametag"),
            "[teams]\nname_prefix = \"BAD1\"\n",
        );

        let result = load_hierarchy_at(None, project.path());
        assert!(matches!(
            result,
            Err(ConfigError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_hierarchy_surfaces_parse_errors() {
        let project = tempfile::TempDir::new().unwrap();
        write_config(&project.path().join(".nametag"), "not = [valid");

        let result = load_hierarchy_at(None, project.path());
        assert!(matches!(result, Err(ConfigError::ConfigParseError { .. })));
    }

    #[test]
    fn test_load_hierarchy_reads_home_from_env() {
        let home = tempfile::TempDir::new().unwrap();
        write_config(
            &home.path().join(".nametag"),
            "[teams]\nname_prefix = \"HOME\"\n",
        );

        let config = temp_env::with_var("HOME", Some(home.path()), load_hierarchy).unwrap();
        assert_eq!(config.teams.name_prefix(), "HOME");
    }

    #[test]
    fn test_merge_configs_keeps_base_when_override_unset() {
        let mut base = NametagConfig::default();
        base.teams.name_prefix = Some("BASE".to_string());

        let merged = merge_configs(base, NametagConfig::default());
        assert_eq!(merged.teams.name_prefix(), "BASE");
    }
}
