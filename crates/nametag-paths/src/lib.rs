use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error("home directory not found, set $HOME")]
    HomeNotFound,
}

/// Centralized path construction for the `~/.nametag/` directory layout.
///
/// Use `resolve()` in production code and `from_dir()` in tests.
#[derive(Debug, Clone)]
pub struct NametagPaths {
    nametag_dir: PathBuf,
}

impl NametagPaths {
    /// Resolve paths from the user's home directory (`~/.nametag`).
    pub fn resolve() -> Result<Self, PathError> {
        let home = dirs::home_dir().ok_or(PathError::HomeNotFound)?;
        Ok(Self {
            nametag_dir: home.join(".nametag"),
        })
    }

    /// Create paths from an explicit base directory. Use in tests.
    pub fn from_dir(nametag_dir: PathBuf) -> Self {
        Self { nametag_dir }
    }

    /// The base `~/.nametag` directory.
    pub fn nametag_dir(&self) -> &Path {
        &self.nametag_dir
    }

    pub fn user_config(&self) -> PathBuf {
        self.nametag_dir.join("config.toml")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.nametag_dir.join("logs")
    }

    // --- Static helpers (no self) ---

    /// Project-level config: `<project_root>/.nametag/config.toml`.
    pub fn project_config(project_root: &Path) -> PathBuf {
        project_root.join(".nametag").join("config.toml")
    }
}
