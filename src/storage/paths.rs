//! Application paths.

use std::path::PathBuf;

use directories::{BaseDirs, ProjectDirs};

/// Application paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Configuration directory.
    pub config: PathBuf,
}

impl AppPaths {
    #[must_use]
    pub fn new() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("pl", "play24", "play24") {
            Self {
                config: proj_dirs.config_dir().to_path_buf(),
            }
        } else {
            // No home directory; fall back to something relative.
            let home = BaseDirs::new().map_or_else(|| PathBuf::from("."), |d| d.home_dir().to_path_buf());
            Self {
                config: home.join(".config/play24"),
            }
        }
    }

    /// Default config file location.
    #[must_use]
    pub fn config_file(&self) -> PathBuf {
        self.config.join("config.toml")
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
