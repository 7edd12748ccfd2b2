use directories::ProjectDirs;
use std::path::PathBuf;

/// Overrides the state directory when set
pub const HOME_ENV: &str = "COGTRACK_HOME";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// `$COGTRACK_HOME`, else `$HOME/.local/state/cogtrack`, else the platform data dir
    pub fn state_dir() -> Option<PathBuf> {
        if let Some(dir) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
            Some(PathBuf::from(dir))
        } else if let Ok(home) = std::env::var("HOME") {
            Some(
                PathBuf::from(home)
                    .join(".local")
                    .join("state")
                    .join("cogtrack"),
            )
        } else {
            ProjectDirs::from("", "", "cogtrack").map(|pd| pd.data_local_dir().to_path_buf())
        }
    }

    pub fn db_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("sessions.db"))
    }

    pub fn log_dir() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("logs"))
    }

    /// Config lives next to the state when `$COGTRACK_HOME` is set, so one
    /// variable isolates a whole installation.
    pub fn config_path() -> Option<PathBuf> {
        if let Some(dir) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
            Some(PathBuf::from(dir).join("config.json"))
        } else {
            ProjectDirs::from("", "", "cogtrack").map(|pd| pd.config_dir().join("config.json"))
        }
    }
}
