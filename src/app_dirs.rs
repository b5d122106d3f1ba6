use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    fn project() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", "windsong")
    }

    pub fn config_path() -> Option<PathBuf> {
        Self::project().map(|pd| pd.config_dir().join("config.json"))
    }

    /// Log file for terminal sessions, where stderr would garble the screen.
    pub fn log_path() -> Option<PathBuf> {
        Self::project().map(|pd| pd.data_dir().join("windsong.log"))
    }

    /// Default directory scanned for `.wsm` maps.
    pub fn maps_dir() -> Option<PathBuf> {
        Self::project().map(|pd| pd.data_dir().join("maps"))
    }
}
