use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// Default location of the backing word table.
    pub fn table_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("watr");
            Some(state_dir.join("wat.csv"))
        } else {
            ProjectDirs::from("", "", "watr")
                .map(|proj_dirs| proj_dirs.data_local_dir().join("wat.csv"))
        }
    }
}
