//! Where the editor stores its own data (config).
//!
//! Documents stay wherever the user keeps them. Only app state lives here.

use std::path::PathBuf;

/// Returns the directory where the editor keeps its config.
/// On Linux: `~/.local/share/notepad/`.
/// Creates the directory if it doesn't exist; returns `None` if we can't determine the path.
pub fn app_data_dir() -> Option<PathBuf> {
    let dir = directories::ProjectDirs::from("org", "Notepad", "Notepad")?.data_local_dir().to_path_buf();
    std::fs::create_dir_all(&dir).ok()?;
    Some(dir)
}
