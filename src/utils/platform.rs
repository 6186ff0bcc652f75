//! Platform-specific paths for yt4dw
//!
//! - Config: `~/.config/yt4dw` (Linux), `~/Library/Application Support/yt4dw` (macOS),
//!   `%APPDATA%\yt4dw` (Windows)
//! - Downloads: `~/Downloads/yt4-dw`, or shared storage when running under Termux

use std::path::{Path, PathBuf};

const APP_DIR: &str = "yt4dw";
const DOWNLOAD_FOLDER: &str = "yt4-dw";
const TERMUX_MARKER: &str = "/data/data/com.termux";
const TERMUX_DOWNLOADS: &str = "/storage/emulated/0/Download";

/// Whether we are running inside Termux on Android
pub fn is_termux() -> bool {
    Path::new(TERMUX_MARKER).exists()
}

/// Returns the configuration directory
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Default settings file location
pub fn default_config_path() -> PathBuf {
    config_dir().join("config.json")
}

/// Returns the default download directory
pub fn default_download_dir() -> PathBuf {
    if is_termux() {
        return PathBuf::from(TERMUX_DOWNLOADS).join(DOWNLOAD_FOLDER);
    }

    dirs::download_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DOWNLOAD_FOLDER)
}

/// Platform-specific executable extension
pub fn exe_extension() -> &'static str {
    #[cfg(target_os = "windows")]
    {
        ".exe"
    }
    #[cfg(not(target_os = "windows"))]
    {
        ""
    }
}
