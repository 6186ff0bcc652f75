//! Application configuration
//!
//! Settings are persisted as a pretty-printed JSON object. A missing file is
//! replaced by defaults (and written back); a malformed file is logged and
//! ignored so startup never fails on it.

use crate::downloader::quality::{AudioFormat, Quality};
use crate::utils::error::{Result, Yt4dwError};
use crate::utils::platform;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Persisted user settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory downloads are written to
    download_path: PathBuf,

    /// Quality picked in the previous session, offered as the menu default
    last_used_quality: Quality,

    /// Container used when the user asks for "audio" without naming one
    audio_format: AudioFormat,

    /// Netscape-format cookie file handed to yt-dlp
    cookies: Option<PathBuf>,

    debug: bool,

    auto_update_check: bool,

    /// Append one line per download to the history log
    keep_history: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            download_path: platform::default_download_dir(),
            last_used_quality: Quality::P720,
            audio_format: AudioFormat::Mp3,
            cookies: None,
            debug: false,
            auto_update_check: true,
            keep_history: true,
        }
    }
}

impl Settings {
    /// Load settings from `path`, falling back to defaults.
    ///
    /// An absent file is created with the defaults. A file that exists but
    /// cannot be parsed is left untouched and defaults are returned.
    pub fn load(path: &Path) -> Self {
        match Self::read(path) {
            Ok(Some(settings)) => {
                debug!("Loaded settings from {}", path.display());
                settings
            }
            Ok(None) => {
                let settings = Self::default();
                if let Err(e) = settings.save(path) {
                    warn!("Could not write default settings to {}: {}", path.display(), e);
                }
                settings
            }
            Err(e) => {
                warn!("Could not load settings from {}: {}", path.display(), e);
                warn!("Using default configuration");
                Self::default()
            }
        }
    }

    /// Read settings strictly. `Ok(None)` when the file does not exist.
    pub fn read(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)?;
        let settings = serde_json::from_str(&content)?;
        Ok(Some(settings))
    }

    /// Write settings to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                Yt4dwError::Configuration(format!(
                    "cannot create config directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        debug!("Saved settings to {}", path.display());
        Ok(())
    }

    pub fn download_path(&self) -> &Path {
        &self.download_path
    }

    pub fn set_download_path(&mut self, path: impl Into<PathBuf>) {
        self.download_path = path.into();
    }

    pub fn last_used_quality(&self) -> Quality {
        self.last_used_quality
    }

    pub fn set_last_used_quality(&mut self, quality: Quality) {
        self.last_used_quality = quality;
    }

    pub fn audio_format(&self) -> AudioFormat {
        self.audio_format
    }

    pub fn set_audio_format(&mut self, format: AudioFormat) {
        self.audio_format = format;
    }

    pub fn cookies(&self) -> Option<&Path> {
        self.cookies.as_deref()
    }

    pub fn set_cookies(&mut self, cookies: Option<PathBuf>) {
        self.cookies = cookies;
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    pub fn auto_update_check(&self) -> bool {
        self.auto_update_check
    }

    pub fn set_auto_update_check(&mut self, enabled: bool) {
        self.auto_update_check = enabled;
    }

    pub fn keep_history(&self) -> bool {
        self.keep_history
    }

    pub fn set_keep_history(&mut self, enabled: bool) {
        self.keep_history = enabled;
    }
}

/// Filesystem locations derived from the settings file path
#[derive(Debug, Clone, PartialEq)]
pub struct Paths {
    pub config_file: PathBuf,
    pub config_dir: PathBuf,
    pub cookies_dir: PathBuf,
    pub history_file: PathBuf,
}

impl Paths {
    /// Lay out the config directory around `config_file`.
    pub fn from_config_file(config_file: impl Into<PathBuf>) -> Self {
        let config_file = config_file.into();
        let config_dir = config_file
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        Self {
            cookies_dir: config_dir.join("cookies"),
            history_file: config_dir.join("history.jsonl"),
            config_dir,
            config_file,
        }
    }

    /// Default layout under the platform config directory.
    pub fn system_default() -> Self {
        Self::from_config_file(platform::default_config_path())
    }

    /// Create the config, cookies and download directories.
    ///
    /// Only a config directory that cannot be created is an error; the other
    /// two are reported and left for yt-dlp to complain about.
    pub fn ensure_directories(&self, download_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(&self.config_dir).map_err(|e| {
            Yt4dwError::Configuration(format!(
                "cannot create config directory {}: {}",
                self.config_dir.display(),
                e
            ))
        })?;

        for dir in [self.cookies_dir.as_path(), download_dir] {
            if let Err(e) = std::fs::create_dir_all(dir) {
                warn!("Failed to create directory {}: {}", dir.display(), e);
            }
        }

        Ok(())
    }
}
