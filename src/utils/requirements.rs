//! Startup checks for the external tools and the network
//!
//! Nothing here is fatal. Each check produces a warning the shell prints
//! before the first prompt.

use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Connectivity probe target
pub const CONNECTIVITY_URL: &str = "https://www.youtube.com";

pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

const FFMPEG_PATHS: &[&str] = &[
    "/usr/bin/ffmpeg",
    "/usr/local/bin/ffmpeg",
    "/data/data/com.termux/files/usr/bin/ffmpeg",
];

/// Outcome of the startup checks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequirementReport {
    pub internet: bool,
    pub ffmpeg: Option<PathBuf>,
    pub ytdlp: Option<PathBuf>,
}

impl RequirementReport {
    pub fn is_ready(&self) -> bool {
        self.internet && self.ffmpeg.is_some() && self.ytdlp.is_some()
    }

    /// One message per failed check
    pub fn warnings(&self) -> Vec<String> {
        let mut out = Vec::new();
        if !self.internet {
            out.push("No internet connection detected. Downloads will likely fail.".to_string());
        }
        if self.ytdlp.is_none() {
            out.push(
                "yt-dlp not found. Install it with 'pip install -U yt-dlp' \
                 (https://github.com/yt-dlp/yt-dlp)."
                    .to_string(),
            );
        }
        if self.ffmpeg.is_none() {
            out.push("ffmpeg not found. Merging and audio extraction will fail.".to_string());
        }
        out
    }
}

/// HEAD `url` within [`PROBE_TIMEOUT`]. Any response counts as connected.
pub async fn check_internet(url: &str) -> bool {
    let client = match reqwest::Client::builder().timeout(PROBE_TIMEOUT).build() {
        Ok(client) => client,
        Err(e) => {
            debug!("Could not build HTTP client: {}", e);
            return false;
        }
    };

    match client.head(url).send().await {
        Ok(resp) => {
            debug!("Connectivity probe: {}", resp.status());
            true
        }
        Err(e) => {
            debug!("Connectivity probe failed: {}", e);
            false
        }
    }
}

/// Locate ffmpeg on PATH or in the usual install locations.
pub fn find_ffmpeg() -> Option<PathBuf> {
    if let Ok(path) = which::which("ffmpeg") {
        return Some(path);
    }

    FFMPEG_PATHS
        .iter()
        .map(Path::new)
        .find(|p| p.is_file())
        .map(Path::to_path_buf)
}

/// Installation help shown when ffmpeg is missing
pub fn ffmpeg_install_guide() -> String {
    let path = std::env::var("PATH").unwrap_or_else(|_| "Not set".to_string());
    format!(
        "FFmpeg Installation Guide\n\
         \n\
         For Ubuntu/Debian Linux:\n  sudo apt update\n  sudo apt install ffmpeg\n\
         \n\
         For Termux:\n  pkg update && pkg upgrade\n  pkg install ffmpeg\n  termux-setup-storage  # grant storage permission\n\
         \n\
         After installation, verify with:\n  1. ffmpeg -version\n  2. which ffmpeg\n\
         \n\
         Troubleshooting:\n  1. Close and reopen your terminal\n  2. Check that ffmpeg is in your PATH (currently: {})\n  3. Run 'hash -r' to clear the command cache",
        path
    )
}

/// Run all checks
pub async fn run_checks(ytdlp: Option<&Path>) -> RequirementReport {
    RequirementReport {
        internet: check_internet(CONNECTIVITY_URL).await,
        ffmpeg: find_ffmpeg(),
        ytdlp: ytdlp.map(Path::to_path_buf),
    }
}
