//! Data structures for video information

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Video information from `yt-dlp --dump-json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoInfo {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub webpage_url: String,
    /// Seconds. yt-dlp reports a float for some extractors.
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub uploader: Option<String>,
    #[serde(default)]
    pub upload_date: Option<String>,
    #[serde(default)]
    pub view_count: Option<u64>,
    #[serde(default)]
    pub is_live: Option<bool>,
    #[serde(default)]
    pub extractor: Option<String>,
}

impl VideoInfo {
    pub fn duration(&self) -> Option<Duration> {
        self.duration
            .filter(|d| d.is_finite() && *d >= 0.0)
            .map(Duration::from_secs_f64)
    }

    /// `h:mm:ss` or `m:ss`
    pub fn duration_label(&self) -> Option<String> {
        let total = self.duration()?.as_secs();
        let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
        Some(if h > 0 {
            format!("{}:{:02}:{:02}", h, m, s)
        } else {
            format!("{}:{:02}", m, s)
        })
    }
}
