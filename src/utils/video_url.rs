//! Video URL shape check
//!
//! Only the shape is checked here. Whether the video exists is yt-dlp's
//! business.

use crate::utils::error::{Result, Yt4dwError};
use reqwest::Url;

const HOSTS: &[&str] = &[
    "youtube.com",
    "m.youtube.com",
    "music.youtube.com",
    "youtube-nocookie.com",
    "youtu.be",
];

const ID_PATHS: &[&str] = &["shorts", "live", "embed", "v"];

/// Parse and validate a YouTube video URL.
///
/// A missing scheme is read as `https://`. Returns the normalized URL.
pub fn parse_video_url(input: &str) -> Result<Url> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Yt4dwError::Input("empty URL".to_string()));
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let url = Url::parse(&candidate)
        .map_err(|e| Yt4dwError::Input(format!("'{}' is not a URL: {}", trimmed, e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(Yt4dwError::Input(format!(
            "unsupported scheme '{}'",
            url.scheme()
        )));
    }

    let host = url
        .host_str()
        .map(|h| h.trim_start_matches("www.").to_ascii_lowercase())
        .unwrap_or_default();
    if !HOSTS.contains(&host.as_str()) {
        return Err(Yt4dwError::Input(format!(
            "'{}' is not a YouTube address",
            trimmed
        )));
    }

    match video_id(&url, &host) {
        Some(_) => Ok(url),
        None => Err(Yt4dwError::Input(format!(
            "no video id found in '{}'",
            trimmed
        ))),
    }
}

/// True when `input` looks like a single-video URL.
pub fn is_video_url(input: &str) -> bool {
    parse_video_url(input).is_ok()
}

/// Extract the video id from an already host-checked URL.
pub fn video_id(url: &Url, host: &str) -> Option<String> {
    let mut segments = url.path_segments()?.filter(|s| !s.is_empty());

    let id = if host == "youtu.be" {
        segments.next().map(str::to_string)
    } else {
        match segments.next() {
            Some("watch") => url
                .query_pairs()
                .find(|(k, _)| k == "v")
                .map(|(_, v)| v.into_owned()),
            Some(kind) if ID_PATHS.contains(&kind) => segments.next().map(str::to_string),
            _ => None,
        }
    }?;

    is_valid_id(&id).then_some(id)
}

fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
