//! Quality menu and yt-dlp format selection
//!
//! The menu is a closed set. Each entry knows its yt-dlp `-f` selector, the
//! container the file ends up in and the post-processing yt-dlp should run.

use crate::utils::error::Yt4dwError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Entries of the quality menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quality {
    #[serde(rename = "360p")]
    P360,
    #[serde(rename = "480p")]
    P480,
    #[serde(rename = "720p")]
    P720,
    #[serde(rename = "1080p")]
    P1080,
    #[serde(rename = "1440p")]
    P1440,
    #[serde(rename = "2160p")]
    P2160,
    #[serde(rename = "mp3")]
    Mp3,
    #[serde(rename = "wav")]
    Wav,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Audio,
}

/// Output container / codec of the final file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    Mp4,
    Mp3,
    Wav,
}

impl Container {
    pub fn as_str(self) -> &'static str {
        match self {
            Container::Mp4 => "mp4",
            Container::Mp3 => "mp3",
            Container::Wav => "wav",
        }
    }
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What yt-dlp (through ffmpeg) does after fetching the streams
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostProcess {
    /// Merge video and audio and remux into `container`
    Remux { container: Container },
    /// Drop the video stream and convert audio to `codec`
    ExtractAudio {
        codec: Container,
        bitrate_kbps: Option<u32>,
    },
}

impl PostProcess {
    /// yt-dlp command-line flags for this step
    pub fn to_args(self) -> Vec<String> {
        match self {
            PostProcess::Remux { container } => vec![
                "--merge-output-format".to_string(),
                container.to_string(),
                "--remux-video".to_string(),
                container.to_string(),
            ],
            PostProcess::ExtractAudio {
                codec,
                bitrate_kbps,
            } => {
                let mut args = vec![
                    "-x".to_string(),
                    "--audio-format".to_string(),
                    codec.to_string(),
                ];
                if let Some(kbps) = bitrate_kbps {
                    args.push("--audio-quality".to_string());
                    args.push(format!("{}K", kbps));
                }
                args
            }
        }
    }
}

/// Resolved format for one download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatSpec {
    pub selector: String,
    pub container: Container,
    pub post_process: PostProcess,
}

impl Quality {
    /// Menu order
    pub const ALL: [Quality; 8] = [
        Quality::P360,
        Quality::P480,
        Quality::P720,
        Quality::P1080,
        Quality::P1440,
        Quality::P2160,
        Quality::Mp3,
        Quality::Wav,
    ];

    /// Short identifier, also the persisted form
    pub fn id(self) -> &'static str {
        match self {
            Quality::P360 => "360p",
            Quality::P480 => "480p",
            Quality::P720 => "720p",
            Quality::P1080 => "1080p",
            Quality::P1440 => "1440p",
            Quality::P2160 => "2160p",
            Quality::Mp3 => "mp3",
            Quality::Wav => "wav",
        }
    }

    /// Text shown in the menu
    pub fn label(self) -> &'static str {
        match self {
            Quality::P360 => "360p",
            Quality::P480 => "480p",
            Quality::P720 => "720p (HD)",
            Quality::P1080 => "1080p (Full HD)",
            Quality::P1440 => "1440p (2K)",
            Quality::P2160 => "2160p (4K)",
            Quality::Mp3 => "MP3 (Audio Only - 320kbps)",
            Quality::Wav => "WAV (Audio Only - Lossless)",
        }
    }

    pub fn kind(self) -> MediaKind {
        match self {
            Quality::Mp3 | Quality::Wav => MediaKind::Audio,
            _ => MediaKind::Video,
        }
    }

    /// Resolution ceiling for video entries
    pub fn max_height(self) -> Option<u32> {
        match self {
            Quality::P360 => Some(360),
            Quality::P480 => Some(480),
            Quality::P720 => Some(720),
            Quality::P1080 => Some(1080),
            Quality::P1440 => Some(1440),
            Quality::P2160 => Some(2160),
            Quality::Mp3 | Quality::Wav => None,
        }
    }

    pub fn container(self) -> Container {
        match self {
            Quality::Mp3 => Container::Mp3,
            Quality::Wav => Container::Wav,
            _ => Container::Mp4,
        }
    }

    /// Map the menu entry to a yt-dlp format request.
    ///
    /// Video selectors try the exact height first, then the best stream at or
    /// below it, then whatever is best. They never leave yt-dlp without a
    /// matching alternative.
    pub fn format_spec(self) -> FormatSpec {
        match (self.max_height(), self) {
            (Some(h), _) => FormatSpec {
                selector: format!(
                    "bestvideo[height={h}][ext=mp4]+bestaudio[ext=m4a]/\
                     bestvideo[height<={h}][ext=mp4]+bestaudio[ext=m4a]/\
                     bestvideo[height<={h}]+bestaudio/\
                     best[height<={h}][ext=mp4]/\
                     best[height<={h}]/\
                     best"
                ),
                container: Container::Mp4,
                post_process: PostProcess::Remux {
                    container: Container::Mp4,
                },
            },
            (None, Quality::Wav) => FormatSpec {
                selector: "bestaudio/best".to_string(),
                container: Container::Wav,
                post_process: PostProcess::ExtractAudio {
                    codec: Container::Wav,
                    bitrate_kbps: None,
                },
            },
            (None, _) => FormatSpec {
                selector: "bestaudio/best".to_string(),
                container: Container::Mp3,
                post_process: PostProcess::ExtractAudio {
                    codec: Container::Mp3,
                    bitrate_kbps: Some(320),
                },
            },
        }
    }

    /// Parse an identifier, a menu label or a bare height.
    ///
    /// Accepts `720`, `720p`, `720p (HD)`, `MP4 - 720p`, `4k`, `mp3`.
    pub fn from_label(input: &str) -> Option<Self> {
        let normalized = input.trim().to_lowercase();
        if normalized.is_empty() {
            return None;
        }

        if let Some(q) = Quality::ALL
            .iter()
            .copied()
            .find(|q| q.id() == normalized || q.label().to_lowercase() == normalized)
        {
            return Some(q);
        }

        let token = normalized
            .rsplit(" - ")
            .next()
            .unwrap_or(&normalized)
            .split_whitespace()
            .next()
            .unwrap_or("");

        match token {
            "2k" => return Some(Quality::P1440),
            "4k" => return Some(Quality::P2160),
            _ => {}
        }

        let height: u32 = token.trim_end_matches('p').parse().ok()?;
        Quality::ALL
            .iter()
            .copied()
            .find(|q| q.max_height() == Some(height))
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Quality {
    type Err = Yt4dwError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Quality::from_label(s)
            .ok_or_else(|| Yt4dwError::Input(format!("unknown quality '{}'", s.trim())))
    }
}

/// Preferred audio container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    #[default]
    Mp3,
    Wav,
}

impl AudioFormat {
    pub fn quality(self) -> Quality {
        match self {
            AudioFormat::Mp3 => Quality::Mp3,
            AudioFormat::Wav => Quality::Wav,
        }
    }
}
