//! Error handling for yt4dw

use thiserror::Error;

/// Main error type for yt4dw
#[derive(Debug, Error)]
pub enum Yt4dwError {
    /// Settings file or directory could not be read, parsed or written
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Malformed URL or invalid menu choice
    #[error("Invalid input: {0}")]
    Input(String),

    #[error("Network error: {0}")]
    Network(String),

    /// Age-restricted, private, members-only or geo-blocked content
    #[error("Restricted content: {0}")]
    RestrictedContent(String),

    #[error("Video unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid cookie file: {0}")]
    InvalidCookies(String),

    #[error("Update check failed: {0}")]
    UpdateCheck(String),

    #[error("yt-dlp not found. Please install yt-dlp")]
    YtDlpNotFound,

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
}

impl Yt4dwError {
    /// Failures that end a single download attempt and are shown to the user
    /// as one message class.
    pub fn is_download_failure(&self) -> bool {
        matches!(
            self,
            Self::Network(_)
                | Self::RestrictedContent(_)
                | Self::Unavailable(_)
                | Self::InvalidCookies(_)
                | Self::YtDlpNotFound
                | Self::DownloadFailed(_)
        )
    }

    /// Guidance printed under the error message, if any.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::RestrictedContent(_) => Some(
                "This video needs authentication.\n\
                 1. Export cookies from your browser using a 'Get cookies.txt' extension\n\
                 2. Place the cookies.txt file in the 'cookies' folder (or pass --cookies <file>)\n\
                 3. Try downloading again",
            ),
            Self::InvalidCookies(_) => Some(
                "The cookie file must be a Netscape-format export \
                 (first line '# Netscape HTTP Cookie File').",
            ),
            Self::Network(_) => Some("Check your internet connection and try again."),
            Self::YtDlpNotFound => Some(
                "Install yt-dlp:\n  pip install -U yt-dlp\n  or visit: https://github.com/yt-dlp/yt-dlp",
            ),
            _ => None,
        }
    }

    /// Classify a yt-dlp `ERROR:` message into the matching variant.
    pub fn from_ytdlp_message(message: &str) -> Self {
        let msg = message.trim().trim_start_matches("ERROR:").trim().to_string();
        let lower = msg.to_lowercase();

        if lower.contains("cookie")
            && (lower.contains("invalid")
                || lower.contains("netscape")
                || lower.contains("could not load")
                || lower.contains("does not look like"))
        {
            return Self::InvalidCookies(msg);
        }

        const RESTRICTED: &[&str] = &[
            "sign in to confirm",
            "age-restricted",
            "age restricted",
            "inappropriate for some users",
            "private video",
            "members-only",
            "available to this channel's members",
            "not available in your country",
            "geo restrict",
            "geo-restrict",
            "login required",
            "requires authentication",
        ];
        if RESTRICTED.iter().any(|needle| lower.contains(needle)) {
            return Self::RestrictedContent(msg);
        }

        const NETWORK: &[&str] = &[
            "unable to download webpage",
            "urlopen error",
            "timed out",
            "timeout",
            "connection reset",
            "connection refused",
            "temporary failure in name resolution",
            "name or service not known",
            "network is unreachable",
            "http error 5",
            "http error 429",
        ];
        if NETWORK.iter().any(|needle| lower.contains(needle)) {
            return Self::Network(msg);
        }

        const UNAVAILABLE: &[&str] = &[
            "unsupported url",
            "is not a valid url",
            "video unavailable",
            "incomplete youtube id",
            "this video has been removed",
            "does not exist",
            "http error 404",
        ];
        if UNAVAILABLE.iter().any(|needle| lower.contains(needle)) {
            return Self::Unavailable(msg);
        }

        Self::DownloadFailed(msg)
    }
}

pub type Result<T> = std::result::Result<T, Yt4dwError>;
