//! yt4dw library
//!
//! Interactive YouTube downloader that drives yt-dlp (and, through it,
//! ffmpeg). This crate holds the settings, the quality menu, progress
//! reporting and the shell; the actual transfer and muxing stay in yt-dlp.

pub mod app;
pub mod downloader;
pub mod extractor;
pub mod history;
pub mod shell;
pub mod updater;
pub mod utils;

// Re-export main types for easier use
pub use downloader::{DownloadOutcome, DownloadRequest, Orchestrator, Quality};
pub use extractor::{MediaBackend, VideoInfo, YtDlpBackend};
pub use utils::{Settings, Yt4dwError};
