use crate::downloader::engine::Invocation;
use crate::downloader::reporter::ProgressReporter;
use crate::extractor::models::VideoInfo;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Command interface to the external downloader
///
/// The application never talks to yt-dlp directly; everything goes through
/// this trait so the orchestrator and shell can be driven by a fake in tests.
#[async_trait]
pub trait MediaBackend: Send + Sync {
    /// Returns a unique identifier for this backend (e.g., "yt-dlp")
    fn id(&self) -> &'static str;

    /// Whether the backend can run at all (binary found, etc.)
    fn is_available(&self) -> bool {
        true
    }

    /// Probe metadata without downloading
    async fn fetch_info(&self, url: &str, cookies: Option<&Path>) -> Result<VideoInfo>;

    /// Run one download, forwarding progress, and return the final file path
    async fn download(
        &self,
        invocation: &Invocation,
        reporter: &mut dyn ProgressReporter,
    ) -> Result<PathBuf>;
}
