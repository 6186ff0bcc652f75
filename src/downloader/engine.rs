//! Download orchestration
//!
//! One request becomes one [`Invocation`], which is handed to the media
//! backend exactly once. No retry is layered on top of what yt-dlp does
//! itself.

use crate::downloader::progress::{download_template, postprocess_template};
use crate::downloader::quality::{FormatSpec, Quality};
use crate::downloader::reporter::ProgressReporter;
use crate::extractor::traits::MediaBackend;
use crate::utils::error::{Result, Yt4dwError};
use crate::utils::video_url::parse_video_url;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Marker in front of the final file path printed by yt-dlp
pub const FILE_PREFIX: &str = "yt4dw-file:";

/// File name part of the output template
pub const OUTPUT_NAME_TEMPLATE: &str = "%(title)s.%(ext)s";

/// What the user asked for
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadRequest {
    url: String,
    quality: Quality,
    cookies: Option<PathBuf>,
    output_dir: PathBuf,
}

impl DownloadRequest {
    /// Build a request. Fails with `Input` when the URL is not a video URL.
    pub fn new(url: &str, quality: Quality, output_dir: impl Into<PathBuf>) -> Result<Self> {
        let url = parse_video_url(url)?;
        Ok(Self {
            url: url.to_string(),
            quality,
            cookies: None,
            output_dir: output_dir.into(),
        })
    }

    pub fn with_cookies(mut self, cookies: Option<PathBuf>) -> Self {
        self.cookies = cookies;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }

    pub fn cookies(&self) -> Option<&Path> {
        self.cookies.as_deref()
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

/// Fully resolved yt-dlp run
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub url: String,
    pub format: FormatSpec,
    pub output_template: PathBuf,
    pub cookies: Option<PathBuf>,
}

impl Invocation {
    pub fn from_request(request: &DownloadRequest) -> Self {
        Self {
            url: request.url.clone(),
            format: request.quality.format_spec(),
            output_template: request.output_dir.join(OUTPUT_NAME_TEMPLATE),
            cookies: request.cookies.clone(),
        }
    }

    /// Command-line arguments, URL last
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "-f".to_string(),
            self.format.selector.clone(),
            "-o".to_string(),
            self.output_template.to_string_lossy().into_owned(),
            "--newline".to_string(), // one progress update per line, even without a TTY
            "--progress".to_string(),
            "--no-simulate".to_string(),
            "--no-playlist".to_string(),
            "--progress-template".to_string(),
            download_template(),
            "--progress-template".to_string(),
            postprocess_template(),
            "--print".to_string(),
            format!("after_move:{}%(filepath)s", FILE_PREFIX),
        ];

        args.extend(self.format.post_process.to_args());

        if let Some(cookies) = &self.cookies {
            args.push("--cookies".to_string());
            args.push(cookies.to_string_lossy().into_owned());
        }

        args.push("--".to_string());
        args.push(self.url.clone());
        args
    }
}

/// Result of a successful download
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadOutcome {
    pub path: PathBuf,
    pub quality: Quality,
    pub elapsed: Duration,
}

/// Runs download requests against a media backend
#[derive(Clone)]
pub struct Orchestrator {
    backend: Arc<dyn MediaBackend>,
}

impl Orchestrator {
    pub fn new(backend: Arc<dyn MediaBackend>) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &Arc<dyn MediaBackend> {
        &self.backend
    }

    /// Download one request, reporting progress synchronously.
    ///
    /// Every failure comes back as one of the download-failure variants.
    pub async fn download(
        &self,
        request: &DownloadRequest,
        reporter: &mut dyn ProgressReporter,
    ) -> Result<DownloadOutcome> {
        let invocation = Invocation::from_request(request);
        info!(
            "Downloading {} as {} via {}",
            request.url(),
            request.quality().id(),
            self.backend.id()
        );
        debug!("Format selector: {}", invocation.format.selector);

        if let Err(e) = std::fs::create_dir_all(request.output_dir()) {
            warn!(
                "Failed to create output directory {}: {}",
                request.output_dir().display(),
                e
            );
        }

        let start = Instant::now();
        let result = self.backend.download(&invocation, reporter).await;
        reporter.finish(result.as_ref().ok().map(PathBuf::as_path));

        match result {
            Ok(path) => {
                let elapsed = start.elapsed();
                info!("Download finished in {:.1}s: {}", elapsed.as_secs_f64(), path.display());
                Ok(DownloadOutcome {
                    path,
                    quality: request.quality(),
                    elapsed,
                })
            }
            Err(e) if e.is_download_failure() => {
                warn!("Download failed: {}", e);
                Err(e)
            }
            Err(e) => {
                warn!("Download failed: {}", e);
                Err(Yt4dwError::DownloadFailed(e.to_string()))
            }
        }
    }
}
