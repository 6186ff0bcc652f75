#![allow(dead_code)]

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use yt4dw::downloader::{DownloadProgress, Invocation, ProgressEvent, ProgressReporter};
use yt4dw::extractor::{MediaBackend, VideoInfo};
use yt4dw::utils::Yt4dwError;

/// Backend that records calls instead of running yt-dlp
#[derive(Default)]
pub struct MockBackend {
    pub probes: Mutex<Vec<String>>,
    pub invocations: Mutex<Vec<Invocation>>,
    /// yt-dlp `ERROR:` line to fail downloads with
    pub download_error: Option<String>,
    /// yt-dlp `ERROR:` line to fail probes with
    pub probe_error: Option<String>,
    /// Pretend the yt-dlp binary is missing
    pub unavailable: bool,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_download(message: &str) -> Self {
        Self {
            download_error: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn failing_probe(message: &str) -> Self {
        Self {
            probe_error: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().unwrap().clone()
    }

    pub fn probe_count(&self) -> usize {
        self.probes.lock().unwrap().len()
    }
}

#[async_trait]
impl MediaBackend for MockBackend {
    fn id(&self) -> &'static str {
        "mock"
    }

    fn is_available(&self) -> bool {
        !self.unavailable
    }

    async fn fetch_info(&self, url: &str, _cookies: Option<&Path>) -> yt4dw::utils::Result<VideoInfo> {
        self.probes.lock().unwrap().push(url.to_string());
        if let Some(message) = &self.probe_error {
            return Err(Yt4dwError::from_ytdlp_message(message));
        }
        Ok(VideoInfo {
            id: "abc123".to_string(),
            title: "Test Video".to_string(),
            webpage_url: url.to_string(),
            duration: Some(65.0),
            uploader: Some("Uploader".to_string()),
            ..Default::default()
        })
    }

    async fn download(
        &self,
        invocation: &Invocation,
        reporter: &mut dyn ProgressReporter,
    ) -> yt4dw::utils::Result<PathBuf> {
        self.invocations.lock().unwrap().push(invocation.clone());

        let mut progress = DownloadProgress::new(Some(1000));
        progress.update(500, 100.0);
        reporter.on_event(&ProgressEvent::Downloading(progress));

        if let Some(message) = &self.download_error {
            return Err(Yt4dwError::from_ytdlp_message(message));
        }

        reporter.on_event(&ProgressEvent::StreamFinished);
        reporter.on_event(&ProgressEvent::PostProcessing {
            step: "Merger".to_string(),
        });

        let dir = invocation
            .output_template
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(dir.join(format!("Test Video.{}", invocation.format.container)))
    }
}

/// Reporter that keeps every event
#[derive(Clone, Default)]
pub struct RecordingReporter {
    pub events: Arc<Mutex<Vec<ProgressEvent>>>,
    pub finished: Arc<Mutex<Vec<Option<PathBuf>>>>,
}

impl ProgressReporter for RecordingReporter {
    fn on_event(&mut self, event: &ProgressEvent) {
        self.events.lock().unwrap().push(event.clone());
    }

    fn finish(&mut self, output: Option<&Path>) {
        self.finished
            .lock()
            .unwrap()
            .push(output.map(Path::to_path_buf));
    }
}
