mod common;

use common::{MockBackend, RecordingReporter};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use yt4dw::downloader::{DownloadRequest, Orchestrator, ProgressEvent, Quality};
use yt4dw::utils::Yt4dwError;

#[tokio::test]
async fn download_720p_uses_capped_selector_under_download_dir() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let backend = Arc::new(MockBackend::new());
    let orchestrator = Orchestrator::new(backend.clone());

    let request = DownloadRequest::new(
        "https://www.youtube.com/watch?v=abc123",
        Quality::P720,
        dir.path(),
    )
    .expect("valid request");

    let mut reporter = RecordingReporter::default();
    let outcome = orchestrator
        .download(&request, &mut reporter)
        .await
        .expect("download should succeed");

    let invocations = backend.invocations();
    assert_eq!(invocations.len(), 1, "backend must be called exactly once");

    let invocation = &invocations[0];
    assert!(invocation.format.selector.contains("[height<=720]"));
    assert!(invocation.format.selector.ends_with("/best"));
    assert!(invocation.output_template.starts_with(dir.path()));
    assert_eq!(invocation.url, "https://www.youtube.com/watch?v=abc123");

    assert_eq!(outcome.quality, Quality::P720);
    assert_eq!(outcome.path, dir.path().join("Test Video.mp4"));
}

#[tokio::test]
async fn reporter_sees_events_and_finish() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let orchestrator = Orchestrator::new(Arc::new(MockBackend::new()));
    let request = DownloadRequest::new("https://youtu.be/abc123", Quality::Mp3, dir.path()).unwrap();

    let mut reporter = RecordingReporter::default();
    orchestrator.download(&request, &mut reporter).await.unwrap();

    let events = reporter.events.lock().unwrap().clone();
    assert_eq!(events.len(), 3);
    assert!(matches!(events[0], ProgressEvent::Downloading(_)));
    assert_eq!(events[1], ProgressEvent::StreamFinished);

    let finished = reporter.finished.lock().unwrap().clone();
    assert_eq!(finished, vec![Some(dir.path().join("Test Video.mp3"))]);
}

#[tokio::test]
async fn cookies_are_passed_through() {
    let dir = TempDir::new().unwrap();
    let backend = Arc::new(MockBackend::new());
    let orchestrator = Orchestrator::new(backend.clone());

    let cookies = PathBuf::from("/config/cookies/cookies.txt");
    let request = DownloadRequest::new("https://youtu.be/abc123", Quality::P1080, dir.path())
        .unwrap()
        .with_cookies(Some(cookies.clone()));

    orchestrator
        .download(&request, &mut RecordingReporter::default())
        .await
        .unwrap();

    let invocation = &backend.invocations()[0];
    assert_eq!(invocation.cookies.as_ref(), Some(&cookies));
    let args = invocation.to_args();
    let pos = args.iter().position(|a| a == "--cookies").unwrap();
    assert_eq!(args[pos + 1], "/config/cookies/cookies.txt");
}

#[tokio::test]
async fn restricted_failure_is_classified_and_reported_once() {
    let dir = TempDir::new().unwrap();
    let backend = Arc::new(MockBackend::failing_download(
        "ERROR: [youtube] abc123: Sign in to confirm your age",
    ));
    let orchestrator = Orchestrator::new(backend.clone());
    let request = DownloadRequest::new("https://youtu.be/abc123", Quality::P360, dir.path()).unwrap();

    let mut reporter = RecordingReporter::default();
    let err = orchestrator
        .download(&request, &mut reporter)
        .await
        .unwrap_err();

    assert!(matches!(err, Yt4dwError::RestrictedContent(_)));
    assert!(err.is_download_failure());
    assert!(err.hint().unwrap().contains("cookies"));
    assert_eq!(backend.invocations().len(), 1, "no retry");
    assert_eq!(reporter.finished.lock().unwrap().clone(), vec![None]);
}

#[tokio::test]
async fn network_failure_is_classified() {
    let dir = TempDir::new().unwrap();
    let orchestrator = Orchestrator::new(Arc::new(MockBackend::failing_download(
        "ERROR: Unable to download webpage: <urlopen error timed out>",
    )));
    let request = DownloadRequest::new("https://youtu.be/abc123", Quality::P480, dir.path()).unwrap();

    let err = orchestrator
        .download(&request, &mut RecordingReporter::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Yt4dwError::Network(_)));
}

#[tokio::test]
async fn output_dir_is_created() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("a").join("b");
    let orchestrator = Orchestrator::new(Arc::new(MockBackend::new()));
    let request = DownloadRequest::new("https://youtu.be/abc123", Quality::Wav, &nested).unwrap();

    orchestrator
        .download(&request, &mut RecordingReporter::default())
        .await
        .unwrap();
    assert!(nested.is_dir());
}
