//! yt-dlp backend
//!
//! Locates the yt-dlp binary, probes metadata with `--dump-json` and runs
//! downloads as a child process. Progress and the final path are read from
//! the process output; failures are classified from its `ERROR:` lines.

use crate::downloader::engine::{Invocation, FILE_PREFIX};
use crate::downloader::progress::parse_line;
use crate::downloader::reporter::ProgressReporter;
use crate::extractor::models::VideoInfo;
use crate::extractor::traits::MediaBackend;
use crate::utils::error::{Result, Yt4dwError};
use crate::utils::platform;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command as AsyncCommand;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Lines of stderr kept for error reports
const STDERR_TAIL: usize = 20;

/// Media backend driving the yt-dlp executable
#[derive(Debug, Clone)]
pub struct YtDlpBackend {
    ytdlp_path: Option<PathBuf>,
}

impl YtDlpBackend {
    /// Search the usual places for yt-dlp.
    ///
    /// A missing binary is not an error here: the shell still starts and
    /// every backend call reports `YtDlpNotFound`.
    pub fn locate() -> Self {
        let ytdlp_path = find_ytdlp();
        if ytdlp_path.is_none() {
            warn!("yt-dlp not found; downloads will fail until it is installed");
        }
        Self { ytdlp_path }
    }

    /// Use a specific binary
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            ytdlp_path: Some(path.into()),
        }
    }

    /// Get the path to yt-dlp being used
    pub fn ytdlp_path(&self) -> Option<&Path> {
        self.ytdlp_path.as_deref()
    }

    fn command(&self) -> Result<AsyncCommand> {
        let path = self.ytdlp_path.as_ref().ok_or(Yt4dwError::YtDlpNotFound)?;
        let mut cmd = AsyncCommand::new(path);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        Ok(cmd)
    }
}

fn spawn_error(e: std::io::Error) -> Yt4dwError {
    if e.kind() == std::io::ErrorKind::NotFound {
        Yt4dwError::YtDlpNotFound
    } else {
        Yt4dwError::IoError(e)
    }
}

/// Pick the most specific error from yt-dlp's stderr.
fn classify_failure(stderr: &str, status: &str) -> Yt4dwError {
    match stderr.lines().rev().find(|l| l.trim_start().starts_with("ERROR:")) {
        Some(line) => Yt4dwError::from_ytdlp_message(line),
        None => {
            let tail = stderr.trim();
            if tail.is_empty() {
                Yt4dwError::DownloadFailed(format!("yt-dlp exited with {}", status))
            } else {
                Yt4dwError::DownloadFailed(format!("yt-dlp exited with {}: {}", status, tail))
            }
        }
    }
}

enum OutputLine {
    Stdout(String),
    Stderr(String),
}

fn spawn_reader<R>(stream: R, tx: mpsc::Sender<OutputLine>, wrap: fn(String) -> OutputLine)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(stream).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if tx.send(wrap(line)).await.is_err() {
                break;
            }
        }
    });
}

/// Final path from human-readable output, for builds that ignore `--print`.
fn parse_destination_line(line: &str) -> Option<PathBuf> {
    let line = line.trim();

    for prefix in ["[download] Destination:", "[ExtractAudio] Destination:"] {
        if let Some(rest) = line.strip_prefix(prefix) {
            let path = rest.trim();
            if !path.is_empty() {
                return Some(PathBuf::from(path));
            }
        }
    }

    if let Some(rest) = line.strip_prefix("[Merger] Merging formats into \"") {
        let path = rest.trim_end_matches('"');
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    if let Some(rest) = line.strip_prefix("[download] ") {
        if let Some(path) = rest.strip_suffix(" has already been downloaded") {
            return Some(PathBuf::from(path.trim()));
        }
    }

    None
}

#[async_trait]
impl MediaBackend for YtDlpBackend {
    fn id(&self) -> &'static str {
        "yt-dlp"
    }

    fn is_available(&self) -> bool {
        self.ytdlp_path.is_some()
    }

    /// Uses: yt-dlp --dump-json --no-download
    async fn fetch_info(&self, url: &str, cookies: Option<&Path>) -> Result<VideoInfo> {
        debug!("Extracting video info for URL: {}", url);

        let mut cmd = self.command()?;
        cmd.arg("--dump-json")
            .arg("--no-download")
            .arg("--no-warnings")
            .arg("--no-playlist");
        if let Some(cookies) = cookies {
            cmd.arg("--cookies").arg(cookies);
        }
        cmd.arg("--").arg(url);

        let output = cmd.output().await.map_err(spawn_error)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!("yt-dlp extraction failed: {}", stderr.trim());
            return Err(classify_failure(&stderr, &output.status.to_string()));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let json = stdout
            .lines()
            .find(|l| l.trim_start().starts_with('{'))
            .ok_or_else(|| Yt4dwError::DownloadFailed("yt-dlp printed no metadata".to_string()))?;
        Ok(serde_json::from_str(json)?)
    }

    async fn download(
        &self,
        invocation: &Invocation,
        reporter: &mut dyn ProgressReporter,
    ) -> Result<PathBuf> {
        let args = invocation.to_args();
        debug!("yt-dlp args: {:?}", args);

        let mut cmd = self.command()?;
        cmd.args(&args);
        let mut child = cmd.spawn().map_err(spawn_error)?;

        // Both streams feed one channel; the reporter runs on this task.
        let (tx, mut rx) = mpsc::channel::<OutputLine>(256);
        if let Some(stdout) = child.stdout.take() {
            spawn_reader(stdout, tx.clone(), OutputLine::Stdout);
        }
        if let Some(stderr) = child.stderr.take() {
            spawn_reader(stderr, tx.clone(), OutputLine::Stderr);
        }
        drop(tx);

        let mut printed_path: Option<PathBuf> = None;
        let mut seen_path: Option<PathBuf> = None;
        let mut stderr_tail: VecDeque<String> = VecDeque::with_capacity(STDERR_TAIL);

        while let Some(line) = rx.recv().await {
            let text = match line {
                OutputLine::Stdout(text) => {
                    if let Some(path) = text.trim().strip_prefix(FILE_PREFIX) {
                        printed_path = Some(PathBuf::from(path));
                        continue;
                    }
                    text
                }
                OutputLine::Stderr(text) => {
                    if stderr_tail.len() == STDERR_TAIL {
                        stderr_tail.pop_front();
                    }
                    stderr_tail.push_back(text.clone());
                    text
                }
            };

            if let Some(event) = parse_line(&text) {
                reporter.on_event(&event);
            } else if let Some(path) = parse_destination_line(&text) {
                seen_path = Some(path);
            } else {
                debug!("yt-dlp: {}", text);
            }
        }

        let status = child.wait().await?;
        debug!("yt-dlp exited with {}", status);

        if !status.success() {
            let stderr: Vec<String> = stderr_tail.into_iter().collect();
            return Err(classify_failure(&stderr.join("\n"), &status.to_string()));
        }

        match printed_path.or(seen_path) {
            Some(path) => {
                info!("yt-dlp wrote {}", path.display());
                Ok(path)
            }
            None => Err(Yt4dwError::DownloadFailed(
                "yt-dlp finished without reporting an output file".to_string(),
            )),
        }
    }
}

// ============================================================
// yt-dlp Detection Functions
// ============================================================

/// Find yt-dlp binary with priority:
/// 1. Next to the executable
/// 2. System PATH
/// 3. Common installation paths
pub fn find_ytdlp() -> Option<PathBuf> {
    if let Some(local) = find_next_to_exe() {
        info!("Using bundled yt-dlp: {:?}", local);
        return Some(local);
    }

    if let Ok(system) = which::which("yt-dlp") {
        info!("Using system yt-dlp: {:?}", system);
        return Some(system);
    }

    if let Some(common) = find_in_common_paths() {
        info!("Using yt-dlp from common path: {:?}", common);
        return Some(common);
    }

    None
}

fn find_next_to_exe() -> Option<PathBuf> {
    let exe_path = std::env::current_exe().ok()?;
    let candidate = exe_path
        .parent()?
        .join(format!("yt-dlp{}", platform::exe_extension()));
    is_executable(&candidate).then_some(candidate)
}

fn find_in_common_paths() -> Option<PathBuf> {
    let mut candidates: Vec<PathBuf> = [
        "/usr/local/bin/yt-dlp",
        "/usr/bin/yt-dlp",
        "/opt/homebrew/bin/yt-dlp",
        "/data/data/com.termux/files/usr/bin/yt-dlp",
    ]
    .into_iter()
    .map(PathBuf::from)
    .collect();

    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(".local").join("bin").join("yt-dlp"));
    }

    candidates.into_iter().find(|p| is_executable(p))
}

/// Check if a file is executable
pub(crate) fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        std::fs::metadata(path)
            .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }

    #[cfg(not(unix))]
    {
        path.is_file()
    }
}

// ============================================================
// Tests
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_ytdlp_does_not_panic() {
        // yt-dlp might not be installed in CI
        let _ = find_ytdlp();
    }

    #[test]
    fn test_is_executable() {
        let path = PathBuf::from("/bin/sh");
        if path.exists() {
            assert!(is_executable(&path));
        }
        assert!(!is_executable(Path::new("/definitely/not/here")));
    }

    #[test]
    fn test_parse_destination_lines() {
        assert_eq!(
            parse_destination_line("[download] Destination: /tmp/a.f137.mp4"),
            Some(PathBuf::from("/tmp/a.f137.mp4"))
        );
        assert_eq!(
            parse_destination_line("[Merger] Merging formats into \"/tmp/a.mp4\""),
            Some(PathBuf::from("/tmp/a.mp4"))
        );
        assert_eq!(
            parse_destination_line("[ExtractAudio] Destination: /tmp/a.mp3"),
            Some(PathBuf::from("/tmp/a.mp3"))
        );
        assert_eq!(
            parse_destination_line("[download] /tmp/a.mp4 has already been downloaded"),
            Some(PathBuf::from("/tmp/a.mp4"))
        );
        assert_eq!(parse_destination_line("[youtube] abc: Downloading"), None);
    }

    #[test]
    fn test_classify_failure_prefers_error_line() {
        let stderr = "WARNING: something\nERROR: [youtube] abc: Private video. Sign in if you've been granted access";
        let err = classify_failure(stderr, "exit status: 1");
        assert!(matches!(err, Yt4dwError::RestrictedContent(_)));
    }

    #[test]
    fn test_classify_failure_without_error_line() {
        let err = classify_failure("", "exit status: 2");
        match err {
            Yt4dwError::DownloadFailed(msg) => assert!(msg.contains("exit status: 2")),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_binary_reports_not_found() {
        let backend = YtDlpBackend { ytdlp_path: None };
        assert!(!backend.is_available());
        let err = backend
            .fetch_info("https://youtu.be/abc", None)
            .await
            .unwrap_err();
        assert!(matches!(err, Yt4dwError::YtDlpNotFound));
    }

    #[tokio::test]
    async fn test_nonexistent_path_reports_not_found() {
        let backend = YtDlpBackend::with_path("/definitely/not/here/yt-dlp");
        let err = backend
            .fetch_info("https://youtu.be/abc", None)
            .await
            .unwrap_err();
        assert!(matches!(err, Yt4dwError::YtDlpNotFound));
    }
}
