//! Interactive shell
//!
//! The shell is a small state machine:
//!
//! ```text
//! AwaitingUrl -> AwaitingQuality -> Downloading -> Done | Error
//!      ^                                             |
//!      +------------------ (loop mode) --------------+
//! ```
//!
//! Input and output are generic so tests can script a whole session.

use crate::downloader::engine::{DownloadOutcome, DownloadRequest, Orchestrator};
use crate::downloader::quality::Quality;
use crate::downloader::reporter::{reporter_for_terminal, ProgressReporter};
use crate::extractor::models::VideoInfo;
use crate::history::{HistoryEntry, HistoryLog};
use crate::shell::menu;
use crate::shell::theme::Theme;
use crate::utils::config::Settings;
use crate::utils::error::{Result, Yt4dwError};
use crate::utils::video_url::parse_video_url;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::{debug, warn};

const QUIT_WORDS: &[&str] = &["q", "quit", "exit"];

/// Builds a fresh reporter for every download
pub type ReporterFactory = Box<dyn Fn() -> Box<dyn ProgressReporter>>;

#[derive(Debug, Clone, PartialEq)]
pub enum ShellState {
    AwaitingUrl,
    AwaitingQuality { url: String },
    Downloading { url: String, quality: Quality },
    Done(DownloadOutcome),
    Error { message: String, hint: Option<String> },
    Exit,
}

/// Flags that shape one session
#[derive(Debug, Clone, Default)]
pub struct ShellOptions {
    /// Pre-filled URL, skips the first URL prompt
    pub url: Option<String>,
    /// Pre-filled quality, skips the first menu
    pub quality: Option<Quality>,
    /// Return to the URL prompt after each download
    pub loop_mode: bool,
}

/// Everything resolved at startup that the shell works with
pub struct Session {
    pub settings: Settings,
    pub settings_path: PathBuf,
    pub output_dir: PathBuf,
    pub cookies: Option<PathBuf>,
    pub history: Option<HistoryLog>,
}

/// Download counts for the exit status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub completed: usize,
    pub failed: usize,
}

pub struct Shell<R, W> {
    input: R,
    out: W,
    theme: Theme,
    orchestrator: Orchestrator,
    session: Session,
    options: ShellOptions,
    reporters: ReporterFactory,
    summary: RunSummary,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(
        input: R,
        out: W,
        orchestrator: Orchestrator,
        session: Session,
        options: ShellOptions,
    ) -> Self {
        Self {
            input,
            out,
            theme: Theme::plain(),
            orchestrator,
            session,
            options,
            reporters: Box::new(|| reporter_for_terminal(true)),
            summary: RunSummary::default(),
        }
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn with_reporters(mut self, factory: ReporterFactory) -> Self {
        self.reporters = factory;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.session.settings
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Drive the state machine until it exits.
    pub async fn run(&mut self) -> Result<RunSummary> {
        let mut state = ShellState::AwaitingUrl;
        while state != ShellState::Exit {
            state = self.step(state).await?;
        }
        Ok(self.summary)
    }

    /// Perform one transition.
    pub async fn step(&mut self, state: ShellState) -> Result<ShellState> {
        debug!("Shell state: {:?}", state);
        match state {
            ShellState::AwaitingUrl => self.await_url().await,
            ShellState::AwaitingQuality { url } => self.await_quality(url),
            ShellState::Downloading { url, quality } => Ok(self.download(url, quality).await),
            ShellState::Done(outcome) => {
                self.report_done(&outcome)?;
                Ok(self.after_attempt())
            }
            ShellState::Error { message, hint } => {
                self.report_error(&message, hint.as_deref())?;
                Ok(self.after_attempt())
            }
            ShellState::Exit => Ok(ShellState::Exit),
        }
    }

    fn after_attempt(&self) -> ShellState {
        if self.options.loop_mode {
            ShellState::AwaitingUrl
        } else {
            ShellState::Exit
        }
    }

    /// `None` at end of input. Undecodable bytes become U+FFFD and fail
    /// validation like any other bad input.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.out, "{}", self.theme.prompt(prompt))?;
        self.out.flush()?;

        let mut buf = Vec::new();
        if self.input.read_until(b'\n', &mut buf)? == 0 {
            writeln!(self.out)?;
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&buf).trim().to_string()))
    }

    async fn await_url(&mut self) -> Result<ShellState> {
        let raw = match self.options.url.take() {
            Some(url) => url,
            None => match self.read_line("Enter YouTube URL (q to quit)")? {
                Some(line) => line,
                None => return Ok(ShellState::Exit),
            },
        };

        if QUIT_WORDS.iter().any(|w| raw.eq_ignore_ascii_case(w)) {
            return Ok(ShellState::Exit);
        }
        if raw.is_empty() {
            return Ok(ShellState::AwaitingUrl);
        }

        let url = match parse_video_url(&raw) {
            Ok(url) => url.to_string(),
            Err(e) => {
                writeln!(self.out, "{}", self.theme.error(&e.to_string()))?;
                return Ok(ShellState::AwaitingUrl);
            }
        };

        if !self.orchestrator.backend().is_available() {
            return Ok(self.failure_state(&Yt4dwError::YtDlpNotFound));
        }

        self.show_cookie_status()?;
        writeln!(self.out, "{}", self.theme.hint("Fetching video information..."))?;
        self.out.flush()?;

        let cookies = self.session.cookies.clone();
        match self
            .orchestrator
            .backend()
            .fetch_info(&url, cookies.as_deref())
            .await
        {
            Ok(info) => {
                self.show_info(&info)?;
                Ok(ShellState::AwaitingQuality { url })
            }
            Err(e) => {
                warn!("Probe failed for {}: {}", url, e);
                Ok(self.failure_state(&e))
            }
        }
    }

    fn await_quality(&mut self, url: String) -> Result<ShellState> {
        let quality = match self.options.quality.take() {
            Some(quality) => quality,
            None => {
                let default = self.session.settings.last_used_quality();
                write!(self.out, "\n{}", menu::render(self.theme, default))?;
                let line = match self.read_line(&format!("Select quality [{}]", default.id()))? {
                    Some(line) => line,
                    None => return Ok(ShellState::Exit),
                };
                match menu::parse_choice(&line, default, self.session.settings.audio_format()) {
                    Ok(quality) => quality,
                    Err(e) => {
                        writeln!(self.out, "{}", self.theme.error(&e.to_string()))?;
                        return Ok(ShellState::AwaitingQuality { url });
                    }
                }
            }
        };

        writeln!(
            self.out,
            "{}",
            self.theme.hint(&format!("Selected format: {}", quality.label()))
        )?;

        if self.session.settings.last_used_quality() != quality {
            self.session.settings.set_last_used_quality(quality);
            if let Err(e) = self.session.settings.save(&self.session.settings_path) {
                warn!("Could not save settings: {}", e);
            }
        }

        Ok(ShellState::Downloading { url, quality })
    }

    async fn download(&mut self, url: String, quality: Quality) -> ShellState {
        let request = match DownloadRequest::new(&url, quality, &self.session.output_dir) {
            Ok(request) => request.with_cookies(self.session.cookies.clone()),
            Err(e) => return self.failure_state(&e),
        };

        let mut reporter = (self.reporters)();
        let result = self.orchestrator.download(&request, reporter.as_mut()).await;

        let entry = match &result {
            Ok(outcome) => HistoryEntry::completed(&url, quality, outcome.path.clone()),
            Err(e) => HistoryEntry::failed(&url, quality, e.to_string()),
        };
        self.record(&entry).await;

        match result {
            Ok(outcome) => {
                self.summary.completed += 1;
                ShellState::Done(outcome)
            }
            Err(e) => {
                self.summary.failed += 1;
                self.failure_state(&e)
            }
        }
    }

    async fn record(&self, entry: &HistoryEntry) {
        if let Some(history) = &self.session.history {
            if let Err(e) = history.append(entry).await {
                warn!("Could not write history entry: {}", e);
            }
        }
    }

    fn failure_state(&self, error: &Yt4dwError) -> ShellState {
        let mut hint = error.hint().map(str::to_string);
        // Probes that fail for unclear reasons are often auth problems.
        if hint.is_none() && self.session.cookies.is_none() {
            if let Yt4dwError::DownloadFailed(_) | Yt4dwError::Unavailable(_) = error {
                hint = Some(
                    "Tip: this video might require authentication. Place a cookies.txt \
                     export in the 'cookies' folder and try again."
                        .to_string(),
                );
            }
        }
        ShellState::Error {
            message: error.to_string(),
            hint,
        }
    }

    fn show_cookie_status(&mut self) -> Result<()> {
        match &self.session.cookies {
            Some(path) => writeln!(
                self.out,
                "{}",
                self.theme
                    .success(&format!("Using cookies from: {}", path.display()))
            )?,
            None => writeln!(
                self.out,
                "{}",
                self.theme
                    .warning("No cookies file found. Some videos may be restricted.")
            )?,
        }
        Ok(())
    }

    fn show_info(&mut self, info: &VideoInfo) -> Result<()> {
        writeln!(self.out, "{}", self.theme.success("Video information retrieved"))?;
        writeln!(self.out, "  Title:    {}", info.title)?;
        if let Some(duration) = info.duration_label() {
            writeln!(self.out, "  Duration: {}", duration)?;
        }
        if let Some(uploader) = &info.uploader {
            writeln!(self.out, "  Uploader: {}", uploader)?;
        }
        Ok(())
    }

    fn report_done(&mut self, outcome: &DownloadOutcome) -> Result<()> {
        writeln!(self.out)?;
        writeln!(
            self.out,
            "{}",
            self.theme.success("Download completed successfully!")
        )?;
        writeln!(self.out, "  Saved to: {}", outcome.path.display())?;
        writeln!(self.out, "  Took:     {:.1}s", outcome.elapsed.as_secs_f64())?;
        Ok(())
    }

    fn report_error(&mut self, message: &str, hint: Option<&str>) -> Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "{}", self.theme.error(message))?;
        if let Some(hint) = hint {
            for line in hint.lines() {
                writeln!(self.out, "{}", self.theme.hint(line))?;
            }
        }
        Ok(())
    }
}
