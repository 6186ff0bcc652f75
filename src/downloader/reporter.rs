//! Progress rendering
//!
//! The orchestrator calls a [`ProgressReporter`] synchronously for every
//! parsed event. Reporters must return quickly; both implementations here
//! drop updates that arrive faster than they redraw.

use crate::downloader::progress::{DownloadProgress, ProgressEvent};
use indicatif::{HumanBytes, HumanDuration, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::{IsTerminal, Write};
use std::path::Path;
use std::time::{Duration, Instant};

/// Redraw ceiling for the animated bar
pub const TERMINAL_REFRESH_HZ: u8 = 10;

/// Minimum gap between two plain progress lines
pub const PLAIN_INTERVAL: Duration = Duration::from_secs(2);

/// Observer for download progress
pub trait ProgressReporter: Send {
    fn on_event(&mut self, event: &ProgressEvent);

    /// Called once after the backend returns, successful or not.
    fn finish(&mut self, _output: Option<&Path>) {}
}

/// Discards everything. Used by tests and `--debug` runs piped to files.
#[derive(Debug, Default)]
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {
    fn on_event(&mut self, _event: &ProgressEvent) {}
}

/// Pick the animated bar for a terminal, plain lines otherwise.
pub fn reporter_for_terminal(no_color: bool) -> Box<dyn ProgressReporter> {
    if std::io::stderr().is_terminal() {
        Box::new(TerminalReporter::new(no_color))
    } else {
        Box::new(PlainReporter::new(std::io::stderr()))
    }
}

/// Rate limiter shared by the reporters
#[derive(Debug, Clone)]
pub struct RefreshThrottle {
    min_interval: Duration,
    last: Option<Instant>,
}

impl RefreshThrottle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last: None,
        }
    }

    /// True when enough time has passed since the last accepted update.
    pub fn ready(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.saturating_duration_since(last) < self.min_interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

fn speed_and_eta(progress: &DownloadProgress) -> String {
    let mut parts = Vec::new();
    if progress.speed > 0.0 {
        parts.push(format!("{}/s", HumanBytes(progress.speed as u64)));
    }
    if let Some(eta) = progress.eta {
        parts.push(format!("ETA {}", HumanDuration(eta)));
    }
    parts.join("  ")
}

/// Animated indicatif bar on stderr
pub struct TerminalReporter {
    bar: ProgressBar,
    has_length: bool,
    no_color: bool,
}

impl TerminalReporter {
    pub fn new(no_color: bool) -> Self {
        let bar = ProgressBar::with_draw_target(
            None,
            ProgressDrawTarget::stderr_with_hz(TERMINAL_REFRESH_HZ),
        );
        bar.set_style(Self::spinner_style(no_color));
        Self {
            bar,
            has_length: false,
            no_color,
        }
    }

    fn bar_style(no_color: bool) -> ProgressStyle {
        let template = if no_color {
            "[{elapsed_precise}] [{bar:40}] {bytes}/{total_bytes} {msg}"
        } else {
            "[{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}"
        };
        ProgressStyle::with_template(template)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░")
    }

    fn spinner_style(no_color: bool) -> ProgressStyle {
        let template = if no_color {
            "{spinner} {msg}"
        } else {
            "{spinner:.green} {msg}"
        };
        ProgressStyle::with_template(template).unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn to_spinner(&mut self) {
        if self.has_length {
            self.bar.set_style(Self::spinner_style(self.no_color));
            self.has_length = false;
        }
        self.bar.enable_steady_tick(Duration::from_millis(100));
    }
}

impl ProgressReporter for TerminalReporter {
    fn on_event(&mut self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Downloading(progress) => match progress.total_bytes {
                Some(total) => {
                    if !self.has_length {
                        self.bar.disable_steady_tick();
                        self.bar.set_style(Self::bar_style(self.no_color));
                        self.has_length = true;
                    }
                    self.bar.set_length(total);
                    self.bar.set_position(progress.downloaded_bytes.min(total));
                    self.bar.set_message(speed_and_eta(progress));
                }
                None => {
                    self.to_spinner();
                    self.bar.set_message(format!(
                        "Downloading {} {}",
                        HumanBytes(progress.downloaded_bytes),
                        speed_and_eta(progress)
                    ));
                }
            },
            ProgressEvent::StreamFinished => {
                if let Some(len) = self.bar.length() {
                    self.bar.set_position(len);
                }
            }
            ProgressEvent::PostProcessing { step } => {
                self.to_spinner();
                self.bar.set_message(format!("Post-processing ({})", step));
            }
        }
    }

    fn finish(&mut self, _output: Option<&Path>) {
        self.bar.finish_and_clear();
    }
}

/// One line per update, for pipes and dumb terminals
pub struct PlainReporter<W: Write + Send> {
    out: W,
    throttle: RefreshThrottle,
    last_step: Option<u64>,
}

impl<W: Write + Send> PlainReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            throttle: RefreshThrottle::new(PLAIN_INTERVAL),
            last_step: None,
        }
    }

    /// Emit when the percentage crossed a new 10% step or the interval elapsed.
    fn should_emit(&mut self, progress: &DownloadProgress, now: Instant) -> bool {
        let step = progress.percentage().map(|p| (p * 10.0).floor() as u64);
        let new_step = step.is_some() && step != self.last_step;
        if new_step {
            self.last_step = step;
            self.throttle.reset();
        }
        self.throttle.ready(now)
    }

    fn line(&mut self, text: &str) {
        // Output errors never abort the download.
        let _ = writeln!(self.out, "{}", text);
        let _ = self.out.flush();
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> ProgressReporter for PlainReporter<W> {
    fn on_event(&mut self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Downloading(progress) => {
                if !self.should_emit(progress, Instant::now()) {
                    return;
                }
                let done = match progress.percentage() {
                    Some(p) => format!(
                        "{:5.1}% of {}",
                        p * 100.0,
                        HumanBytes(progress.total_bytes.unwrap_or(0))
                    ),
                    None => HumanBytes(progress.downloaded_bytes).to_string(),
                };
                let extra = speed_and_eta(progress);
                if extra.is_empty() {
                    self.line(&format!("Downloading: {}", done));
                } else {
                    self.line(&format!("Downloading: {}  {}", done, extra));
                }
            }
            ProgressEvent::StreamFinished => {
                self.last_step = None;
                self.throttle.reset();
                self.line("Stream downloaded");
            }
            ProgressEvent::PostProcessing { step } => {
                self.line(&format!("Post-processing ({})", step));
            }
        }
    }

    fn finish(&mut self, output: Option<&Path>) {
        if let Some(path) = output {
            self.line(&format!("Saved to {}", path.display()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn downloading(done: u64, total: u64) -> ProgressEvent {
        let mut p = DownloadProgress::new(Some(total));
        p.update(done, 100.0);
        ProgressEvent::Downloading(p)
    }

    fn output(reporter: PlainReporter<Vec<u8>>) -> String {
        String::from_utf8(reporter.into_inner()).unwrap()
    }

    #[test]
    fn throttle_blocks_inside_interval() {
        let mut throttle = RefreshThrottle::new(Duration::from_secs(2));
        let start = Instant::now();
        assert!(throttle.ready(start));
        assert!(!throttle.ready(start + Duration::from_millis(500)));
        assert!(throttle.ready(start + Duration::from_secs(2)));
    }

    #[test]
    fn plain_reporter_emits_once_per_step() {
        let mut reporter = PlainReporter::new(Vec::new());
        // 1%, 2%, 3% all fall in the same 10% step and arrive within 2s.
        reporter.on_event(&downloading(10, 1000));
        reporter.on_event(&downloading(20, 1000));
        reporter.on_event(&downloading(30, 1000));
        // Next step is printed immediately.
        reporter.on_event(&downloading(150, 1000));

        let text = output(reporter);
        assert_eq!(text.lines().count(), 2, "got: {text}");
        assert!(text.lines().next().unwrap().contains("1.0%"));
        assert!(text.lines().nth(1).unwrap().contains("15.0%"));
    }

    #[test]
    fn plain_reporter_handles_unknown_size() {
        let mut reporter = PlainReporter::new(Vec::new());
        let mut p = DownloadProgress::new(None);
        p.update(2048, 0.0);
        reporter.on_event(&ProgressEvent::Downloading(p));

        let text = output(reporter);
        assert!(text.starts_with("Downloading: 2.00 KiB"), "got: {text}");
    }

    #[test]
    fn plain_reporter_reports_post_processing_and_result() {
        let mut reporter = PlainReporter::new(Vec::new());
        reporter.on_event(&ProgressEvent::StreamFinished);
        reporter.on_event(&ProgressEvent::PostProcessing {
            step: "Merger".to_string(),
        });
        reporter.finish(Some(Path::new("/tmp/out.mp4")));

        let text = output(reporter);
        assert!(text.contains("Stream downloaded"));
        assert!(text.contains("Post-processing (Merger)"));
        assert!(text.contains("Saved to /tmp/out.mp4"));
    }

    #[test]
    fn terminal_reporter_accepts_all_events() {
        let mut reporter = TerminalReporter::new(true);
        reporter.on_event(&downloading(10, 100));
        reporter.on_event(&ProgressEvent::StreamFinished);
        reporter.on_event(&ProgressEvent::PostProcessing {
            step: "Merger".to_string(),
        });
        reporter.finish(None);
    }
}
