//! Application initialization
//!
//! Resolves paths and settings, runs the startup checks and hands a fully
//! built session to the interactive shell.

use crate::downloader::engine::Orchestrator;
use crate::downloader::quality::Quality;
use crate::downloader::reporter::reporter_for_terminal;
use crate::extractor::ytdlp::YtDlpBackend;
use crate::history::HistoryLog;
use crate::shell::{banner, RunSummary, Session, Shell, ShellOptions, Theme};
use crate::updater::UpdateChecker;
use crate::utils::config::{Paths, Settings};
use crate::utils::cookies::{self, CookieSource};
use crate::utils::requirements::{self, RequirementReport};
use anyhow::{Context, Result};
use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Startup options, usually from the command line
#[derive(Debug, Clone, Default)]
pub struct AppOptions {
    pub config: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub cookies: Option<PathBuf>,
    pub url: Option<String>,
    pub quality: Option<Quality>,
    pub no_color: bool,
    pub loop_mode: bool,
    pub no_update_check: bool,
    pub skip_checks: bool,
    pub update_url: String,
}

impl AppOptions {
    pub fn paths(&self) -> Paths {
        match &self.config {
            Some(path) => Paths::from_config_file(path),
            None => Paths::system_default(),
        }
    }
}

/// Whether the settings file asks for debug logging. Never fails.
pub fn debug_requested(config_file: &Path) -> bool {
    Settings::read(config_file)
        .ok()
        .flatten()
        .map(|s| s.debug())
        .unwrap_or(false)
}

/// Run the application
pub async fn run(options: AppOptions) -> Result<RunSummary> {
    let paths = options.paths();
    let mut settings = Settings::load(&paths.config_file);

    // Flag and environment overrides stay in memory; they never reach the file.
    let output_dir = options
        .output
        .clone()
        .unwrap_or_else(|| settings.download_path().to_path_buf());

    paths
        .ensure_directories(&output_dir)
        .context("Failed to prepare configuration directory")?;

    let mut stdout = std::io::stdout();
    let theme = Theme::new(!options.no_color && stdout.is_terminal());

    write!(
        stdout,
        "{}",
        banner::render(
            theme,
            env!("CARGO_PKG_VERSION"),
            settings.auto_update_check() && !options.no_update_check
        )
    )?;
    stdout.flush()?;

    if settings.auto_update_check() && !options.no_update_check {
        UpdateChecker::new(options.update_url.clone())
            .notify_if_outdated(&mut stdout, theme)
            .await;
    }

    let backend = YtDlpBackend::locate();

    if !options.skip_checks {
        writeln!(stdout, "{}", theme.hint("Checking system requirements..."))?;
        let report = requirements::run_checks(backend.ytdlp_path()).await;
        write_requirements(&mut stdout, theme, &report)?;
        writeln!(stdout)?;
    }

    let source = cookies::discover(
        options.cookies.as_deref(),
        &paths.cookies_dir,
        settings.cookies(),
    );
    if let CookieSource::Discovered(path) = &source {
        // A file dropped into the cookies folder becomes the configured one.
        if settings.cookies() != Some(path.as_path()) {
            settings.set_cookies(Some(path.clone()));
            if let Err(e) = settings.save(&paths.config_file) {
                warn!("Could not save settings: {}", e);
            }
        }
    }
    if let Some(path) = source.path() {
        if let Err(e) = cookies::check_format(path) {
            writeln!(stdout, "{}", theme.warning(&e.to_string()))?;
        }
    } else {
        writeln!(
            stdout,
            "{}",
            theme.hint(&format!(
                "Place a cookies.txt file in {} to enable restricted video access.",
                paths.cookies_dir.display()
            ))
        )?;
    }

    let history = if settings.keep_history() {
        match HistoryLog::open(&paths.history_file).await {
            Ok(log) => Some(log),
            Err(e) => {
                warn!("History disabled: {}", e);
                None
            }
        }
    } else {
        None
    };

    info!("Downloads go to {}", output_dir.display());

    let session = Session {
        settings,
        settings_path: paths.config_file.clone(),
        output_dir,
        cookies: source.into_path(),
        history,
    };
    let shell_options = ShellOptions {
        url: options.url.clone(),
        quality: options.quality,
        loop_mode: options.loop_mode,
    };

    let no_color = options.no_color;
    let stdin = std::io::stdin();
    let mut shell = Shell::new(
        stdin.lock(),
        std::io::stdout(),
        Orchestrator::new(Arc::new(backend)),
        session,
        shell_options,
    )
    .with_theme(theme)
    .with_reporters(Box::new(move || reporter_for_terminal(no_color)));

    let summary = shell.run().await?;

    let mut stdout = shell.into_output();
    writeln!(stdout, "\n{}", theme.heading("Thank you for using YT4-DW!"))?;
    Ok(summary)
}

fn write_requirements<W: Write>(
    out: &mut W,
    theme: Theme,
    report: &RequirementReport,
) -> std::io::Result<()> {
    if report.internet {
        writeln!(out, "{}", theme.success("Internet connection: OK"))?;
    }
    if let Some(path) = &report.ytdlp {
        writeln!(out, "{}", theme.success(&format!("yt-dlp: {}", path.display())))?;
    }
    match &report.ffmpeg {
        Some(path) => writeln!(out, "{}", theme.success(&format!("ffmpeg: {}", path.display())))?,
        None => writeln!(out, "{}", theme.hint(&requirements::ffmpeg_install_guide()))?,
    }
    if report.is_ready() {
        writeln!(out, "{}", theme.success("All requirements met"))?;
    } else {
        for warning in report.warnings() {
            writeln!(out, "{}", theme.warning(&warning))?;
        }
    }
    Ok(())
}
