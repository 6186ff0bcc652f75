//! yt4dw - interactive YouTube downloader
//!
//! Prompts for a URL and a quality, then lets yt-dlp (and ffmpeg) do the
//! work while showing progress in the terminal.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use yt4dw::app::{self, AppOptions};
use yt4dw::updater::DEFAULT_RELEASES_URL;
use yt4dw::Quality;

#[derive(Parser)]
#[command(name = "yt4dw", version, about = "Download YouTube videos and audio with yt-dlp")]
struct Args {
    /// Video URL; skips the URL prompt
    #[arg(long)]
    url: Option<String>,

    /// Quality (360p..2160p, mp3, wav); skips the menu
    #[arg(short, long)]
    quality: Option<Quality>,

    /// Download directory for this run
    #[arg(short, long, env = "YT4DW_DOWNLOAD_DIR")]
    output: Option<PathBuf>,

    /// Settings file
    #[arg(long, env = "YT4DW_CONFIG")]
    config: Option<PathBuf>,

    /// Netscape-format cookie file
    #[arg(long, env = "YT4DW_COOKIES")]
    cookies: Option<PathBuf>,

    /// Verbose logging
    #[arg(long, env = "YT4DW_DEBUG")]
    debug: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Ask for another URL after each download
    #[arg(long = "loop")]
    loop_mode: bool,

    /// Skip the release check
    #[arg(long)]
    no_update_check: bool,

    /// Skip the connectivity and ffmpeg checks
    #[arg(long)]
    skip_checks: bool,

    /// Latest-release endpoint
    #[arg(long, env = "YT4DW_UPDATE_URL", default_value = DEFAULT_RELEASES_URL, hide = true)]
    update_url: String,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let options = AppOptions {
        config: args.config,
        output: args.output,
        cookies: args.cookies,
        url: args.url,
        quality: args.quality,
        no_color: args.no_color,
        loop_mode: args.loop_mode,
        no_update_check: args.no_update_check,
        skip_checks: args.skip_checks,
        update_url: args.update_url,
    };

    // Initialize logging
    let debug = args.debug || app::debug_requested(&options.paths().config_file);
    let default_level = if debug { "yt4dw=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_ansi(!args.no_color)
        .init();

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let loop_mode = options.loop_mode;
    let summary = rt.block_on(app::run(options))?;

    if summary.failed > 0 && !loop_mode {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
