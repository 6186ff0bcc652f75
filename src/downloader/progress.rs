//! Progress tracking for downloads
//!
//! yt-dlp is asked to print progress through a `--progress-template` so the
//! fields arrive as plain numbers. The human-readable `[download]` line is
//! still understood for builds that ignore the template.

use std::time::Duration;

/// Marker in front of templated download progress lines
pub const PROGRESS_PREFIX: &str = "yt4dw-progress:";

/// Marker in front of templated post-processing lines
pub const POSTPROCESS_PREFIX: &str = "yt4dw-post:";

/// `--progress-template` value for the download phase
pub fn download_template() -> String {
    format!(
        "download:{}%(progress.status)s|%(progress.downloaded_bytes)s|%(progress.total_bytes)s|%(progress.total_bytes_estimate)s|%(progress.speed)s|%(progress.eta)s",
        PROGRESS_PREFIX
    )
}

/// `--progress-template` value for the post-processing phase
pub fn postprocess_template() -> String {
    format!(
        "postprocess:{}%(progress.status)s|%(progress.postprocessor)s",
        POSTPROCESS_PREFIX
    )
}

/// Progress tracking structure
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadProgress {
    /// Exact or estimated size, when yt-dlp knows it
    pub total_bytes: Option<u64>,
    pub downloaded_bytes: u64,
    pub speed: f64, // bytes per second
    pub eta: Option<Duration>,
}

impl DownloadProgress {
    /// Create a new progress tracker
    pub fn new(total_bytes: Option<u64>) -> Self {
        Self {
            total_bytes,
            downloaded_bytes: 0,
            speed: 0.0,
            eta: None,
        }
    }

    /// Update progress with new data
    pub fn update(&mut self, downloaded_bytes: u64, speed: f64) {
        self.downloaded_bytes = downloaded_bytes;
        self.speed = speed;

        self.eta = match self.total_bytes {
            Some(total) if downloaded_bytes >= total => Some(Duration::from_secs(0)),
            Some(total) if speed > 0.0 => Some(Duration::from_secs_f64(
                (total - downloaded_bytes) as f64 / speed,
            )),
            _ => None,
        };
    }

    /// Get progress fraction (0.0 to 1.0), `None` when the size is unknown
    pub fn percentage(&self) -> Option<f64> {
        match self.total_bytes {
            Some(total) if total > 0 => Some(self.downloaded_bytes as f64 / total as f64),
            _ => None,
        }
    }
}

/// One update from the downloader
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Downloading(DownloadProgress),
    /// One stream (video or audio) is fully on disk
    StreamFinished,
    /// ffmpeg step started (merge, remux, audio extraction)
    PostProcessing { step: String },
}

/// Parse a line of yt-dlp output into a progress event.
pub fn parse_line(line: &str) -> Option<ProgressEvent> {
    let line = line.trim();

    if let Some(rest) = line.strip_prefix(PROGRESS_PREFIX) {
        return parse_template_fields(rest);
    }

    if let Some(rest) = line.strip_prefix(POSTPROCESS_PREFIX) {
        let mut fields = rest.splitn(2, '|');
        let status = fields.next()?;
        let step = fields.next().unwrap_or("").trim();
        return match status {
            "started" | "processing" => Some(ProgressEvent::PostProcessing {
                step: if step.is_empty() || step == "NA" {
                    "Processing".to_string()
                } else {
                    step.to_string()
                },
            }),
            _ => None,
        };
    }

    if let Some(rest) = line.strip_prefix("[download]") {
        // Progress lines lead with the percentage; Destination lines may hold a '%' in the path.
        let first = rest.split_whitespace().next()?;
        first.strip_suffix('%')?.parse::<f64>().ok()?;

        let (pct, speed, total) = parse_yt_dlp_progress(line)?;
        let total = (total > 0).then_some(total);
        let mut progress = DownloadProgress::new(total);
        let downloaded = total
            .map(|t| (pct / 100.0 * t as f64) as u64)
            .unwrap_or(0);
        progress.update(downloaded, speed);
        return Some(ProgressEvent::Downloading(progress));
    }

    None
}

/// `status|downloaded|total|total_estimate|speed|eta`
fn parse_template_fields(rest: &str) -> Option<ProgressEvent> {
    let fields: Vec<&str> = rest.split('|').map(str::trim).collect();
    let status = *fields.first()?;

    match status {
        "finished" => return Some(ProgressEvent::StreamFinished),
        "downloading" => {}
        _ => return None,
    }

    let number = |idx: usize| -> Option<f64> {
        fields
            .get(idx)
            .filter(|v| **v != "NA" && !v.is_empty())
            .and_then(|v| v.parse::<f64>().ok())
    };

    let downloaded = number(1).unwrap_or(0.0) as u64;
    let total = number(2).or_else(|| number(3)).map(|t| t as u64);
    let speed = number(4).unwrap_or(0.0);

    let mut progress = DownloadProgress::new(total);
    progress.update(downloaded, speed);
    if let Some(eta) = number(5) {
        progress.eta = Some(Duration::from_secs_f64(eta.max(0.0)));
    }

    Some(ProgressEvent::Downloading(progress))
}

/// Parse yt-dlp's default progress line into (percent, bytes/s, total bytes).
fn parse_yt_dlp_progress(line: &str) -> Option<(f64, f64, u64)> {
    // Expected format: [download]  42.5% of ~ 150.00MiB at  5.20MiB/s ETA 00:15
    if !line.contains('%') {
        return None;
    }

    // 1. Parse Percentage
    let pct_pos = line.find('%')?;
    let before = &line[..pct_pos];
    let num_start = before
        .rfind(|c: char| !(c.is_ascii_digit() || c == '.'))
        .map(|i| i + 1)
        .unwrap_or(0);
    let pct = before[num_start..].parse::<f64>().ok()?;

    // 2. Parse Total Size (look for "of " or "of ~ ")
    let mut total_bytes = 0;
    if let Some(of_idx) = line.find(" of ") {
        let after_of = line[of_idx + 4..].trim_start();
        let size_str = after_of.trim_start_matches('~').trim_start();
        let size_end = size_str
            .find(char::is_whitespace)
            .unwrap_or(size_str.len());
        if let Some(bytes) = parse_size(&size_str[..size_end]) {
            total_bytes = bytes as u64;
        }
    }

    // 3. Parse Speed (look for ' at ' and '/s')
    let mut speed_bps = 0.0;
    if let Some(at_idx) = line.find(" at ") {
        let after = &line[at_idx + 4..];
        if let Some(slash_idx) = after.find("/s") {
            speed_bps = parse_size(after[..slash_idx].trim()).unwrap_or(0.0);
        }
    }

    Some((pct, speed_bps, total_bytes))
}

/// `150.00MiB` -> bytes
fn parse_size(token: &str) -> Option<f64> {
    let idx = token
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(token.len());
    if idx == 0 {
        return None;
    }

    let num = token[..idx].parse::<f64>().ok()?;
    let multiplier = match token[idx..].trim() {
        "KiB" => 1024.0,
        "MiB" => 1024.0 * 1024.0,
        "GiB" => 1024.0 * 1024.0 * 1024.0,
        "KB" => 1000.0,
        "MB" => 1000.0 * 1000.0,
        "GB" => 1000.0 * 1000.0 * 1000.0,
        _ => 1.0,
    };
    Some(num * multiplier)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ============================================================
    // DOWNLOAD PROGRESS
    // ============================================================

    #[test]
    fn test_download_progress_new() {
        let progress = DownloadProgress::new(Some(1000));

        assert_eq!(progress.total_bytes, Some(1000));
        assert_eq!(progress.downloaded_bytes, 0);
        assert_eq!(progress.speed, 0.0);
        assert_eq!(progress.eta, None);
    }

    #[test]
    fn test_progress_update_basic() {
        let mut progress = DownloadProgress::new(Some(1000));
        progress.update(500, 100.0);

        assert_eq!(progress.downloaded_bytes, 500);
        assert_eq!(
            progress.eta.unwrap().as_secs(),
            5,
            "ETA should be 5 seconds (500 bytes remaining at 100 B/s)"
        );
    }

    #[test]
    fn test_progress_update_zero_speed() {
        let mut progress = DownloadProgress::new(Some(1000));
        progress.update(100, 0.0);
        assert_eq!(progress.eta, None, "ETA should be None with zero speed");
    }

    #[test]
    fn test_progress_update_over_total() {
        let mut progress = DownloadProgress::new(Some(1000));
        progress.update(1500, 100.0);
        assert_eq!(progress.eta, Some(Duration::from_secs(0)));
    }

    #[test]
    fn test_unknown_total_has_no_percentage() {
        let mut progress = DownloadProgress::new(None);
        progress.update(4096, 1024.0);
        assert_eq!(progress.percentage(), None);
        assert_eq!(progress.eta, None);
    }

    #[test]
    fn test_percentage_half_complete() {
        let mut progress = DownloadProgress::new(Some(1000));
        progress.update(500, 100.0);
        assert!((progress.percentage().unwrap() - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_percentage_zero_total() {
        let progress = DownloadProgress::new(Some(0));
        assert_eq!(progress.percentage(), None);
    }

    // ============================================================
    // TEMPLATE LINES
    // ============================================================

    #[test]
    fn test_parse_template_downloading() {
        let event = parse_line("yt4dw-progress:downloading|1048576|4194304|NA|524288.5|6").unwrap();

        match event {
            ProgressEvent::Downloading(p) => {
                assert_eq!(p.downloaded_bytes, 1_048_576);
                assert_eq!(p.total_bytes, Some(4_194_304));
                assert!((p.speed - 524_288.5).abs() < 0.01);
                assert_eq!(p.eta, Some(Duration::from_secs(6)));
                assert!((p.percentage().unwrap() - 0.25).abs() < 0.001);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_parse_template_uses_estimate_when_total_missing() {
        let event = parse_line("yt4dw-progress:downloading|100|NA|400.0|NA|NA").unwrap();
        match event {
            ProgressEvent::Downloading(p) => {
                assert_eq!(p.total_bytes, Some(400));
                assert_eq!(p.speed, 0.0);
                assert_eq!(p.eta, None);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_parse_template_all_unknown() {
        let event = parse_line("yt4dw-progress:downloading|NA|NA|NA|NA|NA").unwrap();
        match event {
            ProgressEvent::Downloading(p) => {
                assert_eq!(p.downloaded_bytes, 0);
                assert_eq!(p.total_bytes, None);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_parse_template_finished() {
        assert_eq!(
            parse_line("yt4dw-progress:finished|4194304|4194304|NA|NA|NA"),
            Some(ProgressEvent::StreamFinished)
        );
    }

    #[test]
    fn test_parse_postprocess_started() {
        assert_eq!(
            parse_line("yt4dw-post:started|Merger"),
            Some(ProgressEvent::PostProcessing {
                step: "Merger".to_string()
            })
        );
        assert_eq!(parse_line("yt4dw-post:finished|Merger"), None);
    }

    // ============================================================
    // HUMAN-READABLE LINES
    // ============================================================

    #[test]
    fn test_parse_human_progress_line() {
        let event =
            parse_line("[download]  42.5% of ~ 150.00MiB at  5.20MiB/s ETA 00:15").unwrap();

        match event {
            ProgressEvent::Downloading(p) => {
                let total = (150.0 * 1024.0 * 1024.0) as u64;
                assert_eq!(p.total_bytes, Some(total));
                assert!((p.percentage().unwrap() - 0.425).abs() < 0.001);
                assert!((p.speed - 5.2 * 1024.0 * 1024.0).abs() < 1.0);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_parse_human_line_without_speed() {
        let event = parse_line("[download] 100% of   10.00MiB in 00:00:03").unwrap();
        match event {
            ProgressEvent::Downloading(p) => {
                assert_eq!(p.speed, 0.0);
                assert_eq!(p.percentage(), Some(1.0));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_ignores_unrelated_lines() {
        assert_eq!(parse_line("[youtube] abc123: Downloading webpage"), None);
        assert_eq!(parse_line("[download] Destination: /tmp/a.mp4"), None);
        assert_eq!(parse_line(""), None);
    }

    #[test]
    fn test_percent_in_file_name_is_not_progress() {
        assert_eq!(parse_line("[download] Destination: /tmp/50% off.mp4"), None);
        assert_eq!(
            parse_line("[download] /tmp/100% real.mp4 has already been downloaded"),
            None
        );
    }

    #[test]
    fn test_parse_size_units() {
        assert_eq!(parse_size("1KiB"), Some(1024.0));
        assert_eq!(parse_size("2MB"), Some(2_000_000.0));
        assert_eq!(parse_size("512B"), Some(512.0));
        assert_eq!(parse_size("Unknown"), None);
    }

    #[test]
    fn test_templates_carry_markers() {
        assert!(download_template().starts_with("download:yt4dw-progress:"));
        assert!(postprocess_template().starts_with("postprocess:yt4dw-post:"));
    }
}
