//! Quality menu rendering and input parsing

use crate::downloader::quality::{AudioFormat, Quality};
use crate::shell::theme::Theme;
use crate::utils::error::{Result, Yt4dwError};

/// Numbered menu with the default marked
pub fn render(theme: Theme, default: Quality) -> String {
    let mut out = format!("{}\n", theme.heading("Available Download Options"));
    for (i, quality) in Quality::ALL.iter().enumerate() {
        let marker = if *quality == default { " (default)" } else { "" };
        out.push_str(&format!(
            "  {} {}{}\n",
            theme.accent(&format!("{}.", i + 1)),
            quality.label(),
            marker
        ));
    }
    out
}

/// Resolve one line of menu input.
///
/// Empty input picks `default`. A number picks that menu entry. `audio`
/// picks the preferred audio container. Anything else goes through
/// [`Quality::from_label`].
pub fn parse_choice(input: &str, default: Quality, audio: AudioFormat) -> Result<Quality> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(default);
    }

    if let Ok(n) = input.parse::<usize>() {
        if (1..=Quality::ALL.len()).contains(&n) {
            return Ok(Quality::ALL[n - 1]);
        }
        // 360, 720... are heights, not menu numbers
        if let Some(q) = Quality::from_label(input) {
            return Ok(q);
        }
        return Err(Yt4dwError::Input(format!(
            "choose 1-{} or a quality name",
            Quality::ALL.len()
        )));
    }

    if input.eq_ignore_ascii_case("audio") {
        return Ok(audio.quality());
    }

    Quality::from_label(input)
        .ok_or_else(|| Yt4dwError::Input(format!("unknown quality '{}'", input)))
}
