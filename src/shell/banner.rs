//! Welcome banner

use crate::shell::theme::Theme;

const TITLE: &str = r"
██╗   ██╗████████╗██╗  ██╗      ██████╗ ██╗    ██╗
╚██╗ ██╔╝╚══██╔══╝██║  ██║      ██╔══██╗██║    ██║
 ╚████╔╝    ██║   ███████║█████╗██║  ██║██║ █╗ ██║
  ╚██╔╝     ██║   ╚════██║╚════╝██║  ██║██║███╗██║
   ██║      ██║        ██║      ██████╔╝╚███╔███╔╝
   ╚═╝      ╚═╝        ╚═╝      ╚═════╝  ╚══╝╚══╝ ";

const FEATURES: &[&str] = &[
    "Video downloads from 360p up to 4K",
    "MP3 (320kbps) and WAV audio extraction",
    "Real-time progress tracking",
    "Age-restricted content support via cookies",
    "Optimized for Termux & Linux",
];

/// Title art, feature list and a status line
pub fn render(theme: Theme, version: &str, update_check: bool) -> String {
    let mut out = String::new();
    out.push_str(&theme.heading(TITLE));
    out.push_str("\n\n");
    out.push_str(&theme.heading("YouTube Downloader"));
    out.push('\n');

    for feature in FEATURES {
        out.push_str(&format!("  {} {}\n", theme.paint(super::theme::GREEN, "✓"), feature));
    }

    let updates = if update_check {
        "Auto-check enabled"
    } else {
        "Auto-check disabled"
    };
    out.push_str(&format!(
        "\n{} {}   {} {}\n",
        theme.accent("Version:"),
        version,
        theme.accent("Updates:"),
        updates
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banner_shows_version_and_update_state() {
        let text = render(Theme::plain(), "2.1.0", false);
        assert!(text.contains("Version: 2.1.0"));
        assert!(text.contains("Auto-check disabled"));
        assert!(text.contains("MP3 (320kbps)"));
    }
}
