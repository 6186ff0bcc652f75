//! Update check via the GitHub Releases API
//!
//! Advisory only: the result is printed and nothing is installed. Every
//! failure is logged at debug level and otherwise ignored.

use crate::shell::Theme;
use crate::utils::error::{Result, Yt4dwError};
use serde::Deserialize;
use std::cmp::Ordering;
use std::io::Write;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_RELEASES_URL: &str =
    "https://api.github.com/repos/lyssadev/yt4-dw/releases/latest";

const USER_AGENT: &str = concat!("yt4dw/", env!("CARGO_PKG_VERSION"));

pub const CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Subset of a GitHub release object
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Release {
    pub tag_name: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
}

impl Release {
    /// Tag without a leading `v`
    pub fn version(&self) -> &str {
        self.tag_name
            .trim()
            .trim_start_matches(|c: char| c == 'v' || c == 'V')
    }
}

/// Compare dotted versions component-wise as numbers.
///
/// Missing components count as zero, so `2.1` equals `2.1.0`. Trailing
/// non-digits in a component are ignored (`3rc1` reads as 3).
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    fn parts(s: &str) -> Vec<u64> {
        s.trim()
            .trim_start_matches(|c: char| c == 'v' || c == 'V')
            .split('.')
            .map(|p| {
                let digits: String = p.chars().take_while(char::is_ascii_digit).collect();
                digits.parse().unwrap_or(0)
            })
            .collect()
    }

    let (a, b) = (parts(a), parts(b));
    let len = a.len().max(b.len());
    for i in 0..len {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        match x.cmp(&y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

/// Is `remote` strictly newer than `local`?
pub fn is_newer(remote: &str, local: &str) -> bool {
    compare_versions(remote, local) == Ordering::Greater
}

/// Checks a releases endpoint against the running version
#[derive(Debug, Clone)]
pub struct UpdateChecker {
    url: String,
    current_version: String,
    timeout: Duration,
}

impl UpdateChecker {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            current_version: env!("CARGO_PKG_VERSION").to_string(),
            timeout: CHECK_TIMEOUT,
        }
    }

    pub fn with_current_version(mut self, version: impl Into<String>) -> Self {
        self.current_version = version.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn current_version(&self) -> &str {
        &self.current_version
    }

    /// Fetch the latest release. `Some` only when it is newer than ours.
    pub async fn check(&self) -> Result<Option<Release>> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(self.timeout)
            .build()?;

        let response = client
            .get(&self.url)
            .header("Accept", "application/vnd.github.v3+json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Yt4dwError::UpdateCheck(format!(
                "release endpoint returned {}",
                response.status()
            )));
        }

        let release: Release = response.json().await?;
        debug!(
            "Latest release {} (running {})",
            release.version(),
            self.current_version
        );

        if is_newer(release.version(), &self.current_version) {
            Ok(Some(release))
        } else {
            Ok(None)
        }
    }

    /// Print a notice when a newer release exists. Returns whether one was printed.
    pub async fn notify_if_outdated<W: Write>(&self, out: &mut W, theme: Theme) -> bool {
        let release = match self.check().await {
            Ok(Some(release)) => release,
            Ok(None) => return false,
            Err(e) => {
                debug!("Update check failed: {}", e);
                return false;
            }
        };

        if let Err(e) = write_notice(out, theme, &release, &self.current_version) {
            debug!("Could not print update notice: {}", e);
        }
        true
    }
}

fn write_notice<W: Write>(
    out: &mut W,
    theme: Theme,
    release: &Release,
    current: &str,
) -> std::io::Result<()> {
    writeln!(out)?;
    writeln!(
        out,
        "{}",
        theme.warning(&format!(
            "New version {} available (you have {})",
            release.version(),
            current
        ))
    )?;

    if let Some(body) = release.body.as_deref().map(str::trim).filter(|b| !b.is_empty()) {
        writeln!(out, "\n{}", theme.heading("Changelog:"))?;
        for line in body.lines() {
            writeln!(out, "  {}", line)?;
        }
    }

    writeln!(
        out,
        "\n{}",
        theme.hint("To update, fetch the latest source and reinstall:")
    )?;
    writeln!(out, "  {}", theme.accent("git pull && cargo install --path ."))?;
    if let Some(url) = &release.html_url {
        writeln!(out, "  or visit: {}", url)?;
    }
    writeln!(out)?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_is_newer() {
        assert!(is_newer("2.2.0", "2.1.0"));
        assert!(is_newer("3.0", "2.9.9"));
        assert!(is_newer("2.1.1", "2.1"));
        assert!(is_newer("2.10.0", "2.9.0"));
        assert!(!is_newer("2.1.0", "2.1.0"));
        assert!(!is_newer("2.1", "2.1.0"));
        assert!(!is_newer("2.0.9", "2.1.0"));
    }

    #[test]
    fn test_release_version_strips_v() {
        let release: Release =
            serde_json::from_str(r#"{"tag_name": "v2.2.0", "body": "Fixes"}"#).unwrap();
        assert_eq!(release.version(), "2.2.0");
        assert_eq!(release.html_url, None);
    }

    #[test]
    fn test_notice_includes_changelog() {
        let release = Release {
            tag_name: "v9.0.0".to_string(),
            body: Some("- faster\n- better".to_string()),
            html_url: Some("https://example.invalid/r".to_string()),
        };
        let mut out = Vec::new();
        write_notice(&mut out, Theme::plain(), &release, "2.1.0").unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("! New version 9.0.0 available"));
        assert!(text.contains("  - faster"));
        assert!(text.contains("https://example.invalid/r"));
        assert!(!text.contains('\x1b'));
    }

    #[test]
    fn test_notice_follows_theme() {
        let release = Release {
            tag_name: "v9.0.0".to_string(),
            body: None,
            html_url: None,
        };
        let mut out = Vec::new();
        write_notice(&mut out, Theme::new(true), &release, "2.1.0").unwrap();
        let text = String::from_utf8(out).unwrap();

        let headline = Theme::new(true).warning("New version 9.0.0 available (you have 2.1.0)");
        assert!(text.contains(&headline));
        assert!(text.contains("\x1b[33m"));
        assert!(!text.contains("Changelog"));
    }

    proptest! {
        #[test]
        fn compare_is_antisymmetric(a in prop::collection::vec(0u64..50, 1..4),
                                    b in prop::collection::vec(0u64..50, 1..4)) {
            let sa = a.iter().map(u64::to_string).collect::<Vec<_>>().join(".");
            let sb = b.iter().map(u64::to_string).collect::<Vec<_>>().join(".");
            prop_assert_eq!(compare_versions(&sa, &sb), compare_versions(&sb, &sa).reverse());
        }

        #[test]
        fn bumping_any_component_is_newer(base in prop::collection::vec(0u64..50, 3),
                                          idx in 0usize..3) {
            let mut bumped = base.clone();
            bumped[idx] += 1;
            let s = |v: &Vec<u64>| v.iter().map(u64::to_string).collect::<Vec<_>>().join(".");
            prop_assert!(is_newer(&s(&bumped), &s(&base)));
        }
    }
}
