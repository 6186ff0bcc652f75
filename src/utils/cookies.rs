//! Cookie file discovery
//!
//! Cookie files are browser exports in Netscape format. They are handed to
//! yt-dlp untouched; this module only decides which one to use.

use crate::utils::error::{Result, Yt4dwError};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const NETSCAPE_HEADERS: &[&str] = &["# Netscape HTTP Cookie File", "# HTTP Cookie File"];

/// Where the cookie file came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieSource {
    /// `--cookies` / `YT4DW_COOKIES`
    Explicit(PathBuf),
    /// First `*.txt` in the cookies directory
    Discovered(PathBuf),
    /// `cookies` entry of the settings file
    Configured(PathBuf),
    None,
}

impl CookieSource {
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Discovered(p) | Self::Configured(p) => Some(p),
            Self::None => None,
        }
    }

    pub fn into_path(self) -> Option<PathBuf> {
        match self {
            Self::Explicit(p) | Self::Discovered(p) | Self::Configured(p) => Some(p),
            Self::None => None,
        }
    }
}

/// Pick the cookie file to use.
///
/// Order: explicit path, first `*.txt` in `cookies_dir` (by name), the
/// configured path if it still exists, nothing.
pub fn discover(explicit: Option<&Path>, cookies_dir: &Path, configured: Option<&Path>) -> CookieSource {
    if let Some(path) = explicit {
        if !path.is_file() {
            warn!("Cookie file {} does not exist", path.display());
        }
        return CookieSource::Explicit(path.to_path_buf());
    }

    if let Some(found) = first_txt_file(cookies_dir) {
        debug!("Found cookie file {}", found.display());
        return CookieSource::Discovered(found);
    }

    match configured {
        Some(path) if path.is_file() => CookieSource::Configured(path.to_path_buf()),
        _ => CookieSource::None,
    }
}

fn first_txt_file(dir: &Path) -> Option<PathBuf> {
    let entries = std::fs::read_dir(dir).ok()?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .and_then(|e| e.to_str())
                    .map(|e| e.eq_ignore_ascii_case("txt"))
                    .unwrap_or(false)
        })
        .collect();
    files.sort();
    files.into_iter().next()
}

/// Check that `path` starts like a Netscape cookie export.
pub fn check_format(path: &Path) -> Result<()> {
    let file = std::fs::File::open(path)
        .map_err(|e| Yt4dwError::InvalidCookies(format!("{}: {}", path.display(), e)))?;
    let mut first = String::new();
    BufReader::new(file)
        .read_line(&mut first)
        .map_err(|e| Yt4dwError::InvalidCookies(format!("{}: {}", path.display(), e)))?;

    let first = first.trim_start_matches('\u{feff}').trim();
    if NETSCAPE_HEADERS.iter().any(|h| first.starts_with(h)) {
        Ok(())
    } else {
        Err(Yt4dwError::InvalidCookies(format!(
            "{} is missing the Netscape header",
            path.display()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn explicit_path_wins() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.txt", "# Netscape HTTP Cookie File\n");
        let explicit = dir.path().join("mine.txt");

        let source = discover(Some(&explicit), dir.path(), None);
        assert_eq!(source, CookieSource::Explicit(explicit));
    }

    #[test]
    fn first_txt_by_name() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "b.txt", "");
        write(dir.path(), "a.txt", "");
        write(dir.path(), "0.json", "");

        let source = discover(None, dir.path(), None);
        assert_eq!(source, CookieSource::Discovered(dir.path().join("a.txt")));
    }

    #[test]
    fn falls_back_to_configured_if_present() {
        let dir = TempDir::new().unwrap();
        let cookies_dir = dir.path().join("cookies");
        std::fs::create_dir(&cookies_dir).unwrap();
        let configured = write(dir.path(), "elsewhere.cookies", "");

        assert_eq!(
            discover(None, &cookies_dir, Some(&configured)),
            CookieSource::Configured(configured)
        );
        assert_eq!(
            discover(None, &cookies_dir, Some(&dir.path().join("gone.txt"))),
            CookieSource::None
        );
    }

    #[test]
    fn missing_dir_means_none() {
        let source = discover(None, Path::new("/definitely/not/here"), None);
        assert_eq!(source, CookieSource::None);
        assert!(source.path().is_none());
    }

    #[test]
    fn netscape_header_check() {
        let dir = TempDir::new().unwrap();
        let good = write(
            dir.path(),
            "good.txt",
            "# Netscape HTTP Cookie File\n.youtube.com\tTRUE\t/\tTRUE\t0\tSID\tx\n",
        );
        let bad = write(dir.path(), "bad.txt", "SID=x; HSID=y\n");

        assert!(check_format(&good).is_ok());
        assert!(matches!(check_format(&bad), Err(Yt4dwError::InvalidCookies(_))));
    }
}
