use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::Mutex;

use crate::downloader::quality::Quality;
use crate::utils::error::Result;

/// How a download ended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HistoryOutcome {
    Completed { output_path: PathBuf },
    Failed { error: String },
}

/// One line of the download history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub url: String,
    pub quality: Quality,
    #[serde(flatten)]
    pub outcome: HistoryOutcome,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn completed(url: impl Into<String>, quality: Quality, output_path: PathBuf) -> Self {
        Self {
            url: url.into(),
            quality,
            outcome: HistoryOutcome::Completed { output_path },
            timestamp: Utc::now(),
        }
    }

    pub fn failed(url: impl Into<String>, quality: Quality, error: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            quality,
            outcome: HistoryOutcome::Failed {
                error: error.into(),
            },
            timestamp: Utc::now(),
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.outcome, HistoryOutcome::Completed { .. })
    }
}

/// Append-only JSONL log of download outcomes
#[derive(Debug, Clone)]
pub struct HistoryLog {
    file_path: PathBuf,
    writer: Arc<Mutex<BufWriter<File>>>,
}

impl HistoryLog {
    /// Open (or create) the log at `file_path`.
    pub async fn open(file_path: impl Into<PathBuf>) -> Result<Self> {
        let file_path = file_path.into();

        // Ensure directory exists
        if let Some(parent) = file_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&file_path)
            .await?;

        Ok(Self {
            file_path,
            writer: Arc::new(Mutex::new(BufWriter::new(file))),
        })
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Append an entry to the log
    pub async fn append(&self, entry: &HistoryEntry) -> Result<()> {
        let json = serde_json::to_string(entry)?;
        let mut writer = self.writer.lock().await;
        writer.write_all(json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
        Ok(())
    }

    /// Read all entries, oldest first
    pub async fn read_entries(&self) -> Result<Vec<HistoryEntry>> {
        if !self.file_path.exists() {
            return Ok(Vec::new());
        }

        let content = tokio::fs::read_to_string(&self.file_path).await?;
        let mut entries = Vec::new();

        for line in content.lines() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<HistoryEntry>(line) {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    // one bad line must not hide the rest
                    tracing::warn!("Failed to parse history line: {}. Error: {}", line, e);
                }
            }
        }
        Ok(entries)
    }
}
