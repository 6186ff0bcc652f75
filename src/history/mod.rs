//! Optional download history, one JSON object per line

pub mod events;

pub use events::{HistoryEntry, HistoryLog, HistoryOutcome};
