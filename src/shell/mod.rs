//! Interactive command-line shell

pub mod app;
pub mod banner;
pub mod menu;
pub mod theme;

pub use app::{ReporterFactory, RunSummary, Session, Shell, ShellOptions, ShellState};
pub use theme::Theme;
