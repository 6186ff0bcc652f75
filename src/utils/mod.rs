//! Utility modules for error handling, configuration and environment checks

pub mod config;
pub mod cookies;
pub mod error;
pub mod platform;
pub mod requirements;
pub mod video_url;

// Re-export for convenience
pub use config::{Paths, Settings};
pub use error::{Result, Yt4dwError};
