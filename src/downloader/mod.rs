//! Download orchestration, format selection and progress

pub mod engine;
pub mod progress;
pub mod quality;
pub mod reporter;

// Re-export for convenience
pub use engine::{DownloadOutcome, DownloadRequest, Invocation, Orchestrator};
pub use progress::{DownloadProgress, ProgressEvent};
pub use quality::{AudioFormat, Container, FormatSpec, MediaKind, PostProcess, Quality};
pub use reporter::{PlainReporter, ProgressReporter, SilentReporter, TerminalReporter};
