pub mod models;
pub mod traits;
pub mod ytdlp;

pub use models::VideoInfo;
pub use traits::MediaBackend;
pub use ytdlp::{find_ytdlp, YtDlpBackend};
