pub mod compose;
pub mod error;
pub mod feed;
pub mod filter;
pub mod github;
pub mod handoff;
pub mod scout;

pub use compose::{AlertDigest, compose_alert};
pub use error::ScoutError;
pub use feed::{FeedEntry, parse_feed};
pub use filter::{KeywordFilter, shorten};
pub use github::{GithubScout, RepoHit};
pub use handoff::{AlertSink, ChannelSink, IngestSink, StdoutSink};
pub use scout::{ScanReport, Scout};
