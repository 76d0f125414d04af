pub mod loader;
pub mod model;

pub use loader::ConfigLoader;
pub use model::{
    AnalysisConfig, AppConfig, FeedSource, GatewayConfig, GithubScoutConfig, IngestConfig,
    LlmConfig, MAX_LINKS_PER_MESSAGE, RateLimitConfig, Requirement, ScoutConfig, TelegramConfig, TelegramMode,
};
