#[derive(Debug, thiserror::Error)]
pub enum ScoutError {
    #[error("request failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("feed is not valid RSS or Atom: {0}")]
    Feed(String),
}
