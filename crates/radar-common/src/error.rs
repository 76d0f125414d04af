/// Errors shared by every Radar crate.
///
/// Boundary-specific failures (content fetching, completion calls) carry their
/// own typed errors and are converted into one of these variants only when
/// they escape their crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("channel error: {0}")]
    Channel(String),

    #[error("agent error: {0}")]
    Agent(String),

    #[error("content error: {0}")]
    Content(String),

    #[error("gateway error: {0}")]
    Gateway(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
