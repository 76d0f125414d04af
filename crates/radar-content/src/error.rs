/// Why a single URL could not be resolved by one strategy.
///
/// These never reach the operator: the resolver turns every variant into a
/// fallback strategy or a placeholder body.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("request failed: {0}")]
    Fetch(String),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("unsupported content type: {0}")]
    Unsupported(String),

    #[error("malformed xml: {0}")]
    Xml(String),

    #[error("no entry in metadata response")]
    MissingEntry,

    #[error("entry has no {0}")]
    MissingField(&'static str),

    #[error("extracted text too short ({len} chars)")]
    TooShort { len: usize },
}

impl From<reqwest::Error> for ContentError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => Self::Status(status.as_u16()),
            None => Self::Fetch(e.to_string()),
        }
    }
}
