pub mod error;
pub mod message;
pub mod types;

pub use error::{Error, Result};
pub use message::{InboundMessage, MessageSource};
pub use types::{ConversationId, ResolvedContent};
