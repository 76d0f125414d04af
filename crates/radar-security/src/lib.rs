pub mod allowlist;
pub mod redaction;
pub mod secret;

pub use allowlist::ConversationAllowlist;
pub use redaction::{RedactingWriter, redact_secrets};
pub use secret::{SecretError, SharedSecret};
