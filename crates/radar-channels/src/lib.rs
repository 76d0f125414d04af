pub mod telegram;
pub mod telegram_fmt;
pub mod traits;

pub use telegram::{OnMessageFn, TelegramChannel, TelegramSender, parse_webhook_update};
pub use traits::{ChannelLifecycle, ChannelSender, ChannelStatus};
