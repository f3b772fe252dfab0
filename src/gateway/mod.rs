pub mod telegram;

pub use telegram::{BotApi, TelegramGateway};
