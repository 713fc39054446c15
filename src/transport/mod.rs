pub mod api;
pub mod poller;
pub mod telegram;

pub use api::{KeyboardButton, ReplyKeyboard, SendOptions, Transport, TransportError};
pub use poller::UpdatePoller;
pub use telegram::TelegramApi;
