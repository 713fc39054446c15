use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("api error: {0}")]
    Api(String),
}

/// Reply keyboard in the platform wire format.
#[derive(Debug, Clone, Serialize)]
pub struct ReplyKeyboard {
    pub keyboard: Vec<Vec<KeyboardButton>>,
    pub resize_keyboard: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct KeyboardButton {
    pub text: String,
    pub request_contact: bool,
}

/// Options attached to an outbound text message.
#[derive(Debug, Clone, Default)]
pub struct SendOptions {
    pub markdown: bool,
    pub keyboard: Option<ReplyKeyboard>,
    pub disable_web_preview: bool,
}

/// Outbound actions the bot core needs from the platform.
///
/// Implementations must be cheap to clone; scheduled deletions run on
/// their own tasks and never block the caller.
pub trait Transport: Clone + Send + Sync + 'static {
    /// Send a text message, returning the platform message id.
    fn send_text(
        &self,
        chat_id: i64,
        text: String,
        opts: SendOptions,
    ) -> impl Future<Output = Result<i64, TransportError>> + Send;

    /// Send a local file as a document attachment.
    fn send_document(
        &self,
        chat_id: i64,
        path: PathBuf,
        filename: String,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Best-effort message deletion.
    fn delete_message(
        &self,
        chat_id: i64,
        message_id: i64,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Schedule a best-effort deletion after `delay`, without blocking the
    /// caller. Failures are ignored.
    fn delete_after(&self, chat_id: i64, message_id: i64, delay: Duration);
}
