use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use serde_json::json;

use crate::common::SharedContact;

use super::api::{SendOptions, Transport, TransportError};

/// Long-poll wait passed to getUpdates, in seconds.
pub const POLL_TIMEOUT_SECS: u64 = 30;

/// reqwest-based client for the Telegram Bot API.
#[derive(Clone)]
pub struct TelegramApi {
    http: reqwest::Client,
    base_url: String,
}

/// Envelope every Bot API response arrives in.
#[derive(Debug, Deserialize)]
struct ApiReply<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    message_id: i64,
}

#[derive(Debug, Deserialize)]
struct BotProfile {
    username: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<IncomingMessage>,
}

#[derive(Debug, Deserialize)]
pub struct IncomingMessage {
    pub message_id: i64,
    pub from: Option<Sender>,
    pub chat: Chat,
    pub text: Option<String>,
    pub contact: Option<SharedContact>,
}

#[derive(Debug, Deserialize)]
pub struct Sender {
    pub id: i64,
    pub first_name: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
}

impl TelegramApi {
    pub fn new(token: &str) -> Result<Self, TransportError> {
        // The client timeout must outlive the long-poll wait.
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(POLL_TIMEOUT_SECS + 15))
            .build()?;
        Ok(Self {
            http,
            base_url: format!("https://api.telegram.org/bot{token}"),
        })
    }

    async fn call<T>(&self, method: &str, params: serde_json::Value) -> Result<T, TransportError>
    where
        T: serde::de::DeserializeOwned,
    {
        let reply: ApiReply<T> = self
            .http
            .post(format!("{}/{method}", self.base_url))
            .json(&params)
            .send()
            .await?
            .json()
            .await?;
        match reply {
            ApiReply {
                ok: true,
                result: Some(result),
                ..
            } => Ok(result),
            ApiReply { description, .. } => Err(TransportError::Api(
                description.unwrap_or_else(|| format!("{method} returned no result")),
            )),
        }
    }

    /// Resolve the bot's public handle.
    pub async fn bot_handle(&self) -> Result<String, TransportError> {
        let me: BotProfile = self.call("getMe", json!({})).await?;
        me.username
            .ok_or_else(|| TransportError::Api("bot has no username".to_string()))
    }

    /// Long-poll the next batch of updates starting at `offset`.
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>, TransportError> {
        self.call(
            "getUpdates",
            json!({
                "offset": offset,
                "timeout": POLL_TIMEOUT_SECS,
                "limit": 50,
                "allowed_updates": ["message"],
            }),
        )
        .await
    }
}

impl Transport for TelegramApi {
    async fn send_text(
        &self,
        chat_id: i64,
        text: String,
        opts: SendOptions,
    ) -> Result<i64, TransportError> {
        let mut params = json!({ "chat_id": chat_id, "text": text });
        if opts.markdown {
            params["parse_mode"] = json!("Markdown");
        }
        if opts.disable_web_preview {
            params["disable_web_page_preview"] = json!(true);
        }
        if let Some(keyboard) = &opts.keyboard {
            params["reply_markup"] = serde_json::to_value(keyboard)
                .map_err(|err| TransportError::Api(err.to_string()))?;
        }
        let sent: SentMessage = self.call("sendMessage", params).await?;
        Ok(sent.message_id)
    }

    async fn send_document(
        &self,
        chat_id: i64,
        path: PathBuf,
        filename: String,
    ) -> Result<(), TransportError> {
        let bytes = tokio::fs::read(&path).await?;
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(filename)
            .mime_str("text/csv")?;
        let form = reqwest::multipart::Form::new()
            .text("chat_id", chat_id.to_string())
            .part("document", part);
        let reply: ApiReply<serde_json::Value> = self
            .http
            .post(format!("{}/sendDocument", self.base_url))
            .multipart(form)
            .send()
            .await?
            .json()
            .await?;
        if reply.ok {
            Ok(())
        } else {
            Err(TransportError::Api(
                reply
                    .description
                    .unwrap_or_else(|| "sendDocument failed".to_string()),
            ))
        }
    }

    async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<(), TransportError> {
        // deleteMessage returns a bare boolean result.
        let _: bool = self
            .call(
                "deleteMessage",
                json!({ "chat_id": chat_id, "message_id": message_id }),
            )
            .await?;
        Ok(())
    }

    fn delete_after(&self, chat_id: i64, message_id: i64, delay: Duration) {
        let api = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(err) = api.delete_message(chat_id, message_id).await {
                log::debug!("Scheduled delete of {message_id} in chat {chat_id} failed: {err}");
            }
        });
    }
}
