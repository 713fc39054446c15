use std::time::Duration;

use tokio::sync::mpsc;

use crate::common::InboundEvent;

use super::telegram::{TelegramApi, Update};

const POLL_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Long-poll loop feeding normalized events into the dispatcher channel.
pub struct UpdatePoller {
    api: TelegramApi,
    event_sender: mpsc::Sender<InboundEvent>,
}

impl UpdatePoller {
    pub fn new(api: TelegramApi, event_sender: mpsc::Sender<InboundEvent>) -> Self {
        Self { api, event_sender }
    }

    pub async fn run(self) {
        let mut offset = 0i64;
        log::info!("Update poller started");
        loop {
            let updates = match self.api.get_updates(offset).await {
                Ok(updates) => updates,
                Err(err) => {
                    log::warn!("getUpdates failed: {err}");
                    tokio::time::sleep(POLL_RETRY_DELAY).await;
                    continue;
                }
            };
            for update in updates {
                offset = offset.max(update.update_id + 1);
                let Some(event) = normalize(update) else {
                    continue;
                };
                if self.event_sender.send(event).await.is_err() {
                    log::info!("Dispatcher channel closed; stopping poller");
                    return;
                }
            }
        }
    }
}

/// Map a raw update onto the dispatcher's event shape. Updates without a
/// message or a sender carry nothing the dispatcher routes on.
fn normalize(update: Update) -> Option<InboundEvent> {
    let message = update.message?;
    let sender = message.from?;
    Some(InboundEvent {
        sender_id: sender.id,
        chat_id: message.chat.id,
        message_id: message.message_id,
        sender_name: sender.first_name,
        sender_username: sender.username,
        text: message.text,
        contact: message.contact,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_maps_contact_payload() {
        let update: Update = serde_json::from_value(serde_json::json!({
            "update_id": 10,
            "message": {
                "message_id": 77,
                "from": { "id": 7, "first_name": "Alice", "username": "alice" },
                "chat": { "id": 7 },
                "contact": { "phone_number": "+911234567890", "first_name": "Alice" }
            }
        }))
        .unwrap();

        let event = normalize(update).unwrap();
        assert_eq!(event.sender_id, 7);
        assert_eq!(event.message_id, 77);
        assert_eq!(event.text, None);
        assert_eq!(event.contact.unwrap().phone_number, "+911234567890");
    }

    #[test]
    fn normalize_drops_senderless_updates() {
        let update: Update = serde_json::from_value(serde_json::json!({
            "update_id": 11,
            "message": { "message_id": 78, "chat": { "id": 9 }, "text": "hi" }
        }))
        .unwrap();

        assert!(normalize(update).is_none());
    }
}
