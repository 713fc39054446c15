use crate::common::types::SharedContact;

/// Normalized inbound event handed from the transport layer to the dispatcher.
#[derive(Debug, Clone)]
pub struct InboundEvent {
    pub sender_id: i64,
    pub chat_id: i64,
    pub message_id: i64,
    pub sender_name: Option<String>,
    pub sender_username: Option<String>,
    pub text: Option<String>,
    pub contact: Option<SharedContact>,
}
