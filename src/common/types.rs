use serde::{Deserialize, Serialize};

/// Contact card attached to a message by its sender.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedContact {
    pub phone_number: String,
    #[serde(default)]
    pub first_name: Option<String>,
}

/// What the next free-text message from a sender should be read as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionMode {
    #[default]
    None,
    AwaitingBroadcast,
    AwaitingSearch,
}
