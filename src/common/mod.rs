pub mod commands;
pub mod events;
pub mod types;

pub use commands::MenuAction;
pub use events::InboundEvent;
pub use types::{SessionMode, SharedContact};
