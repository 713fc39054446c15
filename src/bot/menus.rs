use crate::common::commands::{
    LABEL_ALL_CONTACTS, LABEL_BROADCAST, LABEL_CHECK_DETAILS, LABEL_EXPORT_CSV, LABEL_GET_LINK,
};
use crate::transport::{KeyboardButton, ReplyKeyboard};

/// Label on the contact-share button shown to unverified visitors.
pub const VERIFY_BUTTON: &str = "Verify Human✅";

fn button(text: &str) -> KeyboardButton {
    KeyboardButton {
        text: text.to_string(),
        request_contact: false,
    }
}

/// Five-item management menu shown to the privileged sender.
pub fn admin_menu() -> ReplyKeyboard {
    ReplyKeyboard {
        keyboard: vec![
            vec![button(LABEL_ALL_CONTACTS)],
            vec![button(LABEL_GET_LINK)],
            vec![button(LABEL_CHECK_DETAILS)],
            vec![button(LABEL_BROADCAST)],
            vec![button(LABEL_EXPORT_CSV)],
        ],
        resize_keyboard: true,
    }
}

/// Single-button menu for verified users.
pub fn get_link_menu() -> ReplyKeyboard {
    ReplyKeyboard {
        keyboard: vec![vec![button(LABEL_GET_LINK)]],
        resize_keyboard: true,
    }
}

/// Contact-share prompt for unverified visitors.
pub fn request_contact_menu() -> ReplyKeyboard {
    ReplyKeyboard {
        keyboard: vec![vec![KeyboardButton {
            text: VERIFY_BUTTON.to_string(),
            request_contact: true,
        }]],
        resize_keyboard: true,
    }
}
