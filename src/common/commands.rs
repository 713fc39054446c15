/// Fixed menu labels, routed by exact string equality.
pub const LABEL_ALL_CONTACTS: &str = "📋 All Contacts";
pub const LABEL_GET_LINK: &str = "📤 Get Your Link";
pub const LABEL_CHECK_DETAILS: &str = "🔍 Check Details";
pub const LABEL_BROADCAST: &str = "📢 Broadcast Message";
pub const LABEL_EXPORT_CSV: &str = "📦 Export CSV";

/// Menu selection decoded from a message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    AllContacts,
    GetLink,
    CheckDetails,
    Broadcast,
    ExportCsv,
}

impl MenuAction {
    pub fn from_label(text: &str) -> Option<Self> {
        match text {
            LABEL_ALL_CONTACTS => Some(Self::AllContacts),
            LABEL_GET_LINK => Some(Self::GetLink),
            LABEL_CHECK_DETAILS => Some(Self::CheckDetails),
            LABEL_BROADCAST => Some(Self::Broadcast),
            LABEL_EXPORT_CSV => Some(Self::ExportCsv),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip() {
        assert_eq!(
            MenuAction::from_label(LABEL_BROADCAST),
            Some(MenuAction::Broadcast)
        );
        assert_eq!(MenuAction::from_label("Broadcast Message"), None);
        assert_eq!(MenuAction::from_label(""), None);
    }
}
