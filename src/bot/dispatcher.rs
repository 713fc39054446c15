use std::time::Duration;

use chrono::{FixedOffset, Utc};
use regex::Regex;
use tokio::sync::mpsc;

use crate::common::{InboundEvent, MenuAction, SessionMode, SharedContact};
use crate::storage::models::NO_USERNAME;
use crate::storage::{ContactRecord, ContactStore};
use crate::transport::{SendOptions, Transport};

use super::menus;
use super::referral::ReferralMap;
use super::session::SessionTracker;

/// Marker prefixing the referrer identity in a start-command argument.
pub const REFERRAL_PREFIX: &str = "ref_";

/// Flush threshold for multi-message listings.
pub const SAFE_MESSAGE_LEN: usize = 3500;

/// Delay before the courtesy delete of a shared contact card.
const CONTACT_CLEANUP_DELAY: Duration = Duration::from_secs(1);

/// Lifetime of a referral-link message in a non-admin chat.
const LINK_MESSAGE_TTL: Duration = Duration::from_secs(30);

/// IST (UTC+05:30), the fixed timezone verification timestamps use.
fn verification_timezone() -> FixedOffset {
    FixedOffset::east_opt(5 * 3600 + 30 * 60).expect("static offset is in range")
}

/// Routes each inbound event to exactly one handler.
///
/// Precedence: armed session mode, start command, shared contact, menu
/// label, drop. The loop is strictly sequential; the only work it spawns
/// is the scheduled message deletions behind [`Transport::delete_after`].
pub struct Dispatcher<T: Transport> {
    transport: T,
    event_receiver: mpsc::Receiver<InboundEvent>,
    contacts: ContactStore,
    referrals: ReferralMap,
    sessions: SessionTracker,
    admin_id: i64,
    bot_handle: String,
    start_pattern: Regex,
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(
        transport: T,
        event_receiver: mpsc::Receiver<InboundEvent>,
        contacts: ContactStore,
        referrals: ReferralMap,
        admin_id: i64,
        bot_handle: String,
    ) -> Self {
        let start_pattern = Regex::new(r"^/start(?:\s+(.+))?$").expect("start pattern is valid");
        Self {
            transport,
            event_receiver,
            contacts,
            referrals,
            sessions: SessionTracker::new(),
            admin_id,
            bot_handle,
            start_pattern,
        }
    }

    /// Drain the event channel until every producer hangs up.
    pub async fn run(mut self) {
        log::info!("Dispatcher started (admin id {})", self.admin_id);
        while let Some(event) = self.event_receiver.recv().await {
            self.dispatch(event).await;
        }
        log::info!("Event channel closed; dispatcher stopping");
    }

    async fn dispatch(&mut self, event: InboundEvent) {
        let text = event.text.as_deref().map(str::trim).unwrap_or_default();

        // 1. An armed session mode claims the next non-empty text,
        //    whatever it says.
        if !text.is_empty() {
            match self.sessions.consume(event.sender_id) {
                SessionMode::AwaitingBroadcast => return self.run_broadcast(text).await,
                SessionMode::AwaitingSearch => return self.run_search(text).await,
                SessionMode::None => {}
            }
        }

        // 2. Start command, with optional referral argument.
        if let Some(captures) = self.start_pattern.captures(text) {
            let arg = captures.get(1).map(|m| m.as_str().trim().to_string());
            return self.handle_start(&event, arg.as_deref()).await;
        }

        // 3. A shared contact card completes verification.
        if let Some(contact) = event.contact.clone() {
            return self.handle_contact(&event, contact).await;
        }

        // 4. Fixed menu labels.
        if let Some(action) = MenuAction::from_label(text) {
            return self.handle_menu(&event, action).await;
        }

        log::debug!("Dropping unhandled event from {}", event.sender_id);
    }

    /// Send a text message, logging (not propagating) delivery failures.
    async fn send(&self, chat_id: i64, text: String, opts: SendOptions) -> Option<i64> {
        match self.transport.send_text(chat_id, text, opts).await {
            Ok(message_id) => Some(message_id),
            Err(err) => {
                log::warn!("Failed to send message to {chat_id}: {err}");
                None
            }
        }
    }

    async fn handle_start(&mut self, event: &InboundEvent, arg: Option<&str>) {
        let referrer = arg
            .and_then(|arg| arg.strip_prefix(REFERRAL_PREFIX))
            .filter(|id| !id.is_empty());
        if let Some(referrer) = referrer {
            self.referrals.insert(event.sender_id, referrer);
        }

        if event.sender_id == self.admin_id {
            let opts = SendOptions {
                keyboard: Some(menus::admin_menu()),
                ..Default::default()
            };
            self.send(event.chat_id, "👑 Welcome, Admin 👑".to_string(), opts)
                .await;
            return;
        }

        if self.contacts.exists(&event.sender_id.to_string()) {
            let opts = SendOptions {
                keyboard: Some(menus::get_link_menu()),
                ..Default::default()
            };
            self.send(event.chat_id, "✅ You are already verified.".to_string(), opts)
                .await;
            return;
        }

        let mut text =
            String::from("👋 *Welcome!*\n\nThis bot saves your contact so the admin can reach you.\n");
        if let Some(referrer) = self.referrals.get(event.sender_id) {
            text.push_str(&format!("📨 Invited by user ID: `{referrer}`\n"));
        }
        text.push_str("\nPress *Verify Human✅* to share your contact.\n\nWe respect your privacy.");
        let opts = SendOptions {
            markdown: true,
            keyboard: Some(menus::request_contact_menu()),
            ..Default::default()
        };
        self.send(event.chat_id, text, opts).await;
    }

    async fn handle_contact(&mut self, event: &InboundEvent, contact: SharedContact) {
        // Courtesy cleanup of the raw contact card.
        self.transport
            .delete_after(event.chat_id, event.message_id, CONTACT_CLEANUP_DELAY);

        let chat_key = event.sender_id.to_string();
        if self.contacts.exists(&chat_key) {
            let opts = SendOptions {
                keyboard: Some(menus::get_link_menu()),
                ..Default::default()
            };
            self.send(event.chat_id, "ℹ️ Already saved.".to_string(), opts)
                .await;
            return;
        }

        let now = Utc::now().with_timezone(&verification_timezone());
        let record = ContactRecord {
            name: event
                .sender_name
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
            phone: contact.phone_number,
            username: event
                .sender_username
                .as_ref()
                .map(|handle| format!("@{handle}"))
                .unwrap_or_else(|| NO_USERNAME.to_string()),
            chat_id: chat_key.clone(),
            day: now.format("%A").to_string(),
            time: now.format("%I:%M %p").to_string(),
            referrer: self.referrals.get(event.sender_id).map(str::to_string),
        };

        if let Err(err) = self.contacts.append(record.clone()) {
            log::error!("Failed to persist contact for {chat_key}: {err}");
            self.send(
                self.admin_id,
                format!("⚠️ Failed to save contact {chat_key}: {err}"),
                SendOptions::default(),
            )
            .await;
            return;
        }

        self.send(
            event.chat_id,
            "✅ Human verification successful!".to_string(),
            SendOptions::default(),
        )
        .await;
        self.send(
            self.admin_id,
            record.render_admin_notification(),
            SendOptions {
                markdown: true,
                ..Default::default()
            },
        )
        .await;

        self.notify_referrer(&record).await;
        self.referrals.remove(event.sender_id);

        let opts = SendOptions {
            keyboard: Some(menus::get_link_menu()),
            ..Default::default()
        };
        self.send(
            event.chat_id,
            "📤 Now you can generate your invite link.".to_string(),
            opts,
        )
        .await;
    }

    /// Best-effort "your link was used" message; never aborts the workflow.
    async fn notify_referrer(&self, record: &ContactRecord) {
        let Some(referrer) = record.referrer.as_deref() else {
            return;
        };
        if referrer == record.chat_id {
            return;
        }
        let Ok(referrer_chat) = referrer.parse::<i64>() else {
            log::warn!("Referrer id {referrer} is not a chat id; skipping notification");
            return;
        };
        self.send(
            referrer_chat,
            record.render_referrer_notification(),
            SendOptions {
                markdown: true,
                ..Default::default()
            },
        )
        .await;
    }

    async fn handle_menu(&mut self, event: &InboundEvent, action: MenuAction) {
        match action {
            // Available to everyone; the rest is privileged.
            MenuAction::GetLink => self.send_referral_link(event).await,
            _ if event.sender_id != self.admin_id => {}
            MenuAction::AllContacts => self.list_contacts().await,
            MenuAction::ExportCsv => self.export_contacts().await,
            MenuAction::CheckDetails => {
                self.send(
                    self.admin_id,
                    "🆔 Send a user ID, username or phone number:".to_string(),
                    SendOptions::default(),
                )
                .await;
                self.sessions.arm(event.sender_id, SessionMode::AwaitingSearch);
            }
            MenuAction::Broadcast => {
                self.send(
                    self.admin_id,
                    "📝 Type the broadcast message:".to_string(),
                    SendOptions::default(),
                )
                .await;
                self.sessions
                    .arm(event.sender_id, SessionMode::AwaitingBroadcast);
            }
        }
    }

    async fn send_referral_link(&self, event: &InboundEvent) {
        let link = format!(
            "https://t.me/{}?start={}{}",
            self.bot_handle, REFERRAL_PREFIX, event.sender_id
        );
        let text = format!(
            "🔗 *Your Referral Link:*\n[{link}]({link})\n\n_This message will auto-delete in 30s._"
        );
        let opts = SendOptions {
            markdown: true,
            disable_web_preview: true,
            ..Default::default()
        };
        let Some(message_id) = self.send(event.chat_id, text, opts).await else {
            return;
        };
        if event.sender_id != self.admin_id {
            self.transport
                .delete_after(event.chat_id, message_id, LINK_MESSAGE_TTL);
        }
    }

    async fn list_contacts(&self) {
        if self.contacts.is_empty() {
            self.send(
                self.admin_id,
                "⚠️ No contacts found.".to_string(),
                SendOptions::default(),
            )
            .await;
            return;
        }
        for chunk in render_contact_chunks(self.contacts.all(), SAFE_MESSAGE_LEN) {
            self.send(
                self.admin_id,
                chunk,
                SendOptions {
                    markdown: true,
                    ..Default::default()
                },
            )
            .await;
        }
    }

    async fn export_contacts(&self) {
        let path = self.contacts.path().to_path_buf();
        if !path.exists() {
            self.send(
                self.admin_id,
                "⚠️ contacts.csv file missing.".to_string(),
                SendOptions::default(),
            )
            .await;
            return;
        }
        if let Err(err) = self
            .transport
            .send_document(self.admin_id, path, "contacts_export.csv".to_string())
            .await
        {
            log::error!("CSV export failed: {err}");
            self.send(
                self.admin_id,
                "❌ Export failed.".to_string(),
                SendOptions::default(),
            )
            .await;
        }
    }

    async fn run_broadcast(&mut self, text: &str) {
        self.send(
            self.admin_id,
            format!("📤 Sending broadcast to {} users...", self.contacts.len()),
            SendOptions::default(),
        )
        .await;

        let body = format!("📢 *Admin Broadcast:*\n{text}");
        let recipients: Vec<i64> = self
            .contacts
            .all()
            .iter()
            .filter_map(|record| record.chat_id.parse().ok())
            .collect();
        for chat_id in recipients {
            // Per-recipient failures are logged inside send and skipped.
            self.send(
                chat_id,
                body.clone(),
                SendOptions {
                    markdown: true,
                    ..Default::default()
                },
            )
            .await;
        }

        self.send(
            self.admin_id,
            "✅ Broadcast sent successfully.".to_string(),
            SendOptions::default(),
        )
        .await;
    }

    async fn run_search(&mut self, query: &str) {
        let query = normalize_query(query);
        let mut found = false;
        for record in self.contacts.all() {
            if record_matches(record, &query) {
                found = true;
                self.send(
                    self.admin_id,
                    record.render_details(),
                    SendOptions {
                        markdown: true,
                        ..Default::default()
                    },
                )
                .await;
            }
        }
        if !found {
            self.send(
                self.admin_id,
                "❌ No record found.".to_string(),
                SendOptions::default(),
            )
            .await;
        }
    }
}

/// Trim, drop one leading `@`, case-fold.
fn normalize_query(raw: &str) -> String {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix('@').unwrap_or(trimmed);
    trimmed.to_lowercase()
}

/// Identity match on chat id, substring match on phone or handle.
fn record_matches(record: &ContactRecord, query: &str) -> bool {
    let handle = record.username.trim_start_matches('@').to_lowercase();
    record.chat_id == query || record.phone.contains(query) || handle.contains(query)
}

/// Render all records as numbered entries, split so no chunk exceeds
/// `limit`. Concatenating the chunks reproduces the single-message
/// rendering.
pub fn render_contact_chunks(records: &[ContactRecord], limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = format!("📋 *Total Contacts:* {}\n\n", records.len());
    for (index, record) in records.iter().enumerate() {
        let entry = record.render_entry(index + 1);
        if current.len() + entry.len() > limit && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
        }
        current.push_str(&entry);
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(index: usize) -> ContactRecord {
        ContactRecord {
            name: format!("User {index}"),
            phone: format!("+91987654{index:04}"),
            username: format!("@user{index}"),
            chat_id: format!("{index}"),
            day: "Tuesday".to_string(),
            time: "11:30 AM".to_string(),
            referrer: None,
        }
    }

    #[test]
    fn query_normalization_strips_one_leading_at() {
        assert_eq!(normalize_query("  @Alice "), "alice");
        assert_eq!(normalize_query("@@alice"), "@alice");
        assert_eq!(normalize_query("987"), "987");
    }

    #[test]
    fn matching_covers_id_phone_and_handle() {
        let record = record(7);
        assert!(record_matches(&record, "7"));
        assert!(record_matches(&record, "9876"));
        assert!(record_matches(&record, "user7"));
        assert!(!record_matches(&record, "nobody"));
    }

    #[test]
    fn chat_id_requires_exact_match() {
        let record = ContactRecord {
            name: "Bob".to_string(),
            phone: "+911111".to_string(),
            username: "@someone".to_string(),
            chat_id: "70".to_string(),
            day: "Friday".to_string(),
            time: "01:00 PM".to_string(),
            referrer: None,
        };
        assert!(!record_matches(&record, "7"));
        assert!(record_matches(&record, "70"));
    }

    #[test]
    fn small_listing_stays_in_one_message() {
        let records: Vec<ContactRecord> = (1..=3).map(record).collect();
        let chunks = render_contact_chunks(&records, SAFE_MESSAGE_LEN);
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].starts_with("📋 *Total Contacts:* 3"));
    }

    #[test]
    fn oversized_listing_splits_without_losing_content() {
        let records: Vec<ContactRecord> = (1..=50).map(record).collect();

        let single = render_contact_chunks(&records, usize::MAX).concat();
        let chunks = render_contact_chunks(&records, 500);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.len() <= 500);
        }
        assert_eq!(chunks.concat(), single);
    }
}
