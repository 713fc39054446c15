/// Sentinel written to the Referrer ID cell when nobody referred the user.
pub const NO_REFERRER: &str = "None";

/// Sentinel used when the sender has no public handle.
pub const NO_USERNAME: &str = "Not Available";

/// One verified contact, as persisted in the CSV store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRecord {
    pub name: String,
    pub phone: String,
    /// `@handle`, or [`NO_USERNAME`] when the sender has none.
    pub username: String,
    pub chat_id: String,
    pub day: String,
    pub time: String,
    pub referrer: Option<String>,
}

impl ContactRecord {
    pub fn referrer_cell(&self) -> &str {
        self.referrer.as_deref().unwrap_or(NO_REFERRER)
    }

    /// Numbered entry used by the contact listing.
    pub fn render_entry(&self, index: usize) -> String {
        format!(
            "{index}) *{}*\n📱 {}\n🔗 {}\n🆔 {}\n📅 {} | {}\n👥 Ref: {}\n\n",
            self.name,
            self.phone,
            self.username,
            self.chat_id,
            self.day,
            self.time,
            self.referrer_cell()
        )
    }

    /// Short card sent once per search hit.
    pub fn render_details(&self) -> String {
        format!(
            "📇 *User Details:*\n👤 {}\n📱 {}\n🔗 {}\n🆔 {}",
            self.name, self.phone, self.username, self.chat_id
        )
    }

    /// Notification sent to the admin when the record is created.
    pub fn render_admin_notification(&self) -> String {
        format!(
            "📩 *New Contact:*\n👤 Name:👉{}\n📱 Phone:👉{}\n🔗 Username:👉{}\n🆔 UserID:👉{}\n📅 {} | 🕒 {}\n👥 Referred by: {}",
            self.name,
            self.phone,
            self.username,
            self.chat_id,
            self.day,
            self.time,
            self.referrer_cell()
        )
    }

    /// Notification sent to whoever's invite link was used.
    pub fn render_referrer_notification(&self) -> String {
        format!(
            "🎉 *Someone used your referral link!*\n\n👤 Name:👉{}\n📱 Phone:👉{}\n🔗 Username:👉{}\n🆔 UserID:👉{}",
            self.name, self.phone, self.username, self.chat_id
        )
    }
}
