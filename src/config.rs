use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "config/bot.json";

/// Runtime configuration: JSON file with defaults, environment overrides
/// for anything secret or deployment-specific.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub bot_token: String,
    #[serde(default)]
    pub admin_id: i64,
    #[serde(default = "default_contact_file")]
    pub contact_file: String,
    #[serde(default = "default_referral_file")]
    pub referral_file: String,
    #[serde(default = "default_health_port")]
    pub health_port: u16,
}

fn default_contact_file() -> String {
    "data/contacts.csv".to_string()
}

fn default_referral_file() -> String {
    "data/referrals.json".to_string()
}

fn default_health_port() -> u16 {
    3000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            admin_id: 0,
            contact_file: default_contact_file(),
            referral_file: default_referral_file(),
            health_port: default_health_port(),
        }
    }
}

pub fn load_config(path: &str) -> AppConfig {
    let path = Path::new(path);
    let mut config = match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Failed to parse config file {}: {err}", path.display());
                AppConfig::default()
            }
        },
        Err(err) => {
            log::info!(
                "Config file {} not found ({err}); using defaults",
                path.display()
            );
            AppConfig::default()
        }
    };

    if let Ok(token) = env::var("BOT_TOKEN") {
        config.bot_token = token;
    }
    if let Ok(admin) = env::var("ADMIN_ID") {
        match admin.parse() {
            Ok(id) => config.admin_id = id,
            Err(err) => log::warn!("Ignoring invalid ADMIN_ID: {err}"),
        }
    }
    if let Ok(port) = env::var("PORT") {
        match port.parse() {
            Ok(port) => config.health_port = port,
            Err(err) => log::warn!("Ignoring invalid PORT: {err}"),
        }
    }

    config
}
