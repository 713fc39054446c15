use std::error::Error;

use clap::Parser;
use dotenvy::dotenv;
use tokio::sync::mpsc;

use contact_saver_bot::bot::{Dispatcher, ReferralMap};
use contact_saver_bot::config;
use contact_saver_bot::health;
use contact_saver_bot::storage::ContactStore;
use contact_saver_bot::transport::{TelegramApi, UpdatePoller};

#[derive(Parser)]
#[command(
    name = "contact_saver_bot",
    version,
    about = "Consent-first Telegram contact saver bot"
)]
struct Cli {
    /// Path to JSON config file
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH, value_name = "FILE")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    let app_config = config::load_config(&cli.config);
    if app_config.bot_token.is_empty() {
        return Err("BOT_TOKEN is not configured".into());
    }
    if app_config.admin_id == 0 {
        return Err("ADMIN_ID is not configured".into());
    }

    let api = TelegramApi::new(&app_config.bot_token)?;
    let bot_handle = api.bot_handle().await?;
    log::info!("Authorized as @{bot_handle}");

    let contacts = ContactStore::open(&app_config.contact_file)?;
    log::info!(
        "Loaded {} contact(s) from {}",
        contacts.len(),
        app_config.contact_file
    );
    let referrals = ReferralMap::load(&app_config.referral_file);

    // Transport -> dispatcher channel; the dispatcher drains it sequentially.
    let (event_tx, event_rx) = mpsc::channel(100);

    tokio::spawn(health::serve(app_config.health_port));
    tokio::spawn(UpdatePoller::new(api.clone(), event_tx).run());

    Dispatcher::new(
        api,
        event_rx,
        contacts,
        referrals,
        app_config.admin_id,
        bot_handle,
    )
    .run()
    .await;

    Ok(())
}
