pub mod dispatcher;
pub mod menus;
pub mod referral;
pub mod session;

pub use dispatcher::Dispatcher;
pub use referral::ReferralMap;
pub use session::SessionTracker;
