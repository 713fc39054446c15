pub mod contact_store;
pub mod models;

pub use contact_store::{ContactStore, StoreError};
pub use models::ContactRecord;
