use async_trait::async_trait;
use thiserror::Error;

use crate::models::qr_code::{QrRecord, QrUpdate};
use crate::models::scan::ScanRecord;
use crate::models::user::User;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("Duplicate key: {0}")]
    Duplicate(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// QR records and their scan history.
#[async_trait]
pub trait QrStore: Send + Sync {
    /// Appends a scan with a server-assigned timestamp. Does not check that
    /// the parent record exists.
    async fn add_scan_record(&self, qr_id: &str) -> Result<(), StoreError>;

    /// Atomically adds `delta` to the record's scan counter. A missing record
    /// is a no-op.
    async fn increment_scan_counter(&self, qr_id: &str, delta: i64) -> Result<(), StoreError>;

    async fn get_record(&self, qr_id: &str) -> Result<Option<QrRecord>, StoreError>;

    /// Returns false when no record matched.
    async fn update_record(&self, qr_id: &str, update: QrUpdate) -> Result<bool, StoreError>;

    /// Inserts the record under a freshly assigned id and returns it.
    async fn create_record(&self, record: QrRecord) -> Result<QrRecord, StoreError>;

    /// Newest first. `None` lists every owner's records.
    async fn list_records(&self, owner: Option<&str>) -> Result<Vec<QrRecord>, StoreError>;

    /// Deletes the record together with its scans.
    async fn delete_record(&self, qr_id: &str) -> Result<bool, StoreError>;

    async fn delete_records_by_user(&self, user_id: &str) -> Result<u64, StoreError>;

    /// Newest first.
    async fn list_scans(&self, qr_id: &str) -> Result<Vec<ScanRecord>, StoreError>;

    async fn list_scans_for(&self, qr_ids: &[String]) -> Result<Vec<ScanRecord>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `StoreError::Duplicate` when the username is taken.
    async fn create_user(&self, user: User) -> Result<User, StoreError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    async fn get_user(&self, user_id: &str) -> Result<Option<User>, StoreError>;

    /// Newest first.
    async fn list_users(&self) -> Result<Vec<User>, StoreError>;

    async fn count_users(&self) -> Result<u64, StoreError>;

    async fn set_admin(&self, user_id: &str, is_admin: bool) -> Result<bool, StoreError>;

    async fn touch_last_login(&self, user_id: &str, at: i64) -> Result<(), StoreError>;

    async fn delete_user(&self, user_id: &str) -> Result<bool, StoreError>;
}
