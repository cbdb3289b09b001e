use std::collections::HashMap;

use async_trait::async_trait;
use nanoid::nanoid;
use tokio::sync::RwLock;

use crate::db::store::{QrStore, StoreError, UserStore};
use crate::models::qr_code::{QrRecord, QrUpdate};
use crate::models::scan::ScanRecord;
use crate::models::user::User;

/// Process-local store used for tests and `STORE_BACKEND=memory` development runs.
/// Every mutation happens under a write lock, so increments never lose updates.
#[derive(Default)]
pub struct MemoryStore {
    qr_codes: RwLock<HashMap<String, QrRecord>>,
    scans: RwLock<Vec<ScanRecord>>,
    users: RwLock<HashMap<String, User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record under the id it already carries.
    #[cfg(test)]
    pub async fn insert_record(&self, record: QrRecord) {
        self.qr_codes.write().await.insert(record.id.clone(), record);
    }

    #[cfg(test)]
    pub async fn insert_scan(&self, qr_id: &str, timestamp: i64) {
        self.scans.write().await.push(ScanRecord {
            id: nanoid!(20),
            qr_id: qr_id.to_string(),
            timestamp,
        });
    }

    #[cfg(test)]
    pub async fn scan_count(&self, qr_id: &str) -> usize {
        self.scans
            .read()
            .await
            .iter()
            .filter(|scan| scan.qr_id == qr_id)
            .count()
    }

    #[cfg(test)]
    pub async fn total_scan_documents(&self) -> usize {
        self.scans.read().await.len()
    }
}

fn newest_first(mut scans: Vec<ScanRecord>) -> Vec<ScanRecord> {
    scans.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    scans
}

#[async_trait]
impl QrStore for MemoryStore {
    async fn add_scan_record(&self, qr_id: &str) -> Result<(), StoreError> {
        let scan = ScanRecord {
            id: nanoid!(20),
            qr_id: qr_id.to_string(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        };
        self.scans.write().await.push(scan);
        Ok(())
    }

    async fn increment_scan_counter(&self, qr_id: &str, delta: i64) -> Result<(), StoreError> {
        if let Some(record) = self.qr_codes.write().await.get_mut(qr_id) {
            record.scans += delta;
        }
        Ok(())
    }

    async fn get_record(&self, qr_id: &str) -> Result<Option<QrRecord>, StoreError> {
        Ok(self.qr_codes.read().await.get(qr_id).cloned())
    }

    async fn update_record(&self, qr_id: &str, update: QrUpdate) -> Result<bool, StoreError> {
        match self.qr_codes.write().await.get_mut(qr_id) {
            Some(record) => {
                update.apply(record);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn create_record(&self, mut record: QrRecord) -> Result<QrRecord, StoreError> {
        record.id = nanoid!(20);
        self.qr_codes
            .write()
            .await
            .insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn list_records(&self, owner: Option<&str>) -> Result<Vec<QrRecord>, StoreError> {
        let mut records: Vec<QrRecord> = self
            .qr_codes
            .read()
            .await
            .values()
            .filter(|record| owner.is_none_or(|user_id| record.user_id == user_id))
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    async fn delete_record(&self, qr_id: &str) -> Result<bool, StoreError> {
        let removed = self.qr_codes.write().await.remove(qr_id).is_some();
        self.scans.write().await.retain(|scan| scan.qr_id != qr_id);
        Ok(removed)
    }

    async fn delete_records_by_user(&self, user_id: &str) -> Result<u64, StoreError> {
        let mut qr_codes = self.qr_codes.write().await;
        let ids: Vec<String> = qr_codes
            .values()
            .filter(|record| record.user_id == user_id)
            .map(|record| record.id.clone())
            .collect();

        for id in &ids {
            qr_codes.remove(id);
        }
        self.scans
            .write()
            .await
            .retain(|scan| !ids.contains(&scan.qr_id));
        Ok(ids.len() as u64)
    }

    async fn list_scans(&self, qr_id: &str) -> Result<Vec<ScanRecord>, StoreError> {
        let scans = self
            .scans
            .read()
            .await
            .iter()
            .filter(|scan| scan.qr_id == qr_id)
            .cloned()
            .collect();
        Ok(newest_first(scans))
    }

    async fn list_scans_for(&self, qr_ids: &[String]) -> Result<Vec<ScanRecord>, StoreError> {
        let scans = self
            .scans
            .read()
            .await
            .iter()
            .filter(|scan| qr_ids.contains(&scan.qr_id))
            .cloned()
            .collect();
        Ok(newest_first(scans))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, mut user: User) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.values().any(|existing| existing.username == user.username) {
            return Err(StoreError::Duplicate(user.username));
        }

        user.id = nanoid!(20);
        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(user_id).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    async fn count_users(&self) -> Result<u64, StoreError> {
        Ok(self.users.read().await.len() as u64)
    }

    async fn set_admin(&self, user_id: &str, is_admin: bool) -> Result<bool, StoreError> {
        match self.users.write().await.get_mut(user_id) {
            Some(user) => {
                user.is_admin = is_admin;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn touch_last_login(&self, user_id: &str, at: i64) -> Result<(), StoreError> {
        if let Some(user) = self.users.write().await.get_mut(user_id) {
            user.last_login_at = Some(at);
        }
        Ok(())
    }

    async fn delete_user(&self, user_id: &str) -> Result<bool, StoreError> {
        Ok(self.users.write().await.remove(user_id).is_some())
    }
}
