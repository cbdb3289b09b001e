use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{DateTime, Document, doc, oid::ObjectId};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, Database, IndexModel};
use serde::{Deserialize, Serialize};

use crate::db::store::{QrStore, StoreError, UserStore};
use crate::models::qr_code::{QrRecord, QrUpdate};
use crate::models::scan::ScanRecord;
use crate::models::user::User;

const QR_CODES: &str = "qr_codes";
const SCANS: &str = "scans";
const USERS: &str = "users";

/// Connect to MongoDB and return the application database
pub async fn get_database(uri: &str, database_name: &str) -> Result<Database, StoreError> {
    let client = Client::with_uri_str(uri).await?;
    let db = client.database(database_name);

    // Fail fast if the server is unreachable
    db.run_command(doc! { "ping": 1 }).await?;
    log::info!("Connected to MongoDB database '{}'", database_name);

    Ok(db)
}

// Scans are written through an upsert so MongoDB itself stamps the time
#[derive(Serialize, Deserialize, Debug)]
struct ScanDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    qr_id: String,
    timestamp: DateTime,
}

impl From<ScanDocument> for ScanRecord {
    fn from(scan: ScanDocument) -> Self {
        Self {
            id: scan.id.to_hex(),
            qr_id: scan.qr_id,
            timestamp: scan.timestamp.timestamp_millis(),
        }
    }
}

#[derive(Clone)]
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn qr_codes(&self) -> Collection<QrRecord> {
        self.db.collection::<QrRecord>(QR_CODES)
    }

    fn scans(&self) -> Collection<ScanDocument> {
        self.db.collection::<ScanDocument>(SCANS)
    }

    fn users(&self) -> Collection<User> {
        self.db.collection::<User>(USERS)
    }

    /// Create the indexes the queries below rely on
    pub async fn init_indexes(&self) -> Result<(), StoreError> {
        self.scans()
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "qr_id": 1, "timestamp": -1 })
                    .build(),
            )
            .await?;

        self.qr_codes()
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "user_id": 1, "created_at": -1 })
                    .build(),
            )
            .await?;

        self.users()
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "username": 1 })
                    .options(IndexOptions::builder().unique(true).build())
                    .build(),
            )
            .await?;

        Ok(())
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == 11000
    )
}

/// `None` when there is nothing to set; Mongo rejects an empty `$set`.
fn update_document(update: QrUpdate) -> Option<Document> {
    if update.is_empty() {
        return None;
    }

    let mut set = Document::new();
    if let Some(destination_url) = update.destination_url {
        set.insert("destination_url", destination_url);
    }
    if let Some(content) = update.content {
        set.insert("content", content);
    }
    if let Some(data_url) = update.qr_code_data_url {
        set.insert("qr_code_data_url", data_url);
    }
    if let Some(updated_at) = update.updated_at {
        set.insert("updated_at", updated_at);
    }
    Some(doc! { "$set": set })
}

#[async_trait]
impl QrStore for MongoStore {
    async fn add_scan_record(&self, qr_id: &str) -> Result<(), StoreError> {
        self.scans()
            .update_one(
                doc! { "_id": ObjectId::new() },
                doc! {
                    "$set": { "qr_id": qr_id },
                    "$currentDate": { "timestamp": true },
                },
            )
            .upsert(true)
            .await?;
        Ok(())
    }

    async fn increment_scan_counter(&self, qr_id: &str, delta: i64) -> Result<(), StoreError> {
        let result = self
            .qr_codes()
            .update_one(doc! { "_id": qr_id }, doc! { "$inc": { "scans": delta } })
            .await?;

        if result.matched_count == 0 {
            log::debug!("Scan counter increment matched no record for {}", qr_id);
        }
        Ok(())
    }

    async fn get_record(&self, qr_id: &str) -> Result<Option<QrRecord>, StoreError> {
        Ok(self.qr_codes().find_one(doc! { "_id": qr_id }).await?)
    }

    async fn update_record(&self, qr_id: &str, update: QrUpdate) -> Result<bool, StoreError> {
        let Some(update) = update_document(update) else {
            return Ok(self.get_record(qr_id).await?.is_some());
        };

        let result = self
            .qr_codes()
            .update_one(doc! { "_id": qr_id }, update)
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn create_record(&self, mut record: QrRecord) -> Result<QrRecord, StoreError> {
        record.id = ObjectId::new().to_hex();
        self.qr_codes().insert_one(&record).await?;
        Ok(record)
    }

    async fn list_records(&self, owner: Option<&str>) -> Result<Vec<QrRecord>, StoreError> {
        let filter = match owner {
            Some(user_id) => doc! { "user_id": user_id },
            None => doc! {},
        };

        let records = self
            .qr_codes()
            .find(filter)
            .sort(doc! { "created_at": -1 })
            .await?
            .try_collect::<Vec<QrRecord>>()
            .await?;
        Ok(records)
    }

    async fn delete_record(&self, qr_id: &str) -> Result<bool, StoreError> {
        let result = self.qr_codes().delete_one(doc! { "_id": qr_id }).await?;
        // Scans go regardless so a half-deleted record leaves no orphans behind
        self.scans().delete_many(doc! { "qr_id": qr_id }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn delete_records_by_user(&self, user_id: &str) -> Result<u64, StoreError> {
        let ids: Vec<String> = self
            .list_records(Some(user_id))
            .await?
            .into_iter()
            .map(|record| record.id)
            .collect();

        if ids.is_empty() {
            return Ok(0);
        }

        self.scans()
            .delete_many(doc! { "qr_id": { "$in": ids.clone() } })
            .await?;
        let result = self
            .qr_codes()
            .delete_many(doc! { "_id": { "$in": ids } })
            .await?;
        Ok(result.deleted_count)
    }

    async fn list_scans(&self, qr_id: &str) -> Result<Vec<ScanRecord>, StoreError> {
        let scans = self
            .scans()
            .find(doc! { "qr_id": qr_id })
            .sort(doc! { "timestamp": -1 })
            .await?
            .try_collect::<Vec<ScanDocument>>()
            .await?;
        Ok(scans.into_iter().map(ScanRecord::from).collect())
    }

    async fn list_scans_for(&self, qr_ids: &[String]) -> Result<Vec<ScanRecord>, StoreError> {
        if qr_ids.is_empty() {
            return Ok(Vec::new());
        }

        let scans = self
            .scans()
            .find(doc! { "qr_id": { "$in": qr_ids.to_vec() } })
            .sort(doc! { "timestamp": -1 })
            .await?
            .try_collect::<Vec<ScanDocument>>()
            .await?;
        Ok(scans.into_iter().map(ScanRecord::from).collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for MongoStore {
    async fn create_user(&self, mut user: User) -> Result<User, StoreError> {
        user.id = ObjectId::new().to_hex();
        match self.users().insert_one(&user).await {
            Ok(_) => Ok(user),
            Err(e) if is_duplicate_key(&e) => Err(StoreError::Duplicate(user.username)),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users()
            .find_one(doc! { "username": username })
            .await?)
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users().find_one(doc! { "_id": user_id }).await?)
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let users = self
            .users()
            .find(doc! {})
            .sort(doc! { "created_at": -1 })
            .await?
            .try_collect::<Vec<User>>()
            .await?;
        Ok(users)
    }

    async fn count_users(&self) -> Result<u64, StoreError> {
        Ok(self.users().count_documents(doc! {}).await?)
    }

    async fn set_admin(&self, user_id: &str, is_admin: bool) -> Result<bool, StoreError> {
        let result = self
            .users()
            .update_one(
                doc! { "_id": user_id },
                doc! { "$set": { "is_admin": is_admin } },
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn touch_last_login(&self, user_id: &str, at: i64) -> Result<(), StoreError> {
        self.users()
            .update_one(
                doc! { "_id": user_id },
                doc! { "$set": { "last_login_at": at } },
            )
            .await?;
        Ok(())
    }

    async fn delete_user(&self, user_id: &str) -> Result<bool, StoreError> {
        let result = self.users().delete_one(doc! { "_id": user_id }).await?;
        Ok(result.deleted_count > 0)
    }
}
