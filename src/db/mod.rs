pub mod memory;
pub mod mongodb;
pub mod store;

use std::sync::Arc;

use crate::config::{Config, StoreBackend};
use memory::MemoryStore;
use store::{QrStore, StoreError, UserStore};

/// Build the stores selected by `STORE_BACKEND`
pub async fn connect(
    config: &Config,
) -> Result<(Arc<dyn QrStore>, Arc<dyn UserStore>), StoreError> {
    match config.store_backend {
        StoreBackend::Mongo => {
            let db = self::mongodb::get_database(&config.mongodb_uri, &config.database_name).await?;
            let store = Arc::new(self::mongodb::MongoStore::new(db));
            store.init_indexes().await?;
            let qr_store: Arc<dyn QrStore> = store.clone();
            let user_store: Arc<dyn UserStore> = store;
            Ok((qr_store, user_store))
        }
        StoreBackend::Memory => {
            log::warn!("Using the in-memory store; data is lost on restart");
            let store = Arc::new(MemoryStore::new());
            let qr_store: Arc<dyn QrStore> = store.clone();
            let user_store: Arc<dyn UserStore> = store;
            Ok((qr_store, user_store))
        }
    }
}
