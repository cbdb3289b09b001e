use std::sync::Arc;

use actix_web::web;

use crate::config::{Config, StoreBackend, TrackFailurePolicy};
use crate::db::memory::MemoryStore;
use crate::db::store::{QrStore, UserStore};
use crate::models::qr_code::{QrRecord, QrType};
use crate::models::user::User;
use crate::state::app_state::AppState;
use crate::utils::jwt::create_token;

pub const TEST_SECRET: &str = "test-secret";

pub fn test_config(policy: TrackFailurePolicy) -> Config {
    Config {
        bind_addr: "127.0.0.1".to_string(),
        port: 0,
        store_backend: StoreBackend::Memory,
        mongodb_uri: String::new(),
        database_name: "qr_tracker_test".to_string(),
        jwt_secret: TEST_SECRET.to_string(),
        tracking_base_url: "http://scan.test/track/".to_string(),
        fallback_url: "http://home.test".to_string(),
        track_failure_policy: policy,
        cors_origins: Vec::new(),
        superuser_username: Some("root".to_string()),
        superuser_password: Some("root-password".to_string()),
    }
}

pub fn state_with(
    qr_store: Arc<dyn QrStore>,
    user_store: Arc<dyn UserStore>,
    policy: TrackFailurePolicy,
) -> web::Data<AppState> {
    web::Data::new(AppState {
        qr_store,
        user_store,
        config: test_config(policy),
    })
}

pub fn memory_state() -> (web::Data<AppState>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let state = state_with(store.clone(), store.clone(), TrackFailurePolicy::Error);
    (state, store)
}

pub fn sample_record(id: &str, owner: &str, destination: &str, scans: i64) -> QrRecord {
    let mut record = QrRecord::new(
        format!("QR {}", id),
        if destination.is_empty() {
            QrType::Text
        } else {
            QrType::Url
        },
        if destination.is_empty() {
            "plain text".to_string()
        } else {
            destination.to_string()
        },
        destination.to_string(),
        owner.to_string(),
    );
    record.id = id.to_string();
    record.scans = scans;
    record
}

/// Create a user straight in the store and hand back a bearer header value.
pub async fn seed_user(store: &MemoryStore, username: &str, is_admin: bool) -> (User, String) {
    let user = User::new(
        username.to_string(),
        None,
        None,
        None,
        "unused-hash".to_string(),
        is_admin,
    );
    let user = store.create_user(user).await.unwrap();
    let token = create_token(&user, TEST_SECRET).unwrap();
    (user, format!("Bearer {}", token))
}
