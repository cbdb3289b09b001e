use std::sync::Arc;

use crate::config::Config;
use crate::db::store::{QrStore, UserStore};

/// Shared by every worker; the stores are injected so tests can swap them.
pub struct AppState {
    pub qr_store: Arc<dyn QrStore>,
    pub user_store: Arc<dyn UserStore>,
    pub config: Config,
}
