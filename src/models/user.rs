use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub password_hash: String,
    #[serde(default)]
    pub is_admin: bool,
    pub created_at: i64,
    pub last_login_at: Option<i64>,
}

impl User {
    pub fn new(
        username: String,
        email: Option<String>,
        phone_number: Option<String>,
        display_name: Option<String>,
        password_hash: String,
        is_admin: bool,
    ) -> Self {
        Self {
            id: String::new(),
            username,
            email,
            phone_number,
            display_name,
            password_hash,
            is_admin,
            created_at: chrono::Utc::now().timestamp_millis(),
            last_login_at: None,
        }
    }

    /// Logged in within the last `days` days as of `now_ms`.
    pub fn is_active_since(&self, now_ms: i64, days: i64) -> bool {
        match self.last_login_at {
            Some(last) => now_ms - last <= days * 24 * 60 * 60 * 1000,
            None => false,
        }
    }
}
