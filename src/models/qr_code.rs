use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct QrRecord {
    #[serde(rename = "_id")]
    pub id: String, // Assigned by the store on creation
    pub title: String,
    pub qr_type: QrType,
    pub content: String,         // What is physically encoded in the image
    pub destination_url: String, // Where a scan redirects; empty for static codes
    #[serde(default)]
    pub scans: i64,
    pub created_at: i64, // Milliseconds since epoch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qr_code_data_url: Option<String>,
    pub user_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum QrType {
    Url,
    Text,
    Email,
    Phone,
    Sms,
    Wifi,
}

impl fmt::Display for QrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QrType::Url => write!(f, "url"),
            QrType::Text => write!(f, "text"),
            QrType::Email => write!(f, "email"),
            QrType::Phone => write!(f, "phone"),
            QrType::Sms => write!(f, "sms"),
            QrType::Wifi => write!(f, "wifi"),
        }
    }
}

impl QrType {
    pub fn parse(value: &str) -> Option<QrType> {
        match value.to_ascii_lowercase().as_str() {
            "url" => Some(QrType::Url),
            "text" => Some(QrType::Text),
            "email" => Some(QrType::Email),
            "phone" => Some(QrType::Phone),
            "sms" => Some(QrType::Sms),
            "wifi" => Some(QrType::Wifi),
            _ => None,
        }
    }

    /// Only URL codes are routed through the tracking redirect.
    pub fn is_trackable(&self) -> bool {
        matches!(self, QrType::Url)
    }
}

impl QrRecord {
    /// Builds an unsaved record; the store replaces `id` on insert.
    pub fn new(
        title: String,
        qr_type: QrType,
        content: String,
        destination_url: String,
        user_id: String,
    ) -> Self {
        Self {
            id: String::new(),
            title,
            qr_type,
            content,
            destination_url,
            scans: 0,
            created_at: chrono::Utc::now().timestamp_millis(),
            updated_at: None,
            qr_code_data_url: None,
            user_id,
        }
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }
}

/// Partial update applied with `$set` semantics. `None` fields are left alone.
#[derive(Debug, Default, Clone)]
pub struct QrUpdate {
    pub destination_url: Option<String>,
    pub content: Option<String>,
    pub qr_code_data_url: Option<String>,
    pub updated_at: Option<i64>,
}

impl QrUpdate {
    pub fn is_empty(&self) -> bool {
        self.destination_url.is_none()
            && self.content.is_none()
            && self.qr_code_data_url.is_none()
            && self.updated_at.is_none()
    }

    pub fn apply(self, record: &mut QrRecord) {
        if let Some(destination_url) = self.destination_url {
            record.destination_url = destination_url;
        }
        if let Some(content) = self.content {
            record.content = content;
        }
        if let Some(data_url) = self.qr_code_data_url {
            record.qr_code_data_url = Some(data_url);
        }
        if let Some(updated_at) = self.updated_at {
            record.updated_at = Some(updated_at);
        }
    }
}
