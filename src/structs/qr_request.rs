use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::qr_code::{QrRecord, QrType};

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WifiSecurity {
    #[default]
    #[serde(rename = "WPA")]
    Wpa,
    #[serde(rename = "WEP")]
    Wep,
    #[serde(rename = "nopass")]
    NoPass,
}

impl WifiSecurity {
    pub fn as_str(&self) -> &'static str {
        match self {
            WifiSecurity::Wpa => "WPA",
            WifiSecurity::Wep => "WEP",
            WifiSecurity::NoPass => "nopass",
        }
    }
}

/// Per-type input fields; which ones matter depends on the QR type.
#[derive(Deserialize, Debug, Default, Clone)]
pub struct QrFields {
    pub url: Option<String>,
    pub text: Option<String>,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
    pub phone: Option<String>,
    pub wifi_ssid: Option<String>,
    pub wifi_password: Option<String>,
    pub wifi_security: Option<WifiSecurity>,
}

#[derive(Deserialize, Validate)]
pub struct CreateQrRequest {
    #[validate(length(max = 120, message = "Title is too long"))]
    pub title: Option<String>,
    pub qr_type: QrType,
    #[serde(flatten)]
    pub fields: QrFields,
}

#[derive(Deserialize, Validate)]
pub struct UpdateDestinationRequest {
    #[validate(length(min = 1, message = "Destination URL is required"))]
    pub destination_url: String,
}

/// Query string for the QR listing endpoints
#[derive(Deserialize, Debug, Default)]
pub struct QrListParams {
    pub search: Option<String>,
    #[serde(rename = "type")]
    pub qr_type: Option<String>,
    pub sort: Option<String>,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

#[derive(Deserialize, Debug, Default)]
pub struct PageParams {
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

#[derive(Serialize)]
pub struct QrResponse {
    pub id: String,
    pub title: String,
    pub qr_type: QrType,
    pub content: String,
    pub destination_url: String,
    pub trackable: bool,
    pub scans: i64,
    pub created_at: i64,
    pub updated_at: Option<i64>,
    pub qr_code_data_url: Option<String>,
    pub user_id: String,
}

impl From<QrRecord> for QrResponse {
    fn from(record: QrRecord) -> Self {
        Self {
            trackable: record.qr_type.is_trackable(),
            id: record.id,
            title: record.title,
            qr_type: record.qr_type,
            content: record.content,
            destination_url: record.destination_url,
            scans: record.scans,
            created_at: record.created_at,
            updated_at: record.updated_at,
            qr_code_data_url: record.qr_code_data_url,
            user_id: record.user_id,
        }
    }
}

#[derive(Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
    pub total_pages: usize,
}
