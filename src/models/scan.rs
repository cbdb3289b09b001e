use serde::{Deserialize, Serialize};

/// One observed scan of a QR code. Never updated after insert.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ScanRecord {
    pub id: String,
    pub qr_id: String,  // Owning QR record
    pub timestamp: i64, // Server-assigned, milliseconds since epoch
}
