use crate::models::qr_code::QrType;
use crate::structs::qr_request::QrFields;

fn field(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

/// Build the string that gets encoded into the QR image for `qr_type`.
pub fn build_content(qr_type: QrType, fields: &QrFields) -> String {
    match qr_type {
        QrType::Url => field(&fields.url).to_string(),
        QrType::Text => field(&fields.text).to_string(),
        QrType::Email => {
            let mut content = format!("mailto:{}", field(&fields.email));
            let subject = field(&fields.subject);
            if !subject.is_empty() {
                content.push_str(&format!("?subject={}", urlencoding::encode(subject)));
            }
            // `&body` even without a subject; mail clients accept it
            let message = field(&fields.message);
            if !message.is_empty() {
                content.push_str(&format!("&body={}", urlencoding::encode(message)));
            }
            content
        }
        QrType::Phone => format!("tel:{}", field(&fields.phone)),
        QrType::Sms => {
            let mut content = format!("sms:{}", field(&fields.phone));
            let message = field(&fields.message);
            if !message.is_empty() {
                content.push_str(&format!("&body={}", urlencoding::encode(message)));
            }
            content
        }
        QrType::Wifi => format!(
            "WIFI:T:{};S:{};P:{};;",
            fields.wifi_security.unwrap_or_default().as_str(),
            field(&fields.wifi_ssid),
            field(&fields.wifi_password),
        ),
    }
}

/// Default title when the user leaves it blank, e.g. "URL QR Code".
pub fn default_title(qr_type: QrType) -> String {
    format!("{} QR Code", qr_type.to_string().to_uppercase())
}
