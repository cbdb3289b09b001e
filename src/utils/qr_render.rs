use std::io::Cursor;

use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{DynamicImage, ImageFormat, Luma};
use qrcode::QrCode;

const MIN_DIMENSION: u32 = 400;

/// Render `text` as a PNG QR code.
pub fn render_png(text: &str) -> Result<Vec<u8>> {
    let qr_code = QrCode::new(text.as_bytes()).context("QR code generation error")?;

    let image = qr_code
        .render::<Luma<u8>>()
        .min_dimensions(MIN_DIMENSION, MIN_DIMENSION)
        .quiet_zone(true)
        .build();

    let mut bytes = Vec::new();
    DynamicImage::ImageLuma8(image)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .context("PNG encoding error")?;

    Ok(bytes)
}

/// Render `text` as a `data:image/png;base64,...` URL.
pub fn render_data_url(text: &str) -> Result<String> {
    let png = render_png(text)?;
    Ok(format!("data:image/png;base64,{}", STANDARD.encode(png)))
}

/// Decode the PNG bytes back out of a data URL produced by `render_data_url`.
pub fn decode_data_url(data_url: &str) -> Result<Vec<u8>> {
    let encoded = data_url
        .strip_prefix("data:image/png;base64,")
        .context("Not a PNG data URL")?;
    STANDARD.decode(encoded).context("Invalid base64 payload")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_a_png_data_url() {
        let data_url = render_data_url("https://example.com/track/abc123").unwrap();
        assert!(data_url.starts_with("data:image/png;base64,"));

        let png = decode_data_url(&data_url).unwrap();
        let decoded = image::load_from_memory_with_format(&png, ImageFormat::Png).unwrap();
        assert!(decoded.width() >= MIN_DIMENSION);
        assert!(decoded.height() >= MIN_DIMENSION);
    }

    #[test]
    fn rejects_foreign_data_urls() {
        assert!(decode_data_url("data:image/svg+xml;base64,AAAA").is_err());
    }
}
