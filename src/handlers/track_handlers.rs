use actix_web::http::header::{self, ContentType};
use actix_web::{HttpRequest, HttpResponse, web};
use thiserror::Error;

use crate::config::TrackFailurePolicy;
use crate::db::store::{QrStore, StoreError};
use crate::state::app_state::AppState;

#[derive(Debug, Error)]
enum TrackError {
    #[error("QR Code not found")]
    RecordNotFound,

    #[error("Destination URL not found")]
    DestinationMissing,

    #[error(transparent)]
    Backend(#[from] StoreError),
}

/// Record the scan, bump the counter, then look up where to send the caller.
/// Each step is terminal on failure; nothing is retried or rolled back.
async fn record_scan(store: &dyn QrStore, qr_id: &str) -> Result<String, TrackError> {
    store.add_scan_record(qr_id).await?;
    log::info!("[SUCCESS] Added scan record for {}", qr_id);

    // A failure here leaves the scan above uncounted
    store.increment_scan_counter(qr_id, 1).await?;
    log::info!("[SUCCESS] Incremented scan counter for {}", qr_id);

    let record = store
        .get_record(qr_id)
        .await?
        .ok_or(TrackError::RecordNotFound)?;

    if record.destination_url.is_empty() {
        return Err(TrackError::DestinationMissing);
    }

    Ok(record.destination_url)
}

fn redirect(location: &str) -> HttpResponse {
    HttpResponse::TemporaryRedirect()
        .append_header((header::LOCATION, location))
        .finish()
}

fn plain_text(mut builder: actix_web::HttpResponseBuilder, body: &'static str) -> HttpResponse {
    builder.content_type(ContentType::plaintext()).body(body)
}

/// Public scan endpoint: `/track/{qr_id}` and `/api/track/{qr_id}`
pub async fn track_scan(app_state: web::Data<AppState>, req: HttpRequest) -> HttpResponse {
    let qr_id = match req.match_info().get("qr_id") {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => {
            log::error!("QR Code ID is missing from the URL: {}", req.path());
            return plain_text(HttpResponse::BadRequest(), "QR Code ID is missing");
        }
    };

    log::info!("[BEGIN] Processing scan for QR ID: {}", qr_id);

    match record_scan(app_state.qr_store.as_ref(), &qr_id).await {
        Ok(destination_url) => {
            log::info!("[END] Redirecting {} to {}", qr_id, destination_url);
            redirect(&destination_url)
        }
        Err(TrackError::RecordNotFound) => {
            log::error!("QR Code not found after update for ID: {}", qr_id);
            plain_text(HttpResponse::NotFound(), "QR Code not found")
        }
        Err(TrackError::DestinationMissing) => {
            log::error!("Destination URL not found for QR ID: {}", qr_id);
            plain_text(HttpResponse::NotFound(), "Destination URL not found")
        }
        Err(TrackError::Backend(e)) => {
            log::error!(
                "[CRITICAL ERROR] Failed during scan tracking for {}: {}",
                qr_id,
                e
            );
            match app_state.config.track_failure_policy {
                TrackFailurePolicy::Error => {
                    plain_text(HttpResponse::InternalServerError(), "An internal error occurred")
                }
                TrackFailurePolicy::Redirect => redirect(&app_state.config.fallback_url),
            }
        }
    }
}
