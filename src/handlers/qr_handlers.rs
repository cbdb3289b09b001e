use actix_web::{HttpRequest, HttpResponse, Result, web};
use validator::{Validate, ValidateUrl};

use crate::error::ApiError;
use crate::models::qr_code::{QrRecord, QrUpdate};
use crate::state::app_state::AppState;
use crate::structs::qr_request::{
    CreateQrRequest, PageParams, QrListParams, QrResponse, UpdateDestinationRequest,
};
use crate::utils::jwt::{Claims, current_claims};
use crate::utils::listing::{QR_PAGE_SIZE, SCAN_PAGE_SIZE, filter_and_sort, paginate};
use crate::utils::qr_content::{build_content, default_title};
use crate::utils::qr_render::{decode_data_url, render_data_url};

fn render(text: &str) -> Result<String, ApiError> {
    render_data_url(text).map_err(|e| ApiError::Internal(format!("{:#}", e)))
}

/// Fetch a record the caller may see. Someone else's record looks missing
/// unless the caller is an admin.
async fn load_visible_record(
    app_state: &AppState,
    claims: &Claims,
    qr_id: &str,
) -> Result<QrRecord, ApiError> {
    let record = app_state
        .qr_store
        .get_record(qr_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("QR code not found".to_string()))?;

    if !claims.is_admin && !record.is_owned_by(&claims.sub) {
        return Err(ApiError::NotFound("QR code not found".to_string()));
    }
    Ok(record)
}

async fn attach_tracking_image(
    app_state: &AppState,
    mut record: QrRecord,
) -> Result<QrRecord, ApiError> {
    let data_url = render(&app_state.config.tracking_url(&record.id))?;
    app_state
        .qr_store
        .update_record(
            &record.id,
            QrUpdate {
                qr_code_data_url: Some(data_url.clone()),
                ..Default::default()
            },
        )
        .await?;
    record.qr_code_data_url = Some(data_url);
    Ok(record)
}

/// Header-safe file name for the PNG download
fn download_filename(title: &str) -> String {
    let stem: String = title
        .chars()
        .filter(|c| !c.is_control() && *c != '"' && *c != '\\')
        .collect();
    let stem = stem.trim();
    if stem.is_empty() {
        "qr-code.png".to_string()
    } else {
        format!("{}.png", stem)
    }
}

/// Generate a QR code and save it
pub async fn create_qr(
    app_state: web::Data<AppState>,
    req: HttpRequest,
    web::Json(body): web::Json<CreateQrRequest>,
) -> Result<HttpResponse, ApiError> {
    let claims = current_claims(&req)?;
    body.validate()?;

    let content = build_content(body.qr_type, &body.fields);
    if content.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Please enter content for your QR code".to_string(),
        ));
    }

    let title = body
        .title
        .filter(|title| !title.trim().is_empty())
        .unwrap_or_else(|| default_title(body.qr_type));
    let store = &app_state.qr_store;

    let record = if body.qr_type.is_trackable() {
        if !content.starts_with("http") || !content.validate_url() {
            return Err(ApiError::BadRequest(
                "Please provide a valid destination URL (e.g., https://example.com)".to_string(),
            ));
        }

        // The image encodes the tracking URL, which needs the id first
        let record = store
            .create_record(QrRecord::new(
                title,
                body.qr_type,
                content.clone(),
                content,
                claims.sub,
            ))
            .await?;

        let qr_id = record.id.clone();
        match attach_tracking_image(&app_state, record).await {
            Ok(record) => record,
            Err(e) => {
                if let Err(cleanup) = store.delete_record(&qr_id).await {
                    log::error!("Failed to remove imageless QR code {}: {}", qr_id, cleanup);
                }
                return Err(e);
            }
        }
    } else {
        let data_url = render(&content)?;
        let mut record = QrRecord::new(title, body.qr_type, content, String::new(), claims.sub);
        record.qr_code_data_url = Some(data_url);
        store.create_record(record).await?
    };

    log::info!(
        "Generated {} QR code {} for user {}",
        record.qr_type,
        record.id,
        record.user_id
    );

    Ok(HttpResponse::Created().json(QrResponse::from(record)))
}

/// List the caller's QR codes with search, type filter, sort and paging
pub async fn list_qr_codes(
    app_state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<QrListParams>,
) -> Result<HttpResponse, ApiError> {
    let claims = current_claims(&req)?;
    let params = query.into_inner();

    let records = app_state
        .qr_store
        .list_records(Some(&claims.sub))
        .await?;
    let filtered: Vec<QrResponse> = filter_and_sort(records, &params)
        .into_iter()
        .map(QrResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(paginate(
        filtered,
        params.page,
        params.per_page,
        QR_PAGE_SIZE,
    )))
}

pub async fn get_qr_code(
    app_state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let claims = current_claims(&req)?;
    let record = load_visible_record(&app_state, &claims, &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(QrResponse::from(record)))
}

/// Point a trackable code somewhere else; the printed image stays valid
pub async fn update_destination(
    app_state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    web::Json(body): web::Json<UpdateDestinationRequest>,
) -> Result<HttpResponse, ApiError> {
    let claims = current_claims(&req)?;
    body.validate()?;

    let qr_id = path.into_inner();
    let record = load_visible_record(&app_state, &claims, &qr_id).await?;

    if !record.qr_type.is_trackable() {
        return Err(ApiError::BadRequest(
            "Only URL QR codes have an editable destination".to_string(),
        ));
    }
    if !body.destination_url.starts_with("http") {
        return Err(ApiError::BadRequest(
            "Please provide a valid destination URL (e.g., https://example.com)".to_string(),
        ));
    }

    let update = QrUpdate {
        destination_url: Some(body.destination_url.clone()),
        // Content follows the destination for consistency
        content: Some(body.destination_url),
        updated_at: Some(chrono::Utc::now().timestamp_millis()),
        ..Default::default()
    };
    let matched = app_state.qr_store.update_record(&qr_id, update).await?;
    if !matched {
        return Err(ApiError::NotFound("QR code not found".to_string()));
    }

    let updated = app_state
        .qr_store
        .get_record(&qr_id)
        .await?
        .ok_or_else(|| ApiError::Internal("QR code updated but not found".to_string()))?;

    log::info!(
        "Updated destination of {} to {}",
        qr_id,
        updated.destination_url
    );
    Ok(HttpResponse::Ok().json(QrResponse::from(updated)))
}

pub async fn delete_qr_code(
    app_state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let claims = current_claims(&req)?;
    let qr_id = path.into_inner();
    load_visible_record(&app_state, &claims, &qr_id).await?;

    app_state.qr_store.delete_record(&qr_id).await?;
    log::info!("Deleted QR code {} and its scans", qr_id);

    Ok(HttpResponse::NoContent().finish())
}

/// Scan history, newest first
pub async fn get_scan_history(
    app_state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    query: web::Query<PageParams>,
) -> Result<HttpResponse, ApiError> {
    let claims = current_claims(&req)?;
    let qr_id = path.into_inner();
    load_visible_record(&app_state, &claims, &qr_id).await?;

    let scans = app_state.qr_store.list_scans(&qr_id).await?;
    Ok(HttpResponse::Ok().json(paginate(
        scans,
        query.page,
        query.per_page,
        SCAN_PAGE_SIZE,
    )))
}

/// Stored QR image as a PNG download
pub async fn get_qr_image(
    app_state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let claims = current_claims(&req)?;
    let record = load_visible_record(&app_state, &claims, &path.into_inner()).await?;

    let data_url = record
        .qr_code_data_url
        .ok_or_else(|| ApiError::NotFound("QR image not generated for this code".to_string()))?;
    let png = decode_data_url(&data_url).map_err(|e| ApiError::Internal(format!("{:#}", e)))?;

    Ok(HttpResponse::Ok()
        .content_type("image/png")
        .append_header((
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", download_filename(&record.title)),
        ))
        .body(png))
}
