use actix_web::{HttpRequest, HttpResponse, web};

use crate::error::ApiError;
use crate::state::app_state::AppState;
use crate::structs::qr_request::{QrListParams, QrResponse};
use crate::structs::user::{UserResponse, UserSearchParams};
use crate::utils::analytics::admin_stats;
use crate::utils::jwt::current_claims;
use crate::utils::listing::{QR_PAGE_SIZE, admin_search, paginate};

pub async fn get_admin_stats(app_state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let users = app_state.user_store.list_users().await?;
    let records = app_state.qr_store.list_records(None).await?;
    let now = chrono::Utc::now().timestamp_millis();

    Ok(HttpResponse::Ok().json(admin_stats(&users, &records, now)))
}

pub async fn list_users(
    app_state: web::Data<AppState>,
    query: web::Query<UserSearchParams>,
) -> Result<HttpResponse, ApiError> {
    let needle = query
        .search
        .as_deref()
        .map(str::to_lowercase)
        .unwrap_or_default();

    let users: Vec<UserResponse> = app_state
        .user_store
        .list_users()
        .await?
        .into_iter()
        .filter(|user| {
            let matches = |field: &Option<String>| {
                field
                    .as_deref()
                    .is_some_and(|value| value.to_lowercase().contains(&needle))
            };
            needle.is_empty()
                || user.username.to_lowercase().contains(&needle)
                || matches(&user.display_name)
                || matches(&user.email)
                || matches(&user.phone_number)
        })
        .map(UserResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(users))
}

/// Delete a user together with their QR codes
pub async fn delete_user(
    app_state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let claims = current_claims(&req)?;
    let user_id = path.into_inner();
    if user_id == claims.sub {
        return Err(ApiError::BadRequest(
            "Admins cannot delete their own account".to_string(),
        ));
    }

    if !app_state.user_store.delete_user(&user_id).await? {
        return Err(ApiError::NotFound("User not found".to_string()));
    }
    let removed = app_state.qr_store.delete_records_by_user(&user_id).await?;
    log::info!("Deleted user {} and {} QR codes", user_id, removed);

    Ok(HttpResponse::NoContent().finish())
}

/// Grant or revoke admin, flipping the current flag
pub async fn toggle_admin(
    app_state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let claims = current_claims(&req)?;
    let user_id = path.into_inner();
    if user_id == claims.sub {
        return Err(ApiError::BadRequest(
            "Admins cannot change their own admin status".to_string(),
        ));
    }

    let user = app_state
        .user_store
        .get_user(&user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let is_admin = !user.is_admin;
    app_state.user_store.set_admin(&user_id, is_admin).await?;
    log::info!(
        "Admin status {} for {}",
        if is_admin { "granted" } else { "revoked" },
        user.username
    );

    let mut updated = user;
    updated.is_admin = is_admin;
    Ok(HttpResponse::Ok().json(UserResponse::from(updated)))
}

/// Every user's codes, searchable by title, content or type
pub async fn list_all_qr_codes(
    app_state: web::Data<AppState>,
    query: web::Query<QrListParams>,
) -> Result<HttpResponse, ApiError> {
    let params = query.into_inner();
    let records = app_state.qr_store.list_records(None).await?;

    let items: Vec<QrResponse> = admin_search(records, params.search.as_deref())
        .into_iter()
        .map(QrResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(paginate(
        items,
        params.page,
        params.per_page,
        QR_PAGE_SIZE,
    )))
}

pub async fn delete_any_qr_code(
    app_state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let qr_id = path.into_inner();
    if !app_state.qr_store.delete_record(&qr_id).await? {
        return Err(ApiError::NotFound("QR code not found".to_string()));
    }
    log::info!("Admin deleted QR code {}", qr_id);

    Ok(HttpResponse::NoContent().finish())
}
