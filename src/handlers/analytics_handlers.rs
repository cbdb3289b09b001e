use actix_web::{HttpRequest, HttpResponse, web};

use crate::error::ApiError;
use crate::state::app_state::AppState;
use crate::structs::analytics::DateRangeParams;
use crate::utils::analytics::{DateRange, dashboard, qr_detail};
use crate::utils::jwt::current_claims;

/// Dashboard totals and charts over the caller's codes
pub async fn get_dashboard(
    app_state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<DateRangeParams>,
) -> Result<HttpResponse, ApiError> {
    let claims = current_claims(&req)?;
    let params = query.into_inner();

    let now = chrono::Utc::now().timestamp_millis();
    let range = DateRange::resolve(params.from, params.to, now);
    if range.from > range.to {
        return Err(ApiError::BadRequest(
            "'from' must not be after 'to'".to_string(),
        ));
    }

    let records = app_state
        .qr_store
        .list_records(Some(&claims.sub))
        .await?;
    let ids: Vec<String> = records.iter().map(|record| record.id.clone()).collect();
    let scans = app_state.qr_store.list_scans_for(&ids).await?;

    Ok(HttpResponse::Ok().json(dashboard(&records, &scans, range)))
}

/// Per-code analytics
pub async fn get_qr_analytics(
    app_state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let claims = current_claims(&req)?;
    let qr_id = path.into_inner();

    let record = app_state
        .qr_store
        .get_record(&qr_id)
        .await?
        .filter(|record| claims.is_admin || record.is_owned_by(&claims.sub))
        .ok_or_else(|| ApiError::NotFound("QR code not found".to_string()))?;
    let scans = app_state.qr_store.list_scans(&qr_id).await?;

    let now = chrono::Utc::now().timestamp_millis();
    Ok(HttpResponse::Ok().json(qr_detail(&record, &scans, now)))
}

#[cfg(test)]
mod tests {
    use actix_web::{App, http::StatusCode, test};
    use serde_json::Value;

    use crate::routes::init_routes;
    use crate::test_support::{memory_state, sample_record, seed_user};

    #[actix_web::test]
    async fn dashboard_covers_only_the_callers_codes() {
        let (state, store) = memory_state();
        let (ana, bearer) = seed_user(&store, "ana", false).await;
        store
            .insert_record(sample_record("a", &ana.id, "https://a.example", 4))
            .await;
        store
            .insert_record(sample_record("b", &ana.id, "", 2))
            .await;
        store
            .insert_record(sample_record("other", "someone-else", "https://c.example", 50))
            .await;
        let now = chrono::Utc::now().timestamp_millis();
        store.insert_scan("a", now - 1_000).await;
        store.insert_scan("other", now - 1_000).await;
        let app = test::init_service(App::new().app_data(state).configure(init_routes)).await;

        let req = test::TestRequest::get()
            .uri("/api/analytics/dashboard")
            .insert_header(("Authorization", bearer))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["total_qrs"], 2);
        assert_eq!(body["total_scans"], 6);
        assert_eq!(body["avg_scans_per_qr"], 3);
        assert_eq!(body["most_scanned_type"], "url");
        assert_eq!(body["recent_activity"], 1);
        assert_eq!(body["hourly"].as_array().unwrap().len(), 24);
        assert_eq!(body["day_of_week"].as_array().unwrap().len(), 7);
    }

    #[actix_web::test]
    async fn inverted_range_is_rejected() {
        let (state, store) = memory_state();
        let (_, bearer) = seed_user(&store, "ana", false).await;
        let app = test::init_service(App::new().app_data(state).configure(init_routes)).await;

        let req = test::TestRequest::get()
            .uri("/api/analytics/dashboard?from=2024-06-30T00:00:00Z&to=2024-06-01T00:00:00Z")
            .insert_header(("Authorization", bearer))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn qr_analytics_for_foreign_code_is_not_found() {
        let (state, store) = memory_state();
        let (_, bearer) = seed_user(&store, "ana", false).await;
        let (_, admin_bearer) = seed_user(&store, "root", true).await;
        store
            .insert_record(sample_record("other", "someone-else", "https://c.example", 5))
            .await;
        let app = test::init_service(App::new().app_data(state).configure(init_routes)).await;

        let req = test::TestRequest::get()
            .uri("/api/analytics/qr/other")
            .insert_header(("Authorization", bearer))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::get()
            .uri("/api/analytics/qr/other")
            .insert_header(("Authorization", admin_bearer))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["total_scans"], 5);
        assert_eq!(body["avg_daily"], 0);
    }
}
