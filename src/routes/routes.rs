use actix_web::web;

use crate::handlers::admin_handlers::{
    delete_any_qr_code, delete_user, get_admin_stats, list_all_qr_codes, list_users, toggle_admin,
};
use crate::handlers::analytics_handlers::{get_dashboard, get_qr_analytics};
use crate::handlers::auth_handlers::{create_superuser, login, signup};
use crate::handlers::health_handlers::health_check;
use crate::handlers::qr_handlers::{
    create_qr, delete_qr_code, get_qr_code, get_qr_image, get_scan_history, list_qr_codes,
    update_destination,
};
use crate::handlers::track_handlers::track_scan;
use crate::middlewares::authmw::{JwtAuth, RequireAdmin};

/// Configure the routes
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    // Public scan routes, registered ahead of the authenticated /api scope.
    // Any method is accepted; the id-less forms answer 400. Segments after
    // the id are ignored.
    cfg.route("/track", web::to(track_scan))
        .route("/track/", web::to(track_scan))
        .route("/track/{qr_id}", web::to(track_scan))
        .route("/track/{qr_id}/{tail:.*}", web::to(track_scan))
        .route("/api/track", web::to(track_scan))
        .route("/api/track/", web::to(track_scan))
        .route("/api/track/{qr_id}", web::to(track_scan))
        .route("/api/track/{qr_id}/{tail:.*}", web::to(track_scan));

    // Authentication routes - no auth required
    cfg.service(
        web::scope("/api/auth")
            .route("/login", web::post().to(login))
            .route("/init", web::post().to(create_superuser))
            .route("/signup", web::post().to(signup)),
    );

    // API routes - require authentication
    cfg.service(
        web::scope("/api")
            .wrap(JwtAuth)
            .route("/health/check", web::get().to(health_check))
            .route("/qr", web::post().to(create_qr))
            .route("/qr", web::get().to(list_qr_codes))
            .route("/qr/{qr_id}", web::get().to(get_qr_code))
            .route("/qr/{qr_id}", web::delete().to(delete_qr_code))
            .route("/qr/{qr_id}/destination", web::put().to(update_destination))
            .route("/qr/{qr_id}/scans", web::get().to(get_scan_history))
            .route("/qr/{qr_id}/image", web::get().to(get_qr_image))
            .route("/analytics/dashboard", web::get().to(get_dashboard))
            .route("/analytics/qr/{qr_id}", web::get().to(get_qr_analytics))
            // Admin routes
            .service(
                web::scope("/admin")
                    .wrap(RequireAdmin)
                    .route("/stats", web::get().to(get_admin_stats))
                    .route("/users", web::get().to(list_users))
                    .route("/users/{user_id}", web::delete().to(delete_user))
                    .route("/users/{user_id}/admin", web::put().to(toggle_admin))
                    .route("/qr", web::get().to(list_all_qr_codes))
                    .route("/qr/{qr_id}", web::delete().to(delete_any_qr_code)),
            ),
    );
}
