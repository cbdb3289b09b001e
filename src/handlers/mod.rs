pub mod admin_handlers;
pub mod analytics_handlers;
pub mod auth_handlers;
pub mod health_handlers;
pub mod qr_handlers;
pub mod track_handlers;
