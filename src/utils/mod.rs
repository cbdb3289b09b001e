pub mod analytics;
pub mod jwt;
pub mod listing;
pub mod qr_content;
pub mod qr_render;
