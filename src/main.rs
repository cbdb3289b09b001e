mod config;
mod db;
mod error;
mod handlers;
mod middlewares;
mod models;
mod routes;
mod state;
mod structs;
#[cfg(test)]
mod test_support;
mod utils;

use crate::config::Config;
use crate::state::app_state::AppState;
use actix_cors::Cors;
use actix_web::{App, HttpServer, http, middleware::Logger, web};
use dotenv::dotenv;
use env_logger::Env;
use routes::init_routes;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    // Initialize the store selected by STORE_BACKEND
    let (qr_store, user_store) = match db::connect(&config).await {
        Ok(stores) => stores,
        Err(e) => {
            log::error!("Error connecting to the database: {}", e);
            std::process::exit(1);
        }
    };

    let bind_addr = (config.bind_addr.clone(), config.port);
    let cors_origins = config.cors_origins.clone();
    log::info!(
        "Scan tracking at {}/{{qr_id}} ({:?} on failure)",
        config.tracking_base_url.trim_end_matches('/'),
        config.track_failure_policy
    );

    // Create shared state
    let app_state = web::Data::new(AppState {
        qr_store,
        user_store,
        config,
    });

    HttpServer::new(move || {
        let logger = Logger::new("%a \"%r\" %s %b \"%{Referer}i\" \"%{User-Agent}i\" %D ms");
        let cors = cors_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
            .allowed_headers(vec![http::header::AUTHORIZATION, http::header::ACCEPT])
            .allowed_header(http::header::CONTENT_TYPE)
            .max_age(3600);
        App::new()
            .wrap(logger)
            .wrap(cors)
            .app_data(app_state.clone())
            .configure(init_routes)
    })
    .bind(bind_addr)?
    .run()
    .await
}
