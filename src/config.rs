use anyhow::{Context, Result, bail};
use std::env;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Mongo,
    Memory,
}

/// What the tracking endpoint answers when the store fails mid-scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackFailurePolicy {
    /// 500 with a generic body
    Error,
    /// 307 to `fallback_url`
    Redirect,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub port: u16,
    pub store_backend: StoreBackend,
    pub mongodb_uri: String,
    pub database_name: String,
    pub jwt_secret: String,
    pub tracking_base_url: String,
    pub fallback_url: String,
    pub track_failure_policy: TrackFailurePolicy,
    pub cors_origins: Vec<String>,
    pub superuser_username: Option<String>,
    pub superuser_password: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let port = var_or("PORT", "8080")
            .parse::<u16>()
            .context("PORT must be a valid port number")?;

        let store_backend = match var_or("STORE_BACKEND", "mongodb").as_str() {
            "mongodb" | "mongo" => StoreBackend::Mongo,
            "memory" => StoreBackend::Memory,
            other => bail!("Unknown STORE_BACKEND '{}'", other),
        };

        let mongodb_uri = match store_backend {
            StoreBackend::Mongo => env::var("MONGODB_URI").context("MONGODB_URI not set")?,
            StoreBackend::Memory => String::new(),
        };

        let track_failure_policy = match var_or("TRACK_FAILURE_POLICY", "error").as_str() {
            "error" => TrackFailurePolicy::Error,
            "redirect" => TrackFailurePolicy::Redirect,
            other => bail!("Unknown TRACK_FAILURE_POLICY '{}'", other),
        };

        let cors_origins = var_or("CORS_ORIGINS", "http://localhost:5173,http://localhost:4173")
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Ok(Self {
            bind_addr: var_or("BIND_ADDR", "127.0.0.1"),
            port,
            store_backend,
            mongodb_uri,
            database_name: var_or("DATABASE_NAME", "qr_tracker"),
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET not set")?,
            tracking_base_url: var_or("TRACKING_BASE_URL", "http://localhost:8080/track"),
            fallback_url: var_or("FALLBACK_URL", "http://localhost:3000"),
            track_failure_policy,
            cors_origins,
            superuser_username: env::var("SUPERUSER_USERNAME").ok(),
            superuser_password: env::var("SUPERUSER_PASSWORD").ok(),
        })
    }

    /// The URL encoded into a trackable QR code
    pub fn tracking_url(&self, qr_id: &str) -> String {
        format!("{}/{}", self.tracking_base_url.trim_end_matches('/'), qr_id)
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| {
        log::info!("{} not set, using default: {}", key, default);
        default.to_string()
    })
}
