// src/config.rs

use std::env;
use std::net::SocketAddr;

use dotenvy::dotenv;

/// Attempts scoring at or above this percentage extend the streak.
pub const STREAK_THRESHOLD_PERCENTAGE: u32 = 70;

/// Number of recent attempts shown on the dashboard and progress pages.
pub const RECENT_QUIZ_LIMIT: usize = 10;

/// Daily question goal used when the user has not set one.
pub const DEFAULT_DAILY_GOAL: u32 = 10;

pub const DEFAULT_QUESTION_COUNT: u32 = 10;

/// How many favorite topics pre-fill an empty quiz setup.
pub const FAVORITE_TOPIC_PREFILL: usize = 3;

/// Which entity store backs the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// The hosted entity API over HTTPS.
    Remote,
    /// A local SQLite database, for development and offline runs.
    Sqlite,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub store_backend: StoreBackend,
    pub entity_api_url: String,
    pub entity_api_key: String,
    pub llm_api_url: String,
    pub llm_api_key: String,
    pub database_url: String,
    pub jwt_secret: String,
    pub rust_log: String,
    pub listen_addr: SocketAddr,
    pub http_timeout_secs: u64,
    /// Directory holding the built front end, served for unmatched paths.
    pub static_dir: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let store_backend = match env::var("QURIO_STORE")
            .unwrap_or_else(|_| "remote".to_string())
            .to_lowercase()
            .as_str()
        {
            "sqlite" => StoreBackend::Sqlite,
            _ => StoreBackend::Remote,
        };

        let entity_api_url = env::var("ENTITY_API_URL").unwrap_or_default();
        let entity_api_key = env::var("ENTITY_API_KEY").unwrap_or_default();

        if store_backend == StoreBackend::Remote && entity_api_url.is_empty() {
            panic!("ENTITY_API_URL must be set when QURIO_STORE=remote");
        }

        let llm_api_url = env::var("LLM_API_URL").expect("LLM_API_URL must be set");
        let llm_api_key = env::var("LLM_API_KEY").unwrap_or_default();

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://qurio.db?mode=rwc".to_string());

        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let listen_addr = env::var("QURIO_ADDR")
            .ok()
            .and_then(|addr| addr.parse().ok())
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

        let http_timeout_secs = env::var("HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|secs| secs.parse().ok())
            .unwrap_or(60);

        let static_dir = env::var("QURIO_STATIC_DIR").ok().filter(|d| !d.is_empty());

        Self {
            store_backend,
            entity_api_url,
            entity_api_key,
            llm_api_url,
            llm_api_key,
            database_url,
            jwt_secret,
            rust_log,
            listen_addr,
            http_timeout_secs,
            static_dir,
        }
    }
}
