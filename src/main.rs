// src/main.rs

use std::sync::Arc;
use std::time::Duration;

use dotenvy::dotenv;
use qurio::config::{Config, StoreBackend};
use qurio::llm::{HttpLlmClient, SharedLlm};
use qurio::quiz::session::QuizSessions;
use qurio::routes;
use qurio::state::AppState;
use qurio::store::{SharedStore, remote::RemoteEntityStore, sqlite::SqliteEntityStore};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily("logs", "qurio.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    let timeout = Duration::from_secs(config.http_timeout_secs);

    let store: SharedStore = match config.store_backend {
        StoreBackend::Remote => {
            tracing::info!("Using entity API at {}", config.entity_api_url);
            Arc::new(
                RemoteEntityStore::new(&config.entity_api_url, &config.entity_api_key, timeout)
                    .expect("Failed to build entity API client"),
            )
        }
        StoreBackend::Sqlite => Arc::new(connect_sqlite(&config.database_url).await),
    };

    let llm: SharedLlm = Arc::new(
        HttpLlmClient::new(&config.llm_api_url, &config.llm_api_key, timeout)
            .expect("Failed to build LLM client"),
    );

    let state = AppState {
        store,
        llm,
        sessions: QuizSessions::new(),
        config: config.clone(),
    };

    let app = routes::create_router(state);

    tracing::info!("Listening on {}", config.listen_addr);

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .expect("Failed to bind listen address");

    axum::serve(listener, app).await.expect("Server error");
}

/// Opens the local database, retrying while the file system settles.
async fn connect_sqlite(database_url: &str) -> SqliteEntityStore {
    let mut retry_count = 0;
    loop {
        match SqliteEntityStore::connect(database_url).await {
            Ok(store) => {
                tracing::info!("Local database ready, migrations applied.");
                return store;
            }
            Err(e) => {
                retry_count += 1;
                if retry_count > 5 {
                    panic!("Failed to open database after 5 retries: {}", e);
                }
                tracing::warn!("Database not ready, retrying in 2s... (Attempt {})", retry_count);
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
        }
    }
}
