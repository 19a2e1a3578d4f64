// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post, put},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::{
    handlers::{analytics, companion, history, profile, quiz, session},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * Topics and companion moods are public; everything else needs a bearer token.
/// * Applies global middleware (Trace, CORS).
/// * Serves the built front end for unmatched paths when a static directory is configured.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://127.0.0.1:3000"),
        ])
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let auth = middleware::from_fn_with_state(state.clone(), auth_middleware);

    let quiz_routes = Router::new()
        .route("/setup", post(quiz::setup))
        .route("/start", post(quiz::start))
        .route("/session", get(session::get_session))
        .route("/session/answers/{index}", put(session::select_answer))
        .route("/session/next", post(session::next))
        .route("/session/previous", post(session::previous))
        .route("/session/current/{index}", put(session::go_to))
        .route("/session/submit", post(session::submit))
        .layer(auth.clone());

    let history_routes = Router::new()
        .route("/", get(history::list_quizzes))
        .route("/{id}/questions", get(history::list_questions))
        .layer(auth.clone());

    let me_routes = Router::new()
        .route("/dashboard", get(analytics::get_dashboard))
        .route("/progress", get(analytics::get_progress))
        .route("/achievements", get(analytics::get_achievements))
        .route(
            "/profile",
            get(profile::get_profile).put(profile::update_profile),
        )
        .layer(auth.clone());

    let companion_routes = Router::new()
        .route("/moods", get(companion::list_moods))
        .merge(
            Router::new()
                .route("/chat", post(companion::chat))
                .layer(auth),
        );

    let api = Router::new()
        .route("/topics", get(quiz::list_topics))
        .nest("/quiz", quiz_routes)
        .nest("/quizzes", history_routes)
        .nest("/companion", companion_routes)
        .merge(me_routes);

    let mut router = Router::new().nest("/api", api);

    if let Some(dir) = &state.config.static_dir {
        tracing::info!("Serving static files from {}", dir);
        router = router.fallback_service(ServeDir::new(dir));
    }

    router
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
