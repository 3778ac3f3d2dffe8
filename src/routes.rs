// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{analytics, gamification, leaderboard, results},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware},
};

/// Assembles the main application router.
///
/// * Public: leaderboard.
/// * Authenticated: submissions, results, gamification views, analytics.
/// * Admin: the standalone rank pass.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        HeaderValue::from_static("http://localhost:3000"),
        HeaderValue::from_static("http://127.0.0.1:3000"),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let auth = middleware::from_fn_with_state(state.clone(), auth_middleware);

    let result_routes = Router::new()
        .route("/", get(results::list_results))
        .route("/submit", post(results::submit_result))
        .route("/{id}/details", get(results::result_details))
        .route_layer(auth.clone());

    let gamification_routes = Router::new()
        .route("/api/streak", get(gamification::get_streak))
        .route("/api/badges", get(gamification::list_badges))
        .route("/api/achievements", get(gamification::list_achievements))
        .route("/api/achievements/catalog", get(gamification::achievement_catalog))
        .route("/api/gamification/retry", post(results::retry_gamification))
        .route_layer(auth.clone());

    let analytics_routes = Router::new()
        .route("/", get(analytics::get_summary))
        .route("/user/recalculate", post(analytics::recalculate))
        .route_layer(auth.clone());

    let admin_routes = Router::new()
        .route("/analytics/rerank", post(analytics::rerank))
        // Double middleware protection: Auth first, then Admin check
        .route_layer(middleware::from_fn(admin_middleware))
        .route_layer(auth);

    Router::new()
        .route("/api/leaderboard", get(leaderboard::get_leaderboard))
        .nest("/api/results", result_routes)
        .nest("/api/analytics", analytics_routes)
        .nest("/api/admin", admin_routes)
        .merge(gamification_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
