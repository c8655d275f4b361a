pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;

use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use database::Database;

/// Process-wide state handed to every handler. The database handle is built
/// once at startup and dropped on shutdown, never reached through a global.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .nest("/api/auth", auth_routes())
        .nest("/api/users", user_routes())
        .nest("/api/tests", test_routes())
        .nest("/api/test-attempts", test_attempt_routes())
        .nest("/api/analytics", analytics_routes())
        .nest("/api/colleges", college_routes())
        .nest("/api/study-materials", study_material_routes())
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_routes() -> Router<AppState> {
    use handlers::auth;

    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/guest", post(auth::guest))
        .route("/verify", post(auth::verify))
        .route("/google", post(auth::google))
}

fn user_routes() -> Router<AppState> {
    use handlers::users;

    Router::new().route(
        "/profile",
        get(users::get_profile).put(users::update_profile),
    )
}

fn test_routes() -> Router<AppState> {
    use handlers::tests;

    Router::new()
        .route("/", get(tests::list_tests).post(tests::create_test))
        .route("/:id", get(tests::get_test))
}

fn test_attempt_routes() -> Router<AppState> {
    use handlers::test_attempts;

    Router::new()
        .route("/", post(test_attempts::create_attempt))
        .route(
            "/:id",
            get(test_attempts::get_attempt).patch(test_attempts::update_attempt),
        )
        .route("/user/attempts", get(test_attempts::list_user_attempts))
}

fn analytics_routes() -> Router<AppState> {
    use handlers::analytics;

    Router::new()
        .route(
            "/",
            get(analytics::get_analytics).post(analytics::get_analytics),
        )
        .route("/update", post(analytics::update_analytics))
        .route("/recent-tests", get(analytics::recent_tests))
}

fn college_routes() -> Router<AppState> {
    use handlers::colleges;

    Router::new()
        .route("/", get(colleges::list_colleges).post(colleges::create_college))
        .route("/:id", get(colleges::get_college))
}

fn study_material_routes() -> Router<AppState> {
    use handlers::study_materials;

    Router::new()
        .route(
            "/",
            get(study_materials::list_materials).post(study_materials::create_material),
        )
        .route(
            "/section/:section",
            get(study_materials::list_materials_by_section),
        )
        .route("/:id", get(study_materials::get_material))
}

fn cors_layer() -> CorsLayer {
    let origins: Vec<HeaderValue> = config::config()
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    if origins.is_empty() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// GET /api/health - liveness plus a database ping
async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.db.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({ "status": "OK", "timestamp": now })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "degraded",
                "timestamp": now,
                "error": e.to_string(),
            })),
        ),
    }
}
