use axum::extract::DefaultBodyLimit;
use axum::{routing::get, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

mod config;
mod database;
mod error;
mod handlers;
mod services;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, LMS_UPLOAD_DIR, etc.
    let _ = dotenvy::dotenv();

    // Initialize configuration (this loads the config singleton)
    let config = crate::config::config();

    tracing_subscriber::fmt::init();
    tracing::info!("Starting Mini LMS API in {:?} mode", config.environment);

    // Schema bootstrap is best-effort at startup; /health reports a degraded
    // state if the database is unreachable.
    if let Err(e) = database::manager::DatabaseManager::migrate().await {
        tracing::warn!("Skipping schema bootstrap: {}", e);
    }

    let app = app();

    // Allow tests or deployments to override port via env
    let port = std::env::var("LMS_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    println!("Mini LMS API server listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app() -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(course_routes())
        .merge(module_routes())
        .merge(lesson_routes())
        // Global middleware
        .layer(DefaultBodyLimit::max(crate::config::config().api.max_upload_size_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn course_routes() -> Router {
    use axum::routing::post;
    use handlers::courses;

    Router::new()
        .route("/courses", post(courses::course_create).get(courses::course_list))
        .route("/courses/:id", get(courses::course_get))
        .route("/courses/:id/progress", get(courses::course_progress))
        .route("/courses/:id/modules", post(courses::module_create))
}

fn module_routes() -> Router {
    use handlers::modules;

    Router::new()
        .route("/modules/:id", get(modules::module_get))
        .route("/modules/:id/progress", get(modules::module_progress))
}

fn lesson_routes() -> Router {
    use axum::routing::post;
    use handlers::lessons;

    Router::new()
        .route("/lessons/modules/:module_id", post(lessons::lesson_create))
        .route("/lessons/:id", get(lessons::lesson_get))
        .route("/lessons/:id/progress", post(lessons::lesson_complete))
        .route("/lessons/:id/content", get(lessons::lesson_content))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Mini LMS API",
            "version": version,
            "description": "API for managing courses, modules, lessons, and tracking user progress",
            "endpoints": {
                "courses": "/courses, /courses/:id, /courses/:id/progress, /courses/:id/modules",
                "modules": "/modules/:id, /modules/:id/progress",
                "lessons": "/lessons/modules/:moduleId, /lessons/:id, /lessons/:id/progress, /lessons/:id/content",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match crate::database::manager::DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
