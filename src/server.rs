use crate::error::ScoutError;
use crate::metrics;
use crate::recommend::{RecommendRequest, RecommendationEngine};
use axum::{
    http::{Method, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post},
    Extension, Json as AxumJson, Router,
};
use hyper::Server;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::error;

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "concert-scout",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Prometheus snapshot rendered in-process
async fn metrics_endpoint() -> impl IntoResponse {
    match metrics::render() {
        Some(body) => body.into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, "metrics recorder not installed").into_response(),
    }
}

async fn find_concerts(
    Extension(engine): Extension<Arc<RecommendationEngine>>,
    AxumJson(request): AxumJson<RecommendRequest>,
) -> impl IntoResponse {
    match engine.recommend(&request).await {
        Ok(response) => AxumJson(response).into_response(),
        Err(e) => {
            let status = match &e {
                ScoutError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
                ScoutError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            error!("find-concerts failed: {}", e);
            (status, Json(serde_json::json!({ "error": e.to_string() }))).into_response()
        }
    }
}

/// Create the HTTP server with all routes
pub fn create_server(engine: Arc<RecommendationEngine>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics_endpoint))
        .route("/find-concerts", post(find_concerts))
        .layer(Extension(engine))
        .layer(ServiceBuilder::new().layer(cors))
}

/// Start the HTTP server on the specified port
pub async fn start_server(
    engine: Arc<RecommendationEngine>,
    port: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_server(engine);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    println!("🚀 HTTP server running on http://localhost:{port}");
    println!("💚 Health check:    http://localhost:{port}/health");
    println!("🎯 Recommendations: POST http://localhost:{port}/find-concerts");

    Server::bind(&addr).serve(app.into_make_service()).await?;

    Ok(())
}
