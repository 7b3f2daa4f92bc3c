// handlers/public/root.rs - GET / and GET /health

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use tracing::warn;

use crate::state::AppState;

/// GET / - service description and endpoint index
pub async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Customizer API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Product customizer backend: designs, line items and tab settings",
            "endpoints": {
                "auth": "/api/request-otp, /api/verify-otp (public)",
                "developer": "/api/developer/product, /api/developer/product-by-sq (public)",
                "products": "/api/products[/:id] (protected)",
                "designs": "/api/layerdesigns[/:id] (protected)",
                "line_items": "/api/layerdesigns/:id/customize (protected)",
            }
        }
    }))
}

/// GET /health - checks the product store
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            warn!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                        "database_error": e.to_string()
                    }
                })),
            )
        }
    }
}
