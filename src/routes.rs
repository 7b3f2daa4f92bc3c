use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::config::AppConfig;
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::state::AppState;

/// Build the full application router
pub fn app(state: AppState, config: &AppConfig) -> Router {
    let mut router = Router::new()
        .merge(public_routes())
        .merge(protected_routes())
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .with_state(state);

    if config.security.enable_cors {
        router = router.layer(cors_layer(&config.security.cors_origins));
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    router
}

fn public_routes() -> Router<AppState> {
    use public::{developer, otp, password_reset, root};

    Router::new()
        .route("/", get(root::root))
        .route("/health", get(root::health))
        // OTP login
        .route("/api/request-otp", post(otp::request_otp))
        .route("/api/verify-otp", post(otp::verify_otp))
        .route("/api/login", post(otp::login))
        // Password reset
        .route("/api/forgot-password", post(password_reset::forgot_password))
        .route("/api/verify-reset-token", post(password_reset::verify_reset_token))
        .route("/api/reset-password", post(password_reset::reset_password))
        // Storefront developer API
        .route("/api/developer/product", get(developer::product))
        .route("/api/developer/product-by-sq", get(developer::product_by_sq))
}

fn protected_routes() -> Router<AppState> {
    use protected::{designs, line_items, products};

    Router::new()
        .route("/api/products", get(products::list).post(products::create))
        .route(
            "/api/products/:id",
            get(products::get).put(products::update_settings),
        )
        .route(
            "/api/products/:id/customizer-image",
            put(products::update_customizer_image),
        )
        .route("/api/products/:id/3d-model", put(products::update_model_file))
        .route("/api/layerdesigns", get(designs::list).post(designs::create))
        .route("/api/layerdesigns/sqs", get(designs::skus))
        .route("/api/layerdesigns/bulk-update-sq", put(designs::bulk_update_sq))
        .route(
            "/api/layerdesigns/by-sq/:sq",
            get(designs::get_by_sq).delete(designs::delete_by_sq),
        )
        .route(
            "/api/layerdesigns/:id",
            get(designs::get).put(designs::rename).delete(designs::delete),
        )
        .route(
            "/api/layerdesigns/:id/customize",
            post(line_items::upsert).delete(line_items::delete),
        )
        .route_layer(middleware::from_fn(jwt_auth_middleware))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}
