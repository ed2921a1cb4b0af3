use axum::http::{header, Method};
use tower_http::cors::{Any, CorsLayer};

/// Browser clients read from any origin and send bearer tokens.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
