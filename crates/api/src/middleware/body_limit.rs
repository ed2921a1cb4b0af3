use tower_http::limit::RequestBodyLimitLayer;

/// Reject bodies larger than the largest accepted upload.
pub fn body_limit_layer(max_bytes: usize) -> RequestBodyLimitLayer {
    RequestBodyLimitLayer::new(max_bytes)
}
