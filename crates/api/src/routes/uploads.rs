use axum::{
    body::Bytes,
    extract::{Path, State},
    http::HeaderMap,
    routing::post,
    Json, Router,
};
use doclab_core::uploads::{UploadKind, UploadedImage};

use crate::auth::RequireUser;
use crate::error::ApiResult;
use crate::routes::documents::content_type;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/uploads/{kind}", post(upload_image))
}

/// Store a raw image body and return its path and public URL.
async fn upload_image(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(kind): Path<UploadKind>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<UploadedImage>> {
    let content_type = content_type(&headers)?;
    let image = state
        .uploader()
        .upload(kind, &user, body.to_vec(), content_type)
        .await?;
    Ok(Json(image))
}
