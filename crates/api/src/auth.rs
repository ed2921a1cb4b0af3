//! Bearer-token identity for requests.
//!
//! Tokens are HS256 JWTs issued by the external auth provider with the user
//! id in `sub`. A missing or invalid token makes the request anonymous;
//! routes that mutate documents take [`RequireUser`] instead.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::Authorization;
use axum_extra::TypedHeader;
use doclab_core::auth::{User, Viewer};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub exp: usize,
}

pub fn decode_user(token: &str, key: &DecodingKey) -> Option<User> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_aud = false;
    match jsonwebtoken::decode::<Claims>(token, key, &validation) {
        Ok(data) => Some(User::new(data.claims.sub, data.claims.email)),
        Err(err) => {
            tracing::debug!("rejected bearer token: {err}");
            None
        }
    }
}

/// The caller, anonymous unless a valid bearer token is present.
#[derive(Debug, Clone)]
pub struct CurrentViewer(pub Viewer);

impl FromRequestParts<AppState> for CurrentViewer {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
            .await
            .ok();
        let user = header.and_then(|TypedHeader(auth)| decode_user(auth.token(), state.decoding_key()));
        Ok(CurrentViewer(Viewer::from(user)))
    }
}

/// A signed-in caller; rejects anonymous requests with 401.
#[derive(Debug, Clone)]
pub struct RequireUser(pub User);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let CurrentViewer(viewer) = CurrentViewer::from_request_parts(parts, state).await?;
        match viewer {
            Viewer::User(user) => Ok(RequireUser(user)),
            Viewer::Anonymous => Err(ApiError::Unauthorized),
        }
    }
}
