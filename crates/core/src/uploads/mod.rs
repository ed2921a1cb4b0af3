//! Image uploads to object storage.
//!
//! Objects are written to `{kind}/{user_id}/{unix_millis}-{random}.{ext}`, so
//! concurrent uploads from one user never share a path.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::User;
use crate::error::DocError;
use crate::ports::ObjectStorage;

const RANDOM_SUFFIX_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error("only images can be uploaded, got {0}")]
    UnsupportedType(String),
    #[error("upload is empty")]
    Empty,
    #[error("upload is {size} bytes, limit is {limit}")]
    TooLarge { size: usize, limit: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadKind {
    Avatar,
    Cover,
    Inline,
}

impl UploadKind {
    fn prefix(&self) -> &'static str {
        match self {
            UploadKind::Avatar => "avatars",
            UploadKind::Cover => "covers",
            UploadKind::Inline => "content",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadedImage {
    pub path: String,
    pub url: String,
}

/// Raster formats only. SVG can carry script and is served from our origin.
fn extension_for(content_type: &str) -> Result<&'static str, UploadError> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match essence.as_str() {
        "image/png" => Ok("png"),
        "image/jpeg" | "image/jpg" => Ok("jpg"),
        "image/gif" => Ok("gif"),
        "image/webp" => Ok("webp"),
        "image/avif" => Ok("avif"),
        _ => Err(UploadError::UnsupportedType(content_type.to_string())),
    }
}

fn random_suffix() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(RANDOM_SUFFIX_LEN)
        .map(char::from)
        .collect::<String>()
        .to_ascii_lowercase()
}

/// Storage path for an upload.
pub fn object_path(
    kind: UploadKind,
    user: &User,
    content_type: &str,
    at: DateTime<Utc>,
) -> Result<String, UploadError> {
    let ext = extension_for(content_type)?;
    Ok(format!(
        "{}/{}/{}-{}.{}",
        kind.prefix(),
        user.id,
        at.timestamp_millis(),
        random_suffix(),
        ext
    ))
}

/// Uploads images on behalf of the signed-in user.
#[derive(Clone)]
pub struct ImageUploader {
    storage: Arc<dyn ObjectStorage>,
    max_bytes: usize,
}

impl ImageUploader {
    pub fn new(storage: Arc<dyn ObjectStorage>, max_bytes: usize) -> Self {
        Self { storage, max_bytes }
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    #[tracing::instrument(skip(self, user, bytes), fields(user_id = %user.id, size = bytes.len()))]
    pub async fn upload(
        &self,
        kind: UploadKind,
        user: &User,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<UploadedImage, DocError> {
        if bytes.is_empty() {
            return Err(UploadError::Empty.into());
        }
        if bytes.len() > self.max_bytes {
            return Err(UploadError::TooLarge {
                size: bytes.len(),
                limit: self.max_bytes,
            }
            .into());
        }
        let path = object_path(kind, user, content_type, Utc::now())?;
        let stored = self.storage.upload(&path, bytes, content_type).await?;
        let url = self.storage.public_url(&stored.path);
        tracing::info!(path = %stored.path, "image uploaded");
        Ok(UploadedImage {
            path: stored.path,
            url,
        })
    }
}
