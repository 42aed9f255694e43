//! Product image upload.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::post,
};
use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::ImageKind;
use crate::state::AppState;

/// Room for multipart boundaries and headers on top of the file itself.
const MULTIPART_OVERHEAD: usize = 16 * 1024;

/// Where an uploaded image was stored.
#[derive(Debug, Serialize)]
pub struct UploadedImage {
    /// Object path inside the bucket.
    pub path: String,
    /// Public URL, suitable for a product's `images`.
    pub url: String,
}

/// Upload routes.
pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new().route(
        "/api/uploads",
        post(upload_image).layer(DefaultBodyLimit::max(
            max_upload_bytes.saturating_add(MULTIPART_OVERHEAD),
        )),
    )
}

/// Store one image from the multipart field `file`.
#[instrument(skip(state, admin, multipart), fields(user_id = %admin.id))]
async fn upload_image(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadedImage>)> {
    let max_bytes = state.config().max_upload_bytes;
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        if field.name() == Some("file") {
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            file = Some(data);
        }
    }

    let data = file.ok_or_else(|| AppError::BadRequest("Missing required 'file' field".into()))?;
    check_upload(&data, max_bytes)?;
    let kind = ImageKind::detect(&data).ok_or_else(|| {
        AppError::BadRequest("Unsupported image type; use JPEG, PNG, WebP or GIF".into())
    })?;

    let path = object_path(Uuid::new_v4(), kind);
    let storage = state.storage();
    storage.upload(&path, data, kind.content_type()).await?;

    tracing::info!(%path, "Image uploaded");
    let url = storage.public_url(&path);
    Ok((StatusCode::CREATED, Json(UploadedImage { path, url })))
}

fn check_upload(data: &[u8], max_bytes: usize) -> Result<()> {
    if data.is_empty() {
        return Err(AppError::BadRequest("Uploaded file is empty".into()));
    }
    if data.len() > max_bytes {
        return Err(AppError::BadRequest(format!(
            "File is too large (limit {max_bytes} bytes)"
        )));
    }
    Ok(())
}

fn object_path(id: Uuid, kind: ImageKind) -> String {
    format!("products/{id}.{}", kind.extension())
}
