use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};

use crate::{ItemsError, server::router::ItemsState};

/// GET /image/{image_filename} -> JPEG bytes, or the default image when missing.
pub async fn get_image(
    State(state): State<ItemsState>,
    Path(image_filename): Path<String>,
) -> Result<impl IntoResponse, ItemsError> {
    let bytes = state.images.read(&image_filename).await?;
    Ok(([(header::CONTENT_TYPE, "image/jpeg")], bytes))
}
