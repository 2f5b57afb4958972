use axum::extract::multipart::MultipartError;
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;
use tracing::error;

#[derive(Debug, ThisError)]
pub enum ItemsError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] SqlxError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Item {0} not found")]
    ItemNotFound(i64),

    #[error("Invalid item id: {0}")]
    InvalidItemId(String),

    #[error("Image not found")]
    ImageNotFound,

    #[error("Invalid image name: {0}")]
    InvalidImageName(String),

    #[error("Missing form field: {0}")]
    MissingField(&'static str),

    #[error("Multipart error: {0}")]
    MultipartError(#[from] MultipartError),
}

impl ItemsError {
    /// Failures of the backing storage rather than of the request itself.
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            ItemsError::DatabaseError(_) | ItemsError::IoError(_) | ItemsError::JsonError(_)
        )
    }
}

impl IntoResponse for ItemsError {
    fn into_response(self) -> axum::response::Response {
        if self.is_storage() {
            error!(error = %self, "storage failure");
        }
        let (status, error_body) = match self {
            ItemsError::DatabaseError(_) | ItemsError::IoError(_) | ItemsError::JsonError(_) => {
                let body = ApiErrorBody {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "An internal server error occurred.".to_string(),
                };
                (StatusCode::INTERNAL_SERVER_ERROR, body)
            }
            ItemsError::ItemNotFound(id) => {
                let body = ApiErrorBody {
                    code: "NOT_FOUND".to_string(),
                    message: format!("Item {id} not found."),
                };
                (StatusCode::NOT_FOUND, body)
            }
            ItemsError::InvalidItemId(raw) => {
                let body = ApiErrorBody {
                    code: "BAD_REQUEST".to_string(),
                    message: format!("Item id `{raw}` is not an integer."),
                };
                (StatusCode::BAD_REQUEST, body)
            }
            ItemsError::ImageNotFound => {
                let body = ApiErrorBody {
                    code: "NOT_FOUND".to_string(),
                    message: "Image not found.".to_string(),
                };
                (StatusCode::NOT_FOUND, body)
            }
            ItemsError::InvalidImageName(_) => {
                let body = ApiErrorBody {
                    code: "BAD_REQUEST".to_string(),
                    message: "Image path does not end with .jpg".to_string(),
                };
                (StatusCode::BAD_REQUEST, body)
            }
            ItemsError::MissingField(field) => {
                let body = ApiErrorBody {
                    code: "BAD_REQUEST".to_string(),
                    message: format!("Missing form field `{field}`."),
                };
                (StatusCode::BAD_REQUEST, body)
            }
            ItemsError::MultipartError(e) => {
                let status = e.status();
                let body = ApiErrorBody {
                    code: status_code_name(status),
                    message: e.body_text(),
                };
                (status, body)
            }
        };
        (status, Json(ApiErrorResponse { error: error_body })).into_response()
    }
}

/// `413 Payload Too Large` -> `PAYLOAD_TOO_LARGE`
fn status_code_name(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(|reason| reason.to_ascii_uppercase().replace([' ', '-'], "_"))
        .unwrap_or_else(|| "BAD_REQUEST".to_string())
}

/// Standardized API error response body
#[derive(Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}
