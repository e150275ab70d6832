use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Error kinds shared by every layer. Handlers and services return these
/// instead of ad hoc messages so the status mapping lives in one place.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("not found")]
    NotFound,

    #[error("nothing to update")]
    NothingToUpdate,

    #[error("invalid email or password")]
    LoginFailed,

    #[error("email is already in use")]
    EmailTaken,

    #[error("invalid registration data")]
    InvalidRegistration,

    #[error("invalid update data")]
    InvalidUpdate,

    #[error("recycle box is full")]
    BoxFull,

    #[error("capacity must be positive")]
    InvalidCapacity,

    #[error("authentication required")]
    Unauthorized,

    #[error("admin access required")]
    Forbidden,

    // Body decode failures, one per classification.
    #[error("invalid request data type")]
    BodyDataType,

    #[error("invalid JSON syntax")]
    BodySyntax,

    #[error("failed to read request body")]
    BodyUnreadable,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::NothingToUpdate
            | Self::LoginFailed
            | Self::EmailTaken
            | Self::InvalidRegistration
            | Self::InvalidUpdate
            | Self::BoxFull
            | Self::InvalidCapacity
            | Self::BodyDataType
            | Self::BodySyntax
            | Self::BodyUnreadable => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::NotFound,
            other => Self::Internal(other.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // Internal causes are logged in full and masked from the client.
        let message = match &self {
            Self::Internal(cause) => {
                error!(error = %cause, "internal error");
                "unexpected error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
