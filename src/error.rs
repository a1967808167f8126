use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::repository::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("there is no parent comment with id {0}")]
    InvalidParent(i64),

    #[error("there is no comment with id {0}")]
    NotFound(i64),

    #[error("storage failure: {0}")]
    Storage(#[source] sqlx::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub fn validation(message: impl Into<String>) -> Error {
        Error::Validation(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation(_) | Error::InvalidParent(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Error {
        match err {
            StoreError::ParentNotFound(id) => Error::InvalidParent(id),
            StoreError::Database(err) => Error::Storage(err),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let detail = match &self {
            Error::Storage(err) => {
                tracing::error!(?err, "internal server error");
                String::from("Internal server error, see logs for details")
            }
            err => {
                tracing::info!("returning error to client: {err}");
                err.to_string()
            }
        };
        (status, Json(serde_json::json!({ "detail": detail }))).into_response()
    }
}
