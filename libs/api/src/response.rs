use axum::{http::StatusCode, response::IntoResponse};
use repository::RepositoryError;
use tracing::error;

/// Every failure a handler can surface, mapped onto an HTTP status. All of
/// them are scoped to the interaction that triggered them; nothing here is
/// fatal to the process.
#[derive(Debug)]
pub enum ApiError {
    /// Bad or missing credentials.
    AuthError(String),
    /// Mutation attempted by a non-owning user.
    Forbidden(String),
    /// Missing or deleted record.
    NotFound(String),
    /// Invalid caller-supplied input.
    ClientError(String),
    /// Object storage failure.
    UploadError(String),
    /// Anything else from the backend.
    ServerError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status_code, message) = match self {
            ApiError::AuthError(message) => {
                (StatusCode::UNAUTHORIZED, message)
            }
            ApiError::Forbidden(message) => (StatusCode::FORBIDDEN, message),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            ApiError::ClientError(message) => {
                (StatusCode::BAD_REQUEST, message)
            }
            ApiError::UploadError(message) => {
                (StatusCode::BAD_GATEWAY, message)
            }
            ApiError::ServerError(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };

        (status_code, message).into_response()
    }
}

pub type ApiResponse<T> = Result<T, ApiError>;

pub trait IntoApiResponse<T> {
    fn into_response(self, task: &str) -> ApiResponse<T>;
}

impl<T> IntoApiResponse<T> for Result<T, RepositoryError> {
    fn into_response(self, task: &str) -> ApiResponse<T> {
        self.map_err(|e| match e {
            RepositoryError::NotFound { .. } => {
                ApiError::NotFound(e.to_string())
            }
            RepositoryError::Forbidden { .. } => {
                ApiError::Forbidden(e.to_string())
            }
            RepositoryError::InSeaOrmDbErr { .. } => {
                error!(task = task, error = e.to_string());
                ApiError::ServerError(
                    "the request could not be completed".to_string(),
                )
            }
        })
    }
}

impl<T> IntoApiResponse<T> for anyhow::Result<T> {
    fn into_response(self, task: &str) -> ApiResponse<T> {
        self.map_err(|e| {
            error!(task = task, error = format!("{:?}", e));
            ApiError::ServerError(
                "the request could not be completed".to_string(),
            )
        })
    }
}
