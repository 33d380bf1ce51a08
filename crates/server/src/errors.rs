use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use linkhint::cache::CacheError;
use linkhint::embedding::EmbeddingError;
use linkhint::search::SearchError;
use linkhint::vector::VectorError;
use serde_json::json;
use tracing::error;

/// A custom error type for the server application.
///
/// This enum encapsulates the different kinds of errors that can occur
/// within the server, allowing them to be converted into appropriate HTTP
/// responses. Note how small it is: source and cache failures never reach
/// this layer because the pipeline recovers them internally.
pub enum AppError {
    /// The request itself is unusable (e.g., empty query text). 400.
    InvalidInput(String),
    /// An external collaborator (embedding API) failed. 502.
    Upstream(String),
    /// Storage faults on the explicitly storage-backed routes. 500.
    Cache(CacheError),
    Vector(VectorError),
    /// Generic internal server errors. 500.
    Internal(anyhow::Error),
}

impl From<SearchError> for AppError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::EmptyQuery => AppError::InvalidInput(err.to_string()),
        }
    }
}

impl From<EmbeddingError> for AppError {
    fn from(err: EmbeddingError) -> Self {
        AppError::Upstream(err.to_string())
    }
}

impl From<CacheError> for AppError {
    fn from(err: CacheError) -> Self {
        AppError::Cache(err)
    }
}

impl From<VectorError> for AppError {
    fn from(err: VectorError) -> Self {
        AppError::Vector(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status_code, error_message) = match self {
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Upstream(msg) => {
                error!("Upstream collaborator error: {msg}");
                (StatusCode::BAD_GATEWAY, msg)
            }
            AppError::Cache(err) => {
                error!("Cache error: {err:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A storage error occurred.".to_string(),
                )
            }
            AppError::Vector(err) => {
                error!("Vector index error: {err:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A storage error occurred.".to_string(),
                )
            }
            AppError::Internal(err) => {
                error!("Internal server error: {err:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred.".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status_code, body).into_response()
    }
}
