use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("resource not found: {0}")]
    ResourceNotFound(String),
    #[error("failed to read resource {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        warn!("{}", self);
        let status = match self {
            ServerError::ResourceNotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        status.into_response()
    }
}
