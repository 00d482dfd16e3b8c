use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Result type alias for processor operations
pub type Result<T, E = ProcessorError> = std::result::Result<T, E>;

/// Errors that can occur while handling a process request
#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Missing/invalid processor secret")]
    InvalidSecret,

    #[error("Gateway error: {0}")]
    Gateway(#[from] gateway::GatewayError),
}

#[derive(Serialize)]
struct ApiErrorResponse {
    error_message: String,
}

impl IntoResponse for ProcessorError {
    fn into_response(self) -> Response {
        let status = match self {
            ProcessorError::InvalidSecret => StatusCode::UNAUTHORIZED,
            ProcessorError::Gateway(_) => StatusCode::BAD_GATEWAY,
        };

        let body = Json(ApiErrorResponse {
            error_message: self.to_string(),
        });

        (status, body).into_response()
    }
}
