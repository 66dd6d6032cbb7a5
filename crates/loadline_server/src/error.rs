//! Errors raised while starting or serving the logistics API

use axum::response::{IntoResponse, Response};
use loadline_api::ApiError;

pub type ServerResult<T> = Result<T, ServerError>;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Core error: {0}")]
    Core(#[from] loadline_core::CoreError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Invalid address: {0}")]
    AddrParse(#[from] std::net::AddrParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        match self {
            ServerError::Core(e) => ApiError::from(e).into_response(),
            ServerError::Api(e) => e.into_response(),
            // Startup-only failures; the catalog is not serving yet
            ServerError::AddrParse(_) | ServerError::Io(_) => ApiError::ServiceUnavailable {
                retry_after_seconds: Some(30),
            }
            .into_response(),
        }
    }
}
