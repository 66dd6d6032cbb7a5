//! One error type for both sides of the logistics REST API
//!
//! The server renders it as the `{error: {type, message, detail}, timestamp}`
//! envelope; the client produces it for transport and decode failures.

use miette::{Diagnostic, JSONReportHandler};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Error returned by a logistics endpoint or raised by the REST client
#[derive(Debug, thiserror::Error, Diagnostic, Serialize, Deserialize)]
pub enum ApiError {
    /// A query parameter or body field was rejected
    #[error("Invalid request: {message}")]
    #[diagnostic(
        code(api::validation_error),
        help("The detail lists each rejected field")
    )]
    ValidationError {
        message: String,
        fields: Option<Vec<FieldError>>,
    },

    #[error("Unknown {resource_type} '{resource_id}'")]
    #[diagnostic(code(api::not_found), help("Flight numbers look like LAX-ORD-2847"))]
    NotFound {
        resource_type: String,
        resource_id: String,
    },

    /// Any other `CoreError`, with its rendered diagnostic
    #[error("{message}")]
    #[diagnostic(code(api::core_error))]
    Core { message: String, json: String },

    #[error("{message}")]
    #[diagnostic(
        code(api::json_error),
        help("The body did not match the flight data schema")
    )]
    Json { message: String, json: String },

    /// The logistics API answered with a non-success status
    #[error("Upstream returned {status}: {message}")]
    #[diagnostic(
        code(api::upstream_error),
        help("Check that the logistics API is reachable and the bearer token is valid")
    )]
    Upstream { status: u16, message: String },

    /// Request never got a response (client feature)
    #[cfg(feature = "client")]
    #[error("Request failed: {0}")]
    #[diagnostic(
        code(api::transport_error),
        help("Check the base URL and network connectivity")
    )]
    Transport(String),

    /// Base URL could not be joined with an endpoint (client feature)
    #[cfg(feature = "client")]
    #[error("Invalid URL: {0}")]
    #[diagnostic(
        code(api::invalid_url),
        help("The base URL must be absolute, e.g. http://localhost:8000")
    )]
    InvalidUrl(String),

    #[error("Flight data is not available yet")]
    #[diagnostic(
        code(api::service_unavailable),
        help("The flight data has not been loaded yet")
    )]
    ServiceUnavailable { retry_after_seconds: Option<u64> },
}

/// One rejected field in a validation error
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl ApiError {
    /// HTTP status the server answers with
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::ValidationError { .. } => 400,
            ApiError::NotFound { .. } => 404,
            ApiError::ServiceUnavailable { .. } => 503,
            ApiError::Core { .. } => 500,
            ApiError::Json { .. } => 400,
            ApiError::Upstream { .. } => 502,
            #[cfg(feature = "client")]
            ApiError::Transport(_) => 502,
            #[cfg(feature = "client")]
            ApiError::InvalidUrl(_) => 400,
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
            fields: None,
        }
    }

    pub fn validation_with_fields(message: impl Into<String>, fields: Vec<FieldError>) -> Self {
        Self::ValidationError {
            message: message.into(),
            fields: Some(fields),
        }
    }

    pub fn not_found(resource_type: impl Into<String>, resource_id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
            resource_id: resource_id.into(),
        }
    }

    /// Short machine-readable name used in error bodies
    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::ValidationError { .. } => "validation_error",
            ApiError::NotFound { .. } => "not_found",
            ApiError::Core { .. } => "core_error",
            ApiError::Json { .. } => "json_error",
            ApiError::Upstream { .. } => "upstream_error",
            #[cfg(feature = "client")]
            ApiError::Transport(_) => "transport_error",
            #[cfg(feature = "client")]
            ApiError::InvalidUrl(_) => "invalid_url",
            ApiError::ServiceUnavailable { .. } => "service_unavailable",
        }
    }
}

impl From<loadline_core::CoreError> for ApiError {
    fn from(err: loadline_core::CoreError) -> Self {
        if let loadline_core::CoreError::FlightNotFound { flight_number } = &err {
            return Self::not_found("flight", flight_number.clone());
        }

        Self::Core {
            message: err.to_string(),
            json: render_json(&err),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        let message = err.to_string();
        let diagnostic = miette::miette!(
            code = "json::parse_error",
            help = "expected the flight data schema",
            "{}",
            message
        );
        Self::Json {
            json: render_json(&*diagnostic),
            message,
        }
    }
}

/// Diagnostic as miette's JSON report; empty when rendering fails
fn render_json(diagnostic: &dyn Diagnostic) -> String {
    let mut json = String::new();
    if JSONReportHandler::new()
        .render_report(&mut json, diagnostic)
        .is_err()
    {
        json.clear();
    }
    json
}

#[cfg(feature = "client")]
impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => Self::Upstream {
                status: status.as_u16(),
                message: err.to_string(),
            },
            None => Self::Transport(err.to_string()),
        }
    }
}

#[cfg(feature = "client")]
impl From<reqwest::header::InvalidHeaderValue> for ApiError {
    fn from(err: reqwest::header::InvalidHeaderValue) -> Self {
        Self::validation(format!("invalid bearer token: {}", err))
    }
}

// Server-side response conversion
#[cfg(feature = "server")]
impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        use axum::http::StatusCode;

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let detail = match &self {
            ApiError::Core { json, .. } => serde_json::from_str(json).ok(),
            ApiError::Json { json, .. } => serde_json::from_str(json).ok(),
            ApiError::ValidationError {
                fields: Some(fields),
                ..
            } => serde_json::to_value(fields).ok(),
            _ => None,
        };

        let mut error = serde_json::json!({
            "type": self.error_type(),
            "message": self.to_string(),
        });
        if let Some(detail) = detail {
            error["detail"] = detail;
        }

        let body = serde_json::json!({
            "error": error,
            "timestamp": chrono::Utc::now(),
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_flight_maps_to_not_found() {
        let err: ApiError = loadline_core::CoreError::flight_not_found("ZZZ-1").into();
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.error_type(), "not_found");
        assert!(matches!(err, ApiError::NotFound { ref resource_id, .. } if resource_id == "ZZZ-1"));
    }

    #[test]
    fn core_errors_carry_rendered_diagnostic() {
        let err: ApiError =
            loadline_core::CoreError::fetch_failed_msg("query_flights", "timed out").into();
        assert_eq!(err.status_code(), 500);
        match err {
            ApiError::Core { message, json } => {
                assert_eq!(message, "Data source request failed");
                assert!(json.contains("loadline_core::fetch_failed"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn json_errors_are_bad_requests() {
        let parse = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err: ApiError = parse.into();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.error_type(), "json_error");
    }
}
