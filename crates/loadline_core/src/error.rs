use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum CoreError {
    #[error("Data source request failed")]
    #[diagnostic(
        code(loadline_core::fetch_failed),
        help("The data source could not complete '{operation}'. Previously displayed data is kept")
    )]
    FetchFailed {
        operation: String,
        #[source]
        cause: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Flight not found")]
    #[diagnostic(
        code(loadline_core::flight_not_found),
        help("No flight matches '{flight_number}'. Flight numbers look like LAX-ORD-2847")
    )]
    FlightNotFound { flight_number: String },

    #[error("Invalid route")]
    #[diagnostic(
        code(loadline_core::invalid_route),
        help("Routes are written as 'LAX → ORD', 'LAX-ORD' or 'LAX->ORD'")
    )]
    InvalidRoute {
        #[source_code]
        src: String,
        #[label("expected ORIGIN-DESTINATION")]
        span: (usize, usize),
    },

    #[error("Feedback submission failed")]
    #[diagnostic(
        code(loadline_core::feedback_failed),
        help("Feedback for flight {flight_id} was not recorded; it can be submitted again")
    )]
    FeedbackFailed {
        flight_id: String,
        #[source]
        cause: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Flight data could not be loaded")]
    #[diagnostic(
        code(loadline_core::data_load_failed),
        help("Check that {path} exists and contains 'flights' and 'historicalData' arrays")
    )]
    DataLoadFailed {
        path: String,
        #[source]
        cause: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Configuration error")]
    #[diagnostic(
        code(loadline_core::configuration_error),
        help("Check configuration file at {config_path}")
    )]
    ConfigurationError {
        config_path: String,
        field: String,
        expected: String,
        #[source]
        cause: ConfigError,
    },
}

/// Low-level configuration failures, wrapped by [`CoreError::ConfigurationError`]
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    pub fn fetch_failed(
        operation: impl Into<String>,
        cause: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::FetchFailed {
            operation: operation.into(),
            cause: Box::new(cause),
        }
    }

    /// Fetch failure from a plain message, for sources that only report text
    pub fn fetch_failed_msg(operation: impl Into<String>, message: impl Into<String>) -> Self {
        #[derive(Debug, Error)]
        #[error("{0}")]
        struct StringError(String);

        Self::FetchFailed {
            operation: operation.into(),
            cause: Box::new(StringError(message.into())),
        }
    }

    pub fn flight_not_found(flight_number: impl Into<String>) -> Self {
        Self::FlightNotFound {
            flight_number: flight_number.into(),
        }
    }

    pub fn invalid_route(input: impl Into<String>) -> Self {
        let src = input.into();
        Self::InvalidRoute {
            span: (0, src.len()),
            src,
        }
    }

    pub fn feedback_failed(
        flight_id: impl Into<String>,
        cause: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::FeedbackFailed {
            flight_id: flight_id.into(),
            cause: Box::new(cause),
        }
    }

    pub fn data_load_failed(
        path: impl Into<String>,
        cause: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::DataLoadFailed {
            path: path.into(),
            cause: Box::new(cause),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use miette::Report;

    #[test]
    fn test_fetch_failed_keeps_operation_in_help() {
        let error = CoreError::fetch_failed_msg("query_flights", "connection refused");
        let report = Report::new(error);
        let output = format!("{:?}", report);
        assert!(output.contains("fetch_failed"));
        assert!(output.contains("query_flights"));
        assert!(output.contains("connection refused"));
    }

    #[test]
    fn test_invalid_route_labels_input() {
        let error = CoreError::invalid_route("LAXORD");
        let report = Report::new(error);
        let output = format!("{:?}", report);
        assert!(output.contains("invalid_route"));
        assert!(output.contains("LAXORD"));
    }
}
