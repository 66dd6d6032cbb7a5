//! Error logging utilities for better miette formatting in tracing

/// Log an error with miette's nice formatting
///
/// Logs at ERROR level using the error's Debug output, which for miette
/// diagnostics includes the code and help text.
#[macro_export]
macro_rules! log_error {
    ($err:expr) => {{
        let err = &$err;
        tracing::error!("{:?}", err);
    }};
    ($msg:expr, $err:expr) => {{
        let err = &$err;
        tracing::error!("{}: {:?}", $msg, err);
    }};
}

/// Log an error as a WARN line with its full cause chain
///
/// For failures the dashboard recovers from on its own.
#[macro_export]
macro_rules! log_warn_chain {
    ($msg:expr, $err:expr) => {{
        use $crate::utils::error_logging::ErrorLogging;
        let err = &$err;
        tracing::warn!("{}: {}", $msg, err.log_format());
    }};
}

/// Chain-aware formatting for errors that end up in logs or status text
pub trait ErrorLogging {
    /// Multi-line form with a numbered `Caused by:` section
    fn log_format(&self) -> String;

    /// The error and its causes on one line, for status text
    fn one_line(&self) -> String;
}

fn cause_messages(err: &dyn std::error::Error) -> Vec<String> {
    let mut messages = Vec::new();
    let mut current = err.source();
    while let Some(cause) = current {
        messages.push(cause.to_string());
        current = cause.source();
    }
    messages
}

impl<E: std::error::Error> ErrorLogging for E {
    fn log_format(&self) -> String {
        let causes = cause_messages(self);
        if causes.is_empty() {
            return self.to_string();
        }
        let numbered: Vec<String> = causes
            .iter()
            .enumerate()
            .map(|(i, cause)| format!("  {}: {}", i + 1, cause))
            .collect();
        format!("{}\n\nCaused by:\n{}", self, numbered.join("\n"))
    }

    fn one_line(&self) -> String {
        let mut parts = vec![self.to_string()];
        parts.extend(cause_messages(self));
        parts.join(": ")
    }
}
