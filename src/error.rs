//! Unified error types for multireq.
//!
//! Defines [`MultireqError`] (the main crate error enum) and
//! [`ValidationError`] for rejected target lists. Both use `thiserror`
//! for `Display` and `Error` derives. Error messages include contextual
//! hints to guide the user toward a fix.
//!
//! Per-target failures during a dispatch never surface here; they are
//! absorbed by the aggregator (see [`crate::proxy::aggregator`]).

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub target: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "  target {}: {}", self.target, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " ({suggestion})")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

fn format_errors(errors: &[ValidationError]) -> String {
    use std::fmt::Write;
    let mut buf = String::new();
    for (i, e) in errors.iter().enumerate() {
        if i > 0 {
            buf.push('\n');
        }
        // write! to String is infallible (only fails on OOM which is unrecoverable)
        let _ = write!(buf, "{e}");
    }
    buf
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum MultireqError {
    #[error("Target validation failed:\n{}", format_errors(.errors))]
    TargetValidation { errors: Vec<ValidationError> },

    #[error("Invalid health path '{0}': must be a literal path starting with '/'")]
    HealthPath(String),

    #[error("Invalid listen address '{addr}': {source}")]
    AddressParse {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid URI: {source}")]
    UriParse {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("HTTP request failed: {source}")]
    HttpRequest {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("Health check failed with status {0}")]
    HealthCheckFailed(hyper::StatusCode),
}
