//! Error taxonomy for the console core.
//!
//! Validation errors stay local to the configuration store. Transport and
//! service errors come back from the remote backend and carry enough raw
//! detail to diagnose what went wrong.

use serde_json::Value;
use std::error::Error as StdError;
use thiserror::Error;

/// A configuration value was rejected. The store is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {field}: {reason}")]
pub struct ValidationError {
    /// Name of the offending field.
    pub field: &'static str,
    /// Human-readable reason.
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Failure talking to the remote analysis service.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// The request could not complete (connection refused, timeout, ...).
    /// `detail` holds the underlying error text with its source chain.
    #[error("{endpoint}: request failed: {message}")]
    Transport {
        endpoint: String,
        message: String,
        detail: String,
    },

    /// The request completed but the service reported a failure or
    /// returned something we could not understand.
    #[error("{endpoint}: {message}")]
    Service {
        endpoint: String,
        message: String,
        detail: Option<Value>,
    },
}

impl ApiError {
    pub fn transport(
        endpoint: impl Into<String>,
        message: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        ApiError::Transport {
            endpoint: endpoint.into(),
            message: message.into(),
            detail: detail.into(),
        }
    }

    pub fn service(
        endpoint: impl Into<String>,
        message: impl Into<String>,
        detail: Option<Value>,
    ) -> Self {
        ApiError::Service {
            endpoint: endpoint.into(),
            message: message.into(),
            detail,
        }
    }

    /// Short message without the endpoint prefix.
    pub fn message(&self) -> &str {
        match self {
            ApiError::Transport { message, .. } | ApiError::Service { message, .. } => message,
        }
    }

    /// Raw diagnostic payload. Transport errors expose the underlying
    /// error chain.
    pub fn detail(&self) -> Value {
        match self {
            ApiError::Transport { detail, .. } => Value::String(detail.clone()),
            ApiError::Service {
                detail: Some(detail),
                ..
            } => detail.clone(),
            ApiError::Service { message, .. } => Value::String(message.clone()),
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport { .. })
    }
}

/// Flatten an error and its `source()` chain into one line.
pub fn error_chain(err: &dyn StdError) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

/// A lifecycle operation was invoked from a state that does not allow it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot {operation} while job is {state}")]
pub struct TransitionError {
    pub operation: &'static str,
    pub state: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validation_error_names_field() {
        let err = ValidationError::new("ticker", "must not be empty");
        assert_eq!(err.to_string(), "invalid ticker: must not be empty");
    }

    #[test]
    fn test_api_error_detail() {
        let err = ApiError::transport(
            "/analyze",
            "connection refused",
            "tcp connect error: Connection refused (os error 111)",
        );
        assert!(err.is_transport());
        assert_eq!(err.message(), "connection refused");
        assert_eq!(
            err.detail(),
            json!("tcp connect error: Connection refused (os error 111)")
        );

        let body = json!({"status": "error", "message": "boom"});
        let err = ApiError::service("/analyze", "boom", Some(body.clone()));
        assert!(!err.is_transport());
        assert_eq!(err.message(), "boom");
        assert_eq!(err.detail(), body);
    }

    #[test]
    fn test_error_chain_includes_sources() {
        let inner = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "os error 111");
        let outer = anyhow::Error::new(inner).context("tcp connect error");
        let err: &(dyn StdError + 'static) = outer.as_ref();
        let text = error_chain(err);
        assert_eq!(text, "tcp connect error: os error 111");
    }
}
