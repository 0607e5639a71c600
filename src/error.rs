//! Error types for pushstream

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors delivered through an observer's `error` channel.
///
/// The enum is `Clone` because one failure may reach several observers, for
/// example every subscriber of a shared future.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message")]
pub enum Error {
    /// Producer body failed or panicked
    #[error("Producer failed: {0}")]
    Producer(String),

    /// A user projection failed or panicked
    #[error("Projection failed: {0}")]
    Projection(String),

    /// A generator yielded an error item
    #[error("Generator failed: {0}")]
    Generator(String),

    /// A future resolved to an error
    #[error("Future rejected: {0}")]
    Rejected(String),

    /// An async source was subscribed outside of a tokio runtime
    #[error("No tokio runtime available to drive an async source")]
    NoRuntime,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Build a `Producer` error from a caught panic payload.
    pub(crate) fn producer_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        Error::Producer(panic_message(payload))
    }

    /// Build a `Projection` error from a caught panic payload.
    pub(crate) fn projection_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        Error::Projection(panic_message(payload))
    }
}

/// Extract a readable message from a panic payload.
fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            Error::Rejected("boom".into()).to_string(),
            "Future rejected: boom"
        );
        assert_eq!(
            Error::NoRuntime.to_string(),
            "No tokio runtime available to drive an async source"
        );
    }

    #[test]
    fn test_panic_payloads() {
        let err = Error::projection_panic(Box::new("static message"));
        assert_eq!(err, Error::Projection("static message".into()));

        let err = Error::producer_panic(Box::new(String::from("owned message")));
        assert_eq!(err, Error::Producer("owned message".into()));

        let err = Error::producer_panic(Box::new(42u32));
        assert_eq!(err, Error::Producer("panic with non-string payload".into()));
    }
}
