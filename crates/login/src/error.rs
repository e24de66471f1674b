use std::time::Duration;

use thiserror::Error;

use crate::strategy::LoginStrategy;

#[derive(Debug, Error)]
pub enum Error {
    /// No loopback listener could be acquired for the import page.
    #[error("failed to bind loopback listener: {source}")]
    Bind {
        #[source]
        source: std::io::Error,
    },

    /// The authenticator rejected or could not complete the exchange.
    #[error("{strategy} authentication failed: {source}")]
    Authentication {
        strategy: LoginStrategy,
        #[source]
        source: Box<Error>,
    },

    /// Nothing was submitted to the import page before the deadline.
    #[error("timed out after {after:?} waiting for JSON input")]
    Timeout { after: Duration },

    /// A submission arrived but carried no bytes.
    #[error("no JSON data received")]
    EmptyPayload,

    /// The credential store rejected the record. The record is discarded.
    #[error("failed to save credential: {source}")]
    Persistence {
        #[source]
        source: Box<Error>,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("{message}")]
    Message { message: String },
}

impl Error {
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn authentication(strategy: LoginStrategy, source: Error) -> Self {
        Self::Authentication {
            strategy,
            source: Box::new(source),
        }
    }

    #[must_use]
    pub fn persistence(source: Error) -> Self {
        Self::Persistence {
            source: Box::new(source),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_message_keeps_sub_second_precision() {
        let short = Error::Timeout {
            after: Duration::from_millis(500),
        };
        assert_eq!(short.to_string(), "timed out after 500ms waiting for JSON input");

        let default = Error::Timeout {
            after: Duration::from_secs(300),
        };
        assert_eq!(default.to_string(), "timed out after 300s waiting for JSON input");
    }

    #[test]
    fn authentication_names_the_strategy() {
        let err = Error::authentication(
            LoginStrategy::DeviceCodeOAuth,
            Error::message("authorization denied"),
        );
        assert_eq!(
            err.to_string(),
            "Kiro AWS authentication failed: authorization denied"
        );
    }
}
