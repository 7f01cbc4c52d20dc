use thiserror::Error;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Local validation failures, reported before any network call is made.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("limit order requires a price")]
    MissingLimitPrice,

    #[error("order amount must be positive, got {amount}")]
    NonPositiveAmount { amount: rust_decimal::Decimal },

    #[error("order price must be positive, got {price}")]
    NonPositivePrice { price: rust_decimal::Decimal },

    #[error("order filter requires a symbol")]
    MissingSymbol,

    #[error("topic '{topic}' does not match layout: {reason}")]
    InvalidTopic { topic: String, reason: &'static str },

    #[error("order id cannot be empty")]
    EmptyOrderId,
}

/// Failures of the underlying HTTP or WebSocket collaborator.
///
/// These are surfaced as-is; nothing in the core retries them.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("WebSocket error: {0}")]
    WebSocket(Box<tokio_tungstenite::tungstenite::Error>),

    #[error("unexpected HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("stream closed")]
    Closed,

    #[error("not connected")]
    NotConnected,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<tokio_tungstenite::tungstenite::Error> for TransportError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        TransportError::WebSocket(Box::new(err))
    }
}

/// Signing failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SigningError {
    #[error("signing secret is empty")]
    EmptySecret,

    #[error("invalid MAC key: {0}")]
    InvalidKey(String),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Signing(#[from] SigningError),

    /// The exchange rejected the request signature or key.
    #[error("{exchange} rejected authentication [{code}]: {message}")]
    Auth {
        exchange: &'static str,
        code: String,
        message: String,
    },

    /// The exchange reported a business failure in the response body.
    #[error("{exchange} error [{code}]: {message}")]
    Exchange {
        exchange: &'static str,
        code: String,
        message: String,
    },

    /// A response used a value outside the exchange's vocabulary table.
    #[error("{exchange} returned unknown {field} '{value}'")]
    UnknownVocabulary {
        exchange: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("failed to decode {context}: {reason}")]
    Decode {
        context: &'static str,
        reason: String,
    },

    #[error("invalid credentials: {0}")]
    CredentialsInvalid(&'static str),
}

impl Error {
    pub(crate) fn decode(context: &'static str, reason: impl ToString) -> Self {
        Error::Decode {
            context,
            reason: reason.to_string(),
        }
    }

    /// True when the exchange refused the signature or key.
    ///
    /// Seen after a period of successful calls, this points at a
    /// canonicalization mismatch rather than bad credentials.
    #[must_use]
    pub fn is_auth(&self) -> bool {
        matches!(self, Error::Auth { .. })
    }

    /// True for connectivity failures a caller may choose to re-issue.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Transport(TransportError::Http(e)) => e.is_timeout() || e.is_connect(),
            Error::Transport(TransportError::Status { status, .. }) => *status >= 500,
            Error::Transport(_) => true,
            _ => false,
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for Error {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        Error::Transport(err.into())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(err.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exchange_error_carries_native_message() {
        let err = Error::Exchange {
            exchange: "huobi",
            code: "order-orderstate-error".into(),
            message: "the order state is error".into(),
        };
        assert_eq!(
            err.to_string(),
            "huobi error [order-orderstate-error]: the order state is error"
        );
        assert!(!err.is_auth());
        assert!(!err.is_transient());
    }

    #[test]
    fn closed_stream_is_transient() {
        assert!(Error::Transport(TransportError::Closed).is_transient());
        assert!(Error::Transport(TransportError::Status {
            status: 502,
            body: String::new()
        })
        .is_transient());
        assert!(!Error::Transport(TransportError::Status {
            status: 404,
            body: String::new()
        })
        .is_transient());
    }

    #[test]
    fn unknown_vocabulary_names_the_raw_value() {
        let err = Error::UnknownVocabulary {
            exchange: "fcoin",
            field: "order state",
            value: "weird_state".into(),
        };
        assert!(err.to_string().contains("weird_state"));
    }
}
