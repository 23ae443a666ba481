use std::fmt;

use thiserror::Error;

/// The error type for all fallible operations in this crate.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct Error {
    kind: ErrorKind,
    message: String,
    #[source]
    source: Option<anyhow::Error>,
}

/// The kind of error that occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// An option, header or argument has an invalid shape or value.
    InvalidArgument,

    /// The HTTP method is not valid for the requested flow.
    UnsupportedMethod,

    /// Access key id or secret is missing from the configuration.
    MissingCredentials,

    /// A policy condition clause is semantically invalid.
    InvalidCondition,

    /// The callback body does not match its declared body type.
    UnsupportedBodyType,

    /// The computed expiration is not in the future.
    ExpirationInPast,

    /// Unexpected errors from underlying infrastructure.
    Unexpected,
}

impl Error {
    /// Create a new error with the given kind and message.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Add a source error.
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Get the error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

// Convenience constructors
impl Error {
    /// Create an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    /// Create an unsupported method error.
    pub fn unsupported_method(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnsupportedMethod, message)
    }

    /// Create a missing credentials error.
    pub fn missing_credentials(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MissingCredentials, message)
    }

    /// Create an invalid condition error.
    pub fn invalid_condition(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidCondition, message)
    }

    /// Create an unsupported body type error.
    pub fn unsupported_body_type(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnsupportedBodyType, message)
    }

    /// Create an expiration in past error.
    pub fn expiration_in_past(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ExpirationInPast, message)
    }

    /// Create an unexpected error.
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unexpected, message)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::InvalidArgument => write!(f, "invalid argument"),
            ErrorKind::UnsupportedMethod => write!(f, "unsupported method"),
            ErrorKind::MissingCredentials => write!(f, "missing credentials"),
            ErrorKind::InvalidCondition => write!(f, "invalid policy condition"),
            ErrorKind::UnsupportedBodyType => write!(f, "unsupported body type"),
            ErrorKind::ExpirationInPast => write!(f, "expiration in past"),
            ErrorKind::Unexpected => write!(f, "unexpected error"),
        }
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, Error>;

// Common From implementations
impl From<std::fmt::Error> for Error {
    fn from(err: std::fmt::Error) -> Self {
        Self::unexpected(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::header::InvalidHeaderName> for Error {
    fn from(err: http::header::InvalidHeaderName) -> Self {
        Self::invalid_argument(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::header::InvalidHeaderValue> for Error {
    fn from(err: http::header::InvalidHeaderValue) -> Self {
        Self::invalid_argument(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::unexpected(err.to_string()).with_source(anyhow::Error::from(err))
    }
}
