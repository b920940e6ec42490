use http::StatusCode;
use std::io;
use thiserror::Error;

/// Errors raised while parsing a request head.
///
/// Every variant is terminal for the current request: the transport should answer with
/// [`ParseError::status_code`] and close the connection. The parser never retries.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("bad request: {reason}")]
    BadRequest { reason: String },

    #[error("method not implemented: {method}")]
    NotImplemented { method: String },

    #[error("http version not supported: {version}")]
    VersionNotSupported { version: String },

    #[error("invalid header: {reason}")]
    InvalidHeader { reason: String },

    #[error("request head too large, current: {current_size} exceed the limit {max_size}")]
    RequestTooLarge { current_size: usize, max_size: usize },

    #[error("parser is no longer accepting input")]
    AlreadyComplete,

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    pub fn bad_request<S: ToString>(str: S) -> Self {
        Self::BadRequest { reason: str.to_string() }
    }

    pub fn not_implemented<S: ToString>(method: S) -> Self {
        Self::NotImplemented { method: method.to_string() }
    }

    pub fn version_not_supported<S: ToString>(version: S) -> Self {
        Self::VersionNotSupported { version: version.to_string() }
    }

    pub fn invalid_header<S: ToString>(str: S) -> Self {
        Self::InvalidHeader { reason: str.to_string() }
    }

    pub fn request_too_large(current_size: usize, max_size: usize) -> Self {
        Self::RequestTooLarge { current_size, max_size }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }

    /// The status the transport should answer with before dropping the connection.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } | Self::InvalidHeader { .. } => StatusCode::BAD_REQUEST,
            Self::NotImplemented { .. } => StatusCode::NOT_IMPLEMENTED,
            Self::VersionNotSupported { .. } => StatusCode::HTTP_VERSION_NOT_SUPPORTED,
            Self::RequestTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::AlreadyComplete | Self::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
