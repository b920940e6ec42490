//! Parser configuration.

use serde::Deserialize;

/// Default ceiling, in bytes, for the request line plus headers.
pub const MAX_REQUEST_LENGTH: usize = 8 * 1024;

/// Limits applied by [`RequestParser`](crate::codec::RequestParser).
///
/// Deserializes with defaults for missing fields, so it can be embedded in any
/// serde-readable configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Maximum number of head bytes consumed before the blank line must appear.
    pub max_request_length: usize,
}

impl ParserConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn max_request_length(mut self, max_request_length: usize) -> Self {
        self.max_request_length = max_request_length;
        self
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self { max_request_length: MAX_REQUEST_LENGTH }
    }
}
