use std::error::Error as StdError;
use std::sync::Arc;

use thiserror::Error;

/// Error value handed to error handlers. Shared so that every handler in an unwind sees
/// the same instance.
pub type SharedError = Arc<dyn StdError + Send + Sync>;

/// Raised while registering a middleware node.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error("invalid path pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

impl RouteError {
    pub fn invalid_pattern<P: ToString, S: ToString>(pattern: P, reason: S) -> Self {
        Self::InvalidPattern { pattern: pattern.to_string(), reason: reason.to_string() }
    }
}

/// Raised by [`Dispatch::raise_into`](crate::dispatch::Dispatch::raise_into).
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("error handlers failed {depth} times in a row, the limit is {max_depth}: {source}")]
    TooManyErrorHandlers { depth: usize, max_depth: usize, source: SharedError },
}

impl DispatchError {
    pub fn too_many_error_handlers(depth: usize, max_depth: usize, source: SharedError) -> Self {
        Self::TooManyErrorHandlers { depth, max_depth, source }
    }
}

#[derive(Error, Debug)]
pub enum AppBuildError {
    #[error("middleware chain must be set")]
    MissingChain,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn messages() {
        let err = RouteError::invalid_pattern("/a/:", "parameter without a name");
        assert_eq!(err.to_string(), r#"invalid path pattern "/a/:": parameter without a name"#);

        let source: SharedError = Arc::new(io::Error::other("boom"));
        let err = DispatchError::too_many_error_handlers(11, 10, source);
        assert_eq!(err.to_string(), "error handlers failed 11 times in a row, the limit is 10: boom");
        assert_eq!(err.source().map(ToString::to_string), Some("boom".to_string()));
    }
}
