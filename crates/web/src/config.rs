//! Dispatch configuration.

use serde::Deserialize;

/// Default number of consecutive error-handler failures tolerated in one dispatch.
pub const MAX_ERROR_DEPTH: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// How many times error handlers may fail in a row before the dispatch gives up.
    pub max_error_depth: usize,
}

impl DispatchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn max_error_depth(mut self, max_error_depth: usize) -> Self {
        self.max_error_depth = max_error_depth;
        self
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self { max_error_depth: MAX_ERROR_DEPTH }
    }
}
