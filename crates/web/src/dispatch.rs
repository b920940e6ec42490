//! Lazy, resumable traversal of a middleware chain.
//!
//! [`Dispatch`] yields the handlers that apply to one request, one [`Step`] at a time,
//! depth-first and in registration order. The caller runs each step to completion before
//! pulling the next one.
//!
//! Error handlers are not yielded on the way down. They are collected on a stack as the
//! traversal passes them, and a nested chain stacks its own on top of its parent's. When
//! the caller reports a failure with [`Dispatch::raise_into`], forward traversal ends and
//! the collected error handlers are yielded from the top of the stack down, so the most
//! recently registered one sees the error first. A failure inside an error handler raises
//! again over the handlers not yet offered, one level deeper. Going deeper than
//! [`DispatchConfig::max_error_depth`] aborts the dispatch.

use std::sync::Arc;

use http::Method;
use tracing::{debug, error};

use crate::chain::{MatchPolicy, Middleware, MiddlewareChain, Role};
use crate::config::DispatchConfig;
use crate::handler::BoxError;
use crate::{DispatchError, PathParams, SharedError};

/// One unit of work handed to the caller.
#[derive(Debug)]
pub enum Step<'a, H, E> {
    Handler { handler: &'a H, params: PathParams },
    ErrorHandler { handler: &'a E, error: SharedError },
}

struct Frame<'a, H, E> {
    chain: &'a MiddlewareChain<H, E>,
    // path as seen by this chain, always starting with '/'
    path: String,
    cursor: usize,
    params: PathParams,
    error_handlers: Vec<&'a E>,
}

impl<'a, H, E> Frame<'a, H, E> {
    fn new(chain: &'a MiddlewareChain<H, E>, path: String, params: PathParams) -> Self {
        Self { chain, path, cursor: 0, params, error_handlers: Vec::new() }
    }
}

enum Mode<'a, E> {
    Forward,
    Unwind { handlers: Vec<&'a E>, error: SharedError, depth: usize },
    Finished,
}

pub struct Dispatch<'a, H, E> {
    method: Method,
    frames: Vec<Frame<'a, H, E>>,
    mode: Mode<'a, E>,
    raised: Option<SharedError>,
    max_error_depth: usize,
}

impl<'a, H, E> Dispatch<'a, H, E> {
    pub(crate) fn new(
        chain: &'a MiddlewareChain<H, E>,
        method: Method,
        path: &str,
        config: &DispatchConfig,
    ) -> Self {
        let path = if path.starts_with('/') { path.to_string() } else { format!("/{path}") };
        Self {
            method,
            frames: vec![Frame::new(chain, path, PathParams::empty())],
            mode: Mode::Forward,
            raised: None,
            max_error_depth: config.max_error_depth,
        }
    }

    /// Reports that the step just yielded failed, and returns the first error handler to
    /// run, if any.
    ///
    /// Called after a request handler, this ends forward traversal and starts offering the
    /// error to the error handlers collected so far. Called after an error handler, it
    /// continues with the ones not yet offered at the next depth.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::TooManyErrorHandlers`] once the depth exceeds the
    /// configured maximum. The dispatch is finished afterwards.
    pub fn raise_into(
        &mut self,
        error: impl Into<BoxError>,
    ) -> Result<Option<Step<'a, H, E>>, DispatchError> {
        let error: SharedError = Arc::from(error.into());

        let (handlers, depth) = match std::mem::replace(&mut self.mode, Mode::Finished) {
            Mode::Forward => {
                let handlers = self.frames.drain(..).flat_map(|frame| frame.error_handlers).collect();
                (handlers, 0)
            }
            Mode::Unwind { handlers, depth, .. } => (handlers, depth + 1),
            Mode::Finished => {
                error!(cause = %error, "error raised into a finished dispatch");
                self.raised = Some(error);
                return Ok(None);
            }
        };

        error!(cause = %error, depth, remaining_handlers = handlers.len(), "error raised into dispatch");
        self.raised = Some(Arc::clone(&error));

        if depth > self.max_error_depth {
            return Err(DispatchError::too_many_error_handlers(depth, self.max_error_depth, error));
        }

        self.mode = Mode::Unwind { handlers, error, depth };
        Ok(self.next())
    }

    /// Ends the dispatch without running any further step.
    pub fn stop(&mut self) {
        self.frames.clear();
        self.mode = Mode::Finished;
    }

    pub fn is_unwinding(&self) -> bool {
        matches!(self.mode, Mode::Unwind { .. })
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.mode, Mode::Finished)
    }

    /// How many times error handlers have failed in a row, while unwinding.
    pub fn error_depth(&self) -> Option<usize> {
        match self.mode {
            Mode::Unwind { depth, .. } => Some(depth),
            _ => None,
        }
    }

    /// The most recent error passed to [`Dispatch::raise_into`].
    pub fn error(&self) -> Option<&SharedError> {
        self.raised.as_ref()
    }

    fn next_forward(&mut self) -> Option<Step<'a, H, E>> {
        loop {
            let frame = self.frames.last_mut()?;
            let chain: &'a MiddlewareChain<H, E> = frame.chain;

            let Some(node) = chain.nodes.get(frame.cursor) else {
                self.frames.pop();
                continue;
            };
            frame.cursor += 1;

            if !node.methods.contains(&self.method) {
                continue;
            }
            let Some(matched) = node.pattern.matches(&frame.path) else {
                continue;
            };
            if chain.policy == MatchPolicy::Exact && node.role() != Role::Chain && !matched.is_exact() {
                continue;
            }

            debug!(
                method = %self.method,
                path = %frame.path,
                pattern = node.pattern.as_str(),
                role = ?node.role(),
                "node matched"
            );

            match &node.middleware {
                Middleware::Handler(handler) => {
                    let mut params = frame.params.clone();
                    params.extend_from(&matched);
                    return Some(Step::Handler { handler, params });
                }
                Middleware::ErrorHandler(handler) => frame.error_handlers.push(handler),
                Middleware::Chain(nested) => {
                    let mut params = frame.params.clone();
                    params.extend_from(&matched);
                    let path = format!("/{}", matched.remainder());
                    self.frames.push(Frame::new(nested, path, params));
                }
            }
        }
    }
}

impl<H, E> std::fmt::Debug for Dispatch<'_, H, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatch")
            .field("method", &self.method)
            .field("depth", &self.frames.len())
            .field("unwinding", &self.is_unwinding())
            .field("finished", &self.is_finished())
            .finish_non_exhaustive()
    }
}

impl<'a, H, E> Iterator for Dispatch<'a, H, E> {
    type Item = Step<'a, H, E>;

    fn next(&mut self) -> Option<Self::Item> {
        let step = match self.mode {
            Mode::Forward => self.next_forward(),
            Mode::Unwind { ref mut handlers, ref error, .. } => {
                handlers.pop().map(|handler| Step::ErrorHandler { handler, error: Arc::clone(error) })
            }
            Mode::Finished => None,
        };

        if step.is_none() {
            self.mode = Mode::Finished;
        }
        step
    }
}
