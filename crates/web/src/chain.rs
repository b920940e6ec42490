//! Middleware chains and routers.
//!
//! A [`MiddlewareChain`] is an ordered list of nodes. Each node pairs a method mask and a
//! path pattern with one of three roles: a request handler, an error handler, or a nested
//! chain. Insertion order is precedence order, duplicates are kept, and a chain is never
//! modified once it starts serving requests.
//!
//! The only difference between a chain and a [`Router`] is the [`MatchPolicy`]. A chain
//! runs every handler whose pattern is a prefix of the path; a router only runs handlers
//! whose pattern consumes the whole path. Nested chains are entered on a prefix match in
//! both cases.
//!
//! # Example
//!
//! ```
//! use http::Method;
//! use weft_web::chain::MiddlewareChain;
//! use weft_web::dispatch::Step;
//! use weft_web::MethodMask;
//!
//! let mut api = MiddlewareChain::<&str, &str>::router();
//! api.handler(MethodMask::GET, "/users/:id", "show_user").unwrap();
//!
//! let mut app = MiddlewareChain::new();
//! app.handler(MethodMask::ALL, "/", "log").unwrap();
//! app.mount(MethodMask::ALL, "/api", api).unwrap();
//!
//! let steps: Vec<_> = app
//!     .dispatch(&Method::GET, "/api/users/7")
//!     .map(|step| match step {
//!         Step::Handler { handler, params } => format!("{handler} {:?}", params.get("id")),
//!         Step::ErrorHandler { handler, .. } => handler.to_string(),
//!     })
//!     .collect();
//! assert_eq!(steps, ["log None", r#"show_user Some("7")"#]);
//! ```

use std::fmt;

use http::Method;

use crate::config::DispatchConfig;
use crate::dispatch::Dispatch;
use crate::handler::{ErrorHandler, RequestHandler};
use crate::path::PathPattern;
use crate::{MethodMask, RouteError};

pub type BoxedHandler = Box<dyn RequestHandler>;
pub type BoxedErrorHandler = Box<dyn ErrorHandler>;

/// A chain built with [`MatchPolicy::Exact`], see [`MiddlewareChain::router`].
pub type Router<H = BoxedHandler, E = BoxedErrorHandler> = MiddlewareChain<H, E>;

/// The role of a node, fixed when it is registered.
pub enum Middleware<H = BoxedHandler, E = BoxedErrorHandler> {
    Handler(H),
    ErrorHandler(E),
    Chain(MiddlewareChain<H, E>),
}

/// Discriminant of [`Middleware`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Handler,
    ErrorHandler,
    Chain,
}

impl<H, E> Middleware<H, E> {
    pub fn role(&self) -> Role {
        match self {
            Middleware::Handler(_) => Role::Handler,
            Middleware::ErrorHandler(_) => Role::ErrorHandler,
            Middleware::Chain(_) => Role::Chain,
        }
    }
}

impl<H, E> fmt::Debug for Middleware<H, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Middleware::Handler(_) => f.write_str("Handler"),
            Middleware::ErrorHandler(_) => f.write_str("ErrorHandler"),
            Middleware::Chain(chain) => f.debug_tuple("Chain").field(chain).finish(),
        }
    }
}

pub struct MiddlewareNode<H = BoxedHandler, E = BoxedErrorHandler> {
    pub(crate) methods: MethodMask,
    pub(crate) pattern: PathPattern,
    pub(crate) middleware: Middleware<H, E>,
}

impl<H, E> MiddlewareNode<H, E> {
    pub fn methods(&self) -> MethodMask {
        self.methods
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    pub fn middleware(&self) -> &Middleware<H, E> {
        &self.middleware
    }

    pub fn role(&self) -> Role {
        self.middleware.role()
    }
}

impl<H, E> fmt::Debug for MiddlewareNode<H, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareNode")
            .field("methods", &self.methods)
            .field("pattern", &self.pattern.as_str())
            .field("middleware", &self.middleware)
            .finish()
    }
}

/// How handler and error-handler patterns are matched against the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPolicy {
    /// The pattern may leave a remainder.
    Prefix,
    /// The pattern has to consume the whole path, up to a trailing slash.
    Exact,
}

pub struct MiddlewareChain<H = BoxedHandler, E = BoxedErrorHandler> {
    pub(crate) nodes: Vec<MiddlewareNode<H, E>>,
    pub(crate) policy: MatchPolicy,
    config: DispatchConfig,
}

impl<H, E> MiddlewareChain<H, E> {
    /// An empty chain with prefix matching.
    pub fn new() -> Self {
        Self::with_policy(MatchPolicy::Prefix)
    }

    /// An empty chain with exact matching.
    pub fn router() -> Self {
        Self::with_policy(MatchPolicy::Exact)
    }

    pub fn with_policy(policy: MatchPolicy) -> Self {
        Self { nodes: Vec::new(), policy, config: DispatchConfig::default() }
    }

    /// Replaces the configuration used by [`MiddlewareChain::dispatch`].
    #[must_use]
    pub fn config(mut self, config: DispatchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn dispatch_config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    pub fn nodes(&self) -> &[MiddlewareNode<H, E>] {
        &self.nodes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Appends a node.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidPattern`] when `path` does not compile.
    pub fn add(
        &mut self,
        methods: MethodMask,
        path: &str,
        middleware: Middleware<H, E>,
    ) -> Result<&mut Self, RouteError> {
        let pattern = PathPattern::parse(path)?;
        self.nodes.push(MiddlewareNode { methods, pattern, middleware });
        Ok(self)
    }

    /// Appends a request handler node.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidPattern`] when `path` does not compile.
    pub fn handler(&mut self, methods: MethodMask, path: &str, handler: H) -> Result<&mut Self, RouteError> {
        self.add(methods, path, Middleware::Handler(handler))
    }

    /// Appends an error handler node.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidPattern`] when `path` does not compile.
    pub fn error_handler(
        &mut self,
        methods: MethodMask,
        path: &str,
        handler: E,
    ) -> Result<&mut Self, RouteError> {
        self.add(methods, path, Middleware::ErrorHandler(handler))
    }

    /// Nests `chain` under `path`. The nested chain sees the path with the matched prefix
    /// removed.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidPattern`] when `path` does not compile.
    pub fn mount(
        &mut self,
        methods: MethodMask,
        path: &str,
        chain: MiddlewareChain<H, E>,
    ) -> Result<&mut Self, RouteError> {
        self.add(methods, path, Middleware::Chain(chain))
    }

    /// Starts a lazy traversal for one request.
    pub fn dispatch<'a>(&'a self, method: &Method, path: &str) -> Dispatch<'a, H, E> {
        Dispatch::new(self, method.clone(), path, &self.config)
    }

    /// Like [`MiddlewareChain::dispatch`] with an explicit configuration.
    pub fn dispatch_with<'a>(
        &'a self,
        method: &Method,
        path: &str,
        config: &DispatchConfig,
    ) -> Dispatch<'a, H, E> {
        Dispatch::new(self, method.clone(), path, config)
    }
}

impl MiddlewareChain<BoxedHandler, BoxedErrorHandler> {
    /// Boxes `handler` and appends it.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidPattern`] when `path` does not compile.
    pub fn route(
        &mut self,
        methods: MethodMask,
        path: &str,
        handler: impl RequestHandler + 'static,
    ) -> Result<&mut Self, RouteError> {
        self.handler(methods, path, Box::new(handler))
    }

    /// Boxes `handler` and appends it as an error handler.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidPattern`] when `path` does not compile.
    pub fn catch(
        &mut self,
        methods: MethodMask,
        path: &str,
        handler: impl ErrorHandler + 'static,
    ) -> Result<&mut Self, RouteError> {
        self.error_handler(methods, path, Box::new(handler))
    }
}

impl<H, E> Default for MiddlewareChain<H, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H, E> fmt::Debug for MiddlewareChain<H, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareChain").field("policy", &self.policy).field("nodes", &self.nodes).finish()
    }
}
