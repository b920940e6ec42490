//! Handler traits driven by [`App`](crate::App).
//!
//! A [`RequestHandler`] works on the request and the response under construction and
//! tells the driver whether the dispatch should go on. An [`ErrorHandler`] is offered a
//! failure raised by an earlier handler; returning `Ok` means the error was dealt with,
//! returning `Err` raises a new error to the handlers registered before it.

use std::error::Error;
use std::fmt;

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::{RequestContext, Response};

/// Error type returned by handlers.
pub type BoxError = Box<dyn Error + Send + Sync>;

/// What the driver should do after a handler returns successfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Move on to the next step, unless the response has been sent.
    Continue,
    /// End the dispatch here.
    Stop,
}

#[async_trait]
pub trait RequestHandler: Send + Sync {
    async fn invoke(&self, req: &mut RequestContext, resp: &mut Response) -> Result<Flow, BoxError>;
}

#[async_trait]
pub trait ErrorHandler: Send + Sync {
    async fn invoke(
        &self,
        req: &mut RequestContext,
        resp: &mut Response,
        error: &(dyn Error + Send + Sync),
    ) -> Result<Flow, BoxError>;
}

#[async_trait]
impl<T: RequestHandler + ?Sized> RequestHandler for Box<T> {
    async fn invoke(&self, req: &mut RequestContext, resp: &mut Response) -> Result<Flow, BoxError> {
        (**self).invoke(req, resp).await
    }
}

#[async_trait]
impl<T: ErrorHandler + ?Sized> ErrorHandler for Box<T> {
    async fn invoke(
        &self,
        req: &mut RequestContext,
        resp: &mut Response,
        error: &(dyn Error + Send + Sync),
    ) -> Result<Flow, BoxError> {
        (**self).invoke(req, resp, error).await
    }
}

/// A synchronous closure acting as a [`RequestHandler`].
pub struct FnHandler<F> {
    f: F,
}

impl<F> fmt::Debug for FnHandler<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnHandler")
    }
}

pub fn handler_fn<F>(f: F) -> FnHandler<F>
where
    F: Fn(&mut RequestContext, &mut Response) -> Result<Flow, BoxError> + Send + Sync,
{
    FnHandler { f }
}

#[async_trait]
impl<F> RequestHandler for FnHandler<F>
where
    F: Fn(&mut RequestContext, &mut Response) -> Result<Flow, BoxError> + Send + Sync,
{
    async fn invoke(&self, req: &mut RequestContext, resp: &mut Response) -> Result<Flow, BoxError> {
        (self.f)(req, resp)
    }
}

/// A synchronous closure acting as an [`ErrorHandler`].
pub struct FnErrorHandler<F> {
    f: F,
}

impl<F> fmt::Debug for FnErrorHandler<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnErrorHandler")
    }
}

pub fn error_handler_fn<F>(f: F) -> FnErrorHandler<F>
where
    F: Fn(&mut RequestContext, &mut Response, &(dyn Error + Send + Sync)) -> Result<Flow, BoxError> + Send + Sync,
{
    FnErrorHandler { f }
}

#[async_trait]
impl<F> ErrorHandler for FnErrorHandler<F>
where
    F: Fn(&mut RequestContext, &mut Response, &(dyn Error + Send + Sync)) -> Result<Flow, BoxError> + Send + Sync,
{
    async fn invoke(
        &self,
        req: &mut RequestContext,
        resp: &mut Response,
        error: &(dyn Error + Send + Sync),
    ) -> Result<Flow, BoxError> {
        (self.f)(req, resp, error)
    }
}

/// An async closure acting as a [`RequestHandler`].
///
/// The closure returns a boxed future borrowing the request and the response, so it is
/// written as `|req, resp| Box::pin(async move { .. })`.
pub struct AsyncFnHandler<F> {
    f: F,
}

impl<F> fmt::Debug for AsyncFnHandler<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AsyncFnHandler")
    }
}

pub fn async_handler_fn<F>(f: F) -> AsyncFnHandler<F>
where
    F: for<'a> Fn(&'a mut RequestContext, &'a mut Response) -> BoxFuture<'a, Result<Flow, BoxError>> + Send + Sync,
{
    AsyncFnHandler { f }
}

#[async_trait]
impl<F> RequestHandler for AsyncFnHandler<F>
where
    F: for<'a> Fn(&'a mut RequestContext, &'a mut Response) -> BoxFuture<'a, Result<Flow, BoxError>> + Send + Sync,
{
    async fn invoke(&self, req: &mut RequestContext, resp: &mut Response) -> Result<Flow, BoxError> {
        (self.f)(req, resp).await
    }
}

/// An async closure acting as an [`ErrorHandler`].
pub struct AsyncFnErrorHandler<F> {
    f: F,
}

impl<F> fmt::Debug for AsyncFnErrorHandler<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AsyncFnErrorHandler")
    }
}

pub fn async_error_handler_fn<F>(f: F) -> AsyncFnErrorHandler<F>
where
    F: for<'a> Fn(
            &'a mut RequestContext,
            &'a mut Response,
            &'a (dyn Error + Send + Sync),
        ) -> BoxFuture<'a, Result<Flow, BoxError>>
        + Send
        + Sync,
{
    AsyncFnErrorHandler { f }
}

#[async_trait]
impl<F> ErrorHandler for AsyncFnErrorHandler<F>
where
    F: for<'a> Fn(
            &'a mut RequestContext,
            &'a mut Response,
            &'a (dyn Error + Send + Sync),
        ) -> BoxFuture<'a, Result<Flow, BoxError>>
        + Send
        + Sync,
{
    async fn invoke(
        &self,
        req: &mut RequestContext,
        resp: &mut Response,
        error: &(dyn Error + Send + Sync),
    ) -> Result<Flow, BoxError> {
        (self.f)(req, resp, error).await
    }
}
