//! Per-request state shared by the handlers of one dispatch.
//!
//! [`RequestContext`] owns the parsed [`RequestHead`], the body bytes that arrived with the
//! head, and the [`PathParams`] captured by the route of the handler currently running.

use bytes::Bytes;
use http::{Method, Version};
use weft_http::protocol::{HeaderValues, Headers, QueryParams, RequestHead};

use crate::PathParams;

#[derive(Debug)]
pub struct RequestContext {
    head: RequestHead,
    body: Bytes,
    path_params: PathParams,
}

impl RequestContext {
    /// Creates a context with no path parameters.
    pub fn new(head: RequestHead, body: Bytes) -> Self {
        Self { head, body, path_params: PathParams::empty() }
    }

    /// Returns a reference to the underlying RequestHead
    pub fn head(&self) -> &RequestHead {
        &self.head
    }

    pub fn method(&self) -> &Method {
        self.head.method()
    }

    /// The percent-decoded request path.
    pub fn path(&self) -> &str {
        self.head.path()
    }

    pub fn query(&self) -> &QueryParams {
        self.head.query()
    }

    pub fn version(&self) -> Version {
        self.head.version()
    }

    pub fn headers(&self) -> &Headers {
        self.head.headers()
    }

    /// First value of a header, looked up case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.head.header(name)
    }

    pub fn header_values(&self, name: &str) -> Option<&HeaderValues> {
        self.head.headers().get(name)
    }

    /// Body bytes received together with the head. The rest of the body, if any, is
    /// still with the transport.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns a reference to the path parameters extracted from the request URL
    pub fn path_params(&self) -> &PathParams {
        &self.path_params
    }

    pub(crate) fn set_path_params(&mut self, path_params: PathParams) {
        self.path_params = path_params;
    }

    pub fn into_parts(self) -> (RequestHead, Bytes) {
        (self.head, self.body)
    }
}
