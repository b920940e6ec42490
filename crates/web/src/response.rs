//! The response built up by the handlers of one dispatch.

use bytes::Bytes;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue, StatusCode};
use mime::Mime;

/// A response under construction.
///
/// Handlers share one `Response` per request. Once [`Response::send`] has been called the
/// response is finished and the driver stops pulling further handlers.
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    finished: bool,
}

impl Response {
    pub fn new() -> Self {
        Self { status: StatusCode::OK, headers: HeaderMap::new(), body: Bytes::new(), finished: false }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) -> &mut Self {
        self.status = status;
        self
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Sets the body, fills in `content-length` and marks the response finished.
    pub fn send(&mut self, body: impl Into<Bytes>) {
        self.body = body.into();
        self.headers.insert(CONTENT_LENGTH, HeaderValue::from(self.body.len()));
        self.finished = true;
    }

    pub fn set_content_type(&mut self, content_type: &Mime) -> &mut Self {
        if let Ok(value) = HeaderValue::from_str(content_type.as_ref()) {
            self.headers.insert(CONTENT_TYPE, value);
        }
        self
    }

    /// Sends a `text/plain; charset=utf-8` body.
    pub fn send_text(&mut self, text: impl Into<String>) {
        self.set_content_type(&mime::TEXT_PLAIN_UTF_8);
        self.send(text.into());
    }

    /// Sends the canonical reason phrase of `status` as the body.
    pub fn send_status(&mut self, status: StatusCode) {
        self.status = status;
        self.send_text(status.canonical_reason().unwrap_or_default());
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn into_http(self) -> http::Response<Bytes> {
        let mut response = http::Response::new(self.body);
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}
