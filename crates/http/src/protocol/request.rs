//! The structured result of parsing a request head.
//!
//! [`RequestHead`] is what the incremental parser hands to the routing layer: the
//! validated method and version, the decoded request target and the ordered headers.

use std::collections::HashMap;

use http::{Method, Uri, Version};
use percent_encoding::percent_decode_str;

use crate::protocol::{Headers, ParseError};

/// Query parameters, every key mapped to its values in arrival order.
pub type QueryParams = HashMap<String, Vec<String>>;

/// A decoded request target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTarget {
    uri: Uri,
    path: String,
    query: QueryParams,
}

impl RequestTarget {
    /// Decodes a raw request target into a percent-decoded path and query parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::BadRequest`] if the target is not a valid URI, if the decoded
    /// path is not UTF-8, or if the query string cannot be decoded.
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        let uri = raw.parse::<Uri>().map_err(|e| ParseError::bad_request(format!("invalid target {raw:?}: {e}")))?;

        let path = percent_decode_str(uri.path())
            .decode_utf8()
            .map_err(|e| ParseError::bad_request(format!("path is not utf-8: {e}")))?
            .into_owned();

        let query = match uri.query() {
            Some(query) => parse_query(query)?,
            None => QueryParams::new(),
        };

        Ok(Self { uri, path, query })
    }

    /// The target exactly as it appeared on the request line.
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &QueryParams {
        &self.query
    }

    /// The first value recorded for a query parameter.
    pub fn query_first(&self, name: &str) -> Option<&str> {
        self.query.get(name).and_then(|values| values.first()).map(String::as_str)
    }
}

fn parse_query(query: &str) -> Result<QueryParams, ParseError> {
    let pairs = serde_urlencoded::from_str::<Vec<(String, String)>>(query)
        .map_err(|e| ParseError::bad_request(format!("invalid query string: {e}")))?;

    let mut params = QueryParams::with_capacity(pairs.len());
    for (key, value) in pairs {
        params.entry(key).or_default().push(value);
    }
    Ok(params)
}

/// A fully parsed request head.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHead {
    method: Method,
    target: RequestTarget,
    version: Version,
    headers: Headers,
}

impl RequestHead {
    pub fn new(method: Method, target: RequestTarget, version: Version, headers: Headers) -> Self {
        Self { method, target, version, headers }
    }

    /// Returns a reference to the request's HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn target(&self) -> &RequestTarget {
        &self.target
    }

    /// The percent-decoded path of the request target.
    pub fn path(&self) -> &str {
        self.target.path()
    }

    pub fn query(&self) -> &QueryParams {
        self.target.query()
    }

    /// Returns the request's HTTP version.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Returns a reference to the request's headers.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// First value of a header, looked up case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get_str(name)
    }

    /// The declared body length, if any.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::BadRequest`] when the header is repeated with different values
    /// or is not a decimal number.
    pub fn content_length(&self) -> Result<Option<u64>, ParseError> {
        let Some(values) = self.headers.get(http::header::CONTENT_LENGTH.as_str()) else {
            return Ok(None);
        };

        let first = values.first().trim();
        if values.iter().any(|value| value.trim() != first) {
            return Err(ParseError::bad_request("conflicting content-length values"));
        }

        first
            .parse::<u64>()
            .map(Some)
            .map_err(|_parse| ParseError::bad_request(format!("content-length {first} is not u64")))
    }

    /// Whether the connection may be reused once this request is answered.
    ///
    /// HTTP/1.1 keeps the connection alive unless `Connection: close` was sent, HTTP/1.0
    /// only when `Connection: keep-alive` was sent.
    pub fn keep_alive(&self) -> bool {
        let has_token = |token: &str| {
            self.headers.get(http::header::CONNECTION.as_str()).is_some_and(|values| {
                values.iter().flat_map(|v| v.split(',')).any(|v| v.trim().eq_ignore_ascii_case(token))
            })
        };

        match self.version {
            Version::HTTP_10 => has_token("keep-alive"),
            _ => !has_token("close"),
        }
    }
}
