//! Request line validation.
//!
//! The line is split on whitespace into exactly three tokens, then checked in order: token
//! count, protocol version, method. The first failing check decides the error.

use http::{Method, Version};

use crate::protocol::{ParseError, RequestTarget};

/// Methods this server implements. Anything else is answered with 501.
const METHODS: [(&str, Method); 5] = [
    ("GET", Method::GET),
    ("POST", Method::POST),
    ("PUT", Method::PUT),
    ("DELETE", Method::DELETE),
    ("HEAD", Method::HEAD),
];

/// The validated first line of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    pub method: Method,
    pub target: RequestTarget,
    pub version: Version,
}

impl RequestLine {
    /// Parses and validates a request line, terminator already stripped.
    ///
    /// # Errors
    ///
    /// - [`ParseError::BadRequest`] if the line is not UTF-8, does not have exactly three
    ///   tokens, or carries an undecodable target
    /// - [`ParseError::VersionNotSupported`] unless the version is `HTTP/1.0` or `HTTP/1.1`
    /// - [`ParseError::NotImplemented`] for a method outside the method table
    pub fn parse(line: &[u8]) -> Result<Self, ParseError> {
        let line = std::str::from_utf8(line)
            .map_err(|e| ParseError::bad_request(format!("request line is not utf-8: {e}")))?;

        let mut tokens = line.split_ascii_whitespace();
        let (Some(method), Some(target), Some(version), None) =
            (tokens.next(), tokens.next(), tokens.next(), tokens.next())
        else {
            return Err(ParseError::bad_request(format!("malformed request line {line:?}")));
        };

        let version = parse_version(version)?;
        let method = parse_method(method)?;
        let target = RequestTarget::parse(target)?;

        Ok(Self { method, target, version })
    }
}

fn parse_version(token: &str) -> Result<Version, ParseError> {
    match token {
        "HTTP/1.1" => Ok(Version::HTTP_11),
        "HTTP/1.0" => Ok(Version::HTTP_10),
        // HTTP/2 and HTTP/3 are not spoken over this framing
        other => Err(ParseError::version_not_supported(other)),
    }
}

fn parse_method(token: &str) -> Result<Method, ParseError> {
    METHODS
        .iter()
        .find(|(name, _)| *name == token)
        .map(|(_, method)| method.clone())
        .ok_or_else(|| ParseError::not_implemented(token))
}
