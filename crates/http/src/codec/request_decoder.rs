//! HTTP request head decoder
//!
//! [`RequestDecoder`] plugs the incremental [`RequestParser`] into
//! `tokio_util::codec`, so a transport can drive it with `FramedRead`.
//!
//! # Example
//!
//! ```no_run
//! use weft_http::codec::RequestDecoder;
//! use tokio_util::codec::Decoder;
//! use bytes::BytesMut;
//!
//! let mut decoder = RequestDecoder::new();
//! let mut buffer = BytesMut::from(&b"GET / HTTP/1.1\r\nHost: h\r\n\r\n"[..]);
//! let head = decoder.decode(&mut buffer);
//! ```

use bytes::BytesMut;
use tokio_util::codec::Decoder;

use crate::codec::RequestParser;
use crate::config::ParserConfig;
use crate::protocol::{ParseError, RequestHead};

/// A decoder yielding one [`RequestHead`] per request.
///
/// Every byte in the source buffer is handed to the parser. When the head completes, the
/// bytes after it are put back into the source buffer and the decoder is reset for the
/// next request. The caller must drain the body from the buffer before decoding again;
/// the body framing itself is not handled here.
#[derive(Debug)]
pub struct RequestDecoder {
    config: ParserConfig,
    parser: RequestParser,
}

impl RequestDecoder {
    /// Creates a new `RequestDecoder` instance
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ParserConfig) -> Self {
        Self { config, parser: RequestParser::with_config(config) }
    }
}

impl Default for RequestDecoder {
    fn default() -> Self {
        Self::with_config(ParserConfig::default())
    }
}

impl Decoder for RequestDecoder {
    type Item = RequestHead;
    type Error = ParseError;

    /// Attempts to decode a request head from the provided buffer
    ///
    /// # Returns
    ///
    /// - `Ok(Some(head))`: the head is complete, body bytes remain in `src`
    /// - `Ok(None)`: need more data to proceed
    /// - `Err(_)`: the request is malformed and the connection should be closed
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() {
            return Ok(None);
        }

        let chunk = src.split();
        let Some(body) = self.parser.feed(&chunk)? else {
            return Ok(None);
        };

        src.extend_from_slice(&body);
        let parser = std::mem::replace(&mut self.parser, RequestParser::with_config(self.config));
        Ok(parser.into_head())
    }
}
