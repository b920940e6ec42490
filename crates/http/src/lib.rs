//! An incremental HTTP/1.x request head parser
//!
//! This crate turns a byte stream that arrives in fragments of arbitrary size into a
//! structured request head: method, decoded target, protocol version, ordered headers and
//! the first bytes of the body. It is the framing half of the `weft` serving core; the
//! routing half lives in `weft-web`.
//!
//! # Features
//!
//! - Fragment-agnostic: feeding a request byte by byte gives the same result as feeding it
//!   whole
//! - Line ending (`\n` or `\r\n`) discovered from the first line
//! - Folded (continuation) header lines and repeated headers kept as value lists
//! - Bounded memory through a configurable head size limit
//! - A `tokio_util::codec::Decoder` adapter for use with `FramedRead`
//!
//! # Example
//!
//! ```
//! use weft_http::codec::RequestParser;
//! use weft_http::protocol::HeaderValues;
//!
//! let mut parser = RequestParser::new();
//! for chunk in [&b"GET /x?q=1 HT"[..], b"TP/1.1\r\nHost: h\r\nX: a\r\n", b" b\r\n\r\n"] {
//!     if let Some(body) = parser.feed(chunk).unwrap() {
//!         assert!(body.is_empty());
//!     }
//! }
//!
//! let head = parser.into_head().unwrap();
//! assert_eq!(head.path(), "/x");
//! assert_eq!(head.query()["q"], ["1"]);
//! assert_eq!(head.headers().get("X"), Some(&HeaderValues::from(vec!["a", "b"])));
//! ```
//!
//! # Architecture
//!
//! - [`codec`]: the parser stages and the tokio-util decoder
//! - [`protocol`]: request head types and the [`protocol::ParseError`] taxonomy
//! - [`config`]: [`config::ParserConfig`] and its defaults
//!
//! # Limitations
//!
//! - Request heads only: body framing (content-length, chunked) is left to the transport
//! - HTTP/1.0 and HTTP/1.1 only
//! - Methods limited to GET, POST, PUT, DELETE and HEAD
//! - Maximum head size: 8KB by default

pub mod codec;
pub mod config;
pub mod protocol;

mod utils;
pub(crate) use utils::ensure;
