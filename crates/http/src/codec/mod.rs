//! HTTP codec module for incrementally decoding request heads
//!
//! The parser is split into the three stages a request head goes through, composed by
//! [`RequestParser`]:
//!
//! - [`LineFramer`]: discovers the line ending and cuts the stream into lines, holding
//!   back incomplete fragments
//! - [`RequestLine`]: validates the first line into method, target and version
//! - [`HeaderAccumulator`]: builds the ordered header map, folding continuation lines
//!
//! [`RequestDecoder`] adapts the parser to `tokio_util::codec::Decoder`.
//!
//! # Example
//!
//! ```
//! use weft_http::codec::RequestParser;
//!
//! let mut parser = RequestParser::new();
//! assert!(parser.feed(b"GET /hello HTTP/1.1\r\nHost: ").unwrap().is_none());
//! let body = parser.feed(b"example.com\r\n\r\n").unwrap();
//! assert_eq!(body.as_deref(), Some(&b""[..]));
//!
//! let head = parser.into_head().unwrap();
//! assert_eq!(head.path(), "/hello");
//! assert_eq!(head.header("host"), Some("example.com"));
//! ```

mod header_accumulator;
mod line_framer;
mod request_decoder;
mod request_line;
mod request_parser;

pub use header_accumulator::HeaderAccumulator;
pub use line_framer::LineEnding;
pub use line_framer::LineFramer;
pub use request_decoder::RequestDecoder;
pub use request_line::RequestLine;
pub use request_parser::Phase;
pub use request_parser::RequestParser;
