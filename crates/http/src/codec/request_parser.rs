//! Incremental request head parser.
//!
//! [`RequestParser`] accepts fragments of any size, in arrival order, and moves through
//! three phases:
//!
//! ```text
//! AwaitingRequestLine --(first line)--> AwaitingHeaders --(blank line)--> Complete
//! ```
//!
//! Phases never move backwards. Once `Complete`, the parser is read-only and further
//! input is rejected with [`ParseError::AlreadyComplete`]. A parser that returned an
//! error is poisoned the same way, every parse error being terminal for the request.
//!
//! # Limits
//!
//! Head bytes (request line, headers and the blank line) are counted against
//! [`ParserConfig::max_request_length`]. Exceeding it raises
//! [`ParseError::RequestTooLarge`] in both phases. Body bytes that arrive in the same
//! fragment as the blank line are not counted.

use bytes::Bytes;
use tracing::trace;

use crate::codec::header_accumulator::HeaderAccumulator;
use crate::codec::line_framer::{LineEnding, LineFramer};
use crate::codec::request_line::RequestLine;
use crate::config::ParserConfig;
use crate::ensure;
use crate::protocol::{Headers, ParseError, RequestHead};

/// Where a parser is in the request head.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingRequestLine,
    AwaitingHeaders,
    Complete,
}

/// Parses one request head, owned by a single connection.
#[derive(Debug)]
pub struct RequestParser {
    config: ParserConfig,
    phase: Phase,
    framer: LineFramer,
    bytes_consumed: usize,
    request_line: Option<RequestLine>,
    accumulator: HeaderAccumulator,
    headers: Option<Headers>,
    poisoned: bool,
}

impl RequestParser {
    /// Creates a parser with the default [`ParserConfig`].
    pub fn new() -> Self {
        Self::with_config(ParserConfig::default())
    }

    pub fn with_config(config: ParserConfig) -> Self {
        Self {
            config,
            phase: Phase::AwaitingRequestLine,
            framer: LineFramer::new(),
            bytes_consumed: 0,
            request_line: None,
            accumulator: HeaderAccumulator::new(),
            headers: None,
            poisoned: false,
        }
    }

    /// Consumes the next fragment of the stream.
    ///
    /// # Returns
    ///
    /// - `Ok(None)` while the head is incomplete
    /// - `Ok(Some(body))` once the blank line was seen, `body` being every byte after it
    ///   (possibly empty)
    ///
    /// # Errors
    ///
    /// Any [`ParseError`] from the request line, the headers or the size limit. Feeding a
    /// parser that already completed or failed returns [`ParseError::AlreadyComplete`].
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Option<Bytes>, ParseError> {
        ensure!(!self.poisoned && self.phase != Phase::Complete, ParseError::AlreadyComplete);

        let result = self.advance(chunk);
        if result.is_err() {
            self.poisoned = true;
        }
        result
    }

    fn advance(&mut self, chunk: &[u8]) -> Result<Option<Bytes>, ParseError> {
        let max_size = self.config.max_request_length;
        self.bytes_consumed += chunk.len();
        self.framer.push(chunk);

        while let Some(line) = self.framer.next_line() {
            match self.phase {
                Phase::AwaitingRequestLine => {
                    let request_line = RequestLine::parse(&line)?;
                    trace!(method = %request_line.method, path = request_line.target.path(), "parsed request line");
                    self.request_line = Some(request_line);
                    self.phase = Phase::AwaitingHeaders;
                }
                Phase::AwaitingHeaders if line.is_empty() => {
                    let body = self.framer.take_remaining();
                    let head_size = self.bytes_consumed - body.len();
                    ensure!(head_size <= max_size, ParseError::request_too_large(head_size, max_size));

                    self.headers = Some(std::mem::take(&mut self.accumulator).finish());
                    self.phase = Phase::Complete;
                    trace!(head_size, body_size = body.len(), "request head complete");
                    return Ok(Some(body));
                }
                Phase::AwaitingHeaders => self.accumulator.push_line(&line)?,
                Phase::Complete => return Err(ParseError::AlreadyComplete),
            }
        }

        ensure!(self.bytes_consumed <= max_size, ParseError::request_too_large(self.bytes_consumed, max_size));
        Ok(None)
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Complete
    }

    /// The line ending discovered from the first `\n`, if any arrived yet.
    pub fn line_ending(&self) -> Option<LineEnding> {
        self.framer.line_ending()
    }

    /// Total bytes fed so far.
    pub fn bytes_consumed(&self) -> usize {
        self.bytes_consumed
    }

    pub fn request_line(&self) -> Option<&RequestLine> {
        self.request_line.as_ref()
    }

    /// The header map, available once the head is complete.
    pub fn headers(&self) -> Option<&Headers> {
        self.headers.as_ref()
    }

    /// Converts a completed parser into its [`RequestHead`], `None` if not complete.
    pub fn into_head(self) -> Option<RequestHead> {
        let RequestLine { method, target, version } = self.request_line?;
        let headers = self.headers?;
        Some(RequestHead::new(method, target, version, headers))
    }
}

impl Default for RequestParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::HeaderValues;
    use bytes::BytesMut;
    use http::{Method, Version};
    use indoc::indoc;

    const SIMPLE: &[u8] = b"GET /x?q=1 HTTP/1.1\r\nHost: h\r\nX: a\r\n b\r\n\r\n";

    fn parse_whole(input: &[u8]) -> (RequestHead, Bytes) {
        let mut parser = RequestParser::new();
        let body = parser.feed(input).unwrap().expect("head should be complete");
        (parser.into_head().unwrap(), body)
    }

    fn parse_in_chunks(input: &[u8], size: usize) -> (RequestHead, Bytes) {
        let mut parser = RequestParser::new();
        let mut body: Option<BytesMut> = None;
        for chunk in input.chunks(size) {
            if let Some(body) = body.as_mut() {
                // the rest of the stream belongs to the body
                body.extend_from_slice(chunk);
            } else {
                body = parser.feed(chunk).unwrap().map(|start| BytesMut::from(&start[..]));
            }
        }
        (parser.into_head().unwrap(), body.expect("head should be complete").freeze())
    }

    #[test]
    fn parses_folded_request() {
        let (head, body) = parse_whole(SIMPLE);

        assert_eq!(head.method(), &Method::GET);
        assert_eq!(head.version(), Version::HTTP_11);
        assert_eq!(head.path(), "/x");
        assert_eq!(head.query().get("q"), Some(&vec!["1".to_string()]));
        assert_eq!(head.headers().len(), 2);
        assert_eq!(head.headers().get("HOST"), Some(&HeaderValues::from("h")));
        assert_eq!(head.headers().get("X"), Some(&HeaderValues::from(vec!["a", "b"])));
        assert!(body.is_empty());
    }

    #[test]
    fn chunking_does_not_change_result() {
        let input = indoc! {b"
            POST /submit?a=1&a=2 HTTP/1.0
            Host: 127.0.0.1:8080
            Accept: */*
            X-Folded: one
              two
            Accept: text/html

            name=value"};

        let expected = parse_whole(input);
        for size in 1..=input.len() {
            assert_eq!(parse_in_chunks(input, size), expected, "chunk size {size}");
        }
        assert_eq!(expected.1, Bytes::from_static(b"name=value"));
        assert_eq!(expected.0.headers().get("ACCEPT"), Some(&HeaderValues::from(vec!["*/*", "text/html"])));
    }

    #[test]
    fn chunking_crlf_does_not_change_result() {
        let expected = parse_whole(SIMPLE);
        for size in 1..=SIMPLE.len() {
            assert_eq!(parse_in_chunks(SIMPLE, size), expected, "chunk size {size}");
        }
    }

    #[test]
    fn discovers_line_ending() {
        for (input, ending) in [
            (&b"DELETE /item/1 HTTP/1.1\nHost: h\n\n"[..], LineEnding::Lf),
            (&b"DELETE /item/1 HTTP/1.1\r\nHost: h\r\n\r\n"[..], LineEnding::CrLf),
        ] {
            let mut parser = RequestParser::new();
            assert_eq!(parser.line_ending(), None);
            assert!(parser.feed(input).unwrap().is_some());
            assert_eq!(parser.line_ending(), Some(ending));
            assert_eq!(parser.headers().and_then(|h| h.get_str("host")), Some("h"));
        }
    }

    #[test]
    fn cr_lf_split_between_fragments() {
        let mut parser = RequestParser::new();
        assert_eq!(parser.feed(b"GET / HTTP/1.1\r").unwrap(), None);
        assert_eq!(parser.phase(), Phase::AwaitingRequestLine);
        assert_eq!(parser.feed(b"\n").unwrap(), None);
        assert_eq!(parser.phase(), Phase::AwaitingHeaders);
        assert_eq!(parser.line_ending(), Some(LineEnding::CrLf));
        assert_eq!(parser.feed(b"\r").unwrap(), None);
        assert_eq!(parser.feed(b"\nbody").unwrap(), Some(Bytes::from_static(b"body")));
        assert!(parser.is_complete());
    }

    #[test]
    fn empty_fragments_are_accepted() {
        let mut parser = RequestParser::new();
        assert_eq!(parser.feed(b"").unwrap(), None);
        assert_eq!(parser.feed(b"HEAD / HTTP/1.1\n").unwrap(), None);
        assert_eq!(parser.feed(b"").unwrap(), None);
        assert_eq!(parser.feed(b"\n").unwrap(), Some(Bytes::new()));
        assert_eq!(parser.into_head().unwrap().method(), &Method::HEAD);
    }

    #[test]
    fn forbidden_header_name_anywhere_in_stream() {
        let input = b"GET / HTTP/1.1\r\nHost: h\r\nBad{Name: v\r\nOther: x\r\n\r\n";
        for size in 1..=input.len() {
            let mut parser = RequestParser::new();
            let err = input.chunks(size).find_map(|chunk| parser.feed(chunk).err()).expect("must fail");
            assert!(matches!(err, ParseError::InvalidHeader { .. }), "chunk size {size} gave {err}");
        }
    }

    #[test]
    fn request_line_errors() {
        let cases: [(&[u8], fn(&ParseError) -> bool); 4] = [
            (b"GET /\r\n\r\n", |e| matches!(e, ParseError::BadRequest { .. })),
            (b"\r\nGET / HTTP/1.1\r\n\r\n", |e| matches!(e, ParseError::BadRequest { .. })),
            (b"GET / HTTP/0.9\r\n\r\n", |e| matches!(e, ParseError::VersionNotSupported { .. })),
            (b"PATCH / HTTP/1.1\r\n\r\n", |e| matches!(e, ParseError::NotImplemented { .. })),
        ];

        for (input, check) in cases {
            let err = RequestParser::new().feed(input).unwrap_err();
            assert!(check(&err), "{:?} gave {err}", String::from_utf8_lossy(input));
        }
    }

    #[test]
    fn too_large_in_request_line_phase() {
        let mut parser = RequestParser::with_config(ParserConfig::new().max_request_length(16));
        assert_eq!(parser.feed(b"GET /aaaaaaa").unwrap(), None);
        let err = parser.feed(b"aaaaaaaaaaaaa").unwrap_err();
        assert!(matches!(err, ParseError::RequestTooLarge { current_size: 25, max_size: 16 }));
    }

    #[test]
    fn too_large_in_header_phase() {
        let mut parser = RequestParser::with_config(ParserConfig::new().max_request_length(32));
        assert_eq!(parser.feed(b"GET / HTTP/1.1\r\n").unwrap(), None);
        let mut result = Ok(None);
        for _ in 0..10 {
            result = parser.feed(b"X: y\r\n");
            if result.is_err() {
                break;
            }
        }
        assert!(matches!(result, Err(ParseError::RequestTooLarge { .. })));
    }

    #[test]
    fn overflow_never_yields_body() {
        let input = b"GET / HTTP/1.1\r\nHost: h\r\n\r\n";
        let mut parser = RequestParser::with_config(ParserConfig::new().max_request_length(input.len() - 1));
        assert!(matches!(parser.feed(input), Err(ParseError::RequestTooLarge { .. })));
        assert!(parser.into_head().is_none());
    }

    #[test]
    fn body_bytes_do_not_count_toward_limit() {
        let head = b"GET / HTTP/1.1\r\nHost: h\r\n\r\n";
        let mut input = head.to_vec();
        input.extend_from_slice(&[b'z'; 100]);

        let mut parser = RequestParser::with_config(ParserConfig::new().max_request_length(head.len()));
        let body = parser.feed(&input).unwrap().unwrap();
        assert_eq!(body.len(), 100);
        assert_eq!(parser.bytes_consumed(), input.len());
    }

    #[test]
    fn feed_after_complete_fails_fast() {
        let mut parser = RequestParser::new();
        parser.feed(SIMPLE).unwrap();
        assert!(matches!(parser.feed(b"more"), Err(ParseError::AlreadyComplete)));
        assert!(matches!(parser.feed(b""), Err(ParseError::AlreadyComplete)));
    }

    #[test]
    fn failed_parser_is_poisoned() {
        let mut parser = RequestParser::new();
        assert!(parser.feed(b"GET / HTTP/1.1\r\n: v\r\n").is_err());
        assert!(matches!(parser.feed(b"\r\n"), Err(ParseError::AlreadyComplete)));
    }

    #[test]
    fn into_head_requires_completion() {
        let mut parser = RequestParser::new();
        parser.feed(b"GET / HTTP/1.1\r\nHost: h\r\n").unwrap();
        assert!(parser.request_line().is_some());
        assert!(parser.headers().is_none());
        assert!(parser.into_head().is_none());
    }
}
