//! Builds the header map line by line.
//!
//! A header is held back as pending until the next line arrives, since that line may be a
//! continuation (leading space or tab) that belongs to it. Continuations and repeated
//! names both turn the entry into an ordered list of values.

use crate::protocol::{Headers, ParseError};

/// Separators that may not appear in a header name, besides control characters.
const FORBIDDEN_NAME_BYTES: &[u8] = b"()<>@,;:\\\"/[]?={} \t";

#[derive(Debug, Default)]
pub struct HeaderAccumulator {
    headers: Headers,
    pending: Option<(String, Vec<String>)>,
}

impl HeaderAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one non-empty header line, terminator already stripped.
    ///
    /// # Errors
    ///
    /// - [`ParseError::BadRequest`] for a non UTF-8 line, a line without a colon, or a
    ///   continuation that has no header to continue
    /// - [`ParseError::InvalidHeader`] for an empty name or one containing a forbidden byte
    pub fn push_line(&mut self, line: &[u8]) -> Result<(), ParseError> {
        let line = std::str::from_utf8(line)
            .map_err(|e| ParseError::bad_request(format!("header line is not utf-8: {e}")))?;

        if line.starts_with([' ', '\t']) {
            let Some((_, values)) = &mut self.pending else {
                return Err(ParseError::bad_request("continuation line before any header"));
            };
            values.push(trim_ows(line).to_string());
            return Ok(());
        }

        let Some((name, value)) = line.split_once(':') else {
            return Err(ParseError::bad_request(format!("header line without colon {line:?}")));
        };
        validate_name(name)?;

        self.flush_pending();
        self.pending = Some((name.to_ascii_uppercase(), vec![trim_ows(value).to_string()]));
        Ok(())
    }

    /// Headers committed so far, excluding the one still pending.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Commits the pending header and returns the completed map.
    pub fn finish(mut self) -> Headers {
        self.flush_pending();
        self.headers
    }

    fn flush_pending(&mut self) {
        if let Some((name, values)) = self.pending.take() {
            self.headers.append(&name, values);
        }
    }
}

fn validate_name(name: &str) -> Result<(), ParseError> {
    if name.is_empty() {
        return Err(ParseError::invalid_header("empty header name"));
    }

    match name.bytes().find(|b| !b.is_ascii() || b.is_ascii_control() || FORBIDDEN_NAME_BYTES.contains(b)) {
        Some(b) => Err(ParseError::invalid_header(format!("forbidden byte {b:#04x} in header name {name:?}"))),
        None => Ok(()),
    }
}

// optional whitespace around field values is only space and tab
fn trim_ows(value: &str) -> &str {
    value.trim_matches([' ', '\t'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::HeaderValues;

    fn accumulate(lines: &[&str]) -> Result<Headers, ParseError> {
        let mut acc = HeaderAccumulator::new();
        for line in lines {
            acc.push_line(line.as_bytes())?;
        }
        Ok(acc.finish())
    }

    #[test]
    fn names_are_uppercased_and_values_trimmed() {
        let headers = accumulate(&["Host:  example.com \t", "x-Custom:v"]).unwrap();

        assert_eq!(headers.get("HOST"), Some(&HeaderValues::from("example.com")));
        assert_eq!(headers.get("X-CUSTOM"), Some(&HeaderValues::from("v")));
    }

    #[test]
    fn value_may_contain_colons() {
        let headers = accumulate(&["Host: 127.0.0.1:8080"]).unwrap();
        assert_eq!(headers.get_str("host"), Some("127.0.0.1:8080"));
    }

    #[test]
    fn continuation_appends_to_previous_header() {
        let headers = accumulate(&["X: a", " b", "\tc", "Y: d"]).unwrap();

        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get("X"), Some(&HeaderValues::from(vec!["a", "b", "c"])));
        assert_eq!(headers.get("Y"), Some(&HeaderValues::from("d")));
    }

    #[test]
    fn pending_header_is_held_back() {
        let mut acc = HeaderAccumulator::new();
        acc.push_line(b"X: a").unwrap();
        assert!(acc.headers().is_empty());

        acc.push_line(b"Y: b").unwrap();
        assert_eq!(acc.headers().get_str("X"), Some("a"));
        assert!(!acc.headers().contains("Y"));
    }

    #[test]
    fn continuation_without_header_is_bad_request() {
        let err = accumulate(&[" orphan"]).unwrap_err();
        assert!(matches!(err, ParseError::BadRequest { .. }));
    }

    #[test]
    fn line_without_colon_is_bad_request() {
        let err = accumulate(&["Host example.com"]).unwrap_err();
        assert!(matches!(err, ParseError::BadRequest { .. }));
    }

    #[test]
    fn forbidden_name_bytes_are_invalid() {
        for b in FORBIDDEN_NAME_BYTES.iter().filter(|b| **b != b':') {
            for name in [format!("{}X", *b as char), format!("X{}", *b as char), format!("X{}Y", *b as char)] {
                if name.starts_with([' ', '\t']) {
                    // a leading space makes the line a continuation instead
                    continue;
                }
                let err = accumulate(&[format!("{name}: v").as_str()]).unwrap_err();
                assert!(matches!(err, ParseError::InvalidHeader { .. }), "{name:?} gave {err}");
            }
        }

        for name in ["X\u{1}Y", "X\u{7f}", "", "Ünicode"] {
            let err = accumulate(&[format!("{name}: v").as_str()]).unwrap_err();
            assert!(matches!(err, ParseError::InvalidHeader { .. }), "{name:?} gave {err}");
        }
    }
}
