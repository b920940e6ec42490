//! Splits a fragmented byte stream into lines.
//!
//! The line ending is not known up front: the first `\n` seen decides it. If the byte
//! before it is `\r` the request uses CRLF, otherwise bare LF. Because unterminated bytes
//! stay buffered, a fragment boundary between `\r` and `\n` is handled like any other.
//!
//! Once discovered, the ending is fixed. Under CRLF a lone `\n` is ordinary line content.

use bytes::{Bytes, BytesMut};
use tracing::trace;

/// The line terminator used by a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    Lf,
    CrLf,
}

impl LineEnding {
    #[inline]
    pub fn as_bytes(self) -> &'static [u8] {
        match self {
            LineEnding::Lf => b"\n",
            LineEnding::CrLf => b"\r\n",
        }
    }

    #[inline]
    pub fn len(self) -> usize {
        self.as_bytes().len()
    }
}

/// Buffers fragments and yields complete lines with the terminator stripped.
#[derive(Debug, Default)]
pub struct LineFramer {
    ending: Option<LineEnding>,
    buf: BytesMut,
    // prefix of `buf` already searched without finding a terminator
    scanned: usize,
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The discovered line ending, `None` until the first `\n` arrives.
    pub fn line_ending(&self) -> Option<LineEnding> {
        self.ending
    }

    /// Appends a fragment.
    pub fn push(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Bytes buffered but not yet returned as a line.
    pub fn pending(&self) -> &[u8] {
        &self.buf
    }

    /// Returns the next complete line, or `None` if the buffer holds only a fragment.
    pub fn next_line(&mut self) -> Option<Bytes> {
        let mut from = self.scanned;

        loop {
            let Some(offset) = self.buf[from..].iter().position(|b| *b == b'\n') else {
                self.scanned = self.buf.len();
                return None;
            };
            let newline = from + offset;
            let preceded_by_cr = newline > 0 && self.buf[newline - 1] == b'\r';

            let ending = match self.ending {
                Some(ending) => ending,
                None => {
                    let ending = if preceded_by_cr { LineEnding::CrLf } else { LineEnding::Lf };
                    trace!(?ending, "discovered line ending");
                    self.ending = Some(ending);
                    ending
                }
            };

            if ending == LineEnding::CrLf && !preceded_by_cr {
                from = newline + 1;
                continue;
            }

            let mut line = self.buf.split_to(newline + 1);
            line.truncate(line.len() - ending.len());
            self.scanned = 0;
            return Some(line.freeze());
        }
    }

    /// Takes every buffered byte, leaving the framer empty.
    pub fn take_remaining(&mut self) -> Bytes {
        self.scanned = 0;
        self.buf.split().freeze()
    }
}
