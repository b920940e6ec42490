//! Core HTTP protocol types produced by the parser.
//!
//! - **Request head** ([`request`]): [`RequestHead`] and the decoded [`RequestTarget`]
//! - **Headers** ([`header`]): ordered, case-insensitive [`Headers`] whose entries are
//!   either a single value or a list ([`HeaderValues`])
//! - **Error handling** ([`error`]): the [`ParseError`] taxonomy, each variant mapping to
//!   the status the transport should answer with

mod header;
pub use header::HeaderValues;
pub use header::Headers;

mod request;
pub use request::QueryParams;
pub use request::RequestHead;
pub use request::RequestTarget;

mod error;
pub use error::ParseError;
