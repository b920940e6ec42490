//! Middleware chains, routers and a resumable dispatch engine
//!
//! `weft-web` decides which handlers run for a request. Handlers, error handlers and
//! nested chains are registered on a [`MiddlewareChain`] with a method mask and a path
//! pattern. For each request, [`MiddlewareChain::dispatch`] produces a lazy
//! [`Dispatch`](dispatch::Dispatch) that yields the matching handlers one at a time, and
//! that switches to the collected error handlers when the caller reports a failure.
//!
//! [`App`] is the caller: it awaits each step and applies the 404 and 500 fallbacks.
//!
//! # Example
//!
//! ```
//! use bytes::Bytes;
//! use http::StatusCode;
//! use weft_http::codec::RequestParser;
//! use weft_web::handler::{handler_fn, Flow};
//! use weft_web::{App, MethodMask, MiddlewareChain};
//!
//! let mut users: MiddlewareChain = MiddlewareChain::router();
//! users
//!     .route(MethodMask::GET, "/:id", handler_fn(|req, resp| {
//!         let id = req.path_params().get("id").unwrap_or_default().to_string();
//!         resp.send_text(id);
//!         Ok(Flow::Continue)
//!     }))
//!     .unwrap();
//!
//! let mut chain: MiddlewareChain = MiddlewareChain::new();
//! chain.mount(MethodMask::ALL, "/users", users).unwrap();
//! let app = App::builder().chain(chain).build().unwrap();
//!
//! let mut parser = RequestParser::new();
//! let body = parser.feed(b"GET /users/7 HTTP/1.1\r\n\r\n").unwrap().unwrap();
//! let head = parser.into_head().unwrap();
//!
//! let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! let resp = rt.block_on(app.handle(head, body));
//! assert_eq!(resp.status(), StatusCode::OK);
//! assert_eq!(resp.body(), &Bytes::from_static(b"7"));
//! ```

mod app;
mod error;
mod method;
mod path;
mod request;
mod response;

pub mod chain;
pub mod config;
pub mod dispatch;
pub mod handler;

pub use app::App;
pub use app::AppBuilder;
pub use chain::MiddlewareChain;
pub use chain::Router;
pub use error::AppBuildError;
pub use error::DispatchError;
pub use error::RouteError;
pub use error::SharedError;
pub use method::MethodMask;
pub use path::PathMatch;
pub use path::PathParams;
pub use path::PathPattern;
pub use request::RequestContext;
pub use response::Response;
