//! The driver that runs a dispatch to completion.
//!
//! [`App`] owns the root [`MiddlewareChain`] and turns a parsed request into a response:
//! it pulls one [`Step`] at a time, awaits the handler, and feeds failures back into the
//! dispatch. Socket handling stays with the transport, which hands `App` the head and the
//! body bytes produced by the parser.

use bytes::Bytes;
use http::StatusCode;
use tracing::{debug, warn};
use weft_http::protocol::{ParseError, RequestHead};

use crate::chain::MiddlewareChain;
use crate::config::DispatchConfig;
use crate::dispatch::Step;
use crate::handler::Flow;
use crate::{AppBuildError, RequestContext, Response};

#[derive(Debug)]
pub struct AppBuilder {
    chain: Option<MiddlewareChain>,
    config: DispatchConfig,
}

impl AppBuilder {
    fn new() -> Self {
        Self { chain: None, config: DispatchConfig::default() }
    }

    pub fn chain(mut self, chain: MiddlewareChain) -> Self {
        self.chain = Some(chain);
        self
    }

    pub fn config(mut self, config: DispatchConfig) -> Self {
        self.config = config;
        self
    }

    /// # Errors
    ///
    /// Returns [`AppBuildError::MissingChain`] when no chain was set.
    pub fn build(self) -> Result<App, AppBuildError> {
        let chain = self.chain.ok_or(AppBuildError::MissingChain)?;
        Ok(App { chain, config: self.config })
    }
}

#[derive(Debug)]
pub struct App {
    chain: MiddlewareChain,
    config: DispatchConfig,
}

impl App {
    pub fn builder() -> AppBuilder {
        AppBuilder::new()
    }

    pub fn chain(&self) -> &MiddlewareChain {
        &self.chain
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Runs every matching handler for one request.
    ///
    /// The dispatch ends when a handler sends the response or returns [`Flow::Stop`].
    /// When the steps run out, the response is `404 Not Found` if nothing failed and
    /// `500 Internal Server Error` if an error was left unhandled. Error handlers failing
    /// too many times in a row also give a 500.
    pub async fn handle(&self, head: RequestHead, body: Bytes) -> http::Response<Bytes> {
        let method = head.method().clone();
        let path = head.path().to_string();

        let mut req = RequestContext::new(head, body);
        let mut resp = Response::new();
        let mut dispatch = self.chain.dispatch_with(&method, &path, &self.config);

        let mut next = dispatch.next();
        while let Some(step) = next {
            let result = match step {
                Step::Handler { handler, params } => {
                    req.set_path_params(params);
                    handler.invoke(&mut req, &mut resp).await
                }
                Step::ErrorHandler { handler, error } => handler.invoke(&mut req, &mut resp, &*error).await,
            };

            next = match result {
                Ok(Flow::Stop) => {
                    debug!(%method, %path, "dispatch stopped by handler");
                    dispatch.stop();
                    return resp.into_http();
                }
                Ok(Flow::Continue) if resp.is_finished() => return resp.into_http(),
                Ok(Flow::Continue) => dispatch.next(),
                Err(e) => match dispatch.raise_into(e) {
                    Ok(step) => step,
                    Err(e) => {
                        warn!(%method, %path, cause = %e, "error handlers gave up, responding 500");
                        resp.send_status(StatusCode::INTERNAL_SERVER_ERROR);
                        return resp.into_http();
                    }
                },
            };
        }

        if let Some(e) = dispatch.error() {
            warn!(%method, %path, cause = %e, "unhandled error, responding 500");
            resp.send_status(StatusCode::INTERNAL_SERVER_ERROR);
        } else {
            warn!(%method, %path, "no handler finished the response, responding 404");
            resp.send_status(StatusCode::NOT_FOUND);
        }
        resp.into_http()
    }

    /// The status the transport should answer with when parsing the head failed.
    pub fn status_for(error: &ParseError) -> StatusCode {
        error.status_code()
    }

    /// A complete response for a request whose head could not be parsed.
    pub fn reject(error: &ParseError) -> http::Response<Bytes> {
        let mut resp = Response::new();
        resp.set_status(Self::status_for(error));
        resp.send_text(error.to_string());
        resp.into_http()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use http::header::CONTENT_TYPE;
    use indoc::indoc;
    use tracing::Level;
    use tracing::subscriber::DefaultGuard;
    use tracing_subscriber::FmtSubscriber;
    use weft_http::codec::RequestParser;

    use super::*;
    use crate::handler::{
        BoxError, ErrorHandler, RequestHandler, async_handler_fn, error_handler_fn, handler_fn,
    };
    use crate::MethodMask;

    type Log = Arc<Mutex<Vec<String>>>;

    #[derive(Debug, Clone, Copy)]
    enum Outcome {
        Continue,
        Stop,
        Send(&'static str),
        Status(StatusCode),
        Fail(&'static str),
    }

    impl Outcome {
        fn apply(self, resp: &mut Response) -> Result<Flow, BoxError> {
            match self {
                Outcome::Continue => Ok(Flow::Continue),
                Outcome::Stop => Ok(Flow::Stop),
                Outcome::Send(text) => {
                    resp.send_text(text);
                    Ok(Flow::Continue)
                }
                Outcome::Status(status) => {
                    resp.send_status(status);
                    Ok(Flow::Continue)
                }
                Outcome::Fail(reason) => Err(reason.into()),
            }
        }
    }

    fn init_tracing() -> DefaultGuard {
        let subscriber = FmtSubscriber::builder().with_max_level(Level::DEBUG).with_test_writer().finish();
        tracing::subscriber::set_default(subscriber)
    }

    fn record(log: &Log, name: &'static str, outcome: Outcome) -> impl RequestHandler + 'static {
        let log = Arc::clone(log);
        handler_fn(move |_req, resp| {
            log.lock().unwrap().push(name.to_string());
            outcome.apply(resp)
        })
    }

    fn record_error(log: &Log, name: &'static str, outcome: Outcome) -> impl ErrorHandler + 'static {
        let log = Arc::clone(log);
        error_handler_fn(move |_req, resp, err| {
            log.lock().unwrap().push(format!("{name}: {err}"));
            outcome.apply(resp)
        })
    }

    // logs on entry, sleeps, then logs again before continuing
    fn suspending(log: &Log, name: &'static str) -> impl RequestHandler + 'static {
        let log = Arc::clone(log);
        async_handler_fn(move |_req, _resp| {
            let log = Arc::clone(&log);
            Box::pin(async move {
                log.lock().unwrap().push(format!("{name}-start"));
                tokio::time::sleep(Duration::from_millis(10)).await;
                log.lock().unwrap().push(format!("{name}-done"));
                Ok(Flow::Continue)
            })
        })
    }

    fn assert_send<T: Send>(_value: &T) {
        // no op
    }

    fn head(raw: &str) -> RequestHead {
        let mut parser = RequestParser::new();
        parser.feed(raw.as_bytes()).unwrap();
        parser.into_head().unwrap()
    }

    fn get(path: &str) -> RequestHead {
        head(&format!("GET {path} HTTP/1.1\r\nHost: localhost\r\n\r\n"))
    }

    fn app(chain: MiddlewareChain) -> App {
        App::builder().chain(chain).build().unwrap()
    }

    fn entries(log: &Log) -> Vec<String> {
        log.lock().unwrap().clone()
    }

    #[tokio::test]
    async fn hello_world() {
        let _guard = init_tracing();
        let mut chain: MiddlewareChain = MiddlewareChain::new();
        chain
            .route(
                MethodMask::GET,
                "/",
                handler_fn(|_req, resp| {
                    resp.send_text("hello world");
                    Ok(Flow::Continue)
                }),
            )
            .unwrap();

        let resp = app(chain).handle(get("/"), Bytes::new()).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[CONTENT_TYPE], "text/plain; charset=utf-8");
        assert_eq!(resp.body(), &Bytes::from_static(b"hello world"));
    }

    #[tokio::test]
    async fn unmatched_request_is_not_found() {
        let _guard = init_tracing();
        let log = Log::default();
        let mut chain: MiddlewareChain = MiddlewareChain::new();
        chain.route(MethodMask::POST, "/", record(&log, "post_only", Outcome::Send("posted"))).unwrap();
        chain.route(MethodMask::GET, "/", record(&log, "passes", Outcome::Continue)).unwrap();

        let resp = app(chain).handle(get("/"), Bytes::new()).await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(entries(&log), ["passes"]);
    }

    #[tokio::test]
    async fn error_handler_answers_for_failing_handler() {
        let _guard = init_tracing();
        let log = Log::default();
        let unavailable = Outcome::Status(StatusCode::SERVICE_UNAVAILABLE);
        let mut chain: MiddlewareChain = MiddlewareChain::new();
        chain
            .catch(MethodMask::ALL, "/", record_error(&log, "maintenance_page", unavailable))
            .unwrap()
            .route(MethodMask::GET, "/", record(&log, "load_cart", Outcome::Fail("boom")))
            .unwrap()
            .route(MethodMask::GET, "/", record(&log, "never", Outcome::Send("unreachable")))
            .unwrap();

        let resp = app(chain).handle(get("/"), Bytes::new()).await;

        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(entries(&log), ["load_cart", "maintenance_page: boom"]);
    }

    #[tokio::test]
    async fn unhandled_error_is_internal_server_error() {
        let _guard = init_tracing();
        let log = Log::default();
        let mut chain: MiddlewareChain = MiddlewareChain::new();
        chain
            .catch(MethodMask::ALL, "/", record_error(&log, "outer", Outcome::Continue))
            .unwrap()
            .catch(MethodMask::ALL, "/", record_error(&log, "inner", Outcome::Continue))
            .unwrap()
            .route(MethodMask::GET, "/", record(&log, "fails", Outcome::Fail("db down")))
            .unwrap();

        let resp = app(chain).handle(get("/"), Bytes::new()).await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(entries(&log), ["fails", "inner: db down", "outer: db down"]);
    }

    #[tokio::test]
    async fn failing_error_handlers_hit_the_depth_limit() {
        let _guard = init_tracing();
        let log = Log::default();
        let mut chain: MiddlewareChain = MiddlewareChain::new();
        chain.catch(MethodMask::ALL, "/", record_error(&log, "e1", Outcome::Send("recovered"))).unwrap();
        chain.catch(MethodMask::ALL, "/", record_error(&log, "e2", Outcome::Fail("e2 failed"))).unwrap();
        chain.catch(MethodMask::ALL, "/", record_error(&log, "e3", Outcome::Fail("e3 failed"))).unwrap();
        chain.route(MethodMask::GET, "/", record(&log, "h", Outcome::Fail("h failed"))).unwrap();

        let limited = App::builder().chain(chain).config(DispatchConfig::new().max_error_depth(1)).build().unwrap();
        let resp = limited.handle(get("/"), Bytes::new()).await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(entries(&log), ["h", "e3: h failed", "e2: e3 failed"]);
    }

    #[tokio::test]
    async fn nested_error_handler_recovers() {
        let _guard = init_tracing();
        let log = Log::default();
        let mut chain: MiddlewareChain = MiddlewareChain::new();
        chain.catch(MethodMask::ALL, "/", record_error(&log, "e1", Outcome::Send("recovered"))).unwrap();
        chain.catch(MethodMask::ALL, "/", record_error(&log, "e2", Outcome::Fail("e2 failed"))).unwrap();
        chain.route(MethodMask::GET, "/", record(&log, "h", Outcome::Fail("h failed"))).unwrap();

        let resp = app(chain).handle(get("/"), Bytes::new()).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.body(), &Bytes::from_static(b"recovered"));
        assert_eq!(entries(&log), ["h", "e2: h failed", "e1: e2 failed"]);
    }

    #[tokio::test]
    async fn stop_ends_dispatch() {
        let _guard = init_tracing();
        let log = Log::default();
        let mut chain: MiddlewareChain = MiddlewareChain::new();
        chain.route(MethodMask::ALL, "/", record(&log, "gate", Outcome::Stop)).unwrap();
        chain.route(MethodMask::ALL, "/", record(&log, "after", Outcome::Send("after"))).unwrap();

        let resp = app(chain).handle(get("/private"), Bytes::new()).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.body().is_empty());
        assert_eq!(entries(&log), ["gate"]);
    }

    #[tokio::test]
    async fn router_params_and_body() {
        let _guard = init_tracing();
        let mut users: MiddlewareChain = MiddlewareChain::router();
        users
            .route(
                MethodMask::PUT,
                "/:id",
                handler_fn(|req, resp| {
                    let id = req.path_params().get("id").unwrap_or_default().to_string();
                    let body = String::from_utf8_lossy(req.body()).into_owned();
                    resp.send_text(format!("{id}={body}"));
                    Ok(Flow::Continue)
                }),
            )
            .unwrap();

        let mut chain: MiddlewareChain = MiddlewareChain::new();
        chain.mount(MethodMask::ALL, "/users", users).unwrap();

        let raw = indoc! {"
            PUT /users/42/ HTTP/1.1
            Content-Length: 3

            ann"};
        let mut parser = RequestParser::new();
        let body = parser.feed(raw.as_bytes()).unwrap().unwrap();
        let resp = app(chain).handle(parser.into_head().unwrap(), body).await;

        assert_eq!(resp.body(), &Bytes::from_static(b"42=ann"));
    }

    #[tokio::test]
    async fn suspending_handlers_run_one_after_another() {
        let _guard = init_tracing();
        let log = Log::default();
        let mut chain: MiddlewareChain = MiddlewareChain::new();
        chain
            .route(MethodMask::GET, "/", suspending(&log, "auth"))
            .unwrap()
            .route(MethodMask::GET, "/", suspending(&log, "audit"))
            .unwrap()
            .route(MethodMask::GET, "/", record(&log, "render", Outcome::Send("ok")))
            .unwrap();
        let app = app(chain);

        let fut = app.handle(get("/"), Bytes::new());
        assert_send(&fut);
        let resp = fut.await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(entries(&log), ["auth-start", "auth-done", "audit-start", "audit-done", "render"]);
    }

    #[test]
    fn build_requires_chain() {
        assert!(matches!(App::builder().build(), Err(AppBuildError::MissingChain)));
    }

    #[test]
    fn reject_parse_errors() {
        let err = ParseError::not_implemented("PATCH");
        assert_eq!(App::status_for(&err), StatusCode::NOT_IMPLEMENTED);

        let resp = App::reject(&ParseError::request_too_large(9000, 8192));
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(resp.body(), &Bytes::from(ParseError::request_too_large(9000, 8192).to_string()));
    }
}
