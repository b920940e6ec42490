use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use weft_http::codec::RequestParser;
use weft_web::handler::{error_handler_fn, handler_fn, Flow};
use weft_web::{App, MethodMask, MiddlewareChain};

const REQUESTS: [&[u8]; 3] = [
    b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n",
    b"GET /users/7 HTTP/1.1\r\nHost: localhost\r\n\r\n",
    b"GET /boom HTTP/1.1\r\nHost: localhost\r\n\r\n",
];

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::DEBUG).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let mut users: MiddlewareChain = MiddlewareChain::router();
    users
        .route(
            MethodMask::GET,
            "/:id",
            handler_fn(|req, resp| {
                let id = req.path_params().get("id").unwrap_or_default().to_string();
                resp.send_text(format!("user {id}"));
                Ok(Flow::Continue)
            }),
        )
        .unwrap();

    let mut chain: MiddlewareChain = MiddlewareChain::new();
    chain
        .catch(
            MethodMask::ALL,
            "/",
            error_handler_fn(|_req, resp, err| {
                resp.send_text(format!("sorry: {err}"));
                Ok(Flow::Continue)
            }),
        )
        .unwrap()
        .route(
            MethodMask::GET,
            "/boom",
            handler_fn(|_req, _resp| Err("the handler exploded".into())),
        )
        .unwrap()
        .mount(MethodMask::ALL, "/users", users)
        .unwrap()
        .route(
            MethodMask::GET | MethodMask::HEAD,
            "/",
            handler_fn(|_req, resp| {
                resp.send_text("hello world");
                Ok(Flow::Continue)
            }),
        )
        .unwrap();

    let app = App::builder().chain(chain).build().unwrap();

    for raw in REQUESTS {
        let mut parser = RequestParser::new();
        let mut body = None;
        // feed in small pieces, the way a socket would deliver them
        for chunk in raw.chunks(7) {
            match parser.feed(chunk) {
                Ok(None) => {}
                Ok(Some(start)) => {
                    body = Some(start);
                    break;
                }
                Err(e) => {
                    info!(status = %App::status_for(&e), "rejected: {e}");
                    break;
                }
            }
        }

        let (Some(head), Some(body)) = (parser.into_head(), body) else { continue };
        let path = head.path().to_string();
        let resp = app.handle(head, body).await;
        info!(%path, status = %resp.status(), body = ?String::from_utf8_lossy(resp.body()), "handled");
    }
}
