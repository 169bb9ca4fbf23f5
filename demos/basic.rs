//! Minimal arbor example — trie routes, groups, middleware, recovery.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl http://localhost:9999/
//!   curl http://localhost:9999/hello?name=geektutu
//!   curl http://localhost:9999/hello/geektutu
//!   curl http://localhost:9999/assets/css/site.css
//!   curl -X POST http://localhost:9999/login -d 'username=geektutu&password=1234'
//!   curl http://localhost:9999/v2/hello/geektutu     # note the extra log line
//!   curl http://localhost:9999/panic                 # recovered as a 500

use std::time::Instant;

use arbor::{Context, Engine, Server, StatusCode, health};
use serde::Serialize;

#[derive(Serialize)]
struct Login {
    username: String,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    // Panic recovery + request logging pre-installed.
    let mut app = Engine::with_defaults();

    app.get("/", |c: &mut Context| {
        c.html(StatusCode::OK, "<h1>Hello arbor</h1>");
    });

    // GET /hello?name=geektutu
    app.get("/hello", |c: &mut Context| {
        let name = c.query("name").unwrap_or_else(|| "stranger".to_owned());
        let path = c.path().to_owned();
        c.string(StatusCode::OK, format!("hello {name}, you're at {path}\n"));
    });

    // GET /hello/geektutu
    app.get("/hello/:name", |c: &mut Context| {
        let name = c.param("name").unwrap_or_default().to_owned();
        let path = c.path().to_owned();
        c.string(StatusCode::OK, format!("hello {name}, you're at {path}\n"));
    });

    // POST /login -d 'username=geektutu&password=1234'
    app.post("/login", |c: &mut Context| {
        match c.post_form("username") {
            Some(username) => c.json(StatusCode::OK, &Login { username }),
            None => c.fail(StatusCode::BAD_REQUEST, "username is required"),
        }
    });

    // GET /assets/css/site.css → ./static/css/site.css
    app.static_dir("/assets", "./static");

    app.get("/healthz", health::liveness);
    app.get("/readyz", health::readiness);

    // A group with its own timing middleware, like an API version scope.
    let mut v2 = app.group("/v2");
    v2.use_middleware(|c: &mut Context| {
        let start = Instant::now();
        c.next();
        tracing::info!(path = %c.path(), elapsed = ?start.elapsed(), "v2 timing");
    });
    v2.get("/hello/:name", |c: &mut Context| {
        let name = c.param("name").unwrap_or_default().to_owned();
        c.string(StatusCode::OK, format!("hello {name} from v2\n"));
    });

    // Deliberately out-of-bounds — the recovery middleware turns the panic
    // into a 500 and the server keeps serving.
    app.get("/panic", |c: &mut Context| {
        let names: Vec<&str> = vec!["arbor"];
        c.string(StatusCode::OK, names[100].to_owned());
    });

    Server::bind("0.0.0.0:9999")
        .serve(app)
        .await
        .expect("server error");
}
