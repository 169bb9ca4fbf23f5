//! End-to-end dispatch tests driving the public `Engine::handle` entry
//! point — no sockets involved, the core's I/O contract is just
//! request-in, response-out.

use std::sync::{Arc, Mutex};

use arbor::{Context, Engine, Method, Request, StatusCode, health, middleware};

type CallLog = Arc<Mutex<Vec<&'static str>>>;

fn get(path: &str) -> Request {
    Request::new(Method::GET, path)
}

#[test]
fn routes_bind_path_params() {
    let mut app = Engine::new();
    app.get("/hello/:name", |c: &mut Context| {
        let name = c.param("name").unwrap_or_default().to_owned();
        c.string(StatusCode::OK, format!("hello {name}"));
    });

    let response = app.handle(get("/hello/geektutu"));
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.body(), b"hello geektutu");
    assert_eq!(response.header("content-type"), Some("text/plain; charset=utf-8"));
}

#[test]
fn wildcard_routes_capture_the_remainder() {
    let mut app = Engine::new();
    app.get("/files/*filepath", |c: &mut Context| {
        let path = c.param("filepath").unwrap_or_default().to_owned();
        c.string(StatusCode::OK, path);
    });

    let response = app.handle(get("/files/css/a.css"));
    assert_eq!(response.body(), b"css/a.css");
}

#[test]
fn unmatched_paths_get_a_diagnostic_404() {
    let app = Engine::new();
    let response = app.handle(get("/unknown"));
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.body(), b"404 NOT FOUND: /unknown\n");
}

#[test]
fn middleware_nests_onion_style_around_the_handler() {
    let log: CallLog = Arc::default();
    let (m1, m2, h) = (Arc::clone(&log), Arc::clone(&log), Arc::clone(&log));

    let mut app = Engine::new();
    app.use_middleware(move |c: &mut Context| {
        m1.lock().unwrap().push("m1-before");
        c.next();
        m1.lock().unwrap().push("m1-after");
    });

    let mut group = app.group("/v2");
    group.use_middleware(move |c: &mut Context| {
        m2.lock().unwrap().push("m2-before");
        c.next();
        m2.lock().unwrap().push("m2-after");
    });
    group.get("/ping", move |c: &mut Context| {
        h.lock().unwrap().push("handler");
        c.string(StatusCode::OK, "pong");
    });

    let response = app.handle(get("/v2/ping"));
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        *log.lock().unwrap(),
        vec!["m1-before", "m2-before", "handler", "m2-after", "m1-after"]
    );
}

#[test]
fn group_middleware_stays_inside_its_prefix() {
    let log: CallLog = Arc::default();
    let seen = Arc::clone(&log);

    let mut app = Engine::new();
    let mut v2 = app.group("/v2");
    v2.use_middleware(move |_c: &mut Context| seen.lock().unwrap().push("v2"));
    app.get("/outside", |c: &mut Context| c.string(StatusCode::OK, "ok"));

    app.handle(get("/outside"));
    assert!(log.lock().unwrap().is_empty());
}

#[test]
fn middleware_without_next_still_reaches_the_handler() {
    let log: CallLog = Arc::default();
    let (m, h) = (Arc::clone(&log), Arc::clone(&log));

    let mut app = Engine::new();
    app.use_middleware(move |_c: &mut Context| m.lock().unwrap().push("m"));
    app.get("/", move |c: &mut Context| {
        h.lock().unwrap().push("handler");
        c.string(StatusCode::OK, "ok");
    });

    let response = app.handle(get("/"));
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(*log.lock().unwrap(), vec!["m", "handler"]);
}

#[test]
fn fail_short_circuits_everything_downstream() {
    let reached: Arc<Mutex<bool>> = Arc::default();
    let flag = Arc::clone(&reached);

    let mut app = Engine::new();
    app.use_middleware(|c: &mut Context| {
        c.fail(StatusCode::INTERNAL_SERVER_ERROR, "x");
    });
    app.get("/", move |c: &mut Context| {
        *flag.lock().unwrap() = true;
        c.string(StatusCode::OK, "unreachable");
    });

    let response = app.handle(get("/"));
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body(), br#"{"message":"x"}"#);
    assert!(!*reached.lock().unwrap());
}

fn panics(_c: &mut Context) {
    panic!("kaboom");
}

#[test]
fn recovery_contains_panics_and_serving_continues() {
    let mut app = Engine::new();
    app.use_middleware(middleware::recovery());
    app.get("/panic", panics);
    app.get("/fine", |c: &mut Context| c.string(StatusCode::OK, "fine"));

    let response = app.handle(get("/panic"));
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body(), br#"{"message":"Internal Server Error"}"#);

    // The engine is untouched by the contained fault.
    let response = app.handle(get("/fine"));
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.body(), b"fine");
}

#[test]
fn default_stack_recovers_too() {
    let mut app = Engine::with_defaults();
    app.get("/panic", panics);

    let response = app.handle(get("/panic"));
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn query_and_form_values_decode() {
    let mut app = Engine::new();
    app.get("/hello", |c: &mut Context| {
        let name = c.query("name").unwrap_or_default();
        c.string(StatusCode::OK, name);
    });
    app.post("/login", |c: &mut Context| {
        let user = c.post_form("username").unwrap_or_default();
        c.string(StatusCode::OK, user);
    });

    let response = app.handle(get("/hello?name=geek%20tutu"));
    assert_eq!(response.body(), b"geek tutu");

    let login = Request::new(Method::POST, "/login")
        .with_header("content-type", "application/x-www-form-urlencoded")
        .with_body(&b"username=alice&password=1234"[..]);
    let response = app.handle(login);
    assert_eq!(response.body(), b"alice");
}

#[test]
fn methods_route_independently() {
    let mut app = Engine::new();
    app.get("/thing", |c: &mut Context| c.string(StatusCode::OK, "got"));
    app.post("/thing", |c: &mut Context| c.string(StatusCode::CREATED, "made"));

    assert_eq!(app.handle(get("/thing")).body(), b"got");

    let response = app.handle(Request::new(Method::POST, "/thing"));
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app.handle(Request::new(Method::DELETE, "/thing"));
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[test]
fn health_probes_answer() {
    let mut app = Engine::new();
    app.get("/healthz", health::liveness);
    app.get("/readyz", health::readiness);

    assert_eq!(app.handle(get("/healthz")).body(), b"ok");
    assert_eq!(app.handle(get("/readyz")).body(), b"ready");
}

#[test]
fn static_dir_serves_files_with_guessed_content_type() {
    let dir = std::env::temp_dir().join(format!("arbor-static-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("a.css"), "body { color: red }").unwrap();

    let mut app = Engine::new();
    app.static_dir("/assets", dir.clone());

    let response = app.handle(get("/assets/a.css"));
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.body(), b"body { color: red }");
    assert_eq!(response.header("content-type"), Some("text/css"));

    let response = app.handle(get("/assets/missing.css"));
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.handle(get("/assets/../dispatch.rs"));
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    std::fs::remove_dir_all(&dir).ok();
}
