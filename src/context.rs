//! Per-request context and middleware-chain execution.
//!
//! One `Context` exists per inbound request, exclusively owned by the task
//! serving it. It carries the request facts, the path parameters extracted
//! by the router, the response being built, and the resolved handler chain
//! with its cursor. Chain execution is cooperative and single-threaded:
//! [`Context::next`] drives continuation, [`Context::fail`] terminates it.

use std::collections::HashMap;
use std::sync::Arc;

use http::{Method, StatusCode};
use serde::Serialize;
use serde_json::json;

use crate::handler::BoxedHandler;
use crate::request::Request;
use crate::response::{ContentType, Response};

/// The shared per-request object every handler receives.
pub struct Context {
    request: Request,
    /// Parameters bound from the matched pattern, e.g. `:name` → `name`.
    /// Lifetime is exactly one request.
    params: HashMap<String, String>,

    // Response-building state. Body writes append, the last status set
    // wins, and `written` records whether any handler touched either.
    status: StatusCode,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
    written: bool,

    /// The concrete chain for this request: applicable middleware in
    /// registration order, then the terminal route handler.
    handlers: Vec<BoxedHandler>,
    /// Index into `handlers`; starts below the first entry and only ever
    /// moves forward.
    cursor: isize,
}

impl Context {
    pub(crate) fn new(request: Request, handlers: Vec<BoxedHandler>) -> Self {
        Self {
            request,
            params: HashMap::new(),
            status: StatusCode::OK,
            headers: Vec::new(),
            body: Vec::new(),
            written: false,
            handlers,
            cursor: -1,
        }
    }

    pub(crate) fn push_handler(&mut self, handler: BoxedHandler) {
        self.handlers.push(handler);
    }

    pub(crate) fn set_params(&mut self, params: HashMap<String, String>) {
        self.params = params;
    }

    pub(crate) fn into_response(self) -> Response {
        Response {
            status: self.status,
            headers: self.headers,
            body: self.body,
        }
    }

    // ── Chain execution ──────────────────────────────────────────────────────

    /// Hands control to the rest of the chain.
    ///
    /// A middleware that wants work on both sides of the downstream
    /// handlers calls this in the middle of its body: code before runs on
    /// the way in, code after runs on the way out, nested onion-style
    /// relative to sibling middleware. A handler that returns *without*
    /// calling `next` does not stop the chain: the loop below advances past
    /// it, so its successors still run (after it, rather than inside it).
    pub fn next(&mut self) {
        self.cursor += 1;
        while self.cursor < self.handlers.len() as isize {
            let handler = Arc::clone(&self.handlers[self.cursor as usize]);
            handler.call(self);
            self.cursor += 1;
        }
    }

    /// Short-circuits the chain with an error response.
    ///
    /// Moves the cursor past the end of the chain, so nothing downstream
    /// runs and every enclosing `next` loop unwinds. Any partially-built
    /// body is replaced with a JSON error payload.
    pub fn fail(&mut self, code: StatusCode, message: impl Into<String>) {
        self.cursor = self.handlers.len() as isize;
        self.body.clear();
        let message: String = message.into();
        self.json(code, &json!({ "message": message }));
    }

    // ── Request accessors ────────────────────────────────────────────────────

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn method(&self) -> &Method {
        self.request.method()
    }

    pub fn path(&self) -> &str {
        self.request.path()
    }

    pub fn body(&self) -> &[u8] {
        self.request.body()
    }

    /// Case-insensitive request-header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.request.header(name)
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/:id`, `c.param("id")` on `/users/42` returns
    /// `Some("42")`. For `/assets/*filepath` on `/assets/css/a.css`,
    /// `c.param("filepath")` returns `Some("css/a.css")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Returns a query-string value, percent-decoded.
    pub fn query(&self, key: &str) -> Option<String> {
        self.request.query_value(key)
    }

    /// Returns a value from a `x-www-form-urlencoded` request body.
    pub fn post_form(&self, key: &str) -> Option<String> {
        self.request.form_value(key)
    }

    // ── Response writers ─────────────────────────────────────────────────────

    /// Sets the response status code.
    pub fn status(&mut self, code: StatusCode) {
        self.status = code;
        self.written = true;
    }

    /// The status the response currently carries. Middleware reads this
    /// after `next` to observe what downstream handlers decided.
    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    /// True once any handler has written status or body state.
    pub fn written(&self) -> bool {
        self.written
    }

    /// Sets a response header, replacing an existing one of the same name
    /// (case-insensitive).
    pub fn set_header(&mut self, name: &str, value: &str) {
        match self.headers.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
            Some((_, v)) => *v = value.to_owned(),
            None => self.headers.push((name.to_owned(), value.to_owned())),
        }
    }

    /// Writes a plain-text response.
    pub fn string(&mut self, code: StatusCode, body: impl Into<String>) {
        self.set_header("content-type", ContentType::Text.as_str());
        self.status(code);
        self.body.extend_from_slice(body.into().as_bytes());
    }

    /// Serializes `value` as the JSON response body.
    ///
    /// A serialization failure is turned into a plain 500 carrying the
    /// encoder's message; handlers never see it.
    pub fn json<T: Serialize>(&mut self, code: StatusCode, value: &T) {
        self.set_header("content-type", ContentType::Json.as_str());
        self.status(code);
        match serde_json::to_vec(value) {
            Ok(bytes) => self.body.extend_from_slice(&bytes),
            Err(e) => {
                self.set_header("content-type", ContentType::Text.as_str());
                self.status(StatusCode::INTERNAL_SERVER_ERROR);
                self.body.clear();
                self.body.extend_from_slice(e.to_string().as_bytes());
            }
        }
    }

    /// Writes an HTML response.
    pub fn html(&mut self, code: StatusCode, html: impl Into<String>) {
        self.set_header("content-type", ContentType::Html.as_str());
        self.status(code);
        self.body.extend_from_slice(html.into().as_bytes());
    }

    /// Writes raw bytes without touching the content type.
    pub fn data(&mut self, code: StatusCode, data: &[u8]) {
        self.status(code);
        self.body.extend_from_slice(data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn chain(handlers: Vec<BoxedHandler>) -> Context {
        Context::new(Request::new(Method::GET, "/"), handlers)
    }

    #[test]
    fn fresh_context_defaults_to_200_unwritten() {
        let c = chain(Vec::new());
        assert_eq!(c.status_code(), StatusCode::OK);
        assert!(!c.written());
    }

    #[test]
    fn handlers_without_next_still_advance() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let (a, b) = (Arc::clone(&log), Arc::clone(&log));

        let mut c = chain(vec![
            Arc::new(move |_c: &mut Context| a.lock().unwrap().push("first")),
            Arc::new(move |_c: &mut Context| b.lock().unwrap().push("second")),
        ]);
        c.next();

        assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn explicit_next_nests_onion_style() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let (a, b) = (Arc::clone(&log), Arc::clone(&log));

        let mut c = chain(vec![
            Arc::new(move |c: &mut Context| {
                a.lock().unwrap().push("outer-in");
                c.next();
                a.lock().unwrap().push("outer-out");
            }),
            Arc::new(move |_c: &mut Context| b.lock().unwrap().push("inner")),
        ]);
        c.next();

        assert_eq!(*log.lock().unwrap(), vec!["outer-in", "inner", "outer-out"]);
    }

    #[test]
    fn fail_stops_the_chain_and_owns_the_body() {
        let ran = Arc::new(Mutex::new(false));
        let flag = Arc::clone(&ran);

        let mut c = chain(vec![
            Arc::new(|c: &mut Context| {
                c.string(StatusCode::OK, "half-written");
                c.fail(StatusCode::INTERNAL_SERVER_ERROR, "boom");
            }),
            Arc::new(move |_c: &mut Context| *flag.lock().unwrap() = true),
        ]);
        c.next();

        assert!(!*ran.lock().unwrap());
        let response = c.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.body(), br#"{"message":"boom"}"#);
    }

    #[test]
    fn set_header_replaces_case_insensitively() {
        let mut c = chain(Vec::new());
        c.set_header("Content-Type", "text/plain");
        c.set_header("content-type", "application/json");

        let response = c.into_response();
        assert_eq!(response.header("content-type"), Some("application/json"));
        assert_eq!(response.headers().len(), 1);
    }

    #[test]
    fn string_then_string_appends() {
        let mut c = chain(Vec::new());
        c.string(StatusCode::OK, "hello ");
        c.string(StatusCode::OK, "world");
        assert_eq!(c.into_response().body(), b"hello world");
    }
}
