//! The dispatcher and route groups.
//!
//! [`Engine`] is the entry point: it owns the shared [`Router`] and the
//! process-wide list of route groups. A request comes in, the engine
//! gathers every group whose prefix covers the path, stacks that middleware
//! in registration order, and hands the context to the router, which
//! appends the terminal handler and starts the chain.
//!
//! Groups are borrow-handles onto the engine, not routing tables of their
//! own: `group.get(…)` prepends the group prefix and delegates to the one
//! shared router. Build the whole thing single-threaded at startup; after
//! that the engine is read-only and freely shared across request tasks.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use http::{Method, StatusCode};
use tracing::debug;

use crate::context::Context;
use crate::handler::{BoxedHandler, Handler};
use crate::middleware;
use crate::request::Request;
use crate::response::{ContentType, Response};
use crate::router::Router;

struct GroupState {
    /// Full prefix, ancestry included: nesting `/v2` under `/api` yields
    /// `/api/v2`.
    prefix: String,
    middlewares: Vec<BoxedHandler>,
    /// Informational back-reference; lookup never needs it since `prefix`
    /// already encodes ancestry.
    parent: Option<usize>,
}

/// The application dispatcher.
///
/// ```rust
/// use arbor::{Context, Engine, StatusCode};
///
/// let mut app = Engine::new();
/// app.get("/hello/:name", |c: &mut Context| {
///     let name = c.param("name").unwrap_or("stranger").to_owned();
///     c.string(StatusCode::OK, format!("hello {name}\n"));
/// });
/// ```
///
/// `Engine` is itself the root route group (prefix `""`): registration and
/// middleware methods called on it apply application-wide.
pub struct Engine {
    router: Router,
    groups: Vec<GroupState>,
}

impl Engine {
    /// An engine with no middleware installed.
    pub fn new() -> Self {
        Self {
            router: Router::new(),
            groups: vec![GroupState {
                prefix: String::new(),
                middlewares: Vec::new(),
                parent: None,
            }],
        }
    }

    /// An engine with the built-in stack: panic recovery outermost, then
    /// request logging. Recovery must stay outermost so it contains faults
    /// from everything downstream, the logger included.
    pub fn with_defaults() -> Self {
        let mut engine = Self::new();
        engine.use_middleware(middleware::recovery());
        engine.use_middleware(middleware::logger());
        engine
    }

    fn root(&mut self) -> RouterGroup<'_> {
        RouterGroup { engine: self, index: 0 }
    }

    /// Creates a child group of the root group. See [`RouterGroup::group`].
    pub fn group(&mut self, prefix: &str) -> RouterGroup<'_> {
        self.new_group(0, prefix)
    }

    /// Appends application-wide middleware.
    pub fn use_middleware(&mut self, middleware: impl Handler) {
        self.root().use_middleware(middleware);
    }

    /// Registers a handler for a method + pattern pair.
    ///
    /// # Panics
    ///
    /// Panics on a configuration error: duplicate or malformed pattern.
    /// Route tables are built once at startup, and an unreachable route is
    /// a bug you want loudly, not at request time. Use
    /// [`Router::add_route`] directly for a recoverable `Result`.
    pub fn route(&mut self, method: Method, pattern: &str, handler: impl Handler) {
        self.root().route(method, pattern, handler);
    }

    pub fn get(&mut self, pattern: &str, handler: impl Handler) {
        self.route(Method::GET, pattern, handler);
    }

    pub fn post(&mut self, pattern: &str, handler: impl Handler) {
        self.route(Method::POST, pattern, handler);
    }

    pub fn put(&mut self, pattern: &str, handler: impl Handler) {
        self.route(Method::PUT, pattern, handler);
    }

    pub fn delete(&mut self, pattern: &str, handler: impl Handler) {
        self.route(Method::DELETE, pattern, handler);
    }

    /// Serves files under `root` at `relative_path/*filepath`. See
    /// [`RouterGroup::static_dir`].
    pub fn static_dir(&mut self, relative_path: &str, root: impl Into<PathBuf>) {
        self.root().static_dir(relative_path, root);
    }

    /// Resolves `(method, path)` to the matched pattern and extracted
    /// params, without running anything.
    pub fn resolve(&self, method: &Method, path: &str) -> Option<(&str, HashMap<String, String>)> {
        self.router.resolve(method, path)
    }

    /// Dispatches one request through middleware and routing to a response.
    ///
    /// This is the core's entire I/O contract: method + path + headers +
    /// body in, status + headers + body out. The bundled
    /// [`Server`](crate::Server) calls it per hyper request; tests and
    /// embedders call it directly.
    pub fn handle(&self, request: Request) -> Response {
        let mut handlers: Vec<BoxedHandler> = Vec::new();
        for group in &self.groups {
            if request.path().starts_with(group.prefix.as_str()) {
                handlers.extend(group.middlewares.iter().cloned());
            }
        }

        let mut c = Context::new(request, handlers);
        self.router.dispatch(&mut c);
        c.into_response()
    }

    fn new_group(&mut self, parent: usize, prefix: &str) -> RouterGroup<'_> {
        let prefix = format!("{}{}", self.groups[parent].prefix, prefix);
        debug!(prefix = %prefix, "route group created");
        self.groups.push(GroupState {
            prefix,
            middlewares: Vec::new(),
            parent: Some(parent),
        });
        let index = self.groups.len() - 1;
        RouterGroup { engine: self, index }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

/// A handle onto one route group: a prefix scope bundling shared
/// middleware.
///
/// ```rust
/// use arbor::{Context, Engine, StatusCode};
///
/// let mut app = Engine::new();
/// let mut v2 = app.group("/v2");
/// v2.use_middleware(|c: &mut Context| {
///     if c.header("authorization").is_none() {
///         c.fail(StatusCode::UNAUTHORIZED, "missing credentials");
///     }
/// });
/// v2.get("/hello/:name", |c: &mut Context| {
///     let name = c.param("name").unwrap_or_default().to_owned();
///     c.string(StatusCode::OK, name);
/// });
/// ```
///
/// Groups exist for the lifetime of the engine. The handle borrows the
/// engine mutably, so configure one group at a time, which is how a route
/// table reads best anyway.
pub struct RouterGroup<'e> {
    engine: &'e mut Engine,
    index: usize,
}

impl RouterGroup<'_> {
    /// Creates a nested child group; the child's prefix is this group's
    /// prefix plus `prefix`.
    pub fn group(&mut self, prefix: &str) -> RouterGroup<'_> {
        self.engine.new_group(self.index, prefix)
    }

    /// Appends middleware to this group. Applies to every request whose
    /// path starts with the group prefix, ahead of the route handler and
    /// behind the middleware of enclosing groups.
    pub fn use_middleware(&mut self, middleware: impl Handler) {
        self.engine.groups[self.index]
            .middlewares
            .push(Arc::new(middleware));
    }

    /// Registers a handler; the group prefix is prepended to `pattern`.
    ///
    /// # Panics
    ///
    /// Panics on duplicate or malformed patterns, like [`Engine::route`].
    pub fn route(&mut self, method: Method, pattern: &str, handler: impl Handler) {
        let pattern = format!("{}{}", self.engine.groups[self.index].prefix, pattern);
        self.engine
            .router
            .add_route(method.clone(), &pattern, handler)
            .unwrap_or_else(|e| panic!("invalid {method} route `{pattern}`: {e}"));
    }

    pub fn get(&mut self, pattern: &str, handler: impl Handler) {
        self.route(Method::GET, pattern, handler);
    }

    pub fn post(&mut self, pattern: &str, handler: impl Handler) {
        self.route(Method::POST, pattern, handler);
    }

    pub fn put(&mut self, pattern: &str, handler: impl Handler) {
        self.route(Method::PUT, pattern, handler);
    }

    pub fn delete(&mut self, pattern: &str, handler: impl Handler) {
        self.route(Method::DELETE, pattern, handler);
    }

    /// Serves the files under `root` at `GET <prefix><relative_path>/*filepath`.
    ///
    /// `group.static_dir("/assets", "./public")` maps a request for
    /// `<prefix>/assets/css/a.css` to `./public/css/a.css`. Unreadable
    /// paths and `..` traversal answer 404. File reads block the serving
    /// task, like any other handler work; put a CDN or the reverse proxy
    /// in front for heavy static traffic.
    pub fn static_dir(&mut self, relative_path: &str, root: impl Into<PathBuf>) {
        let root = root.into();
        let pattern = format!("{relative_path}/*filepath");
        self.get(&pattern, move |c: &mut Context| {
            let Some(file) = c.param("filepath").map(str::to_owned) else {
                c.status(StatusCode::NOT_FOUND);
                return;
            };
            if file.split('/').any(|segment| segment == "..") {
                c.status(StatusCode::NOT_FOUND);
                return;
            }

            let path = root.join(&file);
            match std::fs::read(&path) {
                Ok(bytes) => {
                    let ext = path
                        .extension()
                        .and_then(|e| e.to_str())
                        .map(str::to_ascii_lowercase)
                        .unwrap_or_default();
                    c.set_header("content-type", ContentType::from_extension(&ext).as_str());
                    c.data(StatusCode::OK, &bytes);
                }
                Err(_) => c.status(StatusCode::NOT_FOUND),
            }
        });
    }

    /// This group's full prefix.
    pub fn prefix(&self) -> &str {
        &self.engine.groups[self.index].prefix
    }

    /// The prefix of the parent group, if this group is nested.
    pub fn parent_prefix(&self) -> Option<&str> {
        let parent = self.engine.groups[self.index].parent?;
        Some(self.engine.groups[parent].prefix.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_c: &mut Context) {}

    #[test]
    fn nested_groups_concatenate_prefixes() {
        let mut app = Engine::new();
        let mut api = app.group("/api");
        assert_eq!(api.prefix(), "/api");
        assert_eq!(api.parent_prefix(), Some(""));

        let v2 = api.group("/v2");
        assert_eq!(v2.prefix(), "/api/v2");
        assert_eq!(v2.parent_prefix(), Some("/api"));
    }

    #[test]
    fn group_routes_register_under_the_full_prefix() {
        let mut app = Engine::new();
        let mut api = app.group("/api");
        api.group("/v2").get("/hello/:name", noop);

        let (pattern, params) = app.resolve(&Method::GET, "/api/v2/hello/alice").unwrap();
        assert_eq!(pattern, "/api/v2/hello/:name");
        assert_eq!(params.get("name").map(String::as_str), Some("alice"));
    }

    #[test]
    #[should_panic(expected = "duplicate route")]
    fn conflicting_registration_panics_at_startup() {
        let mut app = Engine::new();
        app.get("/p/:lang", noop);
        app.get("/p/a", noop);
    }
}
