//! Trie-backed request router.
//!
//! One prefix tree per HTTP method plus one handler table keyed by
//! `(method, pattern)`. Built once at startup via registration calls and
//! immutable while serving, so concurrent reads need no synchronization.
//! You register a pattern, a request resolves to a handler. That is all.

use std::collections::HashMap;
use std::sync::Arc;

use http::{Method, StatusCode};
use tracing::info;

use crate::context::Context;
use crate::error::Error;
use crate::handler::{BoxedHandler, Handler};
use crate::trie::{Node, parse_pattern};

/// The routing table: registration in, resolution out.
///
/// Patterns use `/`-delimited segments; `:name` binds a single segment,
/// `*name` (or bare `*`) consumes the remainder of the path and must be the
/// last segment. Most applications register through
/// [`Engine`](crate::Engine) rather than holding a `Router` directly.
pub struct Router {
    /// One trie root per HTTP method, created lazily on first registration.
    roots: HashMap<Method, Node>,
    handlers: HashMap<(Method, String), BoxedHandler>,
}

impl Router {
    pub fn new() -> Self {
        Self {
            roots: HashMap::new(),
            handlers: HashMap::new(),
        }
    }

    /// Registers `handler` for a method + pattern pair.
    ///
    /// Fails with [`Error::MalformedPattern`] when a `*` segment is not the
    /// final segment, and with [`Error::DuplicateRoute`] when a *different*
    /// pattern already terminates at the same normalized segment sequence.
    /// Both surface at registration time, never at request time.
    /// Re-registering the identical pattern replaces its handler.
    pub fn add_route(
        &mut self,
        method: Method,
        pattern: &str,
        handler: impl Handler,
    ) -> Result<(), Error> {
        validate_pattern(pattern)?;
        let parts = parse_pattern(pattern);
        self.roots
            .entry(method.clone())
            .or_default()
            .insert(pattern, &parts, 0)?;

        info!(method = %method, pattern = %pattern, "route registered");
        self.handlers
            .insert((method, pattern.to_owned()), Arc::new(handler));
        Ok(())
    }

    /// Resolves a request path to `(matched pattern, extracted params)`.
    ///
    /// Pure and idempotent: resolving the same `(method, path)` twice
    /// against an unmodified router yields identical results.
    pub fn resolve(&self, method: &Method, path: &str) -> Option<(&str, HashMap<String, String>)> {
        let root = self.roots.get(method)?;
        let search_parts = parse_pattern(path);
        let node = root.search(&search_parts, 0)?;
        let pattern = node.pattern()?;

        // Re-walk the matched pattern alongside the request segments to
        // bind parameters. A named `*` takes the joined remainder; a bare
        // `*` consumes without binding.
        let mut params = HashMap::new();
        for (index, part) in parse_pattern(pattern).iter().enumerate() {
            if let Some(name) = part.strip_prefix(':') {
                params.insert(name.to_owned(), search_parts[index].to_owned());
            }
            if let Some(name) = part.strip_prefix('*') {
                if !name.is_empty() {
                    params.insert(name.to_owned(), search_parts[index..].join("/"));
                }
                break;
            }
        }
        Some((pattern, params))
    }

    /// Resolves the context's request and runs its chain.
    ///
    /// On a hit the stored handler becomes the chain's terminal entry; on a
    /// miss a 404 handler with a diagnostic body takes its place. Either
    /// way the chain starts here.
    pub(crate) fn dispatch(&self, c: &mut Context) {
        let resolved = self.resolve(c.method(), c.path()).and_then(|(pattern, params)| {
            let key = (c.method().clone(), pattern.to_owned());
            self.handlers.get(&key).map(|h| (Arc::clone(h), params))
        });

        match resolved {
            Some((handler, params)) => {
                c.set_params(params);
                c.push_handler(handler);
            }
            None => c.push_handler(Arc::new(not_found)),
        }
        c.next();
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

fn not_found(c: &mut Context) {
    let path = c.path().to_owned();
    c.string(StatusCode::NOT_FOUND, format!("404 NOT FOUND: {path}\n"));
}

fn validate_pattern(pattern: &str) -> Result<(), Error> {
    let parts: Vec<&str> = pattern.split('/').filter(|p| !p.is_empty()).collect();
    if let Some(index) = parts.iter().position(|p| p.starts_with('*')) {
        if index != parts.len() - 1 {
            return Err(Error::MalformedPattern {
                pattern: pattern.to_owned(),
                reason: "a `*` segment must be the last segment",
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_c: &mut Context) {}

    fn test_router() -> Router {
        let mut r = Router::new();
        r.add_route(Method::GET, "/", noop).unwrap();
        r.add_route(Method::GET, "/hello/:name", noop).unwrap();
        r.add_route(Method::GET, "/hello/b/c", noop).unwrap();
        r.add_route(Method::GET, "/hi/:name", noop).unwrap();
        r.add_route(Method::GET, "/assets/*filepath", noop).unwrap();
        r
    }

    #[test]
    fn parametric_route_binds_its_segment() {
        let r = test_router();
        let (pattern, params) = r.resolve(&Method::GET, "/hello/geektutu").unwrap();
        assert_eq!(pattern, "/hello/:name");
        assert_eq!(params.get("name").map(String::as_str), Some("geektutu"));
    }

    #[test]
    fn literal_route_wins_over_parameter_when_deeper() {
        let r = test_router();
        let (pattern, params) = r.resolve(&Method::GET, "/hello/b/c").unwrap();
        assert_eq!(pattern, "/hello/b/c");
        assert!(params.is_empty());
    }

    #[test]
    fn wildcard_captures_the_joined_remainder() {
        let r = test_router();
        let (pattern, params) = r.resolve(&Method::GET, "/assets/css/a.css").unwrap();
        assert_eq!(pattern, "/assets/*filepath");
        assert_eq!(params.get("filepath").map(String::as_str), Some("css/a.css"));
    }

    #[test]
    fn structural_miss_is_a_clean_none() {
        let r = test_router();
        assert!(r.resolve(&Method::GET, "/unknown").is_none());
        assert!(r.resolve(&Method::GET, "/hello/b/c/d").is_none());
        // No root registered for the method at all.
        assert!(r.resolve(&Method::POST, "/hello/geektutu").is_none());
    }

    #[test]
    fn trailing_slash_is_not_distinguished() {
        let r = test_router();
        let (pattern, _) = r.resolve(&Method::GET, "/hello/geektutu/").unwrap();
        assert_eq!(pattern, "/hello/:name");
    }

    #[test]
    fn duplicate_registration_is_an_error() {
        let mut r = Router::new();
        r.add_route(Method::GET, "/p/:lang", noop).unwrap();
        assert!(matches!(
            r.add_route(Method::GET, "/p/a", noop),
            Err(Error::DuplicateRoute { .. })
        ));
        // Same shape under a different method is fine.
        r.add_route(Method::POST, "/p/a", noop).unwrap();
    }

    #[test]
    fn misplaced_wildcard_is_rejected() {
        let mut r = Router::new();
        assert!(matches!(
            r.add_route(Method::GET, "/files/*path/meta", noop),
            Err(Error::MalformedPattern { .. })
        ));
        assert!(matches!(
            r.add_route(Method::GET, "/p/*name/*", noop),
            Err(Error::MalformedPattern { .. })
        ));
        r.add_route(Method::GET, "/files/*path", noop).unwrap();
    }

    #[test]
    fn resolution_is_idempotent() {
        let r = test_router();
        let first = r.resolve(&Method::GET, "/hello/geektutu").map(|(p, m)| (p.to_owned(), m));
        let second = r.resolve(&Method::GET, "/hello/geektutu").map(|(p, m)| (p.to_owned(), m));
        assert_eq!(first, second);
        assert!(first.is_some());
    }
}
