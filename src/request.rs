//! Incoming HTTP request type.

use bytes::Bytes;
use http::Method;

/// An incoming HTTP request, as seen by the dispatch core.
///
/// The core's inbound contract is deliberately small: a method, a path, a
/// query string, headers, and body bytes. The bundled [`Server`] builds one
/// of these per hyper request; embedders driving [`Engine::handle`] directly
/// construct it with [`Request::new`].
///
/// [`Server`]: crate::Server
/// [`Engine::handle`]: crate::Engine::handle
pub struct Request {
    method: Method,
    path: String,
    query: String,
    headers: Vec<(String, String)>,
    body: Bytes,
}

impl Request {
    /// Builds a request for `target`, which may carry a query string:
    /// `Request::new(Method::GET, "/search?q=trie")`.
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, query),
            None => (target, ""),
        };
        Self {
            method,
            path: path.to_owned(),
            query: query.to_owned(),
            headers: Vec::new(),
            body: Bytes::new(),
        }
    }

    /// Appends a header. Chainable.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    /// Sets the body bytes. Chainable.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub(crate) fn from_http(parts: &http::request::Parts, body: Bytes) -> Self {
        Self {
            method: parts.method.clone(),
            path: parts.uri.path().to_owned(),
            query: parts.uri.query().unwrap_or("").to_owned(),
            headers: parts
                .headers
                .iter()
                .map(|(name, value)| {
                    (
                        name.as_str().to_owned(),
                        String::from_utf8_lossy(value.as_bytes()).into_owned(),
                    )
                })
                .collect(),
            body,
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// The raw query string, without the leading `?`. Empty if absent.
    pub fn query_string(&self) -> &str {
        &self.query
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns the first query-string value for `key`, percent-decoded.
    pub fn query_value(&self, key: &str) -> Option<String> {
        url::form_urlencoded::parse(self.query.as_bytes())
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    /// Returns the first value for `key` in a `x-www-form-urlencoded` body.
    pub fn form_value(&self, key: &str) -> Option<String> {
        url::form_urlencoded::parse(&self.body)
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_query_from_target() {
        let req = Request::new(Method::GET, "/search?q=trie&lang=rust");
        assert_eq!(req.path(), "/search");
        assert_eq!(req.query_string(), "q=trie&lang=rust");
        assert_eq!(req.query_value("q").as_deref(), Some("trie"));
        assert_eq!(req.query_value("lang").as_deref(), Some("rust"));
        assert_eq!(req.query_value("missing"), None);
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let req = Request::new(Method::GET, "/").with_header("Content-Type", "application/json");
        assert_eq!(req.header("content-type"), Some("application/json"));
    }

    #[test]
    fn decodes_form_bodies() {
        let req = Request::new(Method::POST, "/form")
            .with_body(&b"username=geektutu&password=12%2034"[..]);
        assert_eq!(req.form_value("username").as_deref(), Some("geektutu"));
        assert_eq!(req.form_value("password").as_deref(), Some("12 34"));
    }
}
