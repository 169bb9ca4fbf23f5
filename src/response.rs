//! Outgoing HTTP response type.
//!
//! Handlers do not build these directly: they write through the
//! [`Context`](crate::Context), and the dispatcher flushes the context into
//! a `Response` once the chain finishes. Embedders receive it from
//! [`Engine::handle`](crate::Engine::handle); the bundled server converts it
//! to a hyper response.

use bytes::Bytes;
use http::{HeaderName, HeaderValue, StatusCode};
use http_body_util::Full;
use tracing::warn;

// ── ContentType ───────────────────────────────────────────────────────────────

/// Common content-type values.
///
/// The typed writers on [`Context`](crate::Context) set these for you; the
/// static file handler guesses one from the file extension.
pub enum ContentType {
    Css,         // text/css
    Gif,         // image/gif
    Html,        // text/html; charset=utf-8
    Ico,         // image/x-icon
    JavaScript,  // text/javascript
    Jpeg,        // image/jpeg
    Json,        // application/json
    OctetStream, // application/octet-stream  (binary / file download)
    Pdf,         // application/pdf
    Png,         // image/png
    Svg,         // image/svg+xml
    Text,        // text/plain; charset=utf-8
    Xml,         // application/xml
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Css         => "text/css",
            Self::Gif         => "image/gif",
            Self::Html        => "text/html; charset=utf-8",
            Self::Ico         => "image/x-icon",
            Self::JavaScript  => "text/javascript",
            Self::Jpeg        => "image/jpeg",
            Self::Json        => "application/json",
            Self::OctetStream => "application/octet-stream",
            Self::Pdf         => "application/pdf",
            Self::Png         => "image/png",
            Self::Svg         => "image/svg+xml",
            Self::Text        => "text/plain; charset=utf-8",
            Self::Xml         => "application/xml",
        }
    }

    /// Guesses a content type from a lowercase file extension.
    /// Unknown extensions are served as `application/octet-stream`.
    pub fn from_extension(ext: &str) -> Self {
        match ext {
            "css"          => Self::Css,
            "gif"          => Self::Gif,
            "htm" | "html" => Self::Html,
            "ico"          => Self::Ico,
            "js" | "mjs"   => Self::JavaScript,
            "jpeg" | "jpg" => Self::Jpeg,
            "json"         => Self::Json,
            "pdf"          => Self::Pdf,
            "png"          => Self::Png,
            "svg"          => Self::Svg,
            "txt"          => Self::Text,
            "xml"          => Self::Xml,
            _              => Self::OctetStream,
        }
    }
}

// ── Response ─────────────────────────────────────────────────────────────────

/// An outgoing HTTP response: status, headers, body bytes.
pub struct Response {
    pub(crate) status: StatusCode,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Vec<u8>,
}

impl Response {
    pub(crate) fn empty(status: StatusCode) -> Self {
        Self { status, headers: Vec::new(), body: Vec::new() }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Converts into a hyper-compatible response. Infallible: a header pair
    /// that is not legal on the wire is dropped with a warning instead of
    /// failing the whole response.
    pub(crate) fn into_http(self) -> http::Response<Full<Bytes>> {
        let mut response = http::Response::new(Full::new(Bytes::from(self.body)));
        *response.status_mut() = self.status;

        for (name, value) in self.headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(&value),
            ) {
                (Ok(name), Ok(value)) => {
                    response.headers_mut().append(name, value);
                }
                _ => warn!(header = %name, "dropping invalid response header"),
            }
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_headers_are_dropped_not_fatal() {
        let response = Response {
            status: StatusCode::OK,
            headers: vec![
                ("x-ok".to_owned(), "yes".to_owned()),
                ("bad name".to_owned(), "nope".to_owned()),
            ],
            body: b"hi".to_vec(),
        };
        let http = response.into_http();
        assert_eq!(http.status(), StatusCode::OK);
        assert_eq!(http.headers().get("x-ok").map(|v| v.as_bytes()), Some(&b"yes"[..]));
        assert_eq!(http.headers().len(), 1);
    }

    #[test]
    fn extension_guessing_defaults_to_octet_stream() {
        assert_eq!(ContentType::from_extension("css").as_str(), "text/css");
        assert_eq!(ContentType::from_extension("weird").as_str(), "application/octet-stream");
    }
}
