//! Unified error type.

use std::fmt;

/// The error type returned by arbor's fallible operations.
///
/// Per-request conditions (404, explicit failures) are expressed as HTTP
/// responses, not as `Error`s. This type surfaces infrastructure failures
/// (binding a port, accepting a connection) and startup configuration
/// errors in the route table. Configuration errors are fatal by policy: the
/// ergonomic registration methods panic on them rather than letting an
/// unreachable or ambiguous route go live.
#[derive(Debug)]
pub enum Error {
    /// Listener-level I/O failure.
    Io(std::io::Error),
    /// Two different patterns normalize to the same segment sequence for
    /// one HTTP method.
    DuplicateRoute { pattern: String, existing: String },
    /// A wildcard placed where the matcher cannot honor it.
    MalformedPattern { pattern: String, reason: &'static str },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::DuplicateRoute { pattern, existing } => {
                write!(f, "duplicate route: `{pattern}` collides with registered `{existing}`")
            }
            Self::MalformedPattern { pattern, reason } => {
                write!(f, "malformed pattern `{pattern}`: {reason}")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
