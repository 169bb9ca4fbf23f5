//! Built-in Kubernetes health-check handlers.
//!
//! Kubernetes asks two questions. arbor answers them.
//!
//! | Probe | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? Failure → restart. |
//! | **Readiness** | `/readyz` | Can the pod serve traffic? Failure → pulled from load-balancer. |
//!
//! Register them on your engine:
//!
//! ```rust
//! use arbor::{Engine, health};
//!
//! let mut app = Engine::new();
//! app.get("/healthz", health::liveness);
//! app.get("/readyz", health::readiness);
//! ```
//!
//! Override `readiness` with a custom handler if you need to gate on
//! dependency availability (database connections, downstream services,
//! etc.).

use http::StatusCode;

use crate::context::Context;

/// Kubernetes liveness probe handler.
///
/// Always returns `200 OK` with body `"ok"`. If the process can respond to
/// HTTP at all, it is alive — this handler intentionally has no
/// dependencies.
pub fn liveness(c: &mut Context) {
    c.string(StatusCode::OK, "ok");
}

/// Kubernetes readiness probe handler (default implementation).
///
/// Returns `200 OK` with body `"ready"`. Replace this with your own handler
/// if your application needs a warm-up period or must verify dependency
/// health before accepting traffic.
pub fn readiness(c: &mut Context) {
    c.string(StatusCode::OK, "ready");
}
