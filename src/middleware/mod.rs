//! Built-in middleware.
//!
//! Middleware is an ordinary [`Handler`] that runs ahead of the route
//! handler and drives its own continuation: call [`Context::next`] to run
//! the rest of the chain (and regain control afterwards), or
//! [`Context::fail`] to stop it. These two built-ins cover the
//! cross-cutting concerns every deployment wants: request timing and
//! fault containment. Authentication, request-id injection, and the like
//! follow the same shape in application code.

use std::any::Any;
use std::backtrace::Backtrace;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Instant;

use http::StatusCode;
use tracing::{error, info};

use crate::context::Context;
use crate::handler::Handler;

/// Logs one structured line per completed request: method, path, resulting
/// status, elapsed time.
///
/// The elapsed time covers everything downstream of this middleware, so
/// install it early (outer) to measure the whole request.
pub fn logger() -> impl Handler {
    |c: &mut Context| {
        let start = Instant::now();
        c.next();
        info!(
            method = %c.method(),
            path = %c.path(),
            status = c.status_code().as_u16(),
            elapsed = ?start.elapsed(),
            "request completed"
        );
    }
}

/// Contains panics raised anywhere downstream, converting each into a 500
/// response instead of letting it tear down the serving task.
///
/// Install this **first**, so it sits outermost and nothing can panic
/// around it. The panic message and a captured backtrace go to the log;
/// the client sees only `{"message":"Internal Server Error"}`. Without
/// this middleware a panic propagates to the transport layer and kills
/// that one request's task; other in-flight requests are unaffected
/// either way, since nothing is shared between them.
pub fn recovery() -> impl Handler {
    |c: &mut Context| {
        if let Err(panic) = catch_unwind(AssertUnwindSafe(|| c.next())) {
            let message = panic_message(&panic);
            error!(
                panic = %message,
                backtrace = %Backtrace::force_capture(),
                "recovered from handler panic"
            );
            c.fail(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error");
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
