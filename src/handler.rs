//! Handler trait and type erasure.
//!
//! # How handlers are stored
//!
//! A request's chain holds middleware and the terminal route handler in one
//! `Vec`, and the router's table holds handlers for every route; both need
//! to store handlers of *different* concrete types uniformly. Rust
//! collections hold one type, so handlers live behind a trait object:
//!
//! ```text
//! fn hello(c: &mut Context) { … }          ← user writes this
//!        ↓ engine.get("/", hello)
//! Arc::new(hello)                          ← coerced to Arc<dyn Handler>
//!        ↓ stored in the route table / cloned into each request's chain
//! handler.call(c)  at request time         ← one vtable dispatch
//! ```
//!
//! The per-request cost is one `Arc` clone (atomic increment) per chain
//! entry plus one virtual call each, negligible next to network I/O.
//!
//! Handlers are synchronous by contract: the dispatch core performs no I/O
//! of its own, and the chain hands a single `&mut Context` from entry to
//! entry. Anything slow belongs in front of or behind the dispatcher.

use std::sync::Arc;

use crate::context::Context;

/// A heap-allocated, type-erased handler shared across concurrent requests.
pub(crate) type BoxedHandler = Arc<dyn Handler>;

/// Implemented for every valid chain entry, middleware and route handlers
/// alike.
///
/// You never implement this yourself. It is automatically satisfied for any
/// function or closure with the signature:
///
/// ```text
/// fn name(c: &mut Context)
/// ```
///
/// A handler reads request facts and `c.param(…)`, writes response state,
/// and may call [`Context::next`] to run the downstream chain or
/// [`Context::fail`] to short-circuit it.
///
/// The trait is **sealed** (via the private `Sealed` supertrait): only the
/// blanket impl below can satisfy it. This keeps the handler contract,
/// and therefore the chain's execution model, stable across versions.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn call(&self, c: &mut Context);
}

/// The sealing module. Because `Sealed` is private, external crates cannot
/// name it and therefore cannot implement `Handler` on their own types.
mod private {
    pub trait Sealed {}
}

impl<F> private::Sealed for F where F: Fn(&mut Context) + Send + Sync + 'static {}

impl<F> Handler for F
where
    F: Fn(&mut Context) + Send + Sync + 'static,
{
    fn call(&self, c: &mut Context) {
        self(c)
    }
}
