//! # arbor
//!
//! A minimal HTTP request-dispatch framework. A request comes in, a trie
//! resolves it to a handler, and an ordered middleware chain runs around
//! that handler. Nothing more. Nothing less.
//!
//! ## The contract
//!
//! The reverse proxy in front of you handles TLS, rate limiting, slow
//! clients, and body-size limits. arbor does not. What's left is the part
//! that changes between applications:
//!
//! - **Trie routing** — per-method prefix tree with static segments,
//!   `:name` parameters, and `*filepath` wildcard tails; conflicts are
//!   caught at startup, not at request time
//! - **Onion middleware** — a per-request chain driven by an explicit
//!   cursor: [`Context::next`] yields downstream, [`Context::fail`]
//!   short-circuits
//! - **Route groups** — prefix scopes that bundle shared middleware and
//!   nest
//! - **Graceful shutdown** — SIGTERM / Ctrl-C, drains in-flight requests
//!
//! The dispatch core itself performs no I/O: [`Engine::handle`] maps a
//! [`Request`] to a [`Response`], and the bundled [`Server`] is just hyper
//! plumbing around it. Embed the engine in any transport that can hand it
//! method + path + headers + body.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use arbor::{Context, Engine, Server, StatusCode};
//!
//! #[tokio::main]
//! async fn main() {
//!     // Recovery + request logging installed; use Engine::new() for none.
//!     let mut app = Engine::with_defaults();
//!
//!     app.get("/users/:id", get_user);
//!
//!     let mut admin = app.group("/admin");
//!     admin.use_middleware(|c: &mut Context| {
//!         if c.header("authorization").is_none() {
//!             c.fail(StatusCode::UNAUTHORIZED, "missing credentials");
//!         }
//!     });
//!     admin.get("/stats", |c: &mut Context| {
//!         c.json(StatusCode::OK, &serde_json::json!({ "uptime": "forever" }));
//!     });
//!
//!     Server::bind("0.0.0.0:3000").serve(app).await.unwrap();
//! }
//!
//! fn get_user(c: &mut Context) {
//!     let id = c.param("id").unwrap_or("unknown").to_owned();
//!     c.json(StatusCode::OK, &serde_json::json!({ "id": id }));
//! }
//! ```

mod context;
mod engine;
mod error;
mod handler;
mod request;
mod response;
mod router;
mod server;
mod trie;

pub mod health;
pub mod middleware;

pub use context::Context;
pub use engine::{Engine, RouterGroup};
pub use error::Error;
pub use handler::Handler;
pub use request::Request;
pub use response::{ContentType, Response};
pub use router::Router;
pub use server::Server;

// The HTTP vocabulary types are the `http` crate's — re-exported so
// applications need no direct dependency on it.
pub use http::{Method, StatusCode};
