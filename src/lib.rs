//! # sample-api
//!
//! A small JSON REST service built on a from-scratch async HTTP/1.1 router.
//!
//! The router matches method + path (with `:name` parameters and grouped
//! prefixes), decodes and validates typed JSON bodies, and answers with JSON.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sample_api::{Method, StatusCode};
//!
//! # async fn demo() {
//! let router = sample_api::api::router();
//! let res = router
//!     .dispatch(Method::Post, "/users", None, r#"{"name":"Alice","age":30}"#)
//!     .await;
//! assert_eq!(res.status(), StatusCode::Ok);
//! # }
//! ```

pub mod api;
pub mod config;
pub mod context;
pub mod database;
pub mod http;
pub mod middleware;
pub mod router;
pub mod server;
pub mod validation;

// ── Convenience re-exports ────────────────────────────────────────────────────
pub use http::{Headers, Method, Request, Response, StatusCode};
pub use router::Router;
pub use server::{Server, ServerError};
