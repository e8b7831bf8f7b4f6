//! # Tracker Middleware
//!
//! Fixed-order validation pipeline for inbound event-tracking requests.
//!
//! ## Pipeline Stages
//!
//! ```text
//! Request → TokenAuthorization → ContentType → SchemaValidation → EventHandler
//! ```
//!
//! | Stage | Middleware          | Rejects with          |
//! |-------|---------------------|-----------------------|
//! | 1     | Token authorization | 400, 401, 500         |
//! | 2     | Content type        | 400, 415              |
//! | 3     | Schema validation   | 500, 400              |
//!
//! Each stage either answers the request itself or forwards it untouched.
//! Only the schema validation stage reads the body; it stores the bytes in
//! the request's terminal slot so the business handler receives exactly what
//! the client sent.
//!
//! ## Example
//!
//! ```
//! use tracker_middleware::Stage;
//!
//! let stages = Stage::all();
//! assert_eq!(stages[0].name(), "token_authorization");
//! assert!(stages[2].consumes_body());
//! ```
//!
//! The body-consuming stage and its terminal are not part of the public API:
//!
//! ```compile_fail
//! use tracker_middleware::BodyMiddleware;
//! ```
//!
//! ```compile_fail
//! use tracker_middleware::terminal::Terminal;
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod middleware;
pub mod pipeline;
pub mod stages;
pub mod terminal;
pub mod types;

#[cfg(test)]
mod testing;

pub use middleware::{BoxFuture, Middleware, Next};
pub use pipeline::{Pipeline, Stage};
pub use terminal::{EventHandler, FnEventHandler};
pub use types::{BoxError, Request, RequestBody, Response, ResponseExt};
