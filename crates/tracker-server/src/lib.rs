//! # Tracker Server
//!
//! HTTP front end for the tracker ingestion pipeline.
//!
//! - [`Server`] - hyper HTTP/1.1 server with graceful shutdown
//! - [`Routes`] - `POST <events path>` to the pipeline, `GET /health`
//! - [`AcceptEvent`] - default handler answering `202 Accepted`
//! - [`ShutdownSignal`] / [`ConnectionTracker`] - shutdown coordination
//!
//! ## Example
//!
//! ```rust,ignore
//! use tracker_config::ConfigLoader;
//! use tracker_server::{Server, ShutdownSignal};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::new().with_file("tracker.toml")?.load()?;
//!     let addr = config.server.socket_addr()?;
//!
//!     Server::from_config(&config)?
//!         .run(addr, ShutdownSignal::with_os_signals())
//!         .await?;
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/tracker-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod accept;
mod error;
mod health;
mod routes;
mod server;
mod shutdown;

pub use accept::AcceptEvent;
pub use error::ServerError;
pub use health::{HealthCheck, HealthStatus, HEALTH_PATH};
pub use routes::{Route, Routes};
pub use server::Server;
pub use shutdown::{ConnectionToken, ConnectionTracker, ShutdownSignal};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
