//! Server errors.

use std::net::SocketAddr;

use thiserror::Error;
use tracker_schema::SchemaLoadError;

/// Errors that stop the server from starting or running.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Binding the listen address failed.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Address that could not be bound.
        addr: SocketAddr,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// I/O error on the listener.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The event schema could not be loaded.
    #[error("failed to load event schema: {0}")]
    Schema(#[from] SchemaLoadError),
}
