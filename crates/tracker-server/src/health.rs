//! Liveness endpoint.
//!
//! `GET /health` answers with a small JSON document so load balancers can
//! check the process without a tracking token.
//!
//! ```rust
//! use tracker_server::HealthCheck;
//!
//! let health = HealthCheck::new("tracker", "0.1.0");
//! let status = health.status();
//! assert_eq!(status.status, "healthy");
//! assert_eq!(status.service, "tracker");
//! ```

use std::time::{Duration, Instant};

use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::StatusCode;
use http_body_util::Full;
use serde::{Deserialize, Serialize};
use tracker_middleware::Response;

/// Path of the liveness endpoint.
pub const HEALTH_PATH: &str = "/health";

/// Body of a `/health` response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthStatus {
    /// Always "healthy" while the process can answer.
    pub status: String,

    /// Service name.
    pub service: String,

    /// Crate version.
    pub version: String,

    /// Seconds since the server was built.
    pub uptime_seconds: u64,
}

/// Liveness reporter.
#[derive(Debug, Clone)]
pub struct HealthCheck {
    service: String,
    version: String,
    started: Instant,
}

impl HealthCheck {
    /// Creates a reporter whose uptime starts now.
    #[must_use]
    pub fn new(service: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            version: version.into(),
            started: Instant::now(),
        }
    }

    /// Time since this reporter was created.
    #[must_use]
    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> HealthStatus {
        HealthStatus {
            status: "healthy".to_string(),
            service: self.service.clone(),
            version: self.version.clone(),
            uptime_seconds: self.uptime().as_secs(),
        }
    }

    /// Renders the status as a `200 OK` JSON response.
    #[must_use]
    pub fn response(&self) -> Response {
        let body = serde_json::to_vec(&self.status())
            .unwrap_or_else(|_| br#"{"status":"healthy"}"#.to_vec());

        let mut response = http::Response::new(Full::new(Bytes::from(body)));
        *response.status_mut() = StatusCode::OK;
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        response
    }
}
