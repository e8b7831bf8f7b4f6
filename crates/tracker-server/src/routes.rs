//! Route table.
//!
//! | Method | Path            | Result                         |
//! |--------|-----------------|--------------------------------|
//! | POST   | events path     | validation pipeline            |
//! | GET    | `/health`       | JSON liveness document         |
//! | other  | events path     | 405, `Allow: POST`             |
//! | other  | `/health`       | 405, `Allow: GET`              |
//! | any    | anything else   | 404                            |

use bytes::Bytes;
use http::header::{HeaderValue, ALLOW};
use http::{Method, StatusCode};
use http_body::Body;
use http_body_util::Limited;
use tracing::debug;
use tracker_middleware::{BoxError, Pipeline, RequestBody, Response, ResponseExt};

use crate::health::{HealthCheck, HEALTH_PATH};

/// Where a request goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Event submission through the pipeline.
    Events,
    /// Liveness check.
    Health,
    /// Known path, wrong method. Carries the `Allow` header value.
    MethodNotAllowed(&'static str),
    /// Unknown path.
    NotFound,
}

/// Dispatches requests to the pipeline or the built-in endpoints.
#[derive(Debug)]
pub struct Routes {
    pipeline: Pipeline,
    events_path: String,
    max_body_bytes: usize,
    health: HealthCheck,
}

impl Routes {
    /// Creates the table around an assembled pipeline.
    pub fn new(
        pipeline: Pipeline,
        events_path: impl Into<String>,
        max_body_bytes: usize,
        health: HealthCheck,
    ) -> Self {
        Self {
            pipeline,
            events_path: events_path.into(),
            max_body_bytes,
            health,
        }
    }

    /// The path that accepts events.
    pub fn events_path(&self) -> &str {
        &self.events_path
    }

    /// The pipeline behind the events path.
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Resolves a method and path.
    pub fn route(&self, method: &Method, path: &str) -> Route {
        if path == self.events_path {
            if method == Method::POST {
                Route::Events
            } else {
                Route::MethodNotAllowed("POST")
            }
        } else if path == HEALTH_PATH {
            if method == Method::GET {
                Route::Health
            } else {
                Route::MethodNotAllowed("GET")
            }
        } else {
            Route::NotFound
        }
    }

    /// Answers one request.
    ///
    /// Event bodies are capped at the configured size; a longer body fails
    /// when the schema stage reads it.
    pub async fn dispatch<B>(&self, request: http::Request<B>) -> Response
    where
        B: Body<Data = Bytes> + Send + 'static,
        B::Error: Into<BoxError>,
    {
        let method = request.method().clone();
        let route = self.route(&method, request.uri().path());
        let path = request.uri().path().to_string();

        let response = match route {
            Route::Events => {
                let (head, body) = request.into_parts();
                let body = RequestBody::new(Limited::new(body, self.max_body_bytes));
                self.pipeline
                    .process(http::Request::from_parts(head, body))
                    .await
            }
            Route::Health => self.health.response(),
            Route::MethodNotAllowed(allow) => {
                let mut response = Response::status_text(StatusCode::METHOD_NOT_ALLOWED);
                response
                    .headers_mut()
                    .insert(ALLOW, HeaderValue::from_static(allow));
                response
            }
            Route::NotFound => Response::status_text(StatusCode::NOT_FOUND),
        };

        debug!(
            parent: self.pipeline.context().logger(),
            http.method = %method,
            http.path = %path,
            http.status_code = response.status().as_u16(),
            "request finished"
        );

        response
    }
}
