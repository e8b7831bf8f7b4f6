//! HTTP/1.1 server.
//!
//! Accepts TCP connections on a Tokio listener and serves each one on its own
//! task with hyper. On shutdown the accept loop stops, open connections
//! finish their current request and close, and the server waits up to the
//! configured timeout for them.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn, Span};
use tracker_config::{ServerSection, TrackerConfig};
use tracker_core::{MemoryTokenStore, TrackerContext};
use tracker_middleware::Pipeline;
use tracker_schema::JsonSchemaValidator;
use tracker_telemetry::{service_span, DEFAULT_SERVICE_NAME};

use crate::accept::AcceptEvent;
use crate::error::ServerError;
use crate::health::HealthCheck;
use crate::routes::Routes;
use crate::shutdown::{ConnectionTracker, ShutdownSignal};

/// The tracker HTTP server.
///
/// # Example
///
/// ```rust,ignore
/// use tracker_config::ConfigLoader;
/// use tracker_server::{Server, ShutdownSignal};
///
/// let config = ConfigLoader::new().with_file("tracker.toml")?.load()?;
/// let server = Server::from_config(&config)?;
/// server
///     .run(config.server.socket_addr()?, ShutdownSignal::with_os_signals())
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct Server {
    inner: Arc<ServerInner>,
}

#[derive(Debug)]
struct ServerInner {
    routes: Routes,
    shutdown_timeout: Duration,
}

impl Server {
    /// Creates a server around an assembled pipeline.
    pub fn new(pipeline: Pipeline, settings: &ServerSection) -> Self {
        Self::with_service_name(pipeline, settings, DEFAULT_SERVICE_NAME)
    }

    /// Creates a server whose health endpoint reports `service_name`.
    pub fn with_service_name(
        pipeline: Pipeline,
        settings: &ServerSection,
        service_name: &str,
    ) -> Self {
        let routes = Routes::new(
            pipeline,
            settings.events_path.clone(),
            settings.max_body_bytes,
            HealthCheck::new(service_name, crate::VERSION),
        );

        Self {
            inner: Arc::new(ServerInner {
                routes,
                shutdown_timeout: settings.shutdown_timeout(),
            }),
        }
    }

    /// Builds the production wiring from configuration.
    ///
    /// Loads the schema file (or the bundled event schema when none is
    /// configured), seeds the in-memory token store and attaches the service
    /// span as the pipeline logger. Every accepted event is answered by
    /// [`AcceptEvent`].
    pub fn from_config(config: &TrackerConfig) -> Result<Self, ServerError> {
        let validator = match &config.schema.path {
            Some(path) => JsonSchemaValidator::from_file(path)?,
            None => {
                debug!("no schema path configured, using the bundled event schema");
                JsonSchemaValidator::event_schema()?
            }
        };

        let store = MemoryTokenStore::from_tokens(config.auth.tokens.iter().cloned());
        if store.is_empty() {
            warn!("no tracking tokens configured, every event will be rejected");
        }

        let log_config = config.logging.to_log_config();
        let ctx = TrackerContext::new(Arc::new(store), Arc::new(validator))
            .with_logger(service_span(&log_config.service_name));

        Ok(Self::with_service_name(
            Pipeline::new(ctx, AcceptEvent::new()),
            &config.server,
            &log_config.service_name,
        ))
    }

    /// The route table.
    pub fn routes(&self) -> &Routes {
        &self.inner.routes
    }

    fn logger(&self) -> &Span {
        self.inner.routes.pipeline().context().logger()
    }

    /// Binds `addr` and serves until `shutdown` fires.
    pub async fn run(self, addr: SocketAddr, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;
        self.serve(listener, shutdown).await
    }

    /// Serves connections from an already bound listener until `shutdown`
    /// fires, then drains open connections.
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown: ShutdownSignal,
    ) -> Result<(), ServerError> {
        let local_addr = listener.local_addr()?;
        let connections = ConnectionTracker::new();

        info!(
            parent: self.logger(),
            addr = %local_addr,
            events_path = self.inner.routes.events_path(),
            "tracker server listening"
        );

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    match accepted {
                        Ok((stream, peer)) => {
                            let inner = Arc::clone(&self.inner);
                            let token = connections.acquire();
                            let shutdown = shutdown.clone();

                            tokio::spawn(async move {
                                let _token = token;
                                if let Err(e) = inner.serve_connection(stream, shutdown).await {
                                    debug!(
                                        parent: inner.routes.pipeline().context().logger(),
                                        peer.addr = %peer,
                                        error = %e,
                                        "connection error"
                                    );
                                }
                            });
                        }
                        Err(e) => {
                            warn!(parent: self.logger(), error = %e, "failed to accept connection");
                        }
                    }
                }
                () = shutdown.recv() => {
                    info!(parent: self.logger(), "shutdown signal received, no longer accepting connections");
                    break;
                }
            }
        }

        drop(listener);

        tokio::select! {
            () = connections.wait_for_idle() => {
                info!(parent: self.logger(), "all connections closed");
            }
            () = tokio::time::sleep(self.inner.shutdown_timeout) => {
                warn!(
                    parent: self.logger(),
                    open_connections = connections.active(),
                    "shutdown timeout elapsed with connections still open"
                );
            }
        }

        Ok(())
    }
}

impl ServerInner {
    async fn serve_connection(
        self: &Arc<Self>,
        stream: TcpStream,
        shutdown: ShutdownSignal,
    ) -> Result<(), hyper::Error> {
        let io = TokioIo::new(stream);
        let inner = Arc::clone(self);

        let service = service_fn(move |request: http::Request<Incoming>| {
            let inner = Arc::clone(&inner);
            async move { Ok::<_, Infallible>(inner.routes.dispatch(request).await) }
        });

        let connection = http1::Builder::new().serve_connection(io, service);
        tokio::pin!(connection);

        tokio::select! {
            result = connection.as_mut() => result,
            () = shutdown.recv() => {
                connection.as_mut().graceful_shutdown();
                connection.await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracker_config::{AuthSection, SchemaSection};

    #[test]
    fn test_from_config_uses_bundled_schema() {
        let config = TrackerConfig {
            auth: AuthSection {
                tokens: vec!["site-a".to_string()],
            },
            ..Default::default()
        };
        let server = Server::from_config(&config).unwrap();
        assert_eq!(server.routes().events_path(), "/track");
        assert_eq!(
            server.routes().pipeline().stage_names(),
            vec!["token_authorization", "content_type", "schema_validation"]
        );
    }

    #[test]
    fn test_from_config_reports_missing_schema_file() {
        let config = TrackerConfig {
            schema: SchemaSection {
                path: Some("/nonexistent/event.schema.json".into()),
            },
            ..Default::default()
        };
        let err = Server::from_config(&config).unwrap_err();
        assert!(matches!(err, ServerError::Schema(_)));
    }

    #[tokio::test]
    async fn test_run_reports_bind_failure() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = taken.local_addr().unwrap();

        let server = Server::from_config(&TrackerConfig::default()).unwrap();
        let err = server.run(addr, ShutdownSignal::new()).await.unwrap_err();
        assert!(matches!(err, ServerError::Bind { .. }));
    }

    #[tokio::test]
    async fn test_serve_returns_after_shutdown() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let server = Server::from_config(&TrackerConfig::default()).unwrap();
        let shutdown = ShutdownSignal::new();
        shutdown.trigger();

        tokio::time::timeout(Duration::from_secs(5), server.serve(listener, shutdown))
            .await
            .unwrap()
            .unwrap();
    }
}
