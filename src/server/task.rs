//! # HTTP server as a supervised task.

use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::{HeaderName, HeaderValue, Method, header};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, decompression::RequestDecompressionLayer,
    trace::TraceLayer,
};

use crate::error::{ConfigError, TaskError};
use crate::server::products;
use crate::tasks::Task;

/// Settings for [`HttpServer`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    /// Listen address, `host:port`.
    pub address: String,
    /// Origin allowed by CORS.
    pub allowed_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "localhost:8080".into(),
            allowed_origin: "http://localhost:5173".into(),
        }
    }
}

/// Serves the product listing until the lifetime is cancelled.
#[derive(Debug)]
pub struct HttpServer {
    cfg: ServerConfig,
    cors: CorsLayer,
}

impl HttpServer {
    /// Validates `cfg` and builds the server.
    pub fn new(cfg: ServerConfig) -> Result<Self, ConfigError> {
        let origin = HeaderValue::from_str(&cfg.allowed_origin).map_err(|e| ConfigError::Invalid {
            field: "allowed origin",
            reason: e.to_string(),
        })?;
        let cors = CorsLayer::new()
            .allow_origin(origin)
            .allow_credentials(true)
            .allow_methods([
                Method::HEAD,
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
            ])
            .allow_headers([
                header::ORIGIN,
                header::AUTHORIZATION,
                header::CONTENT_TYPE,
                header::ACCEPT_ENCODING,
            ])
            .expose_headers([
                header::CONTENT_LENGTH,
                header::ACCESS_CONTROL_ALLOW_ORIGIN,
                header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
                HeaderName::from_static("access-control-allow-headers"),
                HeaderName::from_static("access-control-allow-methods"),
            ])
            .max_age(Duration::from_secs(600));
        Ok(Self { cfg, cors })
    }

    /// Router with all layers applied.
    pub fn app(&self) -> axum::Router {
        products::router()
            .layer(self.cors.clone())
            .layer(CompressionLayer::new().gzip(true))
            .layer(RequestDecompressionLayer::new().gzip(true))
            .layer(TraceLayer::new_for_http())
    }

    /// Binds and serves on an already-open listener.
    pub async fn serve(&self, listener: TcpListener, lifetime: CancellationToken) -> Result<(), TaskError> {
        let local: Option<SocketAddr> = listener.local_addr().ok();
        tracing::info!(address = ?local, "http server running");

        axum::serve(listener, self.app())
            .with_graceful_shutdown(lifetime.cancelled_owned())
            .await
            .map_err(TaskError::fail)?;

        tracing::info!("http server shutdown processed");
        Ok(())
    }
}

#[async_trait]
impl Task for HttpServer {
    fn name(&self) -> &str {
        "http-server"
    }

    async fn run(&self, lifetime: CancellationToken) -> Result<(), TaskError> {
        let listener = TcpListener::bind(&self.cfg.address)
            .await
            .map_err(|e| TaskError::fail(format!("bind {}: {e}", self.cfg.address)))?;
        self.serve(listener, lifetime).await
    }
}
