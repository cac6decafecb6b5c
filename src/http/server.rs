//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all proxy handler
//! - Wire up middleware (tracing, request ID)
//! - Bind server to listener
//! - Forward matching requests to the backend origin (http or https)
//! - Swap in reloaded configuration without dropping connections

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::ProxyConfig;
use crate::http::request::{prepare_forward_request, request_id, MakeRequestUuidV4, X_REQUEST_ID};
use crate::http::response::{into_client_response, proxy_error_response, UpstreamFailure};
use crate::observability::metrics;
use crate::routing::{RoutingError, Upstream};

/// Errors constructing the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid proxy configuration: {0}")]
    Routing(#[from] RoutingError),
    #[error("failed to set up upstream TLS: {0}")]
    Tls(#[from] rustls::Error),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub upstream: Arc<ArcSwap<Upstream>>,
    pub client: Client<HttpsConnector<HttpConnector>, Body>,
    pub request_timeout: Duration,
}

/// HTTP server for the development proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
    upstream: Arc<ArcSwap<Upstream>>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, ServerError> {
        let upstream = Arc::new(ArcSwap::from_pointee(Upstream::from_config(&config.proxy)?));

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(config.timeouts.connect_secs)));
        // The TLS wrapper hands https URIs to the inner connector.
        connector.enforce_http(false);
        let connector = HttpsConnectorBuilder::new()
            .with_provider_and_webpki_roots(rustls::crypto::ring::default_provider())?
            .https_or_http()
            .enable_http1()
            .wrap_connector(connector);
        let client = Client::builder(TokioExecutor::new()).build(connector);

        let state = AppState {
            upstream: upstream.clone(),
            client,
            request_timeout: Duration::from_secs(config.timeouts.request_secs),
        };

        let router = Self::build_router(state);
        Ok(Self {
            router,
            config,
            upstream,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuidV4))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::new(X_REQUEST_ID)),
            )
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Configs received on `config_updates` replace the live upstream.
    /// Returns once `shutdown` fires and in-flight requests have drained.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<ProxyConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        let current = self.upstream.load_full();
        tracing::info!(
            address = %addr,
            context = %current.context(),
            target = %current.target(),
            "HTTP server starting"
        );

        let upstream = self.upstream.clone();
        let running = self.config.clone();
        tokio::spawn(async move {
            while let Some(new_config) = config_updates.recv().await {
                apply_update(&upstream, &running, &new_config);
            }
        });

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config the server was started with.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Snapshot of the upstream currently serving requests.
    pub fn upstream(&self) -> Arc<Upstream> {
        self.upstream.load_full()
    }
}

/// Config sections that differ from `running` but only take effect on restart.
fn restart_only_changes(running: &ProxyConfig, config: &ProxyConfig) -> Vec<&'static str> {
    let mut changed = Vec::new();
    if config.listener != running.listener {
        changed.push("listener");
    }
    if config.timeouts != running.timeouts {
        changed.push("timeouts");
    }
    if config.observability != running.observability {
        changed.push("observability");
    }
    changed
}

fn apply_update(upstream: &ArcSwap<Upstream>, running: &ProxyConfig, config: &ProxyConfig) {
    for section in restart_only_changes(running, config) {
        tracing::warn!(section, "Changes to this section require a restart; ignoring");
    }

    match Upstream::from_config(&config.proxy) {
        Ok(new_upstream) => {
            tracing::info!(
                context = %new_upstream.context(),
                target = %new_upstream.target(),
                "Proxy configuration reloaded"
            );
            upstream.store(Arc::new(new_upstream));
        }
        Err(e) => {
            tracing::error!(error = %e, "Rejected reloaded configuration; keeping current upstream");
        }
    }
}

/// Main proxy handler.
/// Checks the context, rewrites the request, and streams the backend response back.
async fn proxy_handler(
    State(state): State<AppState>,
    ConnectInfo(client_addr): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(&request);
    let method = request.method().to_string();
    let path = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    let host = request
        .headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let upstream = state.upstream.load_full();

    if !upstream.matches(&request) {
        tracing::debug!(request_id = %request_id, path = %path, "No route matched");
        metrics::record_request(&method, 404, "unmatched", start_time);
        return (StatusCode::NOT_FOUND, "No matching route found").into_response();
    }

    let forward = match prepare_forward_request(request, &upstream, client_addr) {
        Ok(req) => req,
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Failed to build upstream request");
            let failure = UpstreamFailure::Other;
            metrics::record_request(&method, failure.status().as_u16(), "error", start_time);
            return proxy_error_response(failure, &host, &path);
        }
    };

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        upstream_uri = %forward.uri(),
        "Proxying request"
    );

    let failure = match tokio::time::timeout(state.request_timeout, state.client.request(forward)).await {
        Ok(Ok(response)) => {
            metrics::record_request(&method, response.status().as_u16(), "forwarded", start_time);
            return into_client_response(response);
        }
        Ok(Err(e)) => {
            tracing::error!(request_id = %request_id, target = %upstream.target(), error = %e, "Upstream error");
            UpstreamFailure::from_client_error(&e)
        }
        Err(_) => {
            tracing::error!(
                request_id = %request_id,
                target = %upstream.target(),
                timeout = ?state.request_timeout,
                "Upstream timed out"
            );
            UpstreamFailure::Timeout
        }
    };

    metrics::record_request(&method, failure.status().as_u16(), "error", start_time);
    proxy_error_response(failure, &host, &path)
}
