//! HTTP server setup and request handling.
//!
//! # Responsibilities
//! - Create the Axum router with the catch-all edge handler
//! - Wire up middleware (tracing, timeout, request ID)
//! - Rewrite each request path by Host header before the origin fetch
//! - Forward requests to the origin with retries for idempotent methods
//! - Apply config updates without dropping traffic
//!
//! # Design Decisions
//! - Rewrite state lives behind an ArcSwap: the hot path takes a
//!   snapshot per request, reloads swap the whole snapshot atomically
//! - The rewriter never fails; only URI reassembly and the origin
//!   fetch have error paths (400 and 502 respectively)
//! - Query strings pass through untouched; only the path is rewritten

use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::{
        header,
        uri::{Authority, PathAndQuery, Scheme},
        HeaderValue, Request, StatusCode, Uri,
    },
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::{ConfigError, EdgeConfig, RetryConfig, ValidationError};
use crate::http::headers::{set_forwarded_host, strip_hop_by_hop};
use crate::http::request::{RequestIdLayer, REQUEST_ID_HEADER};
use crate::observability::metrics;
use crate::resilience::backoff::calculate_backoff;
use crate::resilience::retries::{is_retryable, RetryBudget};
use crate::rewrite::{host_without_port, RewriteTable};

/// Largest request body buffered for replay across retries.
const MAX_REPLAY_BODY_BYTES: usize = 1024 * 1024;

/// Brand label used when no configured host matched.
const DEFAULT_BRAND_LABEL: &str = "default";

/// Immutable snapshot of everything the hot path needs.
///
/// Rebuilt wholesale from each accepted config; never mutated.
pub struct EdgeState {
    pub table: RewriteTable,
    pub origin_scheme: Scheme,
    pub origin_authority: Authority,
    pub retries: RetryConfig,
}

impl EdgeState {
    /// Compile a snapshot from a configuration.
    pub fn from_config(config: &EdgeConfig) -> Result<Self, ConfigError> {
        let parsed = url::Url::parse(&config.origin.url)
            .map_err(|e| origin_error(config, e.to_string()))?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(origin_error(
                config,
                format!("unsupported scheme `{}`", parsed.scheme()),
            ));
        }
        let origin_scheme = Scheme::try_from(parsed.scheme())
            .map_err(|_| origin_error(config, format!("unsupported scheme `{}`", parsed.scheme())))?;

        let mut authority = parsed
            .host_str()
            .ok_or_else(|| origin_error(config, "missing host"))?
            .to_string();
        if let Some(port) = parsed.port() {
            authority.push(':');
            authority.push_str(&port.to_string());
        }
        let origin_authority = Authority::try_from(authority.as_str())
            .map_err(|e| origin_error(config, e.to_string()))?;

        Ok(Self {
            table: RewriteTable::from_config(config),
            origin_scheme,
            origin_authority,
            retries: config.retries.clone(),
        })
    }
}

fn origin_error(config: &EdgeConfig, reason: impl Into<String>) -> ConfigError {
    ConfigError::Validation(vec![ValidationError::InvalidOrigin {
        url: config.origin.url.clone(),
        reason: reason.into(),
    }])
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub state: Arc<ArcSwap<EdgeState>>,
    pub client: Client<HttpConnector, Body>,
    pub retry_budget: Arc<RetryBudget>,
}

/// HTTP server for the edge router.
pub struct HttpServer {
    router: Router,
    state: Arc<ArcSwap<EdgeState>>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: EdgeConfig) -> Result<Self, ConfigError> {
        let state = Arc::new(ArcSwap::from_pointee(EdgeState::from_config(&config)?));

        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        let retry_budget = Arc::new(RetryBudget::new(config.retries.budget_ratio, 100));

        let app_state = AppState {
            state: state.clone(),
            client,
            retry_budget,
        };

        let router = Self::build_router(&config, app_state);
        Ok(Self { router, state })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &EdgeConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(edge_handler))
            .route("/", any(edge_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(RequestIdLayer)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Config updates received on `config_updates` are compiled and
    /// swapped in atomically; a bad update is logged and dropped.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<EdgeConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let state = self.state.clone();
        tokio::spawn(async move {
            while let Some(new_config) = config_updates.recv().await {
                match EdgeState::from_config(&new_config) {
                    Ok(new_state) => {
                        tracing::info!(
                            brands = new_state.table.brand_count(),
                            hosts = new_state.table.host_count(),
                            "Configuration applied"
                        );
                        state.store(Arc::new(new_state));
                        metrics::record_reload();
                    }
                    Err(e) => {
                        tracing::error!("Rejected config update: {}", e);
                    }
                }
            }
        });

        let app = self.router.into_make_service();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Main edge handler.
///
/// Rewrites the path for the resolved brand and fetches from origin.
async fn edge_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let snapshot = state.state.load_full();

    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let raw_host = request
        .headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    let host = host_without_port(&raw_host);

    let method = request.method().clone();
    let method_str = method.to_string();
    let original_path = request.uri().path().to_string();
    let query = request.uri().query().map(|q| q.to_string());

    let (brand, rewritten) = snapshot.table.rewrite(host, &original_path);
    let brand_label = brand
        .map(|b| b.name.clone())
        .unwrap_or_else(|| DEFAULT_BRAND_LABEL.to_string());

    tracing::debug!(
        request_id = %request_id,
        host = %host,
        brand = %brand_label,
        original = %original_path,
        rewritten = %rewritten,
        "Rewrote request path"
    );

    // Reassemble the origin URI, keeping the query untouched.
    let path_and_query = match &query {
        Some(q) => format!("{}?{}", rewritten, q),
        None => rewritten.clone(),
    };
    let path_and_query = match PathAndQuery::try_from(path_and_query.as_str()) {
        Ok(pq) => pq,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Rewritten path is not a valid URI");
            metrics::record_request(&method_str, 400, &brand_label, start);
            return (StatusCode::BAD_REQUEST, "Invalid request path").into_response();
        }
    };
    let origin_uri = match Uri::builder()
        .scheme(snapshot.origin_scheme.clone())
        .authority(snapshot.origin_authority.clone())
        .path_and_query(path_and_query)
        .build()
    {
        Ok(uri) => uri,
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Failed to build origin URI");
            metrics::record_request(&method_str, 500, &brand_label, start);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Origin URI error").into_response();
        }
    };

    // Prepare outbound headers once; reused across retry attempts.
    let (parts, body) = request.into_parts();
    let mut outbound_headers = parts.headers.clone();
    strip_hop_by_hop(&mut outbound_headers);
    outbound_headers.remove(header::HOST);
    set_forwarded_host(&mut outbound_headers, &raw_host);
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        outbound_headers.insert(REQUEST_ID_HEADER, value);
    }

    // Buffer idempotent bodies so attempts can be replayed. Static-site
    // traffic is GET/HEAD, so this is normally an empty buffer.
    let mut single_use_body = None;
    let replay_body = if snapshot.retries.enabled && method.is_idempotent() {
        match axum::body::to_bytes(body, MAX_REPLAY_BODY_BYTES).await {
            Ok(bytes) => Some(bytes),
            Err(_) => None,
        }
    } else {
        single_use_body = Some(body);
        None
    };

    state.retry_budget.record_request();

    let max_attempts = if replay_body.is_some() {
        snapshot.retries.max_attempts
    } else {
        1
    };

    let mut attempts = 0;
    loop {
        attempts += 1;

        let attempt_body = match &replay_body {
            Some(bytes) => Body::from(bytes.clone()),
            None => single_use_body.take().unwrap_or_else(Body::empty),
        };

        let mut builder = Request::builder().method(method.clone()).uri(origin_uri.clone());
        if let Some(headers) = builder.headers_mut() {
            *headers = outbound_headers.clone();
        }
        let origin_request = match builder.body(attempt_body) {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(request_id = %request_id, error = %e, "Failed to build origin request");
                metrics::record_request(&method_str, 500, &brand_label, start);
                return (StatusCode::INTERNAL_SERVER_ERROR, "Origin request error").into_response();
            }
        };

        match state.client.request(origin_request).await {
            Ok(response) => {
                let status = response.status();

                if attempts < max_attempts
                    && is_retryable(&method, Some(status), false)
                    && state.retry_budget.can_retry()
                {
                    let backoff = calculate_backoff(
                        attempts,
                        snapshot.retries.base_delay_ms,
                        snapshot.retries.max_delay_ms,
                    );
                    tracing::info!(
                        request_id = %request_id,
                        attempt = attempts,
                        delay = ?backoff,
                        status = %status,
                        "Retrying origin fetch"
                    );
                    tokio::time::sleep(backoff).await;
                    continue;
                }

                metrics::record_request(&method_str, status.as_u16(), &brand_label, start);

                let (parts, body) = response.into_parts();
                return Response::from_parts(parts, Body::new(body)).into_response();
            }
            Err(e) => {
                tracing::error!(
                    request_id = %request_id,
                    attempt = attempts,
                    error = %e,
                    "Origin fetch failed"
                );

                if attempts < max_attempts
                    && is_retryable(&method, None, true)
                    && state.retry_budget.can_retry()
                {
                    let backoff = calculate_backoff(
                        attempts,
                        snapshot.retries.base_delay_ms,
                        snapshot.retries.max_delay_ms,
                    );
                    tracing::info!(
                        request_id = %request_id,
                        attempt = attempts,
                        delay = ?backoff,
                        "Retrying after origin connection error"
                    );
                    tokio::time::sleep(backoff).await;
                    continue;
                }

                metrics::record_origin_error(&brand_label);
                metrics::record_request(&method_str, 502, &brand_label, start);
                return (StatusCode::BAD_GATEWAY, "Origin request failed").into_response();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_from_default_config() {
        let state = EdgeState::from_config(&EdgeConfig::default()).unwrap();
        assert_eq!(state.origin_scheme, Scheme::HTTP);
        assert_eq!(state.origin_authority.as_str(), "127.0.0.1:9000");
    }

    #[test]
    fn test_state_rejects_bad_origin() {
        let mut config = EdgeConfig::default();
        config.origin.url = "not a url".into();
        assert!(EdgeState::from_config(&config).is_err());

        config.origin.url = "ftp://origin.internal".into();
        assert!(EdgeState::from_config(&config).is_err());
    }

    #[test]
    fn test_state_keeps_default_port_implicit() {
        let mut config = EdgeConfig::default();
        config.origin.url = "http://origin.internal".into();
        let state = EdgeState::from_config(&config).unwrap();
        assert_eq!(state.origin_authority.as_str(), "origin.internal");
    }
}
