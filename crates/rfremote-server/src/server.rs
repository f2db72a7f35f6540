//! The HTTP listener and its lifecycle.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::any;
use parking_lot::Mutex;
use rfremote_keywords::KeywordRegistry;
use rfremote_rpc::{RemoteRpc, RpcEndpoint};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::ServerConfig;
use crate::page;
use crate::shutdown::ShutdownSignal;

/// Errors from listener lifecycle operations.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Binding the configured address failed.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// The requested `host:port`.
        addr: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The listener is mid-transition and cannot take the call.
    #[error("listener is {state:?}")]
    Busy {
        /// The state that blocked the call.
        state: ListenerState,
    },
}

/// Observable lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    /// Not serving; the port is free.
    Stopped,
    /// Bind in progress.
    Starting,
    /// Accepting requests.
    Running,
    /// Draining in-flight requests.
    Stopping,
}

/// Shared state accessible from the route handlers.
#[derive(Clone)]
struct AppState {
    registry: Arc<KeywordRegistry>,
    endpoint: Arc<dyn RpcEndpoint>,
    signal: ShutdownSignal,
    addr: SocketAddr,
}

struct Active {
    addr: SocketAddr,
    signal: ShutdownSignal,
    task: JoinHandle<()>,
}

struct Inner {
    state: ListenerState,
    active: Option<Active>,
}

/// Serves the remote keyword protocol on one configured address.
///
/// A listener can be started and stopped repeatedly; each start binds a
/// fresh socket and spawns a fresh serve task. Stopping (locally via
/// [`Listener::stop`] or remotely via DELETE) releases the port, so
/// start, stop, start on the same port works.
pub struct Listener {
    config: ServerConfig,
    registry: Arc<KeywordRegistry>,
    endpoint: Arc<dyn RpcEndpoint>,
    inner: Mutex<Inner>,
}

impl Listener {
    /// A listener serving `registry` through the standard RPC endpoint.
    pub fn new(config: ServerConfig, registry: Arc<KeywordRegistry>) -> Self {
        let endpoint = Arc::new(RemoteRpc::new(Arc::clone(&registry)));
        Self::with_endpoint(config, registry, endpoint)
    }

    /// A listener with a caller-supplied endpoint.
    pub fn with_endpoint(
        config: ServerConfig,
        registry: Arc<KeywordRegistry>,
        endpoint: Arc<dyn RpcEndpoint>,
    ) -> Self {
        Self {
            config,
            registry,
            endpoint,
            inner: Mutex::new(Inner {
                state: ListenerState::Stopped,
                active: None,
            }),
        }
    }

    /// Binds the configured address and starts serving.
    ///
    /// Returns the bound address, with the OS-assigned port when the
    /// config asked for port 0. Calling `start` on a running listener
    /// returns the existing address unchanged. A bind failure (port in
    /// use, bad host) comes back as [`ServerError::Bind`] and leaves the
    /// listener stopped.
    pub async fn start(&self) -> Result<SocketAddr, ServerError> {
        {
            let mut inner = self.inner.lock();
            match inner.state {
                ListenerState::Running => {
                    if let Some(active) = &inner.active {
                        return Ok(active.addr);
                    }
                }
                ListenerState::Starting | ListenerState::Stopping => {
                    return Err(ServerError::Busy { state: inner.state });
                }
                ListenerState::Stopped => {}
            }
            inner.state = ListenerState::Starting;
        }

        let bind_addr = self.config.bind_addr();
        let socket = match TcpListener::bind(&bind_addr).await {
            Ok(socket) => socket,
            Err(source) => {
                self.inner.lock().state = ListenerState::Stopped;
                return Err(ServerError::Bind {
                    addr: bind_addr,
                    source,
                });
            }
        };
        let addr = match socket.local_addr() {
            Ok(addr) => addr,
            Err(source) => {
                self.inner.lock().state = ListenerState::Stopped;
                return Err(ServerError::Bind {
                    addr: bind_addr,
                    source,
                });
            }
        };

        let signal = ShutdownSignal::new();
        let app = router(AppState {
            registry: Arc::clone(&self.registry),
            endpoint: Arc::clone(&self.endpoint),
            signal: signal.clone(),
            addr,
        });
        let token = signal.token();
        let task = tokio::spawn(async move {
            let serve = axum::serve(socket, app).with_graceful_shutdown(token.cancelled_owned());
            if let Err(err) = serve.await {
                error!(error = %err, "serve loop failed");
            }
        });

        let mut inner = self.inner.lock();
        inner.state = ListenerState::Running;
        inner.active = Some(Active { addr, signal, task });
        drop(inner);

        info!(%addr, "listener started");
        Ok(addr)
    }

    /// Stops serving and waits up to the configured grace period for
    /// in-flight requests to drain.
    ///
    /// A hung invocation cannot be cancelled; when the grace period
    /// expires the serve task is abandoned with a warning. Stopping a
    /// stopped listener is a no-op.
    pub async fn stop(&self) -> Result<(), ServerError> {
        let active = {
            let mut inner = self.inner.lock();
            match inner.state {
                ListenerState::Stopped => return Ok(()),
                ListenerState::Starting | ListenerState::Stopping => {
                    return Err(ServerError::Busy { state: inner.state });
                }
                ListenerState::Running => {}
            }
            inner.state = ListenerState::Stopping;
            inner.active.take()
        };

        if let Some(active) = active {
            active.signal.trigger();
            match tokio::time::timeout(self.config.shutdown_grace(), active.task).await {
                Ok(Ok(())) => info!("listener stopped"),
                Ok(Err(err)) => error!(error = %err, "serve task failed during shutdown"),
                Err(_) => warn!(
                    grace_secs = self.config.shutdown_grace_secs,
                    "shutdown grace expired, abandoning serve task"
                ),
            }
        }

        self.inner.lock().state = ListenerState::Stopped;
        Ok(())
    }

    /// Resolves when a shutdown has been requested, locally or remotely.
    ///
    /// Returns immediately when the listener is not running.
    pub async fn wait_shutdown(&self) {
        let token = {
            let inner = self.inner.lock();
            inner.active.as_ref().map(|active| active.signal.token())
        };
        if let Some(token) = token {
            token.cancelled_owned().await;
        }
    }

    /// The bound address while running.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.inner.lock().active.as_ref().map(|active| active.addr)
    }

    /// The current lifecycle state.
    pub fn state(&self) -> ListenerState {
        self.inner.lock().state
    }

    /// The configuration the listener was built with.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        if let Some(active) = self.inner.get_mut().active.take() {
            active.signal.trigger();
        }
    }
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/", any(root))
        .fallback(root)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Every path serves the same surface; the method picks the behavior.
async fn root(State(state): State<AppState>, method: Method, body: Bytes) -> Response {
    if method == Method::POST {
        dispatch_rpc(&state, &body).await
    } else if method == Method::DELETE {
        remote_shutdown(&state)
    } else {
        Html(page::render(&state.registry, state.addr)).into_response()
    }
}

async fn dispatch_rpc(state: &AppState, body: &[u8]) -> Response {
    match state.endpoint.handle(body).await {
        Ok(bytes) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            bytes,
        )
            .into_response(),
        Err(err) => {
            error!(error = %err, "rpc endpoint failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "request processing failed").into_response()
        }
    }
}

fn remote_shutdown(state: &AppState) -> Response {
    info!("remote shutdown requested");
    state.signal.trigger();
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        r#"{"shutdown": true}"#,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use rfremote_keywords::StaticLoader;
    use rfremote_rpc::EndpointError;
    use tower::ServiceExt;

    use super::*;

    struct FixedEndpoint;

    #[async_trait]
    impl RpcEndpoint for FixedEndpoint {
        async fn handle(&self, _body: &[u8]) -> Result<Vec<u8>, EndpointError> {
            Ok(br#"{"ok":true}"#.to_vec())
        }
    }

    struct FailingEndpoint;

    #[async_trait]
    impl RpcEndpoint for FailingEndpoint {
        async fn handle(&self, _body: &[u8]) -> Result<Vec<u8>, EndpointError> {
            Err(EndpointError::Worker("worker gone".into()))
        }
    }

    fn empty_registry() -> Arc<KeywordRegistry> {
        Arc::new(KeywordRegistry::new(Arc::new(StaticLoader::new())))
    }

    fn test_app(endpoint: Arc<dyn RpcEndpoint>) -> (Router, ShutdownSignal) {
        let signal = ShutdownSignal::new();
        let state = AppState {
            registry: empty_registry(),
            endpoint,
            signal: signal.clone(),
            addr: "127.0.0.1:8270".parse().unwrap(),
        };
        (router(state), signal)
    }

    fn port_zero() -> ServerConfig {
        ServerConfig {
            port: 0,
            ..ServerConfig::default()
        }
    }

    #[tokio::test]
    async fn post_reaches_the_endpoint() {
        let (app, _signal) = test_app(Arc::new(FixedEndpoint));
        let req = Request::builder()
            .method("POST")
            .uri("/")
            .body(Body::from(r#"{"method":"get_library_names"}"#))
            .unwrap();

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/json");
        let body = axum::body::to_bytes(resp.into_body(), 10_000).await.unwrap();
        assert_eq!(&body[..], br#"{"ok":true}"#);
    }

    #[tokio::test]
    async fn endpoint_failure_becomes_a_500() {
        let (app, _signal) = test_app(Arc::new(FailingEndpoint));
        let req = Request::builder()
            .method("POST")
            .uri("/")
            .body(Body::from("{}"))
            .unwrap();

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = axum::body::to_bytes(resp.into_body(), 10_000).await.unwrap();
        assert_eq!(&body[..], b"request processing failed");
    }

    #[tokio::test]
    async fn delete_acknowledges_and_triggers_shutdown() {
        let (app, signal) = test_app(Arc::new(FixedEndpoint));
        assert!(!signal.is_triggered());

        let req = Request::builder()
            .method("DELETE")
            .uri("/")
            .body(Body::empty())
            .unwrap();

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = axum::body::to_bytes(resp.into_body(), 10_000).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed["shutdown"], true);
        assert!(signal.is_triggered());
    }

    #[tokio::test]
    async fn get_serves_the_page() {
        let (app, _signal) = test_app(Arc::new(FixedEndpoint));
        let req = Request::builder().uri("/").body(Body::empty()).unwrap();

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let content_type = resp.headers()[header::CONTENT_TYPE].to_str().unwrap();
        assert!(content_type.starts_with("text/html"));
        let body = axum::body::to_bytes(resp.into_body(), 100_000).await.unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("Remote keyword server"));
    }

    #[tokio::test]
    async fn every_path_serves_the_same_surface() {
        let (app, signal) = test_app(Arc::new(FixedEndpoint));
        let req = Request::builder()
            .method("DELETE")
            .uri("/some/other/path")
            .body(Body::empty())
            .unwrap();

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(signal.is_triggered());
    }

    #[tokio::test]
    async fn start_reports_the_bound_port() {
        let listener = Listener::new(port_zero(), empty_registry());
        assert_eq!(listener.state(), ListenerState::Stopped);
        assert!(listener.local_addr().is_none());

        let addr = listener.start().await.unwrap();
        assert_ne!(addr.port(), 0);
        assert_eq!(listener.state(), ListenerState::Running);
        assert_eq!(listener.local_addr(), Some(addr));

        listener.stop().await.unwrap();
        assert_eq!(listener.state(), ListenerState::Stopped);
        assert!(listener.local_addr().is_none());
    }

    #[tokio::test]
    async fn start_while_running_returns_the_same_addr() {
        let listener = Listener::new(port_zero(), empty_registry());
        let first = listener.start().await.unwrap();
        let second = listener.start().await.unwrap();
        assert_eq!(first, second);
        listener.stop().await.unwrap();
    }

    #[tokio::test]
    async fn stop_when_stopped_is_a_no_op() {
        let listener = Listener::new(port_zero(), empty_registry());
        listener.stop().await.unwrap();
        assert_eq!(listener.state(), ListenerState::Stopped);
    }

    #[tokio::test]
    async fn bind_conflict_surfaces_and_resets() {
        let holder = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let taken = holder.local_addr().unwrap().port();

        let config = ServerConfig {
            port: taken,
            ..ServerConfig::default()
        };
        let listener = Listener::new(config, empty_registry());
        let err = listener.start().await.unwrap_err();
        assert!(matches!(err, ServerError::Bind { .. }));
        assert_eq!(listener.state(), ListenerState::Stopped);
    }

    #[tokio::test]
    async fn restart_reuses_the_same_port() {
        let listener = Listener::new(port_zero(), empty_registry());
        let first = listener.start().await.unwrap();
        listener.stop().await.unwrap();

        let config = ServerConfig {
            port: first.port(),
            ..ServerConfig::default()
        };
        let again = Listener::new(config, empty_registry());
        let second = again.start().await.unwrap();
        assert_eq!(second.port(), first.port());
        again.stop().await.unwrap();
    }

    #[tokio::test]
    async fn remote_shutdown_resolves_wait() {
        let listener = Listener::new(port_zero(), empty_registry());
        let _ = listener.start().await.unwrap();

        let signal = {
            let inner = listener.inner.lock();
            inner.active.as_ref().map(|a| a.signal.clone()).unwrap()
        };
        signal.trigger();

        tokio::time::timeout(std::time::Duration::from_secs(1), listener.wait_shutdown())
            .await
            .unwrap();
        listener.stop().await.unwrap();
    }
}
