//! Local HTTP transport for trigger commands.
//!
//! Routes (any method):
//! - `/add` adds a device named after the current UTC time
//! - `/add/{name}` adds a device named `name`
//! - `/remove` removes every device
//!
//! Every request, including unknown routes, is answered with 204.

use super::{TriggerCommand, dispatch};
use crate::error::{BridgeError, Result};
use crate::registry::DeviceRegistry;
use axum::Router;
use axum::extract::{Path, State};
use axum::http::{StatusCode, Uri};
use axum::routing::any;
use log::{info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

type SharedRegistry = Arc<DeviceRegistry>;

pub struct TriggerListener {
    registry: SharedRegistry,
    addr: SocketAddr,
}

impl TriggerListener {
    pub fn new(registry: SharedRegistry, addr: SocketAddr) -> Self {
        Self { registry, addr }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/add", any(add_timestamped))
            .route("/add/{name}", any(add_named))
            .route("/remove", any(remove_all))
            .fallback(unrecognized)
            .with_state(self.registry.clone())
    }

    /// Bind the socket without serving yet, so address errors surface to
    /// the caller instead of a background task.
    ///
    /// Refuses to bind before the registry has been restored.
    pub async fn bind(self) -> Result<BoundTriggerListener> {
        if !self.registry.is_restored() {
            return Err(BridgeError::NotRestored);
        }

        let listener = TcpListener::bind(self.addr)
            .await
            .map_err(|e| BridgeError::ListenerBindFailed(format!("{}: {e}", self.addr)))?;
        info!("[Trigger] Listening on http://{}", listener.local_addr()?);

        Ok(BoundTriggerListener {
            router: self.router(),
            listener,
        })
    }

    /// Bind and serve until `shutdown` is cancelled.
    pub async fn run(self, shutdown: CancellationToken) -> Result<()> {
        self.bind().await?.serve(shutdown).await
    }
}

/// A trigger listener whose socket is already bound.
pub struct BoundTriggerListener {
    router: Router,
    listener: TcpListener,
}

impl BoundTriggerListener {
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve until `shutdown` is cancelled.
    pub async fn serve(self, shutdown: CancellationToken) -> Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await?;

        info!("[Trigger] Listener stopped");
        Ok(())
    }

    /// Serve in a background task
    pub fn spawn(self, shutdown: CancellationToken) -> JoinHandle<Result<()>> {
        tokio::spawn(async move { self.serve(shutdown).await })
    }
}

/// Registry calls take a lock and may write the cache, so keep them off
/// the async workers.
async fn apply(registry: SharedRegistry, command: TriggerCommand) -> StatusCode {
    if let Err(e) = tokio::task::spawn_blocking(move || dispatch(&registry, command)).await {
        warn!("[Trigger] Command task failed: {}", e);
    }
    StatusCode::NO_CONTENT
}

async fn add_timestamped(State(registry): State<SharedRegistry>) -> StatusCode {
    apply(registry, TriggerCommand::Add { name: None }).await
}

async fn add_named(
    State(registry): State<SharedRegistry>,
    Path(name): Path<String>,
) -> StatusCode {
    apply(registry, TriggerCommand::Add { name: Some(name) }).await
}

async fn remove_all(State(registry): State<SharedRegistry>) -> StatusCode {
    apply(registry, TriggerCommand::RemoveAll).await
}

async fn unrecognized(State(registry): State<SharedRegistry>, uri: Uri) -> StatusCode {
    let path = uri.path().to_string();
    apply(registry, TriggerCommand::Unrecognized { path }).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Exposure;
    use crate::trigger::tests::switch_registry;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    async fn send(listener: &TriggerListener, method: &str, uri: &str) -> StatusCode {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = listener.router().oneshot(request).await.unwrap();
        response.status()
    }

    fn listener() -> (TriggerListener, SharedRegistry) {
        let (registry, _) = switch_registry(Exposure::DynamicSet);
        registry.restore(Vec::new()).unwrap();
        let addr = "127.0.0.1:0".parse().unwrap();
        (TriggerListener::new(registry.clone(), addr), registry)
    }

    #[tokio::test]
    async fn test_add_routes() {
        let (listener, registry) = listener();

        assert_eq!(send(&listener, "GET", "/add").await, StatusCode::NO_CONTENT);
        assert_eq!(registry.len(), 1);

        assert_eq!(
            send(&listener, "POST", "/add/Front%20Door").await,
            StatusCode::NO_CONTENT
        );
        assert_eq!(registry.len(), 2);
        assert!(registry.get(registry.derive_id("Front Door")).is_some());

        // Duplicate name is acknowledged the same way
        assert_eq!(
            send(&listener, "GET", "/add/Front%20Door").await,
            StatusCode::NO_CONTENT
        );
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test]
    async fn test_remove_route() {
        let (listener, registry) = listener();
        registry.add("A").unwrap();
        registry.add("B").unwrap();

        assert_eq!(send(&listener, "GET", "/remove").await, StatusCode::NO_CONTENT);
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_route_is_acknowledged() {
        let (listener, registry) = listener();
        registry.add("A").unwrap();

        assert_eq!(send(&listener, "GET", "/").await, StatusCode::NO_CONTENT);
        assert_eq!(
            send(&listener, "DELETE", "/devices/A").await,
            StatusCode::NO_CONTENT
        );
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_run_requires_restore() {
        let (registry, _) = switch_registry(Exposure::DynamicSet);
        let listener = TriggerListener::new(registry, "127.0.0.1:0".parse().unwrap());
        let result = listener.run(CancellationToken::new()).await;
        assert!(matches!(result, Err(BridgeError::NotRestored)));
    }

    #[tokio::test]
    async fn test_serve_stops_on_cancel() {
        let (listener, _) = listener();
        let bound = listener.bind().await.unwrap();
        assert_ne!(bound.local_addr().unwrap().port(), 0);

        let shutdown = CancellationToken::new();
        let handle = bound.spawn(shutdown.clone());
        shutdown.cancel();
        assert!(handle.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_bind_reports_taken_port() {
        let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let (registry, _) = switch_registry(Exposure::DynamicSet);
        registry.restore(Vec::new()).unwrap();

        let listener = TriggerListener::new(registry, taken.local_addr().unwrap());
        assert!(matches!(
            listener.bind().await,
            Err(BridgeError::ListenerBindFailed(_))
        ));
    }
}
