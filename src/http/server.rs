//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the shared application state (catalog, orders, request history)
//! - Create the Axum router with API routes and static fallback
//! - Wire up middleware (request observer, timeout, panic recovery, tracing)
//! - Serve until the shutdown signal fires

use axum::{middleware, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    catch_panic::CatchPanicLayer, services::ServeDir, timeout::TimeoutLayer, trace::TraceLayer,
};

use crate::api::{self, handlers};
use crate::catalog::{CatalogStore, InventoryAdjuster};
use crate::config::AppConfig;
use crate::observability::{observe_requests, RequestLog, RequestObserver};
use crate::orders::OrderBook;

/// Application state injected into handlers.
///
/// One instance per server; nothing here is process-global.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogStore>,
    pub inventory: InventoryAdjuster,
    pub orders: OrderBook,
    pub observer: RequestObserver,
}

impl AppState {
    /// Fresh state seeded with the default lessons.
    pub fn new(config: &AppConfig) -> Self {
        Self::with_catalog(config, CatalogStore::seeded())
    }

    pub fn with_catalog(config: &AppConfig, catalog: CatalogStore) -> Self {
        let catalog = Arc::new(catalog);
        let obs = &config.observability;
        let log = Arc::new(RequestLog::new(obs.max_logs, obs.default_log_limit));

        Self {
            inventory: InventoryAdjuster::new(catalog.clone()),
            orders: OrderBook::new(catalog.clone()),
            observer: RequestObserver::new(log, obs.body_preview_chars, config.limits.max_body_size),
            catalog,
        }
    }
}

/// Wrap `router` in the service middleware stack.
///
/// The observer sits outside the timeout and panic layers so that
/// timed-out and panicking requests are still recorded.
#[allow(deprecated)]
fn with_middleware(router: Router, timeout: Duration, observer: RequestObserver) -> Router {
    router
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::new(timeout))
        .layer(middleware::from_fn_with_state(observer, observe_requests))
        .layer(TraceLayer::new_for_http())
}

/// HTTP server for the booking API.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        let state = AppState::new(&config);
        Self::with_state(config, state)
    }

    pub fn with_state(config: AppConfig, state: AppState) -> Self {
        let router = Self::build_router(&config, state.clone());
        Self {
            router,
            config,
            state,
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &AppConfig, state: AppState) -> Router {
        let mut router = api::setup_api_router(state.clone());

        router = if config.static_files.enabled {
            router.fallback_service(ServeDir::new(&config.static_files.directory))
        } else {
            router.fallback(handlers::not_found)
        };

        with_middleware(
            router,
            Duration::from_secs(config.timeouts.request_secs),
            state.observer,
        )
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            lessons = self.state.catalog.len(),
            max_logs = self.state.observer.log().capacity(),
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The fully layered router, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{self, StatusCode},
        routing::get,
    };
    use tower::ServiceExt;

    async fn explode() -> StatusCode {
        panic!("handler failure")
    }

    async fn stall() -> StatusCode {
        tokio::time::sleep(Duration::from_secs(5)).await;
        StatusCode::OK
    }

    fn failing_app(observer: RequestObserver) -> Router {
        let routes = Router::new()
            .route("/explode", get(explode))
            .route("/stall", get(stall));
        with_middleware(routes, Duration::from_millis(50), observer)
    }

    fn get_request(uri: &str) -> http::Request<Body> {
        http::Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn panicking_handler_is_recorded_as_500() {
        let observer = RequestObserver::new(Arc::new(RequestLog::new(10, 10)), 500, 1024);

        let response = failing_app(observer.clone())
            .oneshot(get_request("/explode"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let entry = observer.log().recent(None).remove(0);
        assert_eq!(entry.url, "/explode");
        assert_eq!(entry.status, 500);
    }

    #[tokio::test]
    async fn timed_out_handler_is_recorded_as_408() {
        let observer = RequestObserver::new(Arc::new(RequestLog::new(10, 10)), 500, 1024);

        let response = failing_app(observer.clone())
            .oneshot(get_request("/stall"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);

        let entry = observer.log().recent(None).remove(0);
        assert_eq!(entry.url, "/stall");
        assert_eq!(entry.status, 408);
    }

    #[tokio::test]
    async fn default_config_serves_api_through_the_stack() {
        let mut config = AppConfig::default();
        config.static_files.enabled = false;
        let server = HttpServer::new(config);

        let response = server.router().oneshot(get_request("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(server.state().observer.log().len(), 1);
    }
}
