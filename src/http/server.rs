//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, CORS, limits, request ID)
//! - Bind server to listener
//! - Hand submitted specs to the load test engine

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    http::{HeaderName, HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{CorsConfig, TesterConfig};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::http::response::ApiError;
use crate::loadtest::{run_all, BatchExecutor, LoadTestResult, RequestSpec, ResultRecord};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub executor: Arc<BatchExecutor>,
}

/// HTTP front end for the load test engine.
pub struct HttpServer {
    router: Router,
    config: TesterConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: TesterConfig) -> LoadTestResult<Self> {
        let executor = Arc::new(BatchExecutor::new(&config.executor)?);
        let state = AppState { executor };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &TesterConfig, state: AppState) -> Router {
        let middleware = ServiceBuilder::new()
            .layer(set_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(propagate_request_id_layer())
            .layer(cors_layer(&config.cors))
            .layer(TimeoutLayer::new(Duration::from_secs(config.server.request_timeout_secs)));

        Router::new()
            .route("/test/post", post(post_test))
            .route("/status", get(get_status))
            .with_state(state)
            .layer(DefaultBodyLimit::max(config.server.max_body_size))
            .layer(middleware)
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &TesterConfig {
        &self.config
    }
}

/// Build the CORS layer from configuration.
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let mut cors = CorsLayer::new();

    if config.allowed_origins.iter().any(|o| o == "*") {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|origin| match origin.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        cors = cors.allow_origin(origins);
    }

    let methods: Vec<Method> = config
        .allowed_methods
        .iter()
        .filter_map(|method| method.parse().ok())
        .collect();
    let headers: Vec<HeaderName> = config
        .allowed_headers
        .iter()
        .filter_map(|header| header.parse().ok())
        .collect();

    cors.allow_methods(methods).allow_headers(headers)
}

/// Run a list of load tests and return one result per spec.
async fn post_test(
    State(state): State<AppState>,
    payload: Result<Json<Vec<RequestSpec>>, JsonRejection>,
) -> Result<Json<Vec<ResultRecord>>, ApiError> {
    let Json(specs) = payload?;
    let records = run_all(&state.executor, &specs).await?;
    Ok(Json(records))
}

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
}

async fn get_status() -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
    })
}
