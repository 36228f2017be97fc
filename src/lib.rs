use std::{future::Future, net::SocketAddr, sync::Arc};

use axum::{middleware, routing::any, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::net::TcpListener;
use tracing::{info, warn};

pub mod config;
pub mod errors;
pub mod http;
pub mod logging;
pub mod observability;

use config::Config;
use errors::ServeError;

#[derive(Clone)]
pub struct AppState {
    pub message: Arc<str>,
    pub version: Arc<str>,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(message: String, version: String, metrics: Option<PrometheusHandle>) -> Self {
        Self {
            message: Arc::<str>::from(message),
            version: Arc::<str>::from(version),
            metrics,
        }
    }
}

pub fn build_app(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/health", any(http::handlers::health))
        .route("/version", any(http::handlers::version));

    if let Some(handle) = state.metrics.clone() {
        router = router.route(
            "/metrics",
            any(move || http::handlers::metrics(handle.clone())),
        );
    }

    router
        .fallback(http::handlers::greeting)
        .layer(middleware::from_fn(logging::request_logging_middleware))
        .with_state(state)
}

/// Binds the configured socket and serves until SIGINT or SIGTERM.
pub async fn run(config: Config) -> Result<(), ServeError> {
    let bind_socket = config.bind_socket()?;
    let metrics = if config.metrics_enabled {
        Some(observability::install_recorder()?)
    } else {
        None
    };
    let (listener, local_addr) = bind_listener(bind_socket).await?;
    let upkeep = metrics
        .clone()
        .map(|handle| observability::spawn_upkeep(handle, observability::UPKEEP_INTERVAL));
    let state = AppState::new(config.message, config.version, metrics);

    info!(
        bind_addr = %local_addr,
        metrics_enabled = config.metrics_enabled,
        "server starting"
    );

    let result = serve(listener, build_app(state), shutdown_signal()).await;
    if let Some(task) = upkeep {
        task.abort();
    }
    result
}

/// Returns the listener with the address the OS actually assigned, which
/// differs from the requested one when the port is 0.
pub async fn bind_listener(
    bind_socket: SocketAddr,
) -> Result<(TcpListener, SocketAddr), ServeError> {
    let listener = TcpListener::bind(bind_socket)
        .await
        .map_err(|source| ServeError::Bind {
            addr: bind_socket,
            source,
        })?;
    let local_addr = listener.local_addr()?;
    Ok((listener, local_addr))
}

pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> Result<(), ServeError>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("server stopped");
    Ok(())
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}
