//! HTTP status service for the ML API.
//!
//! Serves a single route, `GET /`, answering with a fixed JSON message.
//! Logging goes through `tracing`; request counts and latencies go through
//! `metrics` and can be scraped from a separate Prometheus listener.

pub mod config;
pub mod error;
pub mod routes;
pub mod shutdown;
pub mod telemetry;

use axum::Router;
use axum::middleware;
use axum::routing::get;
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::net::TcpListener;

pub use config::{Config, LogFormat};
pub use error::{Result, ServerError};
use shutdown::Shutdown;

/// Creates the application router.
pub fn create_app(config: &Config) -> Router {
    Router::new()
        .route("/", get(routes::root::status))
        .layer(middleware::from_fn(telemetry::track_metrics))
        .layer(telemetry::trace_layer(config.debug))
}

/// Creates the router served on the metrics listener.
pub fn create_metrics_app(handle: PrometheusHandle) -> Router {
    Router::new()
        .route("/metrics", get(routes::metrics::render))
        .with_state(handle)
}

/// Serves `app` on `listener` until `shutdown` resolves and in-flight requests drain.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

/// Binds the configured listeners and serves until SIGINT or SIGTERM.
///
/// The metrics listener and its upkeep task are only started when both
/// `config.metrics_port` and `metrics_handle` are present.
pub async fn run(config: Config, metrics_handle: Option<PrometheusHandle>) -> Result<()> {
    let addr = config.addr();
    let listener = bind(&addr).await?;
    tracing::info!(%addr, debug = config.debug, "starting ML API server");

    let metrics = match (config.metrics_addr(), metrics_handle) {
        (Some(metrics_addr), Some(handle)) => {
            let listener = bind(&metrics_addr).await?;
            tracing::info!(addr = %metrics_addr, "serving Prometheus metrics");
            Some((listener, handle))
        }
        _ => None,
    };

    let stop = Shutdown::new();
    let app = serve(listener, create_app(&config), stop.wait());
    let metrics = metrics.map(|(listener, handle)| {
        tokio::spawn(telemetry::run_upkeep(
            handle.clone(),
            telemetry::UPKEEP_INTERVAL,
            stop.wait(),
        ));
        serve(listener, create_metrics_app(handle), stop.wait())
    });

    tokio::spawn(async move {
        shutdown::signal().await;
        stop.trigger();
    });

    match metrics {
        Some(metrics) => {
            tokio::try_join!(app, metrics)?;
        }
        None => app.await?,
    }

    tracing::info!("server shut down gracefully");
    Ok(())
}

async fn bind(addr: &str) -> Result<TcpListener> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.to_string(),
            source,
        })
}
