//! Logging, request tracing and HTTP metrics.

use std::time::{Duration, Instant};

use axum::extract::{MatchedPath, Request};
use axum::http::Method;
use axum::middleware::Next;
use axum::response::Response;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{Config, LogFormat};
use crate::error::Result;

/// Counter of handled requests, labelled by method, path and status.
pub const REQUESTS_TOTAL: &str = "http_requests_total";
/// Histogram of request latency in seconds, labelled by method and path.
pub const REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";

/// Path label for requests that matched no route.
const UNMATCHED_PATH: &str = "unmatched";
/// Method label for anything outside the standard methods.
const OTHER_METHOD: &str = "other";

/// How often the Prometheus handle drains histogram buffers when nobody scrapes.
pub const UPKEEP_INTERVAL: Duration = Duration::from_secs(5);

/// Installs the global tracing subscriber.
///
/// The filter comes from `config.log_level`; an invalid directive falls back to `info`.
pub fn init_tracing(config: &Config) -> Result<()> {
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match config.log_format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init()?,
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()?,
    }
    Ok(())
}

/// Installs the global Prometheus recorder and describes the HTTP metrics.
pub fn init_metrics() -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    metrics::describe_counter!(REQUESTS_TOTAL, "Total number of HTTP requests handled");
    metrics::describe_histogram!(
        REQUEST_DURATION_SECONDS,
        metrics::Unit::Seconds,
        "HTTP request latency"
    );

    Ok(handle)
}

/// Builds the request tracing layer. Debug mode logs every request at DEBUG with headers.
pub fn trace_layer(debug: bool) -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    let level = if debug { Level::DEBUG } else { Level::INFO };

    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(level).include_headers(debug))
        .on_request(DefaultOnRequest::new().level(level))
        .on_response(
            DefaultOnResponse::new()
                .level(level)
                .include_headers(debug),
        )
}

/// Middleware recording request count and latency for every response.
pub async fn track_metrics(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_owned())
        .unwrap_or_else(|| UNMATCHED_PATH.to_owned());
    let method = method_label(req.method());

    let response = next.run(req).await;

    let status = response.status().as_u16().to_string();
    metrics::counter!(
        REQUESTS_TOTAL,
        "method" => method,
        "path" => path.clone(),
        "status" => status
    )
    .increment(1);
    metrics::histogram!(REQUEST_DURATION_SECONDS, "method" => method, "path" => path)
        .record(start.elapsed().as_secs_f64());

    response
}

/// Maps a request method onto a bounded label set.
fn method_label(method: &Method) -> &'static str {
    match method.as_str() {
        "GET" => "GET",
        "HEAD" => "HEAD",
        "POST" => "POST",
        "PUT" => "PUT",
        "DELETE" => "DELETE",
        "PATCH" => "PATCH",
        "OPTIONS" => "OPTIONS",
        _ => OTHER_METHOD,
    }
}

/// Runs recorder upkeep every `period` until `shutdown` resolves.
pub async fn run_upkeep<F>(handle: PrometheusHandle, period: Duration, shutdown: F)
where
    F: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(period);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            () = &mut shutdown => break,
            _ = ticker.tick() => handle.run_upkeep(),
        }
    }
    tracing::debug!("metrics upkeep stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServerError;

    #[test]
    fn second_subscriber_install_is_an_error() {
        let config = Config {
            log_format: LogFormat::Json,
            log_level: "not a [valid directive".to_string(),
            ..Config::default()
        };

        init_tracing(&config).expect("first install should succeed");
        let err = init_tracing(&Config::default()).unwrap_err();
        assert!(matches!(err, ServerError::Logging(_)));
    }

    #[test]
    fn method_label_is_bounded() {
        assert_eq!(method_label(&Method::GET), "GET");
        assert_eq!(method_label(&Method::OPTIONS), "OPTIONS");
        assert_eq!(method_label(&Method::TRACE), "other");

        let made_up = Method::from_bytes(b"FOO1").unwrap();
        assert_eq!(method_label(&made_up), "other");
    }
}
