//! ML API server entry point.

use std::process::ExitCode;

use ml_api::Config;

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::from_env();

    if let Err(err) = ml_api::telemetry::init_tracing(&config) {
        eprintln!("{err}");
        return ExitCode::FAILURE;
    }

    let metrics_handle = match config.metrics_port {
        Some(_) => match ml_api::telemetry::init_metrics() {
            Ok(handle) => Some(handle),
            Err(err) => {
                tracing::error!(error = %err, "failed to install metrics recorder");
                return ExitCode::FAILURE;
            }
        },
        None => None,
    };

    match ml_api::run(config, metrics_handle).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "server failed");
            ExitCode::FAILURE
        }
    }
}
