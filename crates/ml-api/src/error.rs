//! Process-level error types.
//!
//! The status route itself cannot fail; everything here is about getting the
//! server onto the network and keeping it there.

use thiserror::Error;

/// Errors raised while starting or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listener could not be bound to the configured address.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The accept loop terminated with an I/O error.
    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),

    /// The Prometheus recorder could not be installed.
    #[error("metrics recorder error: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    /// A global tracing subscriber was already installed.
    #[error("logging setup error: {0}")]
    Logging(#[from] tracing_subscriber::util::TryInitError),
}

/// Result type for server operations.
pub type Result<T> = std::result::Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_error_names_the_address() {
        let err = ServerError::Bind {
            addr: "127.0.0.1:5000".to_string(),
            source: std::io::Error::from(std::io::ErrorKind::AddrInUse),
        };
        let message = err.to_string();
        assert!(message.starts_with("failed to bind 127.0.0.1:5000"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn io_error_converts_to_serve() {
        let err: ServerError = std::io::Error::other("accept failed").into();
        assert!(matches!(err, ServerError::Serve(_)));
        assert_eq!(err.to_string(), "server error: accept failed");
    }
}
