//! Service status endpoint.

use axum::Json;
use serde::Serialize;

/// Message returned by the status endpoint. The trailing space is part of the contract.
pub const STATUS_MESSAGE: &str = "ML API running ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusResponse {
    pub message: &'static str,
}

impl Default for StatusResponse {
    fn default() -> Self {
        Self {
            message: STATUS_MESSAGE,
        }
    }
}

/// GET / — reports that the service is up.
pub async fn status() -> Json<StatusResponse> {
    Json(StatusResponse::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_keeps_trailing_space() {
        assert_eq!(STATUS_MESSAGE.len(), 15);
        assert!(STATUS_MESSAGE.ends_with(' '));
    }

    #[tokio::test]
    async fn handler_returns_fixed_payload() {
        let Json(first) = status().await;
        let Json(second) = status().await;
        assert_eq!(first, second);
        assert_eq!(first.message, "ML API running ");
    }
}
