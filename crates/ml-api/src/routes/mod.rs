//! HTTP route handlers.

pub mod metrics;
pub mod root;
