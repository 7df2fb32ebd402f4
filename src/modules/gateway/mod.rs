//! REST gateway module
//!
//! The gateway performs ingestion, embedding, API-key issuance and usage
//! accounting. This crate only consumes it.

mod client;

pub use client::{error_from_response, GatewayClient, DATABASE_API_PREFIX};
