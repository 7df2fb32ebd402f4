//! Modules layer - Infrastructure components for external integrations
//!
//! Contains clients and adapters for the REST gateway, the managed platform and
//! object storage.

pub mod gateway;
pub mod platform;
pub mod storage;
