//! Client data-access and synchronization layer for the vector database builder.
//!
//! - [`modules`]: REST gateway client, managed platform seam, object storage
//! - [`features`]: per-entity services, DTOs, screen hooks and flows
//! - [`hooks`]: reactive fetch and live-collection state shared by features

pub mod core;
pub mod features;
pub mod hooks;
pub mod modules;
pub mod shared;
