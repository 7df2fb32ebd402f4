//! Usage feature.
//!
//! Query accounting per user from the gateway, read-only Usage windows from the
//! platform, and the dashboard aggregations built on top of both.
//!
//! ## Gateway endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/v1/database/usage/{user_id}` | Query totals, per-database counts and history |

pub mod dashboard;
pub mod dtos;
pub mod hooks;
pub mod models;
pub mod services;

pub use dashboard::{report_filename, UsageDashboard};
pub use hooks::use_usage;
pub use services::UsageService;
