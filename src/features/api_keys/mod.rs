//! API keys feature.
//!
//! Keys issued by the gateway (one per user and database, shown in the key
//! dialog and the keys table) and typed ApiKey records on the platform.
//!
//! ## Gateway endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/v1/database/{id}/api-key?user_id=` | Existing key or null |
//! | POST | `/api/v1/database/{id}/generate-key?user_id=` | Issue a new key |
//! | GET | `/api/v1/database/user/{user_id}/api-keys` | All keys of a user |

pub mod dialog;
pub mod dtos;
pub mod hooks;
pub mod models;
pub mod services;

pub use dialog::{ApiKeyDialog, ApiKeyDialogState};
pub use hooks::use_user_api_keys;
pub use services::{ApiKeyGateway, ApiKeyService};
