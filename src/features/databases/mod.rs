//! Vector databases feature.
//!
//! Databases exist on both backend surfaces: the REST gateway owns ingestion
//! (create with files, status, delete, the home list) and the managed platform
//! holds the typed Database records with live updates.
//!
//! ## Gateway endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/v1/database/list?user_id=` | List the user's databases |
//! | POST | `/api/v1/database/create` | Multipart create with files |
//! | GET | `/api/v1/database/{id}/status` | Ingestion status |
//! | DELETE | `/api/v1/database/{id}` | Delete a database |

pub mod create_flow;
pub mod dtos;
pub mod filter;
pub mod hooks;
pub mod models;
pub mod services;

pub use create_flow::CreateDatabaseFlow;
pub use filter::{filter_databases, SectorFilter};
pub use hooks::{use_databases, use_live_databases, UseDatabasesOptions};
pub use services::{DatabaseGateway, DatabaseService};
