mod database_gateway;
mod database_service;

pub use database_gateway::DatabaseGateway;
pub use database_service::DatabaseService;
