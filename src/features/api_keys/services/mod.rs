mod api_key_gateway;
mod api_key_service;

pub use api_key_gateway::ApiKeyGateway;
pub use api_key_service::{generate_key, ApiKeyService};
