pub mod api_keys;
pub mod databases;
pub mod documents;
pub mod usage;
