//! Documents feature.
//!
//! Files uploaded into a database. The bytes live in the uploads bucket; the
//! Document record on the platform points at them and is moved out of
//! `processing` by the ingestion pipeline.

pub mod dtos;
pub mod hooks;
pub mod models;
pub mod services;

pub use hooks::{use_documents, DocumentsHook, NewDocument};
pub use services::DocumentService;
