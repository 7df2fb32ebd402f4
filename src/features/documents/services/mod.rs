mod document_service;

pub use document_service::{store_file, DocumentService};
