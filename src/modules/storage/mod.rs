//! Storage module for uploaded document files
//!
//! Provides the S3-compatible bucket client and the object-key scheme used for
//! document uploads.

mod s3_client;

pub use s3_client::{generate_document_key, ObjectStore, S3DocumentStorage, UPLOADS_PREFIX};
