mod document_dto;

pub use document_dto::{CreateDocumentDto, StoredFileDto, UpdateDocumentDto};
