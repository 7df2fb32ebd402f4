mod database_dto;

pub use database_dto::{
    ChunkSize, CreateDatabaseDto, CreateDatabaseForm, CreateDatabaseResponseDto,
    DatabaseListEntry, DatabaseStatusDto, DeleteDatabaseResponseDto, EmbeddingModel,
    UpdateDatabaseDto,
};
