mod api_key_dto;

pub use api_key_dto::{
    mask_key, ApiKeyResponseDto, CreateApiKeyDto, UserApiKeyDto, UserApiKeysResponseDto,
};
