use std::sync::Arc;

use crate::core::context::RequestContext;
use crate::features::api_keys::dtos::UserApiKeyDto;
use crate::features::api_keys::services::ApiKeyGateway;
use crate::hooks::{FetchHook, PollOptions};

pub type UserApiKeysHook = FetchHook<RequestContext, Vec<UserApiKeyDto>>;

/// All keys the caller holds, fetched once on mount
pub fn use_user_api_keys(gateway: Arc<ApiKeyGateway>, ctx: RequestContext) -> UserApiKeysHook {
    let hook = FetchHook::new(
        move |ctx: RequestContext| {
            let gateway = Arc::clone(&gateway);
            async move { gateway.list_user(&ctx).await }
        },
        PollOptions::default(),
    );
    hook.mount(ctx);
    hook
}
