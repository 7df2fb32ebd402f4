use std::sync::Arc;

use crate::core::context::RequestContext;
use crate::features::usage::dtos::UsageSummaryDto;
use crate::features::usage::services::UsageService;
use crate::hooks::{FetchHook, PollOptions};

pub type UsageHook = FetchHook<RequestContext, UsageSummaryDto>;

/// Usage summary of the caller; `refresh()` re-fetches it
pub fn use_usage(service: Arc<UsageService>, ctx: RequestContext) -> UsageHook {
    let hook = FetchHook::new(
        move |ctx: RequestContext| {
            let service = Arc::clone(&service);
            async move { service.summary(&ctx).await }
        },
        PollOptions::default(),
    );
    hook.mount(ctx);
    hook
}
