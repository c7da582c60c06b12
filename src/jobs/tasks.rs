/// Background task implementations
use crate::{api::health, context::AppContext, error::HubResult};
use chrono::Utc;

/// Mark overdue pending queue rows expired; agent records are untouched
pub async fn expire_verification_queue(ctx: &AppContext) -> HubResult<u64> {
    ctx.moderation_manager
        .queue()
        .mark_expired(Utc::now())
        .await
}

/// Health check - verify storage is reachable
pub async fn health_check(ctx: &AppContext) -> HubResult<()> {
    health::check_database(ctx).await?;
    health::check_image_storage(ctx).await?;
    Ok(())
}
