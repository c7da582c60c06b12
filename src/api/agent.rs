/// Agent self-service verification endpoints
use crate::{
    admin::{ResubmissionReceipt, VerificationStatus},
    api::ApiResponse,
    auth::AgentAuthContext,
    context::AppContext,
    error::HubResult,
};
use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use chrono::Utc;

pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/agent/resubmit-verification", post(resubmit_verification))
        .route("/api/agent/verification-status", get(verification_status))
}

async fn resubmit_verification(
    State(ctx): State<AppContext>,
    auth: AgentAuthContext,
) -> HubResult<ApiResponse<ResubmissionReceipt>> {
    let receipt = ctx
        .moderation_manager
        .resubmit(&auth.user.id, Utc::now())
        .await?;

    Ok(ApiResponse::with_message(
        receipt,
        "Verification resubmitted for review",
    ))
}

async fn verification_status(
    State(ctx): State<AppContext>,
    auth: AgentAuthContext,
) -> HubResult<ApiResponse<VerificationStatus>> {
    let status = ctx
        .moderation_manager
        .verification_status(&auth.user.id, Utc::now())
        .await?;

    Ok(ApiResponse::data(status))
}
