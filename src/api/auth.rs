/// Student and agent account endpoints
use crate::{
    account::{LoginRequest, RegisterRequest, SessionResponse},
    api::{middleware::HubJson, ApiResponse},
    auth::AuthContext,
    context::AppContext,
    db::models::UserProfile,
    error::HubResult,
};
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Router,
};
use chrono::Utc;

pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/me", get(me))
}

/// Create an account and sign it in
///
/// New agents are queued for verification; a queue failure only warns.
async fn register(
    State(ctx): State<AppContext>,
    HubJson(req): HubJson<RegisterRequest>,
) -> HubResult<(StatusCode, ApiResponse<SessionResponse>)> {
    let now = Utc::now();
    let user = ctx.account_manager.register(req, now).await?;

    if user.is_agent() {
        if let Err(e) = ctx.moderation_manager.queue().enqueue(&user.id, now).await {
            tracing::warn!("Agent {} registered without a queue entry: {}", user.id, e);
        }
    }

    let token = ctx.account_manager.issue_token(&user, now)?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(
            SessionResponse {
                token,
                user: user.profile(),
            },
            "Account created",
        ),
    ))
}

async fn login(
    State(ctx): State<AppContext>,
    HubJson(req): HubJson<LoginRequest>,
) -> HubResult<ApiResponse<SessionResponse>> {
    let user = ctx.account_manager.login(&req).await?;
    let token = ctx.account_manager.issue_token(&user, Utc::now())?;

    Ok(ApiResponse::data(SessionResponse {
        token,
        user: user.profile(),
    }))
}

async fn me(auth: AuthContext) -> ApiResponse<UserProfile> {
    ApiResponse::data(auth.user.profile())
}
