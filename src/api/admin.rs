/// Admin API Endpoints
///
/// Login/logout, session checks and the agent moderation surface. Every
/// route except login goes through `AdminAuthContext`.
use crate::{
    admin::{ActionType, AgentHistoryReport, PendingQueue},
    api::{middleware::HubJson, ApiResponse},
    auth::AdminAuthContext,
    bookings::Booking,
    context::AppContext,
    db::models::UserProfile,
    error::{HubError, HubResult},
};
use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Build admin API routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        // Session
        .route("/api/admin/login", post(login))
        .route("/api/admin/logout", post(logout))
        .route("/api/admin/verify", get(verify_session))
        .route("/api/admin/simple-verify", get(simple_verify))
        // Agent moderation
        .route("/api/admin/pending-agents", get(pending_agents))
        .route("/api/admin/agent-history", get(agent_history))
        .route("/api/admin/ban-agent", post(ban_agent))
        .route("/api/admin/verify-agent", post(verify_agent))
        // Marketplace oversight
        .route("/api/admin/bookings", get(all_bookings))
}

#[derive(Debug, Deserialize)]
struct AdminLoginRequest {
    username: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct AdminIdentity {
    email: String,
    username: String,
    role: String,
}

#[derive(Debug, Serialize)]
struct SessionCheck {
    email: String,
    role: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BanAgentRequest {
    agent_id: String,
    banned: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerifyAgentRequest {
    agent_id: String,
    action: String,
    #[serde(default)]
    reason: Option<String>,
}

/// Check admin credentials and set the session cookie
async fn login(
    State(ctx): State<AppContext>,
    jar: CookieJar,
    HubJson(req): HubJson<AdminLoginRequest>,
) -> HubResult<(CookieJar, ApiResponse<AdminIdentity>)> {
    if !ctx.admin_gate.validate(&req.username, &req.password) {
        tracing::warn!("Failed admin login for {:?}", req.username);
        return Err(HubError::Authentication("Invalid credentials".to_string()));
    }

    let session = ctx.admin_gate.create_session(Utc::now());
    let cookie = ctx.admin_gate.encode_cookie(&session)?;

    tracing::info!("Admin {} logged in", session.email);

    Ok((
        jar.add(ctx.admin_gate.session_cookie(cookie)),
        ApiResponse::with_message(
            AdminIdentity {
                email: session.email,
                username: session.username,
                role: session.role,
            },
            "Login successful",
        ),
    ))
}

async fn logout(
    State(ctx): State<AppContext>,
    jar: CookieJar,
) -> (CookieJar, ApiResponse<()>) {
    (
        jar.add(ctx.admin_gate.removal_cookie()),
        ApiResponse::message("Logged out"),
    )
}

async fn verify_session(auth: AdminAuthContext) -> ApiResponse<SessionCheck> {
    ApiResponse::data(SessionCheck {
        email: auth.session.email,
        role: auth.session.role,
    })
}

/// Same check as `/api/admin/verify`, kept for older dashboard builds
async fn simple_verify(auth: AdminAuthContext) -> ApiResponse<SessionCheck> {
    verify_session(auth).await
}

async fn pending_agents(
    State(ctx): State<AppContext>,
    _auth: AdminAuthContext,
) -> HubResult<ApiResponse<PendingQueue>> {
    let queue = ctx.moderation_manager.pending_queue(Utc::now()).await?;
    Ok(ApiResponse::data(queue))
}

async fn agent_history(
    State(ctx): State<AppContext>,
    _auth: AdminAuthContext,
) -> HubResult<ApiResponse<AgentHistoryReport>> {
    let report = ctx.moderation_manager.agent_history(Utc::now()).await?;
    Ok(ApiResponse::data(report))
}

async fn ban_agent(
    State(ctx): State<AppContext>,
    auth: AdminAuthContext,
    HubJson(req): HubJson<BanAgentRequest>,
) -> HubResult<ApiResponse<UserProfile>> {
    let agent = ctx
        .moderation_manager
        .set_banned(&req.agent_id, req.banned)
        .await?;

    tracing::info!(
        "Admin {} set banned={} on agent {}",
        auth.session.email,
        req.banned,
        agent.id
    );

    let message = if req.banned {
        "Agent banned"
    } else {
        "Agent unbanned"
    };
    Ok(ApiResponse::with_message(agent.profile(), message))
}

/// Approve or reject an agent, then notify them by email
async fn verify_agent(
    State(ctx): State<AppContext>,
    auth: AdminAuthContext,
    HubJson(req): HubJson<VerifyAgentRequest>,
) -> HubResult<ApiResponse<UserProfile>> {
    let action = ActionType::from_str(&req.action)?;
    let reason = req
        .reason
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty());

    let agent = ctx
        .moderation_manager
        .decide(&req.agent_id, action, reason, &auth.session.email, Utc::now())
        .await?;

    if let Err(e) = ctx
        .mailer
        .send_verification_decision(&agent.email, &agent.full_name, action, reason)
        .await
    {
        tracing::warn!("Decision email to agent {} failed: {}", agent.id, e);
    }

    let message = match action {
        ActionType::Approve => "Agent approved",
        ActionType::Reject => "Agent rejected",
    };
    Ok(ApiResponse::with_message(agent.profile(), message))
}

async fn all_bookings(
    State(ctx): State<AppContext>,
    _auth: AdminAuthContext,
) -> HubResult<ApiResponse<Vec<Booking>>> {
    let bookings = ctx.booking_manager.list_all().await?;
    Ok(ApiResponse::data(bookings))
}
