/// Authentication extractors
///
/// Students and agents authenticate with bearer tokens; the admin uses the
/// signed `admin-session` cookie.
use crate::{
    admin::{AdminSession, ADMIN_SESSION_COOKIE},
    api::middleware::extract_bearer_token,
    context::AppContext,
    db::models::{Role, User},
    error::HubError,
};
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::CookieJar;
use chrono::Utc;

/// Any signed-in student or agent
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user: User,
}

#[async_trait]
impl FromRequestParts<AppContext> for AuthContext {
    type Rejection = HubError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers)
            .ok_or_else(|| HubError::Authentication("Missing authorization header".to_string()))?;

        let user = state.account_manager.authenticate(&token).await?;

        if user.banned {
            return Err(HubError::Authorization("Account has been banned".to_string()));
        }

        Ok(AuthContext { user })
    }
}

/// A signed-in agent; verification is not required
#[derive(Debug, Clone)]
pub struct AgentAuthContext {
    pub user: User,
}

#[async_trait]
impl FromRequestParts<AppContext> for AgentAuthContext {
    type Rejection = HubError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let AuthContext { user } = AuthContext::from_request_parts(parts, state).await?;

        if user.role != Role::Agent {
            return Err(HubError::Authorization("Agent role required".to_string()));
        }

        Ok(AgentAuthContext { user })
    }
}

/// A signed-in student
#[derive(Debug, Clone)]
pub struct StudentAuthContext {
    pub user: User,
}

#[async_trait]
impl FromRequestParts<AppContext> for StudentAuthContext {
    type Rejection = HubError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let AuthContext { user } = AuthContext::from_request_parts(parts, state).await?;

        if user.role != Role::Student {
            return Err(HubError::Authorization("Student role required".to_string()));
        }

        Ok(StudentAuthContext { user })
    }
}

/// Admin authentication context - requires a valid admin session cookie
#[derive(Debug, Clone)]
pub struct AdminAuthContext {
    pub session: AdminSession,
}

#[async_trait]
impl FromRequestParts<AppContext> for AdminAuthContext {
    type Rejection = HubError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let cookie = jar.get(ADMIN_SESSION_COOKIE).map(|c| c.value().to_string());

        let session = state.admin_gate.authorize(cookie.as_deref(), Utc::now())?;

        Ok(AdminAuthContext { session })
    }
}
