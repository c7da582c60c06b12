/// Admin authentication gate
///
/// One configured administrator identity, a signed client-side session
/// cookie, and a single validity check used by every admin-gated route.
use crate::{
    account::password,
    config::AdminConfig,
    error::{HubError, HubResult},
};
use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Name of the admin session cookie
pub const ADMIN_SESSION_COOKIE: &str = "admin-session";

/// Lifetime of an admin session, enforced both as cookie max-age and on every check
pub const ADMIN_SESSION_HOURS: i64 = 8;

const ADMIN_ROLE: &str = "admin";

/// Admin session payload carried in the cookie
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSession {
    pub username: String,
    pub email: String,
    pub role: String,
    pub login_time: DateTime<Utc>,
}

/// Credential check and session authority for the admin surface
#[derive(Clone)]
pub struct AdminGate {
    config: AdminConfig,
    signing_secret: String,
}

impl AdminGate {
    pub fn new(config: AdminConfig, jwt_secret: &str) -> Self {
        Self {
            config,
            // Separate key space from student/agent bearer tokens
            signing_secret: format!("{}:{}", ADMIN_SESSION_COOKIE, jwt_secret),
        }
    }

    pub fn admin_email(&self) -> &str {
        &self.config.email
    }

    /// Check a username/password pair against the configured admin
    pub fn validate(&self, username: &str, password: &str) -> bool {
        if username != self.config.username {
            return false;
        }
        password::verify_password(password, &self.config.password_hash)
    }

    /// Build a fresh session for the configured admin
    pub fn create_session(&self, now: DateTime<Utc>) -> AdminSession {
        AdminSession {
            username: self.config.username.clone(),
            email: self.config.email.clone(),
            role: ADMIN_ROLE.to_string(),
            login_time: now,
        }
    }

    /// The one validity rule for admin sessions
    pub fn is_valid(&self, session: &AdminSession, now: DateTime<Utc>) -> bool {
        session.email == self.config.email
            && session.role == ADMIN_ROLE
            && now - session.login_time <= Duration::hours(ADMIN_SESSION_HOURS)
    }

    /// Sign a session into a cookie value
    pub fn encode_cookie(&self, session: &AdminSession) -> HubResult<String> {
        encode(
            &Header::new(Algorithm::HS256),
            session,
            &EncodingKey::from_secret(self.signing_secret.as_bytes()),
        )
        .map_err(|e| HubError::Internal(format!("Failed to sign admin session: {}", e)))
    }

    /// Recover a session from a cookie value; `None` on a bad signature or shape
    pub fn decode_cookie(&self, value: &str) -> Option<AdminSession> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is loginTime-based and checked by is_valid
        validation.required_spec_claims.clear();
        validation.validate_exp = false;

        decode::<AdminSession>(
            value,
            &DecodingKey::from_secret(self.signing_secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| tracing::debug!("Admin session cookie rejected: {}", e))
        .ok()
    }

    /// Resolve an optional cookie value into a valid session or a 401
    pub fn authorize(&self, cookie: Option<&str>, now: DateTime<Utc>) -> HubResult<AdminSession> {
        let value =
            cookie.ok_or_else(|| HubError::Authentication("Admin session required".to_string()))?;

        let session = self
            .decode_cookie(value)
            .ok_or_else(|| HubError::Authentication("Invalid admin session".to_string()))?;

        if !self.is_valid(&session, now) {
            return Err(HubError::Authentication(
                "Admin session expired or invalid".to_string(),
            ));
        }

        Ok(session)
    }

    /// Session cookie carrying a signed value
    pub fn session_cookie(&self, value: String) -> Cookie<'static> {
        Cookie::build((ADMIN_SESSION_COOKIE, value))
            .path(self.config.cookie_path.clone())
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(self.config.secure_cookie)
            .max_age(time::Duration::hours(ADMIN_SESSION_HOURS))
            .build()
    }

    /// Cookie that makes the browser drop the session
    pub fn removal_cookie(&self) -> Cookie<'static> {
        let mut cookie = self.session_cookie(String::new());
        cookie.make_removal();
        cookie
    }
}
