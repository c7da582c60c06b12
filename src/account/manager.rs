/// Account manager implementation using runtime queries
use crate::{
    account::{password, LoginRequest, RegisterRequest},
    config::AuthConfig,
    db::{
        format_timestamp,
        models::{Role, User, USER_COLUMNS},
    },
    error::{HubError, HubResult},
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;
use validator::Validate;

/// Claims carried by student and agent bearer tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Account manager service
pub struct AccountManager {
    db: SqlitePool,
    auth: AuthConfig,
}

impl AccountManager {
    /// Create a new account manager
    pub fn new(db: SqlitePool, auth: AuthConfig) -> Self {
        Self { db, auth }
    }

    /// Create a new account
    ///
    /// Agents start unverified; every other role is verified at creation.
    pub async fn register(&self, req: RegisterRequest, now: DateTime<Utc>) -> HubResult<User> {
        req.validate()?;

        let role = Role::from_str(&req.role)?;
        let email = req.email.trim().to_lowercase();

        if self.email_exists(&email).await? {
            return Err(HubError::Conflict("Email already registered".to_string()));
        }

        let password_hash = password::hash_password(&req.password)?;
        let id = Uuid::new_v4().to_string();
        let verified_status = role != Role::Agent;

        sqlx::query(
            "INSERT INTO users (id, email, full_name, phone, password_hash, role, verified_status, banned, verification_attempts, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, 0, ?8)",
        )
        .bind(&id)
        .bind(&email)
        .bind(req.full_name.trim())
        .bind(&req.phone)
        .bind(&password_hash)
        .bind(role.as_str())
        .bind(verified_status)
        .bind(format_timestamp(now))
        .execute(&self.db)
        .await
        .map_err(email_conflict)?;

        tracing::info!("Registered {} account {}", role.as_str(), id);

        Ok(User {
            id,
            email,
            full_name: req.full_name.trim().to_string(),
            phone: req.phone,
            password_hash,
            role,
            verified_status,
            banned: false,
            verification_attempts: 0,
            last_verification_attempt: None,
            created_at: now,
        })
    }

    /// Check credentials and return the account
    pub async fn login(&self, req: &LoginRequest) -> HubResult<User> {
        let email = req.email.trim().to_lowercase();

        let user = self
            .find_by_email(&email)
            .await?
            .ok_or_else(|| HubError::Authentication("Invalid credentials".to_string()))?;

        if !password::verify_password(&req.password, &user.password_hash) {
            return Err(HubError::Authentication("Invalid credentials".to_string()));
        }

        if user.banned {
            return Err(HubError::Authorization("Account has been banned".to_string()));
        }

        Ok(user)
    }

    /// Issue a bearer token for an account
    pub fn issue_token(&self, user: &User, now: DateTime<Utc>) -> HubResult<String> {
        let claims = TokenClaims {
            sub: user.id.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.auth.user_token_ttl_hours)).timestamp(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.auth.jwt_secret.as_bytes()),
        )
        .map_err(|e| HubError::Internal(format!("Failed to sign token: {}", e)))
    }

    /// Verify a bearer token signature and expiry
    pub fn verify_token(&self, token: &str) -> HubResult<TokenClaims> {
        let validation = Validation::new(Algorithm::HS256);

        decode::<TokenClaims>(
            token,
            &DecodingKey::from_secret(self.auth.jwt_secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::debug!("Bearer token rejected: {}", e);
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    HubError::Authentication("Token has expired".to_string())
                }
                _ => HubError::Authentication("Invalid token".to_string()),
            }
        })
    }

    /// Resolve a bearer token to the current account row
    pub async fn authenticate(&self, token: &str) -> HubResult<User> {
        let claims = self.verify_token(token)?;

        self.get_user(&claims.sub)
            .await?
            .ok_or_else(|| HubError::Authentication("Account no longer exists".to_string()))
    }

    /// Get an account by id
    pub async fn get_user(&self, id: &str) -> HubResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        row.as_ref().map(User::from_row).transpose()
    }

    async fn find_by_email(&self, email: &str) -> HubResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE email = ?1", USER_COLUMNS))
            .bind(email)
            .fetch_optional(&self.db)
            .await?;

        row.as_ref().map(User::from_row).transpose()
    }

    async fn email_exists(&self, email: &str) -> HubResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ?1")
            .bind(email)
            .fetch_one(&self.db)
            .await?;

        Ok(count > 0)
    }
}

/// A concurrent registration can pass `email_exists` and still lose on the
/// unique index
fn email_conflict(e: sqlx::Error) -> HubError {
    match e.as_database_error() {
        Some(db) if db.is_unique_violation() => {
            HubError::Conflict("Email already registered".to_string())
        }
        _ => HubError::from(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    async fn create_test_manager() -> AccountManager {
        let pool = db::memory_pool().await.unwrap();
        AccountManager::new(
            pool,
            AuthConfig {
                jwt_secret: "test-secret-that-is-at-least-32-characters".to_string(),
                user_token_ttl_hours: 1,
            },
        )
    }

    fn register_request(email: &str, role: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            password: "password123".to_string(),
            full_name: "Ada Obi".to_string(),
            phone: None,
            role: role.to_string(),
        }
    }

    #[tokio::test]
    async fn test_agent_starts_unverified() {
        let manager = create_test_manager().await;

        let agent = manager
            .register(register_request("agent@example.com", "agent"), Utc::now())
            .await
            .unwrap();
        assert!(!agent.verified_status);
        assert_eq!(agent.verification_attempts, 0);

        let student = manager
            .register(register_request("student@example.com", "student"), Utc::now())
            .await
            .unwrap();
        assert!(student.verified_status);
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let manager = create_test_manager().await;

        manager
            .register(register_request("dup@example.com", "student"), Utc::now())
            .await
            .unwrap();
        let err = manager
            .register(register_request("DUP@example.com", "student"), Utc::now())
            .await
            .unwrap_err();

        assert!(matches!(err, HubError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_unique_index_violation_is_conflict() {
        let manager = create_test_manager().await;
        manager
            .register(register_request("race@example.com", "student"), Utc::now())
            .await
            .unwrap();

        let err = sqlx::query(
            "INSERT INTO users (id, email, full_name, phone, password_hash, role, verified_status, banned, verification_attempts, created_at)
             VALUES ('other', 'race@example.com', 'Other', NULL, 'x', 'student', 1, 0, 0, '2026-01-01T00:00:00Z')",
        )
        .execute(&manager.db)
        .await
        .unwrap_err();

        assert!(matches!(email_conflict(err), HubError::Conflict(_)));

        let other = sqlx::Error::RowNotFound;
        assert!(!matches!(email_conflict(other), HubError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_invalid_registration_rejected() {
        let manager = create_test_manager().await;

        let mut req = register_request("not-an-email", "student");
        assert!(matches!(
            manager.register(req.clone(), Utc::now()).await,
            Err(HubError::Validation(_))
        ));

        req.email = "ok@example.com".to_string();
        req.role = "admin".to_string();
        assert!(matches!(
            manager.register(req, Utc::now()).await,
            Err(HubError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_login_and_token_roundtrip() {
        let manager = create_test_manager().await;
        let user = manager
            .register(register_request("login@example.com", "student"), Utc::now())
            .await
            .unwrap();

        let logged_in = manager
            .login(&LoginRequest {
                email: "login@example.com".to_string(),
                password: "password123".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(logged_in.id, user.id);

        let bad = manager
            .login(&LoginRequest {
                email: "login@example.com".to_string(),
                password: "wrong-password".to_string(),
            })
            .await;
        assert!(matches!(bad, Err(HubError::Authentication(_))));

        let token = manager.issue_token(&user, Utc::now()).unwrap();
        let resolved = manager.authenticate(&token).await.unwrap();
        assert_eq!(resolved.id, user.id);
    }

    #[tokio::test]
    async fn test_expired_token_rejected() {
        let manager = create_test_manager().await;
        let user = manager
            .register(register_request("old@example.com", "student"), Utc::now())
            .await
            .unwrap();

        let token = manager
            .issue_token(&user, Utc::now() - Duration::hours(3))
            .unwrap();

        assert!(matches!(
            manager.verify_token(&token),
            Err(HubError::Authentication(_))
        ));
    }
}
