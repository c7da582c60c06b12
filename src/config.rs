/// Configuration management for Hostel Hub
use crate::{
    account::password,
    error::{HubError, HubResult},
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub service: ServiceConfig,
    pub storage: StorageConfig,
    pub authentication: AuthConfig,
    pub admin: AdminConfig,
    pub email: Option<EmailConfig>,
    pub rate_limit: RateLimitSettings,
    pub logging: LoggingConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub hostname: String,
    pub port: u16,
    /// Public base URL used in outgoing emails
    pub public_url: String,
    pub version: String,
    pub image_upload_limit: usize,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_directory: PathBuf,
    pub database: PathBuf,
    pub image_directory: PathBuf,
}

/// Bearer token configuration for students and agents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub user_token_ttl_hours: i64,
}

/// The single administrator identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    pub username: String,
    pub email: String,
    /// Argon2 PHC string
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Path attribute of the admin session cookie
    pub cookie_path: String,
    pub secure_cookie: bool,
}

/// Email configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    pub smtp_url: String,
    pub from_address: String,
}

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitSettings {
    pub enabled: bool,
    pub global_requests_per_second: u32,
    pub auth_requests_per_minute: u32,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> HubResult<Self> {
        dotenv::dotenv().ok();

        let hostname = env_or("HOSTEL_HOSTNAME", "127.0.0.1");
        let port = env_or("HOSTEL_PORT", "8080")
            .parse()
            .map_err(|_| HubError::Validation("Invalid port number".to_string()))?;
        let public_url =
            env::var("HOSTEL_PUBLIC_URL").unwrap_or_else(|_| format!("http://{}:{}", hostname, port));
        let version = env_or("HOSTEL_VERSION", env!("CARGO_PKG_VERSION"));
        let image_upload_limit = env_parse("HOSTEL_IMAGE_UPLOAD_LIMIT", 5 * 1024 * 1024);

        let data_directory: PathBuf = env_or("HOSTEL_DATA_DIRECTORY", "./data").into();
        let database = env::var("HOSTEL_DATABASE_LOCATION")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_directory.join("hostel_hub.sqlite"));
        let image_directory = env::var("HOSTEL_IMAGE_DIRECTORY")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_directory.join("images"));

        let jwt_secret = env::var("HOSTEL_JWT_SECRET")
            .map_err(|_| HubError::Validation("JWT secret required".to_string()))?;
        let user_token_ttl_hours = env_parse("HOSTEL_USER_TOKEN_TTL_HOURS", 24 * 7);

        let admin_username = env_or("HOSTEL_ADMIN_USERNAME", "admin");
        let admin_email = env::var("HOSTEL_ADMIN_EMAIL")
            .map_err(|_| HubError::Validation("Admin email required".to_string()))?;
        // A pre-computed hash wins; plaintext is only a development convenience
        let admin_password_hash = match env::var("HOSTEL_ADMIN_PASSWORD_HASH") {
            Ok(hash) => hash,
            Err(_) => {
                let plain = env::var("HOSTEL_ADMIN_PASSWORD").map_err(|_| {
                    HubError::Validation("Admin password or password hash required".to_string())
                })?;
                tracing::warn!("HOSTEL_ADMIN_PASSWORD is set in plaintext; prefer HOSTEL_ADMIN_PASSWORD_HASH");
                password::hash_password(&plain)?
            }
        };
        let cookie_path = env_or("HOSTEL_ADMIN_COOKIE_PATH", "/admin");
        let secure_cookie = env_parse("HOSTEL_ADMIN_SECURE_COOKIE", true);

        let email = if let Ok(smtp_url) = env::var("HOSTEL_EMAIL_SMTP_URL") {
            Some(EmailConfig {
                smtp_url,
                from_address: env::var("HOSTEL_EMAIL_FROM_ADDRESS")
                    .unwrap_or_else(|_| format!("noreply@{}", hostname)),
            })
        } else {
            None
        };

        let rate_limit = RateLimitSettings {
            enabled: env_parse("HOSTEL_RATE_LIMITS_ENABLED", true),
            global_requests_per_second: env_parse("HOSTEL_RATE_LIMIT_GLOBAL_RPS", 100),
            auth_requests_per_minute: env_parse("HOSTEL_RATE_LIMIT_AUTH_PER_MINUTE", 20),
        };

        let log_level = env_or("RUST_LOG", "info");

        Ok(ServerConfig {
            service: ServiceConfig {
                hostname,
                port,
                public_url,
                version,
                image_upload_limit,
            },
            storage: StorageConfig {
                data_directory,
                database,
                image_directory,
            },
            authentication: AuthConfig {
                jwt_secret,
                user_token_ttl_hours,
            },
            admin: AdminConfig {
                username: admin_username,
                email: admin_email,
                password_hash: admin_password_hash,
                cookie_path,
                secure_cookie,
            },
            email,
            rate_limit,
            logging: LoggingConfig { level: log_level },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> HubResult<()> {
        if self.service.hostname.is_empty() {
            return Err(HubError::Validation("Hostname cannot be empty".to_string()));
        }

        if self.authentication.jwt_secret.len() < 32 {
            return Err(HubError::Validation(
                "JWT secret must be at least 32 characters".to_string(),
            ));
        }

        if self.authentication.user_token_ttl_hours <= 0 {
            return Err(HubError::Validation(
                "User token TTL must be positive".to_string(),
            ));
        }

        if self.admin.username.trim().is_empty() || !self.admin.email.contains('@') {
            return Err(HubError::Validation(
                "Admin username and a valid admin email are required".to_string(),
            ));
        }

        if !password::is_valid_hash(&self.admin.password_hash) {
            return Err(HubError::Validation(
                "Admin password hash is not a valid argon2 PHC string".to_string(),
            ));
        }

        Ok(())
    }

    /// Configuration suitable for tests and local experiments
    pub fn for_testing(data_directory: PathBuf, admin_password: &str) -> HubResult<Self> {
        Ok(ServerConfig {
            service: ServiceConfig {
                hostname: "127.0.0.1".to_string(),
                port: 0,
                public_url: "http://localhost".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                image_upload_limit: 1024 * 1024,
            },
            storage: StorageConfig {
                database: data_directory.join("hostel_hub.sqlite"),
                image_directory: data_directory.join("images"),
                data_directory,
            },
            authentication: AuthConfig {
                jwt_secret: "test-secret-that-is-at-least-32-characters".to_string(),
                user_token_ttl_hours: 24,
            },
            admin: AdminConfig {
                username: "admin".to_string(),
                email: "admin@hostelhub.test".to_string(),
                password_hash: password::hash_password(admin_password)?,
                cookie_path: "/admin".to_string(),
                secure_cookie: false,
            },
            email: None,
            rate_limit: RateLimitSettings {
                enabled: false,
                global_requests_per_second: 100,
                auth_requests_per_minute: 20,
            },
            logging: LoggingConfig {
                level: "debug".to_string(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_testing_config_is_valid() {
        let config = ServerConfig::for_testing("./data".into(), "correct horse").unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_short_jwt_secret_rejected() {
        let mut config = ServerConfig::for_testing("./data".into(), "correct horse").unwrap();
        config.authentication.jwt_secret = "short".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_admin_hash_rejected() {
        let mut config = ServerConfig::for_testing("./data".into(), "correct horse").unwrap();
        config.admin.password_hash = "plaintext".to_string();
        assert!(config.validate().is_err());
    }
}
