/// Row types shared across managers
use crate::{
    db::{parse_optional_timestamp, parse_timestamp},
    error::{HubError, HubResult},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row};

/// Marketplace roles stored on the account row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Agent,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Agent => "agent",
        }
    }

    pub fn from_str(s: &str) -> HubResult<Self> {
        match s.to_lowercase().as_str() {
            "student" => Ok(Role::Student),
            "agent" => Ok(Role::Agent),
            _ => Err(HubError::Validation(format!("Invalid role: {}", s))),
        }
    }
}

/// Column list matching [`User::from_row`]
pub const USER_COLUMNS: &str = "id, email, full_name, phone, password_hash, role, verified_status, \
     banned, verification_attempts, last_verification_attempt, created_at";

/// Account row. For agents this is the authoritative verification record.
#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub password_hash: String,
    pub role: Role,
    pub verified_status: bool,
    pub banned: bool,
    pub verification_attempts: i64,
    pub last_verification_attempt: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn from_row(row: &SqliteRow) -> HubResult<Self> {
        let role: String = row.try_get("role")?;
        let created_at: String = row.try_get("created_at")?;

        Ok(User {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            full_name: row.try_get("full_name")?,
            phone: row.try_get("phone")?,
            password_hash: row.try_get("password_hash")?,
            role: Role::from_str(&role)?,
            verified_status: row.try_get("verified_status")?,
            banned: row.try_get("banned")?,
            verification_attempts: row.try_get("verification_attempts")?,
            last_verification_attempt: parse_optional_timestamp(
                row.try_get("last_verification_attempt")?,
            )?,
            created_at: parse_timestamp(&created_at)?,
        })
    }

    pub fn is_agent(&self) -> bool {
        self.role == Role::Agent
    }

    /// Public view without credentials
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.clone(),
            email: self.email.clone(),
            full_name: self.full_name.clone(),
            phone: self.phone.clone(),
            role: self.role,
            verified_status: self.verified_status,
            banned: self.banned,
            verification_attempts: self.verification_attempts,
            last_verification_attempt: self.last_verification_attempt,
            created_at: self.created_at,
        }
    }
}

/// Account data safe to return to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub role: Role,
    pub verified_status: bool,
    pub banned: bool,
    pub verification_attempts: i64,
    pub last_verification_attempt: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Column list matching [`Hostel::from_row`]
pub const HOSTEL_COLUMNS: &str = "h.id, h.agent_id, h.name, h.location, h.description, h.price, \
     h.total_rooms, h.available_rooms, h.image_key, h.image_mime, h.created_at, h.updated_at";

/// Hostel listing owned by an agent
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hostel {
    pub id: String,
    pub agent_id: String,
    pub name: String,
    pub location: String,
    pub description: Option<String>,
    pub price: i64,
    pub total_rooms: i64,
    pub available_rooms: i64,
    pub image_key: Option<String>,
    pub image_mime: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Hostel {
    pub fn from_row(row: &SqliteRow) -> HubResult<Self> {
        let created_at: String = row.try_get("created_at")?;
        let updated_at: String = row.try_get("updated_at")?;

        Ok(Hostel {
            id: row.try_get("id")?,
            agent_id: row.try_get("agent_id")?,
            name: row.try_get("name")?,
            location: row.try_get("location")?,
            description: row.try_get("description")?,
            price: row.try_get("price")?,
            total_rooms: row.try_get("total_rooms")?,
            available_rooms: row.try_get("available_rooms")?,
            image_key: row.try_get("image_key")?,
            image_mime: row.try_get("image_mime")?,
            created_at: parse_timestamp(&created_at)?,
            updated_at: parse_timestamp(&updated_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_from_str() {
        assert_eq!(Role::from_str("agent").unwrap(), Role::Agent);
        assert_eq!(Role::from_str("STUDENT").unwrap(), Role::Student);
        assert!(Role::from_str("admin").is_err());
    }

    #[test]
    fn test_hostel_serializes_camel_case() {
        let now = Utc::now();
        let hostel = Hostel {
            id: "h1".to_string(),
            agent_id: "a1".to_string(),
            name: "Harmony Hall".to_string(),
            location: "Yaba".to_string(),
            description: None,
            price: 120_000,
            total_rooms: 4,
            available_rooms: 3,
            image_key: None,
            image_mime: Some("image/png".to_string()),
            created_at: now,
            updated_at: now,
        };

        let value = serde_json::to_value(&hostel).unwrap();
        assert_eq!(value["agentId"], "a1");
        assert_eq!(value["totalRooms"], 4);
        assert_eq!(value["availableRooms"], 3);
        assert_eq!(value["imageMime"], "image/png");
        assert!(value.get("available_rooms").is_none());
        assert!(value.get("createdAt").is_some());
    }
}
