/// Admin action log
///
/// Append-only record of verification decisions, newest first on read.
use crate::{
    db::{format_timestamp, parse_timestamp},
    error::{HubError, HubResult},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row, SqliteConnection, SqlitePool};

/// Decision recorded by an admin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    Approve,
    Reject,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::Approve => "approve",
            ActionType::Reject => "reject",
        }
    }

    pub fn from_str(s: &str) -> HubResult<Self> {
        match s.to_lowercase().as_str() {
            "approve" => Ok(ActionType::Approve),
            "reject" => Ok(ActionType::Reject),
            _ => Err(HubError::Validation(format!("Invalid action: {}", s))),
        }
    }
}

/// Audit log row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminAction {
    pub id: i64,
    pub agent_id: String,
    pub action_type: ActionType,
    pub reason: Option<String>,
    pub admin_email: String,
    pub created_at: DateTime<Utc>,
}

impl AdminAction {
    fn from_row(row: &SqliteRow) -> HubResult<Self> {
        let action_type: String = row.try_get("action_type")?;
        let created_at: String = row.try_get("created_at")?;

        Ok(AdminAction {
            id: row.try_get("id")?,
            agent_id: row.try_get("agent_id")?,
            action_type: ActionType::from_str(&action_type)?,
            reason: row.try_get("reason")?,
            admin_email: row.try_get("admin_email")?,
            created_at: parse_timestamp(&created_at)?,
        })
    }
}

/// Action log store
#[derive(Clone)]
pub struct ActionLog {
    db: SqlitePool,
}

impl ActionLog {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Append a decision; runs on the caller's connection so it joins their transaction
    pub async fn append(
        conn: &mut SqliteConnection,
        agent_id: &str,
        action_type: ActionType,
        reason: Option<&str>,
        admin_email: &str,
        now: DateTime<Utc>,
    ) -> HubResult<AdminAction> {
        let result = sqlx::query(
            r#"
            INSERT INTO admin_actions (agent_id, action_type, reason, admin_email, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(agent_id)
        .bind(action_type.as_str())
        .bind(reason)
        .bind(admin_email)
        .bind(format_timestamp(now))
        .execute(conn)
        .await?;

        Ok(AdminAction {
            id: result.last_insert_rowid(),
            agent_id: agent_id.to_string(),
            action_type,
            reason: reason.map(str::to_string),
            admin_email: admin_email.to_string(),
            created_at: now,
        })
    }

    /// Decisions for one agent, most recent first
    pub async fn history_for_agent(&self, agent_id: &str) -> HubResult<Vec<AdminAction>> {
        let rows = sqlx::query(
            r#"
            SELECT id, agent_id, action_type, reason, admin_email, created_at
            FROM admin_actions
            WHERE agent_id = ?
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(agent_id)
        .fetch_all(&self.db)
        .await?;

        rows.iter().map(AdminAction::from_row).collect()
    }

    /// Every decision, most recent first
    pub async fn all(&self) -> HubResult<Vec<AdminAction>> {
        let rows = sqlx::query(
            r#"
            SELECT id, agent_id, action_type, reason, admin_email, created_at
            FROM admin_actions
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        rows.iter().map(AdminAction::from_row).collect()
    }
}
