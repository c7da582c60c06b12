/// Verification queue
///
/// One row per agent submission with a fixed decision deadline. Rows are
/// bookkeeping only: the agent's account row stays authoritative.
use crate::{
    db::{
        format_timestamp,
        models::{User, UserProfile, USER_COLUMNS},
        parse_optional_timestamp, parse_timestamp,
    },
    error::{HubError, HubResult},
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row, SqliteConnection, SqlitePool};

/// Minutes an admin has to decide on a submission
pub const DECISION_WINDOW_MINUTES: i64 = 30;

/// Queue entry status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueStatus {
    Pending,
    Expired,
    Decided,
}

impl QueueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueueStatus::Pending => "pending",
            QueueStatus::Expired => "expired",
            QueueStatus::Decided => "decided",
        }
    }

    pub fn from_str(s: &str) -> HubResult<Self> {
        match s {
            "pending" => Ok(QueueStatus::Pending),
            "expired" => Ok(QueueStatus::Expired),
            "decided" => Ok(QueueStatus::Decided),
            _ => Err(HubError::Internal(format!("Invalid queue status: {}", s))),
        }
    }
}

/// Stored queue row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueEntry {
    pub id: i64,
    pub agent_id: String,
    pub submitted_at: DateTime<Utc>,
    pub decision_deadline: DateTime<Utc>,
    pub status: QueueStatus,
    pub admin_email: Option<String>,
    pub decided_at: Option<DateTime<Utc>>,
}

impl QueueEntry {
    fn from_row(row: &SqliteRow) -> HubResult<Self> {
        let status: String = row.try_get("status")?;
        let submitted_at: String = row.try_get("submitted_at")?;
        let decision_deadline: String = row.try_get("decision_deadline")?;

        Ok(QueueEntry {
            id: row.try_get("id")?,
            agent_id: row.try_get("agent_id")?,
            submitted_at: parse_timestamp(&submitted_at)?,
            decision_deadline: parse_timestamp(&decision_deadline)?,
            status: QueueStatus::from_str(&status)?,
            admin_email: row.try_get("admin_email")?,
            decided_at: parse_optional_timestamp(row.try_get("decided_at")?)?,
        })
    }
}

/// An unverified agent as shown in the admin review queue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingAgent {
    #[serde(flatten)]
    pub agent: UserProfile,
    pub decision_deadline: DateTime<Utc>,
    pub minutes_remaining: i64,
    pub queue_status: QueueStatus,
}

/// Actionable review queue plus counts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingQueue {
    pub agents: Vec<PendingAgent>,
    pub total: usize,
    pub pending: usize,
    pub expired: usize,
}

/// Deadline, whole minutes left (rounded up, never negative) and status
pub fn classify(created_at: DateTime<Utc>, now: DateTime<Utc>) -> (DateTime<Utc>, i64, QueueStatus) {
    let deadline = created_at + Duration::minutes(DECISION_WINDOW_MINUTES);
    let remaining_ms = (deadline - now).num_milliseconds();
    let minutes_remaining = if remaining_ms > 0 {
        (remaining_ms + 59_999) / 60_000
    } else {
        0
    };

    let status = if minutes_remaining > 0 {
        QueueStatus::Pending
    } else {
        QueueStatus::Expired
    };

    (deadline, minutes_remaining, status)
}

/// Verification queue store
#[derive(Clone)]
pub struct VerificationQueue {
    db: SqlitePool,
}

impl VerificationQueue {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Record a submission with a deadline `DECISION_WINDOW_MINUTES` out
    pub async fn enqueue(&self, agent_id: &str, now: DateTime<Utc>) -> HubResult<QueueEntry> {
        let deadline = now + Duration::minutes(DECISION_WINDOW_MINUTES);

        let result = sqlx::query(
            r#"
            INSERT INTO verification_queue (agent_id, submitted_at, decision_deadline, status)
            VALUES (?, ?, ?, 'pending')
            "#,
        )
        .bind(agent_id)
        .bind(format_timestamp(now))
        .bind(format_timestamp(deadline))
        .execute(&self.db)
        .await?;

        Ok(QueueEntry {
            id: result.last_insert_rowid(),
            agent_id: agent_id.to_string(),
            submitted_at: now,
            decision_deadline: deadline,
            status: QueueStatus::Pending,
            admin_email: None,
            decided_at: None,
        })
    }

    /// Most recent submission for an agent
    pub async fn latest_for_agent(&self, agent_id: &str) -> HubResult<Option<QueueEntry>> {
        let row = sqlx::query(
            r#"
            SELECT id, agent_id, submitted_at, decision_deadline, status, admin_email, decided_at
            FROM verification_queue
            WHERE agent_id = ?
            ORDER BY submitted_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(agent_id)
        .fetch_optional(&self.db)
        .await?;

        row.as_ref().map(QueueEntry::from_row).transpose()
    }

    /// Close every open submission of an agent with an admin decision
    pub async fn mark_decided(
        conn: &mut SqliteConnection,
        agent_id: &str,
        admin_email: &str,
        now: DateTime<Utc>,
    ) -> HubResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE verification_queue
            SET status = 'decided', admin_email = ?, decided_at = ?
            WHERE agent_id = ? AND status IN ('pending', 'expired')
            "#,
        )
        .bind(admin_email)
        .bind(format_timestamp(now))
        .bind(agent_id)
        .execute(conn)
        .await?;

        Ok(result.rows_affected())
    }

    /// Persist the derived expired status on overdue rows
    pub async fn mark_expired(&self, now: DateTime<Utc>) -> HubResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE verification_queue
            SET status = 'expired'
            WHERE status = 'pending' AND decision_deadline < ?
            "#,
        )
        .bind(format_timestamp(now))
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected())
    }

    /// Unverified agents oldest first, with expired ones counted but dropped
    pub async fn pending_view(&self, now: DateTime<Utc>) -> HubResult<PendingQueue> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM users WHERE role = 'agent' AND verified_status = 0 ORDER BY created_at ASC",
            USER_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        let mut agents = Vec::new();
        let mut expired = 0;

        for row in &rows {
            let user = User::from_row(row)?;
            let (decision_deadline, minutes_remaining, queue_status) =
                classify(user.created_at, now);

            if queue_status == QueueStatus::Expired {
                expired += 1;
                continue;
            }

            agents.push(PendingAgent {
                agent: user.profile(),
                decision_deadline,
                minutes_remaining,
                queue_status,
            });
        }

        Ok(PendingQueue {
            total: rows.len(),
            pending: agents.len(),
            expired,
            agents,
        })
    }
}
