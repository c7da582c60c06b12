/// Agent verification and moderation workflow
use crate::{
    admin::{
        audit::{ActionLog, ActionType, AdminAction},
        queue::{PendingQueue, QueueEntry, VerificationQueue},
    },
    db::{
        format_timestamp,
        models::{User, UserProfile, USER_COLUMNS},
    },
    error::{HubError, HubResult},
    metrics,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::HashMap;

/// Resubmissions allowed per agent
pub const MAX_VERIFICATION_ATTEMPTS: i64 = 3;

/// Wait between resubmissions
pub const RESUBMISSION_COOLDOWN_HOURS: i64 = 1;

/// Result of an accepted resubmission
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResubmissionReceipt {
    pub attempt: i64,
    pub max_attempts: i64,
    pub cooldown_hours: i64,
}

/// Agent-facing view of their own verification state
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationStatus {
    pub verified: bool,
    pub banned: bool,
    pub attempts_used: i64,
    pub attempts_remaining: i64,
    pub minutes_until_resubmission: i64,
    pub latest_submission: Option<QueueEntry>,
}

/// One agent in the history view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentHistoryEntry {
    #[serde(flatten)]
    pub agent: UserProfile,
    #[serde(rename = "lastAction")]
    pub last_action: Option<AdminAction>,
    #[serde(rename = "actionHistory")]
    pub action_history: Vec<AdminAction>,
    #[serde(rename = "canBeBanned")]
    pub can_be_banned: bool,
    /// Whole days since registration
    #[serde(rename = "registrationAgeDays")]
    pub registration_age: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentStats {
    pub total: usize,
    pub verified: usize,
    pub unverified: usize,
    pub banned: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentHistoryReport {
    pub agents: Vec<AgentHistoryEntry>,
    pub stats: AgentStats,
}

/// Minutes left before another resubmission is allowed, rounded up; 0 when allowed
pub fn cooldown_remaining_minutes(last_attempt: Option<DateTime<Utc>>, now: DateTime<Utc>) -> i64 {
    let Some(last) = last_attempt else {
        return 0;
    };

    let remaining_ms = (last + Duration::hours(RESUBMISSION_COOLDOWN_HOURS) - now).num_milliseconds();
    if remaining_ms > 0 {
        (remaining_ms + 59_999) / 60_000
    } else {
        0
    }
}

/// Ordered eligibility checks for a resubmission
pub fn check_resubmission(agent: &User, now: DateTime<Utc>) -> HubResult<()> {
    if !agent.is_agent() {
        return Err(HubError::Authorization("Agent role required".to_string()));
    }

    if agent.verified_status {
        return Err(HubError::Validation("Agent is already verified".to_string()));
    }

    if agent.verification_attempts >= MAX_VERIFICATION_ATTEMPTS {
        return Err(HubError::Validation(
            "Maximum verification attempts reached. Please contact support.".to_string(),
        ));
    }

    let wait = cooldown_remaining_minutes(agent.last_verification_attempt, now);
    if wait > 0 {
        return Err(HubError::Validation(format!(
            "Please wait {} minutes before resubmitting",
            wait
        )));
    }

    Ok(())
}

/// Moderation manager
#[derive(Clone)]
pub struct ModerationManager {
    db: SqlitePool,
    queue: VerificationQueue,
    log: ActionLog,
}

impl ModerationManager {
    pub fn new(db: SqlitePool) -> Self {
        Self {
            queue: VerificationQueue::new(db.clone()),
            log: ActionLog::new(db.clone()),
            db,
        }
    }

    pub fn queue(&self) -> &VerificationQueue {
        &self.queue
    }

    async fn fetch_agent(conn: &mut SqliteConnection, agent_id: &str) -> HubResult<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM users WHERE id = ? AND role = 'agent'",
            USER_COLUMNS
        ))
        .bind(agent_id)
        .fetch_optional(conn)
        .await?;

        row.as_ref().map(User::from_row).transpose()
    }

    async fn get_agent(&self, agent_id: &str) -> HubResult<User> {
        let mut conn = self.db.acquire().await?;
        Self::fetch_agent(&mut conn, agent_id)
            .await?
            .ok_or_else(|| HubError::NotFound("Agent not found".to_string()))
    }

    /// Agent asks for another verification review
    ///
    /// The attempt counter and timestamp move in one conditional update, so
    /// concurrent resubmissions cannot both pass the cap or cooldown. The
    /// queue row is written afterwards and its failure is only logged.
    pub async fn resubmit(&self, agent_id: &str, now: DateTime<Utc>) -> HubResult<ResubmissionReceipt> {
        let agent = self.get_agent(agent_id).await?;
        if let Err(e) = check_resubmission(&agent, now) {
            metrics::record_resubmission("rejected");
            return Err(e);
        }

        let cooldown_cutoff = now - Duration::hours(RESUBMISSION_COOLDOWN_HOURS);
        let attempt: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE users
            SET verification_attempts = verification_attempts + 1,
                last_verification_attempt = ?
            WHERE id = ?
              AND role = 'agent'
              AND verified_status = 0
              AND verification_attempts < ?
              AND (last_verification_attempt IS NULL OR last_verification_attempt <= ?)
            RETURNING verification_attempts
            "#,
        )
        .bind(format_timestamp(now))
        .bind(agent_id)
        .bind(MAX_VERIFICATION_ATTEMPTS)
        .bind(format_timestamp(cooldown_cutoff))
        .fetch_optional(&self.db)
        .await?;

        let Some(attempt) = attempt else {
            // Lost a race; report whichever rule the fresh row now violates
            metrics::record_resubmission("rejected");
            let fresh = self.get_agent(agent_id).await?;
            check_resubmission(&fresh, now)?;
            return Err(HubError::Conflict(
                "Verification state changed, please retry".to_string(),
            ));
        };

        if let Err(e) = self.queue.enqueue(agent_id, now).await {
            tracing::warn!(
                "Resubmission {} for agent {} recorded without a queue entry: {}",
                attempt,
                agent_id,
                e
            );
        }

        metrics::record_resubmission("accepted");
        tracing::info!(
            "Agent {} resubmitted verification (attempt {}/{})",
            agent_id,
            attempt,
            MAX_VERIFICATION_ATTEMPTS
        );

        Ok(ResubmissionReceipt {
            attempt,
            max_attempts: MAX_VERIFICATION_ATTEMPTS,
            cooldown_hours: RESUBMISSION_COOLDOWN_HOURS,
        })
    }

    /// Agent's own verification summary
    pub async fn verification_status(
        &self,
        agent_id: &str,
        now: DateTime<Utc>,
    ) -> HubResult<VerificationStatus> {
        let agent = self.get_agent(agent_id).await?;
        let latest_submission = self.queue.latest_for_agent(agent_id).await?;

        Ok(VerificationStatus {
            verified: agent.verified_status,
            banned: agent.banned,
            attempts_used: agent.verification_attempts,
            attempts_remaining: (MAX_VERIFICATION_ATTEMPTS - agent.verification_attempts).max(0),
            minutes_until_resubmission: cooldown_remaining_minutes(
                agent.last_verification_attempt,
                now,
            ),
            latest_submission,
        })
    }

    /// Review queue for admins
    pub async fn pending_queue(&self, now: DateTime<Utc>) -> HubResult<PendingQueue> {
        self.queue.pending_view(now).await
    }

    /// Record an approve/reject decision
    ///
    /// Agent row, audit entry and queue rows change in one transaction.
    pub async fn decide(
        &self,
        agent_id: &str,
        action: ActionType,
        reason: Option<&str>,
        admin_email: &str,
        now: DateTime<Utc>,
    ) -> HubResult<User> {
        let mut tx = self.db.begin().await?;

        let mut agent = Self::fetch_agent(&mut tx, agent_id)
            .await?
            .ok_or_else(|| HubError::NotFound("Agent not found".to_string()))?;

        if agent.verified_status {
            return Err(HubError::Validation("Agent is already verified".to_string()));
        }

        if action == ActionType::Approve {
            sqlx::query("UPDATE users SET verified_status = 1 WHERE id = ?")
                .bind(agent_id)
                .execute(&mut *tx)
                .await?;
            agent.verified_status = true;
        }

        ActionLog::append(&mut tx, agent_id, action, reason, admin_email, now).await?;
        VerificationQueue::mark_decided(&mut tx, agent_id, admin_email, now).await?;

        tx.commit().await?;

        metrics::record_moderation_action(action.as_str());
        tracing::info!("Admin {} recorded {} for agent {}", admin_email, action.as_str(), agent_id);

        Ok(agent)
    }

    /// Set the banned flag; repeating the same value is a no-op success
    ///
    /// Only agents that have been verified may be banned.
    pub async fn set_banned(&self, agent_id: &str, banned: bool) -> HubResult<User> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET banned = ?
            WHERE id = ? AND role = 'agent' AND (? = 0 OR verified_status = 1)
            "#,
        )
        .bind(banned)
        .bind(agent_id)
        .bind(banned)
        .execute(&self.db)
        .await?;

        let agent = self.get_agent(agent_id).await?;

        if result.rows_affected() == 0 {
            return Err(HubError::Validation(
                "Only verified agents can be banned".to_string(),
            ));
        }

        metrics::record_moderation_action(if banned { "ban" } else { "unban" });
        tracing::info!("Agent {} banned={}", agent_id, banned);

        Ok(agent)
    }

    /// Every agent with its decision history
    pub async fn agent_history(&self, now: DateTime<Utc>) -> HubResult<AgentHistoryReport> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM users WHERE role = 'agent' ORDER BY created_at DESC",
            USER_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        let mut by_agent: HashMap<String, Vec<AdminAction>> = HashMap::new();
        for action in self.log.all().await? {
            by_agent.entry(action.agent_id.clone()).or_default().push(action);
        }

        let mut stats = AgentStats::default();
        let mut agents = Vec::with_capacity(rows.len());

        for row in &rows {
            let agent = User::from_row(row)?;

            stats.total += 1;
            if agent.verified_status {
                stats.verified += 1;
            } else {
                stats.unverified += 1;
            }
            if agent.banned {
                stats.banned += 1;
            }

            let action_history = by_agent.remove(&agent.id).unwrap_or_default();

            agents.push(AgentHistoryEntry {
                last_action: action_history.first().cloned(),
                action_history,
                can_be_banned: agent.verified_status,
                registration_age: (now - agent.created_at).num_days(),
                agent: agent.profile(),
            });
        }

        Ok(AgentHistoryReport { agents, stats })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap()
    }

    async fn setup() -> (ModerationManager, SqlitePool) {
        let pool = db::memory_pool().await.unwrap();
        (ModerationManager::new(pool.clone()), pool)
    }

    async fn insert_agent(pool: &SqlitePool, id: &str, created_at: DateTime<Utc>) {
        sqlx::query(
            "INSERT INTO users (id, email, full_name, password_hash, role, created_at)
             VALUES (?, ?, 'Agent', 'x', 'agent', ?)",
        )
        .bind(id)
        .bind(format!("{}@example.com", id))
        .bind(format_timestamp(created_at))
        .execute(pool)
        .await
        .unwrap();
    }

    fn expect_validation(result: HubResult<ResubmissionReceipt>) -> String {
        match result {
            Err(HubError::Validation(msg)) => msg,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_cooldown_rounds_up() {
        let last = t0();
        assert_eq!(cooldown_remaining_minutes(None, last), 0);
        assert_eq!(cooldown_remaining_minutes(Some(last), last), 60);
        assert_eq!(cooldown_remaining_minutes(Some(last), last + Duration::minutes(30)), 30);
        assert_eq!(
            cooldown_remaining_minutes(Some(last), last + Duration::seconds(59 * 60 + 1)),
            1
        );
        assert_eq!(cooldown_remaining_minutes(Some(last), last + Duration::hours(1)), 0);
    }

    #[tokio::test]
    async fn test_resubmission_scenario() {
        let (manager, pool) = setup().await;
        insert_agent(&pool, "agent-1", t0()).await;

        let receipt = manager.resubmit("agent-1", t0() + Duration::hours(2)).await.unwrap();
        assert_eq!(receipt.attempt, 1);
        assert_eq!(receipt.max_attempts, 3);
        assert_eq!(receipt.cooldown_hours, 1);

        let entry = manager.queue().latest_for_agent("agent-1").await.unwrap().unwrap();
        assert_eq!(
            entry.decision_deadline,
            t0() + Duration::hours(2) + Duration::minutes(30)
        );

        let msg = expect_validation(
            manager
                .resubmit("agent-1", t0() + Duration::hours(2) + Duration::minutes(30))
                .await,
        );
        assert!(msg.contains("30 minutes"), "{}", msg);

        let receipt = manager
            .resubmit("agent-1", t0() + Duration::hours(3) + Duration::minutes(30))
            .await
            .unwrap();
        assert_eq!(receipt.attempt, 2);

        let receipt = manager.resubmit("agent-1", t0() + Duration::hours(5)).await.unwrap();
        assert_eq!(receipt.attempt, 3);

        let msg = expect_validation(manager.resubmit("agent-1", t0() + Duration::days(30)).await);
        assert!(msg.contains("Maximum verification attempts"), "{}", msg);
    }

    #[tokio::test]
    async fn test_max_attempts_wins_over_cooldown() {
        let (manager, pool) = setup().await;
        insert_agent(&pool, "agent-1", t0()).await;
        sqlx::query(
            "UPDATE users SET verification_attempts = 3, last_verification_attempt = ? WHERE id = 'agent-1'",
        )
        .bind(format_timestamp(t0()))
        .execute(&pool)
        .await
        .unwrap();

        for offset in [Duration::minutes(1), Duration::minutes(59), Duration::days(2)] {
            let msg = expect_validation(manager.resubmit("agent-1", t0() + offset).await);
            assert!(msg.contains("Maximum verification attempts"));
        }
    }

    #[tokio::test]
    async fn test_resubmit_unknown_or_verified_agent() {
        let (manager, pool) = setup().await;

        assert!(matches!(
            manager.resubmit("ghost", t0()).await,
            Err(HubError::NotFound(_))
        ));

        insert_agent(&pool, "agent-1", t0()).await;
        sqlx::query("UPDATE users SET verified_status = 1 WHERE id = 'agent-1'")
            .execute(&pool)
            .await
            .unwrap();

        let msg = expect_validation(manager.resubmit("agent-1", t0()).await);
        assert_eq!(msg, "Agent is already verified");
    }

    #[tokio::test]
    async fn test_queue_failure_keeps_attempt() {
        let (manager, pool) = setup().await;
        insert_agent(&pool, "agent-1", t0()).await;

        sqlx::query("DROP TABLE verification_queue")
            .execute(&pool)
            .await
            .unwrap();

        let receipt = manager.resubmit("agent-1", t0()).await.unwrap();
        assert_eq!(receipt.attempt, 1);

        let attempts: i64 =
            sqlx::query_scalar("SELECT verification_attempts FROM users WHERE id = 'agent-1'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(attempts, 1);
    }

    #[tokio::test]
    async fn test_decide_approve_writes_log_and_closes_queue() {
        let (manager, pool) = setup().await;
        insert_agent(&pool, "agent-1", t0()).await;
        manager.queue().enqueue("agent-1", t0()).await.unwrap();

        let agent = manager
            .decide("agent-1", ActionType::Approve, None, "admin@x.test", t0() + Duration::minutes(5))
            .await
            .unwrap();
        assert!(agent.verified_status);

        let entry = manager.queue().latest_for_agent("agent-1").await.unwrap().unwrap();
        assert_eq!(entry.admin_email.as_deref(), Some("admin@x.test"));

        let report = manager.agent_history(t0() + Duration::days(3)).await.unwrap();
        assert_eq!(report.stats.total, 1);
        assert_eq!(report.stats.verified, 1);
        let entry = &report.agents[0];
        assert!(entry.can_be_banned);
        assert_eq!(entry.registration_age, 3);
        assert_eq!(entry.action_history.len(), 1);
        assert_eq!(
            entry.last_action.as_ref().map(|a| a.action_type),
            Some(ActionType::Approve)
        );

        assert!(matches!(
            manager
                .decide("agent-1", ActionType::Approve, None, "admin@x.test", t0())
                .await,
            Err(HubError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_reject_keeps_agent_unverified() {
        let (manager, pool) = setup().await;
        insert_agent(&pool, "agent-1", t0()).await;

        let agent = manager
            .decide("agent-1", ActionType::Reject, Some("ID unreadable"), "admin@x.test", t0())
            .await
            .unwrap();
        assert!(!agent.verified_status);

        let report = manager.agent_history(t0()).await.unwrap();
        assert!(!report.agents[0].can_be_banned);
        assert_eq!(
            report.agents[0].last_action.as_ref().and_then(|a| a.reason.clone()),
            Some("ID unreadable".to_string())
        );
    }

    #[tokio::test]
    async fn test_ban_is_idempotent_and_requires_verification() {
        let (manager, pool) = setup().await;
        insert_agent(&pool, "agent-1", t0()).await;

        assert!(matches!(
            manager.set_banned("agent-1", true).await,
            Err(HubError::Validation(_))
        ));
        assert!(matches!(
            manager.set_banned("ghost", true).await,
            Err(HubError::NotFound(_))
        ));

        manager
            .decide("agent-1", ActionType::Approve, None, "admin@x.test", t0())
            .await
            .unwrap();

        assert!(manager.set_banned("agent-1", true).await.unwrap().banned);
        assert!(manager.set_banned("agent-1", true).await.unwrap().banned);
        assert!(!manager.set_banned("agent-1", false).await.unwrap().banned);

        // Ban/unban does not touch the decision log
        assert_eq!(manager.log.all().await.unwrap().len(), 1);
    }
}
