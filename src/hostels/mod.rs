/// Hostel listings
///
/// Listings belong to agents; only verified, non-banned agents' hostels are
/// publicly visible.
use crate::{
    db::{
        format_timestamp,
        models::{Hostel, User, HOSTEL_COLUMNS, USER_COLUMNS},
    },
    error::{HubError, HubResult},
};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::future::Future;
use uuid::Uuid;
use validator::Validate;

const VISIBLE_AGENT: &str = "u.role = 'agent' AND u.verified_status = 1 AND u.banned = 0";

/// New listing
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateHostelRequest {
    #[validate(length(min = 1, max = 200, message = "Hostel name is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 200, message = "Location is required"))]
    pub location: String,
    #[serde(default)]
    pub description: Option<String>,
    #[validate(range(min = 1, message = "Price must be greater than zero"))]
    pub price: i64,
    #[validate(range(min = 1, message = "A hostel needs at least one room"))]
    pub total_rooms: i64,
}

/// Partial listing update; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateHostelRequest {
    pub name: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub total_rooms: Option<i64>,
    pub available_rooms: Option<i64>,
}

/// Listing counts for one agent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentHostelStats {
    pub hostel_count: i64,
    pub available_rooms: i64,
}

/// Agent entry in the public agents listing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicAgent {
    pub id: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub hostel_count: i64,
    pub available_rooms: i64,
}

/// Run one lookup per item concurrently, keeping input order
///
/// A failed lookup yields the default value and a warning.
pub async fn gather_in_order<'a, T, S, F, Fut>(items: &'a [T], lookup: F) -> Vec<S>
where
    S: Default,
    F: Fn(&'a T) -> Fut,
    Fut: Future<Output = HubResult<S>>,
{
    join_all(items.iter().map(&lookup))
        .await
        .into_iter()
        .enumerate()
        .map(|(index, result)| {
            result.unwrap_or_else(|e| {
                tracing::warn!("Lookup {} failed, using defaults: {}", index, e);
                S::default()
            })
        })
        .collect()
}

fn require_text(value: &str, message: &str) -> HubResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(HubError::Validation(message.to_string()));
    }
    Ok(trimmed.to_string())
}

/// Hostel manager
#[derive(Clone)]
pub struct HostelManager {
    db: SqlitePool,
}

impl HostelManager {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Publicly visible hostels, newest first
    pub async fn list_public(&self, location: Option<&str>) -> HubResult<Vec<Hostel>> {
        let location = location.map(str::trim).filter(|l| !l.is_empty());

        let mut sql = format!(
            "SELECT {} FROM hostels h JOIN users u ON u.id = h.agent_id WHERE {}",
            HOSTEL_COLUMNS, VISIBLE_AGENT
        );
        if location.is_some() {
            sql.push_str(" AND h.location LIKE ? COLLATE NOCASE");
        }
        sql.push_str(" ORDER BY h.created_at DESC");

        let mut query = sqlx::query(&sql);
        if let Some(location) = location {
            query = query.bind(format!("%{}%", location));
        }

        let rows = query.fetch_all(&self.db).await?;
        rows.iter().map(Hostel::from_row).collect()
    }

    /// A hostel if it is publicly visible
    pub async fn get_public(&self, id: &str) -> HubResult<Hostel> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM hostels h JOIN users u ON u.id = h.agent_id WHERE h.id = ? AND {}",
            HOSTEL_COLUMNS, VISIBLE_AGENT
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        row.as_ref()
            .map(Hostel::from_row)
            .transpose()?
            .ok_or_else(|| HubError::NotFound("Hostel not found".to_string()))
    }

    /// A hostel regardless of visibility
    pub async fn get(&self, id: &str) -> HubResult<Option<Hostel>> {
        let row = sqlx::query(&format!("SELECT {} FROM hostels h WHERE h.id = ?", HOSTEL_COLUMNS))
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        row.as_ref().map(Hostel::from_row).transpose()
    }

    /// A hostel that must belong to `agent_id`
    pub async fn get_owned(&self, id: &str, agent_id: &str) -> HubResult<Hostel> {
        let hostel = self
            .get(id)
            .await?
            .ok_or_else(|| HubError::NotFound("Hostel not found".to_string()))?;

        if hostel.agent_id != agent_id {
            return Err(HubError::Authorization(
                "You do not own this hostel".to_string(),
            ));
        }

        Ok(hostel)
    }

    /// Hostels owned by one agent, newest first
    pub async fn list_for_agent(&self, agent_id: &str) -> HubResult<Vec<Hostel>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM hostels h WHERE h.agent_id = ? ORDER BY h.created_at DESC",
            HOSTEL_COLUMNS
        ))
        .bind(agent_id)
        .fetch_all(&self.db)
        .await?;

        rows.iter().map(Hostel::from_row).collect()
    }

    /// Create a listing for a verified, non-banned agent
    pub async fn create(
        &self,
        agent: &User,
        req: CreateHostelRequest,
        now: DateTime<Utc>,
    ) -> HubResult<Hostel> {
        if !agent.is_agent() || !agent.verified_status || agent.banned {
            return Err(HubError::Authorization(
                "Only verified agents can list hostels".to_string(),
            ));
        }

        req.validate()?;
        let name = require_text(&req.name, "Hostel name is required")?;
        let location = require_text(&req.location, "Location is required")?;

        let hostel = Hostel {
            id: Uuid::new_v4().to_string(),
            agent_id: agent.id.clone(),
            name,
            location,
            description: req.description,
            price: req.price,
            total_rooms: req.total_rooms,
            available_rooms: req.total_rooms,
            image_key: None,
            image_mime: None,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO hostels (id, agent_id, name, location, description, price, total_rooms, available_rooms, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&hostel.id)
        .bind(&hostel.agent_id)
        .bind(&hostel.name)
        .bind(&hostel.location)
        .bind(&hostel.description)
        .bind(hostel.price)
        .bind(hostel.total_rooms)
        .bind(hostel.available_rooms)
        .bind(format_timestamp(now))
        .bind(format_timestamp(now))
        .execute(&self.db)
        .await?;

        tracing::info!("Agent {} listed hostel {}", agent.id, hostel.id);
        Ok(hostel)
    }

    /// Apply a partial update to an owned listing
    ///
    /// Confirmed bookings each hold a room, so neither count may drop below
    /// them. `available_rooms` is only written when supplied or when
    /// `total_rooms` changes.
    pub async fn update(
        &self,
        id: &str,
        agent_id: &str,
        req: UpdateHostelRequest,
        now: DateTime<Utc>,
    ) -> HubResult<Hostel> {
        let mut tx = self.db.begin().await?;

        // Write first so the room counts read below cannot move under us
        let claimed = sqlx::query("UPDATE hostels SET updated_at = ? WHERE id = ? AND agent_id = ?")
            .bind(format_timestamp(now))
            .bind(id)
            .bind(agent_id)
            .execute(&mut *tx)
            .await?;
        if claimed.rows_affected() == 0 {
            drop(tx);
            self.get_owned(id, agent_id).await?;
            return Err(HubError::NotFound("Hostel not found".to_string()));
        }

        let row = sqlx::query(&format!("SELECT {} FROM hostels h WHERE h.id = ?", HOSTEL_COLUMNS))
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        let mut hostel = Hostel::from_row(&row)?;

        if let Some(name) = req.name {
            hostel.name = require_text(&name, "Hostel name is required")?;
        }
        if let Some(location) = req.location {
            hostel.location = require_text(&location, "Location is required")?;
        }
        if let Some(description) = req.description {
            hostel.description = Some(description);
        }
        if let Some(price) = req.price {
            if price <= 0 {
                return Err(HubError::Validation(
                    "Price must be greater than zero".to_string(),
                ));
            }
            hostel.price = price;
        }

        let confirmed: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM bookings WHERE hostel_id = ? AND status = 'confirmed'",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        let old_total = hostel.total_rooms;
        if let Some(total_rooms) = req.total_rooms {
            if total_rooms < 1 {
                return Err(HubError::Validation(
                    "A hostel needs at least one room".to_string(),
                ));
            }
            if total_rooms < confirmed {
                return Err(HubError::Validation(format!(
                    "Total rooms cannot be fewer than the {} confirmed bookings",
                    confirmed
                )));
            }
            hostel.total_rooms = total_rooms;
        }

        let bookable = hostel.total_rooms - confirmed;
        let available_rooms = match req.available_rooms {
            Some(available) if available < 0 || available > bookable => {
                return Err(HubError::Validation(format!(
                    "Available rooms must be between 0 and {}",
                    bookable
                )));
            }
            Some(available) => Some(available),
            None if hostel.total_rooms != old_total => Some(
                (hostel.available_rooms + hostel.total_rooms - old_total).clamp(0, bookable),
            ),
            None => None,
        };

        hostel.available_rooms = sqlx::query_scalar(
            r#"
            UPDATE hostels
            SET name = ?, location = ?, description = ?, price = ?, total_rooms = ?,
                available_rooms = COALESCE(?, available_rooms)
            WHERE id = ?
            RETURNING available_rooms
            "#,
        )
        .bind(&hostel.name)
        .bind(&hostel.location)
        .bind(&hostel.description)
        .bind(hostel.price)
        .bind(hostel.total_rooms)
        .bind(available_rooms)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        hostel.updated_at = now;
        Ok(hostel)
    }

    /// Delete an owned listing with no active bookings
    ///
    /// Finished bookings are removed with it.
    pub async fn delete(&self, id: &str, agent_id: &str) -> HubResult<Hostel> {
        let hostel = self.get_owned(id, agent_id).await?;
        let mut tx = self.db.begin().await?;

        let active: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM bookings WHERE hostel_id = ? AND status IN ('pending', 'confirmed')",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        if active > 0 {
            return Err(HubError::Conflict(
                "Hostel has active bookings and cannot be deleted".to_string(),
            ));
        }

        sqlx::query("DELETE FROM bookings WHERE hostel_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM hostels WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!("Agent {} deleted hostel {}", agent_id, id);
        Ok(hostel)
    }

    /// Point an owned listing at a stored image; returns the updated listing
    pub async fn set_image(
        &self,
        id: &str,
        agent_id: &str,
        image_key: &str,
        mime_type: &str,
        now: DateTime<Utc>,
    ) -> HubResult<Hostel> {
        let mut hostel = self.get_owned(id, agent_id).await?;

        sqlx::query("UPDATE hostels SET image_key = ?, image_mime = ?, updated_at = ? WHERE id = ?")
            .bind(image_key)
            .bind(mime_type)
            .bind(format_timestamp(now))
            .bind(id)
            .execute(&self.db)
            .await?;

        hostel.image_key = Some(image_key.to_string());
        hostel.image_mime = Some(mime_type.to_string());
        hostel.updated_at = now;
        Ok(hostel)
    }

    /// Whether any listing still references an image key
    pub async fn image_in_use(&self, image_key: &str) -> HubResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM hostels WHERE image_key = ?")
            .bind(image_key)
            .fetch_one(&self.db)
            .await?;
        Ok(count > 0)
    }

    /// Listing counts for one agent
    pub async fn agent_stats(&self, agent_id: &str) -> HubResult<AgentHostelStats> {
        let (hostel_count, available_rooms): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(SUM(available_rooms), 0) FROM hostels WHERE agent_id = ?",
        )
        .bind(agent_id)
        .fetch_one(&self.db)
        .await?;

        Ok(AgentHostelStats {
            hostel_count,
            available_rooms,
        })
    }

    /// Verified, non-banned agents with their listing counts
    pub async fn list_public_agents(&self) -> HubResult<Vec<PublicAgent>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM users u WHERE {} ORDER BY u.created_at ASC",
            USER_COLUMNS, VISIBLE_AGENT
        ))
        .fetch_all(&self.db)
        .await?;

        let agents = rows
            .iter()
            .map(User::from_row)
            .collect::<HubResult<Vec<_>>>()?;

        let stats = gather_in_order(&agents, |agent| self.agent_stats(&agent.id)).await;

        Ok(agents
            .into_iter()
            .zip(stats)
            .map(|(agent, stats)| PublicAgent {
                id: agent.id,
                full_name: agent.full_name,
                phone: agent.phone,
                hostel_count: stats.hostel_count,
                available_rooms: stats.available_rooms,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{self, models::Role};
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()
    }

    fn agent(id: &str, verified: bool, banned: bool) -> User {
        User {
            id: id.to_string(),
            email: format!("{}@example.com", id),
            full_name: format!("Agent {}", id),
            phone: None,
            password_hash: "x".to_string(),
            role: Role::Agent,
            verified_status: verified,
            banned,
            verification_attempts: 0,
            last_verification_attempt: None,
            created_at: t0(),
        }
    }

    async fn insert_user(pool: &SqlitePool, user: &User) {
        sqlx::query(
            "INSERT INTO users (id, email, full_name, password_hash, role, verified_status, banned, created_at)
             VALUES (?, ?, ?, 'x', ?, ?, ?, ?)",
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(user.role.as_str())
        .bind(user.verified_status)
        .bind(user.banned)
        .bind(format_timestamp(user.created_at))
        .execute(pool)
        .await
        .unwrap();
    }

    fn listing(name: &str, location: &str, rooms: i64) -> CreateHostelRequest {
        CreateHostelRequest {
            name: name.to_string(),
            location: location.to_string(),
            description: None,
            price: 150_000,
            total_rooms: rooms,
        }
    }

    async fn setup() -> (HostelManager, SqlitePool, User) {
        let pool = db::memory_pool().await.unwrap();
        let owner = agent("owner", true, false);
        insert_user(&pool, &owner).await;
        (HostelManager::new(pool.clone()), pool, owner)
    }

    #[tokio::test]
    async fn test_create_requires_verified_unbanned_agent() {
        let (manager, pool, owner) = setup().await;

        let unverified = agent("fresh", false, false);
        insert_user(&pool, &unverified).await;
        assert!(matches!(
            manager.create(&unverified, listing("A", "Yaba", 4), t0()).await,
            Err(HubError::Authorization(_))
        ));

        let banned = agent("bad", true, true);
        assert!(matches!(
            manager.create(&banned, listing("A", "Yaba", 4), t0()).await,
            Err(HubError::Authorization(_))
        ));

        let hostel = manager.create(&owner, listing("Palm Lodge", "Yaba", 4), t0()).await.unwrap();
        assert_eq!(hostel.available_rooms, 4);
    }

    #[tokio::test]
    async fn test_create_validates_fields() {
        let (manager, _pool, owner) = setup().await;

        assert!(matches!(
            manager.create(&owner, listing("  ", "Yaba", 4), t0()).await,
            Err(HubError::Validation(_))
        ));
        assert!(matches!(
            manager.create(&owner, listing("A", "Yaba", 0), t0()).await,
            Err(HubError::Validation(_))
        ));

        let mut free = listing("A", "Yaba", 2);
        free.price = 0;
        assert!(matches!(
            manager.create(&owner, free, t0()).await,
            Err(HubError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_public_listing_hides_banned_agents() {
        let (manager, pool, owner) = setup().await;

        manager.create(&owner, listing("Older", "Akoka", 2), t0()).await.unwrap();
        manager
            .create(&owner, listing("Newer", "Yaba Central", 2), t0() + Duration::hours(1))
            .await
            .unwrap();

        let all = manager.list_public(None).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "Newer");

        let filtered = manager.list_public(Some("yaba")).await.unwrap();
        assert_eq!(filtered.len(), 1);

        sqlx::query("UPDATE users SET banned = 1 WHERE id = 'owner'")
            .execute(&pool)
            .await
            .unwrap();
        assert!(manager.list_public(None).await.unwrap().is_empty());
        assert!(matches!(
            manager.get_public(&all[0].id).await,
            Err(HubError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_is_owner_only_and_keeps_rooms_in_range() {
        let (manager, pool, owner) = setup().await;
        let other = agent("other", true, false);
        insert_user(&pool, &other).await;

        let hostel = manager.create(&owner, listing("A", "Yaba", 3), t0()).await.unwrap();

        assert!(matches!(
            manager
                .update(&hostel.id, "other", UpdateHostelRequest::default(), t0())
                .await,
            Err(HubError::Authorization(_))
        ));

        let too_many = UpdateHostelRequest {
            available_rooms: Some(4),
            ..Default::default()
        };
        assert!(matches!(
            manager.update(&hostel.id, "owner", too_many, t0()).await,
            Err(HubError::Validation(_))
        ));

        let shrink = UpdateHostelRequest {
            total_rooms: Some(2),
            available_rooms: Some(1),
            name: Some("Renamed".to_string()),
            ..Default::default()
        };
        let updated = manager.update(&hostel.id, "owner", shrink, t0()).await.unwrap();
        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.total_rooms, 2);
        assert_eq!(updated.available_rooms, 1);
    }

    async fn confirmed_booking(pool: &SqlitePool, hostel_id: &str, booking_id: &str, student: &str) {
        sqlx::query(
            "INSERT INTO bookings (id, hostel_id, student_id, status, created_at, updated_at)
             VALUES (?, ?, ?, 'confirmed', ?, ?)",
        )
        .bind(booking_id)
        .bind(hostel_id)
        .bind(student)
        .bind(format_timestamp(t0()))
        .bind(format_timestamp(t0()))
        .execute(pool)
        .await
        .unwrap();
        sqlx::query("UPDATE hostels SET available_rooms = available_rooms - 1 WHERE id = ?")
            .bind(hostel_id)
            .execute(pool)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_update_cannot_free_rooms_held_by_confirmed_bookings() {
        let (manager, pool, owner) = setup().await;
        let student = User {
            role: Role::Student,
            ..agent("student", true, false)
        };
        insert_user(&pool, &student).await;

        let hostel = manager.create(&owner, listing("A", "Yaba", 1), t0()).await.unwrap();
        confirmed_booking(&pool, &hostel.id, "b1", "student").await;

        let reopen = UpdateHostelRequest {
            available_rooms: Some(1),
            ..Default::default()
        };
        assert!(matches!(
            manager.update(&hostel.id, "owner", reopen, t0()).await,
            Err(HubError::Validation(_))
        ));

        let shrink = UpdateHostelRequest {
            total_rooms: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            manager.update(&hostel.id, "owner", shrink, t0()).await,
            Err(HubError::Validation(_))
        ));

        // A name-only edit leaves the room count alone
        let rename = UpdateHostelRequest {
            name: Some("Renamed".to_string()),
            ..Default::default()
        };
        let renamed = manager.update(&hostel.id, "owner", rename, t0()).await.unwrap();
        assert_eq!(renamed.available_rooms, 0);

        // Growing the hostel frees exactly the new rooms
        let grow = UpdateHostelRequest {
            total_rooms: Some(3),
            ..Default::default()
        };
        let grown = manager.update(&hostel.id, "owner", grow, t0()).await.unwrap();
        assert_eq!(grown.total_rooms, 3);
        assert_eq!(grown.available_rooms, 2);

        let stored = manager.get(&hostel.id).await.unwrap().unwrap();
        assert_eq!(stored.available_rooms, 2);
    }

    #[tokio::test]
    async fn test_update_unknown_hostel_is_not_found() {
        let (manager, _pool, _owner) = setup().await;
        assert!(matches!(
            manager
                .update("missing", "owner", UpdateHostelRequest::default(), t0())
                .await,
            Err(HubError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_blocked_by_active_booking() {
        let (manager, pool, owner) = setup().await;
        let student = User {
            role: Role::Student,
            ..agent("student", true, false)
        };
        insert_user(&pool, &student).await;

        let hostel = manager.create(&owner, listing("A", "Yaba", 3), t0()).await.unwrap();
        sqlx::query(
            "INSERT INTO bookings (id, hostel_id, student_id, status, created_at, updated_at)
             VALUES ('b1', ?, 'student', 'pending', ?, ?)",
        )
        .bind(&hostel.id)
        .bind(format_timestamp(t0()))
        .bind(format_timestamp(t0()))
        .execute(&pool)
        .await
        .unwrap();

        assert!(matches!(
            manager.delete(&hostel.id, "owner").await,
            Err(HubError::Conflict(_))
        ));

        sqlx::query("UPDATE bookings SET status = 'cancelled' WHERE id = 'b1'")
            .execute(&pool)
            .await
            .unwrap();
        manager.delete(&hostel.id, "owner").await.unwrap();
        assert!(manager.get(&hostel.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_public_agents_with_stats() {
        let (manager, pool, owner) = setup().await;
        let second = User {
            created_at: t0() + Duration::hours(1),
            ..agent("second", true, false)
        };
        insert_user(&pool, &second).await;
        insert_user(&pool, &agent("hidden", false, false)).await;

        manager.create(&owner, listing("A", "Yaba", 3), t0()).await.unwrap();
        manager.create(&owner, listing("B", "Yaba", 2), t0()).await.unwrap();

        let agents = manager.list_public_agents().await.unwrap();
        assert_eq!(agents.len(), 2);
        assert_eq!(agents[0].id, "owner");
        assert_eq!(agents[0].hostel_count, 2);
        assert_eq!(agents[0].available_rooms, 5);
        assert_eq!(agents[1].id, "second");
        assert_eq!(agents[1].hostel_count, 0);
    }

    #[tokio::test]
    async fn test_gather_in_order_falls_back_on_failure() {
        let ids = vec!["a", "fail", "c"];
        let results = gather_in_order(&ids, |id| {
            let id = id.to_string();
            async move {
                if id == "fail" {
                    Err(HubError::Internal("lookup failed".to_string()))
                } else {
                    Ok(AgentHostelStats {
                        hostel_count: id.len() as i64,
                        available_rooms: 1,
                    })
                }
            }
        })
        .await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].available_rooms, 1);
        assert_eq!(results[1], AgentHostelStats::default());
        assert_eq!(results[2].available_rooms, 1);
    }
}
