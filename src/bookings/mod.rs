/// Booking state machine
///
/// ```text
/// pending ──► confirmed ──► completed
///    │            │
///    ├──► rejected └──► cancelled
///    └──► cancelled
/// ```
///
/// A confirmed booking holds one room of its hostel until it is cancelled
/// or completed.
use crate::{
    db::{format_timestamp, models::Role, parse_timestamp},
    error::{HubError, HubResult},
    hostels::HostelManager,
    metrics,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row, SqliteConnection, SqlitePool};
use uuid::Uuid;

const BOOKING_COLUMNS: &str = "b.id, b.hostel_id, b.student_id, b.status, b.message, \
     b.created_at, b.updated_at, h.name AS hostel_name, h.agent_id";

/// Booking status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Rejected,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Rejected => "rejected",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }

    pub fn from_str(s: &str) -> HubResult<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "rejected" => Ok(BookingStatus::Rejected),
            "cancelled" => Ok(BookingStatus::Cancelled),
            "completed" => Ok(BookingStatus::Completed),
            _ => Err(HubError::Validation(format!("Invalid booking status: {}", s))),
        }
    }

    /// Pending or confirmed
    pub fn is_active(&self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }
}

/// Who is asking for a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingActor {
    /// The student who made the booking
    Student,
    /// The agent who owns the booked hostel
    Agent,
}

impl BookingActor {
    fn for_role(role: Role) -> Self {
        match role {
            Role::Student => BookingActor::Student,
            Role::Agent => BookingActor::Agent,
        }
    }
}

/// Legal moves and the party allowed to make each
pub fn can_transition(from: BookingStatus, to: BookingStatus, actor: BookingActor) -> bool {
    use BookingActor::*;
    use BookingStatus::*;

    matches!(
        (from, to, actor),
        (Pending, Confirmed, Agent)
            | (Pending, Rejected, Agent)
            | (Pending, Cancelled, Student)
            | (Confirmed, Cancelled, Student)
            | (Confirmed, Cancelled, Agent)
            | (Confirmed, Completed, Agent)
    )
}

/// Booking row joined with its hostel
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub hostel_id: String,
    pub hostel_name: String,
    pub agent_id: String,
    pub student_id: String,
    pub status: BookingStatus,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    fn from_row(row: &SqliteRow) -> HubResult<Self> {
        let status: String = row.try_get("status")?;
        let created_at: String = row.try_get("created_at")?;
        let updated_at: String = row.try_get("updated_at")?;

        Ok(Booking {
            id: row.try_get("id")?,
            hostel_id: row.try_get("hostel_id")?,
            hostel_name: row.try_get("hostel_name")?,
            agent_id: row.try_get("agent_id")?,
            student_id: row.try_get("student_id")?,
            status: BookingStatus::from_str(&status)?,
            message: row.try_get("message")?,
            created_at: parse_timestamp(&created_at)?,
            updated_at: parse_timestamp(&updated_at)?,
        })
    }
}

/// Booking request from a student
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub hostel_id: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Agent status change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}

/// Booking manager
#[derive(Clone)]
pub struct BookingManager {
    db: SqlitePool,
    hostels: HostelManager,
}

impl BookingManager {
    pub fn new(db: SqlitePool, hostels: HostelManager) -> Self {
        Self { db, hostels }
    }

    async fn fetch(conn: &mut SqliteConnection, id: &str) -> HubResult<Option<Booking>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM bookings b JOIN hostels h ON h.id = b.hostel_id WHERE b.id = ?",
            BOOKING_COLUMNS
        ))
        .bind(id)
        .fetch_optional(conn)
        .await?;

        row.as_ref().map(Booking::from_row).transpose()
    }

    /// Request a room at a publicly visible hostel
    pub async fn create(
        &self,
        student_id: &str,
        req: CreateBookingRequest,
        now: DateTime<Utc>,
    ) -> HubResult<Booking> {
        let hostel = self.hostels.get_public(&req.hostel_id).await?;

        if hostel.available_rooms <= 0 {
            return Err(HubError::Validation(
                "No rooms available at this hostel".to_string(),
            ));
        }

        let id = Uuid::new_v4().to_string();
        let message = req
            .message
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty());

        // The NOT EXISTS guard keeps the one-active-booking rule atomic
        let result = sqlx::query(
            r#"
            INSERT INTO bookings (id, hostel_id, student_id, status, message, created_at, updated_at)
            SELECT ?, ?, ?, 'pending', ?, ?, ?
            WHERE NOT EXISTS (
                SELECT 1 FROM bookings
                WHERE hostel_id = ? AND student_id = ? AND status IN ('pending', 'confirmed')
            )
            "#,
        )
        .bind(&id)
        .bind(&hostel.id)
        .bind(student_id)
        .bind(&message)
        .bind(format_timestamp(now))
        .bind(format_timestamp(now))
        .bind(&hostel.id)
        .bind(student_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(HubError::Conflict(
                "You already have an active booking for this hostel".to_string(),
            ));
        }

        metrics::record_booking_transition(BookingStatus::Pending.as_str());
        tracing::info!("Student {} requested booking {} at hostel {}", student_id, id, hostel.id);

        Ok(Booking {
            id,
            hostel_id: hostel.id,
            hostel_name: hostel.name,
            agent_id: hostel.agent_id,
            student_id: student_id.to_string(),
            status: BookingStatus::Pending,
            message,
            created_at: now,
            updated_at: now,
        })
    }

    /// Bookings a user is party to, newest first
    pub async fn list_for_user(&self, user_id: &str, role: Role) -> HubResult<Vec<Booking>> {
        let filter = match role {
            Role::Student => "b.student_id = ?",
            Role::Agent => "h.agent_id = ?",
        };

        let rows = sqlx::query(&format!(
            "SELECT {} FROM bookings b JOIN hostels h ON h.id = b.hostel_id WHERE {} \
             ORDER BY b.created_at DESC, b.id DESC",
            BOOKING_COLUMNS, filter
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        rows.iter().map(Booking::from_row).collect()
    }

    /// Every booking, newest first
    pub async fn list_all(&self) -> HubResult<Vec<Booking>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM bookings b JOIN hostels h ON h.id = b.hostel_id \
             ORDER BY b.created_at DESC, b.id DESC",
            BOOKING_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        rows.iter().map(Booking::from_row).collect()
    }

    /// Move a booking to `to` on behalf of a user
    ///
    /// Status change and room accounting commit together.
    pub async fn transition(
        &self,
        booking_id: &str,
        user_id: &str,
        role: Role,
        to: BookingStatus,
        now: DateTime<Utc>,
    ) -> HubResult<Booking> {
        let actor = BookingActor::for_role(role);
        let mut tx = self.db.begin().await?;

        let mut booking = Self::fetch(&mut tx, booking_id)
            .await?
            .ok_or_else(|| HubError::NotFound("Booking not found".to_string()))?;

        let is_party = match actor {
            BookingActor::Student => booking.student_id == user_id,
            BookingActor::Agent => booking.agent_id == user_id,
        };
        if !is_party {
            return Err(HubError::NotFound("Booking not found".to_string()));
        }

        let from = booking.status;
        if !can_transition(from, to, actor) {
            return Err(HubError::Validation(format!(
                "Cannot change booking from {} to {}",
                from.as_str(),
                to.as_str()
            )));
        }

        if to == BookingStatus::Confirmed {
            let claimed = sqlx::query(
                "UPDATE hostels SET available_rooms = available_rooms - 1 WHERE id = ? AND available_rooms > 0",
            )
            .bind(&booking.hostel_id)
            .execute(&mut *tx)
            .await?;

            if claimed.rows_affected() == 0 {
                return Err(HubError::Validation(
                    "No rooms available at this hostel".to_string(),
                ));
            }
        } else if from == BookingStatus::Confirmed {
            sqlx::query(
                "UPDATE hostels SET available_rooms = available_rooms + 1 WHERE id = ? AND available_rooms < total_rooms",
            )
            .bind(&booking.hostel_id)
            .execute(&mut *tx)
            .await?;
        }

        // Guard on the status we read so a concurrent change loses cleanly
        let updated = sqlx::query(
            "UPDATE bookings SET status = ?, updated_at = ? WHERE id = ? AND status = ?",
        )
        .bind(to.as_str())
        .bind(format_timestamp(now))
        .bind(booking_id)
        .bind(from.as_str())
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(HubError::Conflict(
                "Booking changed concurrently, please retry".to_string(),
            ));
        }

        tx.commit().await?;

        metrics::record_booking_transition(to.as_str());
        tracing::info!(
            "Booking {} moved {} -> {} by {}",
            booking_id,
            from.as_str(),
            to.as_str(),
            user_id
        );

        booking.status = to;
        booking.updated_at = now;
        Ok(booking)
    }
}
