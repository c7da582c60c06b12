/// Booking endpoints
use crate::{
    api::{middleware::HubJson, ApiResponse},
    auth::{AgentAuthContext, AuthContext, StudentAuthContext},
    bookings::{Booking, BookingStatus, CreateBookingRequest, StatusUpdateRequest},
    context::AppContext,
    error::HubResult,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use chrono::Utc;

pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/bookings", get(list_bookings).post(create_booking))
        .route("/api/bookings/:id/cancel", post(cancel_booking))
        .route("/api/bookings/:id/status", post(update_status))
}

async fn create_booking(
    State(ctx): State<AppContext>,
    auth: StudentAuthContext,
    HubJson(req): HubJson<CreateBookingRequest>,
) -> HubResult<(StatusCode, ApiResponse<Booking>)> {
    let booking = ctx
        .booking_manager
        .create(&auth.user.id, req, Utc::now())
        .await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(booking, "Booking requested"),
    ))
}

async fn list_bookings(
    State(ctx): State<AppContext>,
    auth: AuthContext,
) -> HubResult<ApiResponse<Vec<Booking>>> {
    let bookings = ctx
        .booking_manager
        .list_for_user(&auth.user.id, auth.user.role)
        .await?;
    Ok(ApiResponse::data(bookings))
}

async fn cancel_booking(
    State(ctx): State<AppContext>,
    auth: AuthContext,
    Path(id): Path<String>,
) -> HubResult<ApiResponse<Booking>> {
    let booking = ctx
        .booking_manager
        .transition(
            &id,
            &auth.user.id,
            auth.user.role,
            BookingStatus::Cancelled,
            Utc::now(),
        )
        .await?;

    if auth.user.is_agent() {
        notify_student(&ctx, &booking).await;
    }

    Ok(ApiResponse::with_message(booking, "Booking cancelled"))
}

async fn update_status(
    State(ctx): State<AppContext>,
    auth: AgentAuthContext,
    Path(id): Path<String>,
    HubJson(req): HubJson<StatusUpdateRequest>,
) -> HubResult<ApiResponse<Booking>> {
    let to = BookingStatus::from_str(&req.status)?;

    let booking = ctx
        .booking_manager
        .transition(&id, &auth.user.id, auth.user.role, to, Utc::now())
        .await?;

    notify_student(&ctx, &booking).await;

    Ok(ApiResponse::with_message(booking, "Booking updated"))
}

/// Best-effort email to the booking's student
async fn notify_student(ctx: &AppContext, booking: &Booking) {
    let student = match ctx.account_manager.get_user(&booking.student_id).await {
        Ok(Some(student)) => student,
        Ok(None) => return,
        Err(e) => {
            tracing::warn!("Could not load student for booking {}: {}", booking.id, e);
            return;
        }
    };

    if let Err(e) = ctx
        .mailer
        .send_booking_status(
            &student.email,
            &student.full_name,
            &booking.hostel_name,
            booking.status,
        )
        .await
    {
        tracing::warn!("Booking email for {} failed: {}", booking.id, e);
    }
}
