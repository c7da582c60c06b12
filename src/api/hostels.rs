/// Hostel listing endpoints
use crate::{
    api::{
        middleware::{content_type, HubJson},
        ApiResponse,
    },
    auth::AgentAuthContext,
    context::AppContext,
    db::models::Hostel,
    error::{HubError, HubResult},
    hostels::{CreateHostelRequest, UpdateHostelRequest},
};
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, put},
    Router,
};
use chrono::Utc;
use serde::Deserialize;

pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/hostels", get(list_hostels).post(create_hostel))
        .route(
            "/api/hostels/:id",
            get(get_hostel).put(update_hostel).delete(delete_hostel),
        )
        .route("/api/hostels/:id/image", put(upload_image).get(get_image))
        .route("/api/agent/hostels", get(my_hostels))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    location: Option<String>,
}

async fn list_hostels(
    State(ctx): State<AppContext>,
    Query(query): Query<ListQuery>,
) -> HubResult<ApiResponse<Vec<Hostel>>> {
    let hostels = ctx
        .hostel_manager
        .list_public(query.location.as_deref())
        .await?;
    Ok(ApiResponse::data(hostels))
}

async fn get_hostel(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> HubResult<ApiResponse<Hostel>> {
    Ok(ApiResponse::data(ctx.hostel_manager.get_public(&id).await?))
}

/// The calling agent's own listings, including hidden ones
async fn my_hostels(
    State(ctx): State<AppContext>,
    auth: AgentAuthContext,
) -> HubResult<ApiResponse<Vec<Hostel>>> {
    let hostels = ctx.hostel_manager.list_for_agent(&auth.user.id).await?;
    Ok(ApiResponse::data(hostels))
}

async fn create_hostel(
    State(ctx): State<AppContext>,
    auth: AgentAuthContext,
    HubJson(req): HubJson<CreateHostelRequest>,
) -> HubResult<(StatusCode, ApiResponse<Hostel>)> {
    let hostel = ctx
        .hostel_manager
        .create(&auth.user, req, Utc::now())
        .await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(hostel, "Hostel created"),
    ))
}

async fn update_hostel(
    State(ctx): State<AppContext>,
    auth: AgentAuthContext,
    Path(id): Path<String>,
    HubJson(req): HubJson<UpdateHostelRequest>,
) -> HubResult<ApiResponse<Hostel>> {
    let hostel = ctx
        .hostel_manager
        .update(&id, &auth.user.id, req, Utc::now())
        .await?;
    Ok(ApiResponse::with_message(hostel, "Hostel updated"))
}

async fn delete_hostel(
    State(ctx): State<AppContext>,
    auth: AgentAuthContext,
    Path(id): Path<String>,
) -> HubResult<ApiResponse<()>> {
    let hostel = ctx.hostel_manager.delete(&id, &auth.user.id).await?;

    if let Some(key) = hostel.image_key {
        release_image(&ctx, &key).await;
    }

    Ok(ApiResponse::message("Hostel deleted"))
}

/// Replace a listing's image with the raw request body
async fn upload_image(
    State(ctx): State<AppContext>,
    auth: AgentAuthContext,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> HubResult<ApiResponse<Hostel>> {
    // Ownership first so strangers cannot fill the store
    let previous = ctx.hostel_manager.get_owned(&id, &auth.user.id).await?;

    let mime_type = content_type(&headers)
        .ok_or_else(|| HubError::Validation("Content-Type header is required".to_string()))?;
    let stored = ctx.image_store.store(body.to_vec(), &mime_type).await?;

    let hostel = ctx
        .hostel_manager
        .set_image(&id, &auth.user.id, &stored.key, &stored.mime_type, Utc::now())
        .await?;

    if let Some(old_key) = previous.image_key.filter(|k| *k != stored.key) {
        release_image(&ctx, &old_key).await;
    }

    Ok(ApiResponse::with_message(hostel, "Image uploaded"))
}

async fn get_image(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> HubResult<Response> {
    let hostel = ctx.hostel_manager.get_public(&id).await?;
    let key = hostel
        .image_key
        .ok_or_else(|| HubError::NotFound("Hostel has no image".to_string()))?;

    let data = ctx
        .image_store
        .fetch(&key)
        .await?
        .ok_or_else(|| HubError::NotFound("Image not found".to_string()))?;

    let mime_type = hostel
        .image_mime
        .unwrap_or_else(|| "application/octet-stream".to_string());

    Ok((
        [
            (header::CONTENT_TYPE, mime_type),
            (header::CACHE_CONTROL, "public, max-age=31536000, immutable".to_string()),
        ],
        data,
    )
        .into_response())
}

/// Drop stored bytes once no listing points at them; failures only warn
async fn release_image(ctx: &AppContext, key: &str) {
    match ctx.hostel_manager.image_in_use(key).await {
        Ok(true) => {}
        Ok(false) => {
            if let Err(e) = ctx.image_store.remove(key).await {
                tracing::warn!("Failed to remove image {}: {}", key, e);
            }
        }
        Err(e) => tracing::warn!("Could not check image {} usage: {}", key, e),
    }
}
