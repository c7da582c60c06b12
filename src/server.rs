/// Router assembly and the listener loop
use crate::{
    context::AppContext,
    error::{ErrorEnvelope, HubError, HubResult},
    metrics::track_http_metrics,
    rate_limit::rate_limit_middleware,
};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method, StatusCode},
    middleware,
    response::Json,
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

/// Floor for the body limit so JSON requests are never squeezed by a tiny image cap
const MIN_BODY_LIMIT: usize = 64 * 1024;

/// The dashboard and student app are served from other origins; nothing
/// relies on credentialed CORS since the admin cookie is same-site.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// Full application router with every middleware applied
pub fn build_router(ctx: AppContext) -> Router {
    let body_limit = ctx.config.service.image_upload_limit.max(MIN_BODY_LIMIT);

    crate::api::routes()
        // route_layer so MatchedPath is populated for the metric labels
        .route_layer(middleware::from_fn(track_http_metrics))
        .fallback(unknown_route)
        .with_state(ctx.clone())
        .layer(middleware::from_fn_with_state(ctx, rate_limit_middleware))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors_layer())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
}

async fn unknown_route() -> (StatusCode, Json<ErrorEnvelope>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorEnvelope {
            success: false,
            message: "Endpoint not found".to_string(),
        }),
    )
}

/// Bind and serve until the process exits
pub async fn serve(ctx: AppContext) -> HubResult<()> {
    let addr = format!("{}:{}", ctx.config.service.hostname, ctx.config.service.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| HubError::Internal(format!("Failed to bind to {}: {}", addr, e)))?;

    info!(
        "Hostel Hub listening on {} (public URL {}, admin cookie path {})",
        addr, ctx.config.service.public_url, ctx.config.admin.cookie_path
    );

    axum::serve(listener, build_router(ctx))
        .await
        .map_err(|e| HubError::Internal(format!("Server error: {}", e)))
}
