/// Health and metrics endpoints
///
/// - `/health`: liveness, always 200 while the process can answer
/// - `/health/ready`: readiness with per-component checks, 503 when unhealthy
/// - `/metrics`: Prometheus text exposition
use crate::{context::AppContext, error::HubResult, metrics};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Readiness response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    /// "healthy", "degraded" or "unhealthy"
    pub status: String,
    pub version: String,
    pub checks: Vec<ComponentHealth>,
}

/// Health of a single component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub name: String,
    pub status: String,
    pub response_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ComponentHealth {
    fn from_result(name: &str, start: Instant, result: HubResult<()>) -> Self {
        let (status, error) = match result {
            Ok(()) => ("healthy", None),
            Err(e) => {
                // Detail stays in the log; readiness is served unauthenticated
                tracing::warn!("Health check {} failed: {}", name, e);
                ("unhealthy", Some("unavailable".to_string()))
            }
        };

        Self {
            name: name.to_string(),
            status: status.to_string(),
            response_time_ms: start.elapsed().as_millis() as u64,
            error,
        }
    }
}

pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/health", get(liveness))
        .route("/health/ready", get(readiness))
        .route("/metrics", get(metrics_endpoint))
}

async fn liveness(State(ctx): State<AppContext>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": ctx.config.service.version,
    }))
}

async fn readiness(State(ctx): State<AppContext>) -> (StatusCode, Json<HealthStatus>) {
    let mut checks = Vec::new();

    let start = Instant::now();
    checks.push(ComponentHealth::from_result(
        "database",
        start,
        check_database(&ctx).await,
    ));

    let start = Instant::now();
    checks.push(ComponentHealth::from_result(
        "image_storage",
        start,
        check_image_storage(&ctx).await,
    ));

    let status = determine_overall_status(&checks);
    let code = if status == "unhealthy" {
        tracing::warn!("Readiness check failed: {:?}", checks);
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    (
        code,
        Json(HealthStatus {
            status,
            version: ctx.config.service.version.clone(),
            checks,
        }),
    )
}

async fn metrics_endpoint() -> HubResult<Response> {
    let body = metrics::render_metrics()?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
        .into_response())
}

/// Check database connectivity
pub async fn check_database(ctx: &AppContext) -> HubResult<()> {
    sqlx::query("SELECT 1").fetch_one(&ctx.db).await?;
    Ok(())
}

/// Check the image directory is reachable
pub async fn check_image_storage(ctx: &AppContext) -> HubResult<()> {
    tokio::fs::create_dir_all(&ctx.config.storage.image_directory).await?;
    Ok(())
}

/// Worst status across checks
fn determine_overall_status(checks: &[ComponentHealth]) -> String {
    if checks.iter().any(|c| c.status == "unhealthy") {
        "unhealthy".to_string()
    } else if checks.iter().any(|c| c.status == "degraded") {
        "degraded".to_string()
    } else {
        "healthy".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HubError;

    fn check(status: &str) -> ComponentHealth {
        ComponentHealth {
            name: "component".to_string(),
            status: status.to_string(),
            response_time_ms: 1,
            error: None,
        }
    }

    #[test]
    fn test_failed_check_hides_error_detail() {
        let failed = ComponentHealth::from_result(
            "database",
            Instant::now(),
            Err(HubError::Internal(
                "unable to open database file: /var/lib/hub/hub.db".to_string(),
            )),
        );
        assert_eq!(failed.status, "unhealthy");
        assert_eq!(failed.error.as_deref(), Some("unavailable"));

        let body = serde_json::to_string(&failed).unwrap();
        assert!(!body.contains("/var/lib/hub"));

        let ok = ComponentHealth::from_result("database", Instant::now(), Ok(()));
        assert_eq!(ok.status, "healthy");
        assert!(ok.error.is_none());
    }

    #[test]
    fn test_overall_status() {
        assert_eq!(
            determine_overall_status(&[check("healthy"), check("healthy")]),
            "healthy"
        );
        assert_eq!(
            determine_overall_status(&[check("healthy"), check("degraded")]),
            "degraded"
        );
        assert_eq!(
            determine_overall_status(&[check("degraded"), check("unhealthy")]),
            "unhealthy"
        );
    }
}
