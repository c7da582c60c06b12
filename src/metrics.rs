/// Prometheus series for Hostel Hub
///
/// Everything registers in the default registry under the `hostel_hub_`
/// prefix and is exposed on `/metrics`.
use crate::error::{HubError, HubResult};
use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, register_int_gauge, Encoder, HistogramVec,
    IntCounterVec, IntGauge, TextEncoder,
};
use std::time::Instant;

lazy_static! {
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "hostel_hub_http_requests_total",
        "Requests served, by method, route template and status code",
        &["method", "route", "status"]
    )
    .unwrap();

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "hostel_hub_http_request_duration_seconds",
        "Time from routing to response, by method and route template",
        &["method", "route"],
        vec![0.002, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 3.0]
    )
    .unwrap();

    /// Requests currently inside a handler
    pub static ref HTTP_REQUESTS_IN_FLIGHT: IntGauge = register_int_gauge!(
        "hostel_hub_http_requests_in_flight",
        "Requests currently being handled"
    )
    .unwrap();

    /// Scheduler runs by job and result
    pub static ref JOB_RUNS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "hostel_hub_job_runs_total",
        "Scheduled job runs, by job and result",
        &["job", "result"]
    )
    .unwrap();

    pub static ref JOB_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "hostel_hub_job_duration_seconds",
        "Scheduled job run time",
        &["job"],
        vec![0.01, 0.1, 1.0, 10.0, 60.0]
    )
    .unwrap();

    /// approve / reject / ban / unban
    pub static ref MODERATION_ACTIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "hostel_hub_moderation_actions_total",
        "Admin actions taken on agent accounts",
        &["action"]
    )
    .unwrap();

    pub static ref VERIFICATION_RESUBMISSIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "hostel_hub_verification_resubmissions_total",
        "Agent verification resubmissions, by outcome",
        &["outcome"]
    )
    .unwrap();

    /// Bookings entering each status, creation counted as `pending`
    pub static ref BOOKING_TRANSITIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "hostel_hub_booking_transitions_total",
        "Bookings entering a status",
        &["status"]
    )
    .unwrap();

    pub static ref ERROR_RESPONSES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "hostel_hub_error_responses_total",
        "Error responses, by error kind",
        &["kind"]
    )
    .unwrap();
}

/// Text exposition of the default registry
pub fn render_metrics() -> HubResult<String> {
    let mut out = Vec::new();
    TextEncoder::new()
        .encode(&prometheus::gather(), &mut out)
        .map_err(|e| HubError::Internal(format!("Failed to encode metrics: {}", e)))?;
    String::from_utf8(out)
        .map_err(|e| HubError::Internal(format!("Metrics output is not UTF-8: {}", e)))
}

pub fn record_http_request(method: &str, route: &str, status: u16, seconds: f64) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, route, &status.to_string()])
        .inc();
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, route])
        .observe(seconds);
}

pub fn record_background_job(job: &str, result: &str, seconds: f64) {
    JOB_RUNS_TOTAL.with_label_values(&[job, result]).inc();
    JOB_DURATION_SECONDS.with_label_values(&[job]).observe(seconds);
}

pub fn record_moderation_action(action: &str) {
    MODERATION_ACTIONS_TOTAL.with_label_values(&[action]).inc();
}

/// Record a resubmission outcome
pub fn record_resubmission(outcome: &str) {
    VERIFICATION_RESUBMISSIONS_TOTAL
        .with_label_values(&[outcome])
        .inc();
}

/// Record a booking entering a status
pub fn record_booking_transition(status: &str) {
    BOOKING_TRANSITIONS_TOTAL.with_label_values(&[status]).inc();
}

pub fn record_error(kind: &str) {
    ERROR_RESPONSES_TOTAL.with_label_values(&[kind]).inc();
}

/// Middleware timing every request against its matched route
pub async fn track_http_metrics(request: Request, next: Next) -> Response {
    // Templates, not raw paths, so ids never become label values
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned());
    let method = request.method().as_str().to_owned();

    HTTP_REQUESTS_IN_FLIGHT.inc();
    let start = Instant::now();
    let response = next.run(request).await;
    HTTP_REQUESTS_IN_FLIGHT.dec();

    record_http_request(
        &method,
        &route,
        response.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_and_job_series_render() {
        record_http_request("GET", "/api/hostels/:id", 200, 0.05);
        record_background_job("queue_expiry", "success", 0.2);

        let text = render_metrics().unwrap();
        assert!(text.contains("hostel_hub_http_requests_total"));
        assert!(text.contains(r#"route="/api/hostels/:id""#));
        assert!(text.contains("hostel_hub_job_runs_total"));
    }

    #[test]
    fn test_domain_counters_render() {
        record_moderation_action("approve");
        record_resubmission("accepted");
        record_booking_transition("confirmed");
        record_error("conflict");

        let text = render_metrics().unwrap();
        assert!(text.contains("hostel_hub_moderation_actions_total"));
        assert!(text.contains("hostel_hub_verification_resubmissions_total"));
        assert!(text.contains(r#"status="confirmed""#));
        assert!(text.contains("hostel_hub_error_responses_total"));
    }
}
