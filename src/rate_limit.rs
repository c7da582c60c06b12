/// Rate Limiting System
use crate::{
    config::RateLimitSettings,
    context::AppContext,
    error::{HubError, HubResult},
};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    clock::{Clock, DefaultClock},
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter as GovernorLimiter,
};
use std::{num::NonZeroU32, sync::Arc};

type DirectLimiter = GovernorLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Paths that accept credentials and get the stricter quota
const CREDENTIAL_PATHS: &[&str] = &["/api/auth/login", "/api/auth/register", "/api/admin/login"];

fn non_zero(value: u32, fallback: NonZeroU32) -> NonZeroU32 {
    NonZeroU32::new(value).unwrap_or(fallback)
}

/// Rate limiter manager
#[derive(Clone)]
pub struct RateLimiter {
    enabled: bool,
    global: Arc<DirectLimiter>,
    credentials: Arc<DirectLimiter>,
}

impl RateLimiter {
    pub fn new(settings: &RateLimitSettings) -> Self {
        let global_quota = Quota::per_second(non_zero(
            settings.global_requests_per_second,
            NonZeroU32::MIN.saturating_add(99),
        ));
        let credential_quota = Quota::per_minute(non_zero(
            settings.auth_requests_per_minute,
            NonZeroU32::MIN.saturating_add(19),
        ));

        Self {
            enabled: settings.enabled,
            global: Arc::new(GovernorLimiter::direct(global_quota)),
            credentials: Arc::new(GovernorLimiter::direct(credential_quota)),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Check the quota for every request
    pub fn check_global(&self) -> HubResult<()> {
        Self::check(&self.global)
    }

    /// Check the quota for login and registration
    pub fn check_credentials(&self) -> HubResult<()> {
        Self::check(&self.credentials)
    }

    fn check(limiter: &DirectLimiter) -> HubResult<()> {
        limiter
            .check()
            .map_err(|not_until| HubError::RateLimitExceeded {
                retry_after: not_until.wait_time_from(DefaultClock::default().now()),
            })
    }
}

/// Rate limiting middleware
pub async fn rate_limit_middleware(
    State(ctx): State<AppContext>,
    request: Request,
    next: Next,
) -> Response {
    let limiter = &ctx.rate_limiter;
    if !limiter.is_enabled() {
        return next.run(request).await;
    }

    let is_credential_path = CREDENTIAL_PATHS.contains(&request.uri().path());

    let result = limiter.check_global().and_then(|_| {
        if is_credential_path {
            limiter.check_credentials()
        } else {
            Ok(())
        }
    });

    match result {
        Ok(()) => next.run(request).await,
        Err(e) => {
            tracing::warn!("Rate limit exceeded for {}", request.uri().path());
            e.into_response()
        }
    }
}
