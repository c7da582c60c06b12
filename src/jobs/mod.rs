use crate::{context::AppContext, metrics};
use std::{sync::Arc, time::Instant};
use tokio::time::{interval, Duration};
use tracing::{error, info};

pub mod tasks;

/// Queue expiry sweep interval
const QUEUE_EXPIRY_INTERVAL: Duration = Duration::from_secs(300);

/// Health check interval
const HEALTH_CHECK_INTERVAL: Duration = Duration::from_secs(300);

/// Job scheduler for background tasks
pub struct JobScheduler {
    context: AppContext,
}

impl JobScheduler {
    pub fn new(context: AppContext) -> Self {
        Self { context }
    }

    /// Start all background jobs
    pub fn start(self: Arc<Self>) {
        info!("Starting background job scheduler");

        tokio::spawn(Self::queue_expiry_job(Arc::clone(&self)));
        tokio::spawn(Self::health_check_job(Arc::clone(&self)));

        info!("Background jobs started");
    }

    /// Persist expired status on overdue verification queue rows
    async fn queue_expiry_job(scheduler: Arc<Self>) {
        let mut interval = interval(QUEUE_EXPIRY_INTERVAL);

        loop {
            interval.tick().await;
            let start = Instant::now();

            match tasks::expire_verification_queue(&scheduler.context).await {
                Ok(count) => {
                    if count > 0 {
                        info!("Marked {} verification queue entries expired", count);
                    }
                    metrics::record_background_job(
                        "queue_expiry",
                        "success",
                        start.elapsed().as_secs_f64(),
                    );
                }
                Err(e) => {
                    error!("Failed to sweep verification queue: {}", e);
                    metrics::record_background_job(
                        "queue_expiry",
                        "failure",
                        start.elapsed().as_secs_f64(),
                    );
                }
            }
        }
    }

    async fn health_check_job(scheduler: Arc<Self>) {
        let mut interval = interval(HEALTH_CHECK_INTERVAL);

        loop {
            interval.tick().await;
            let start = Instant::now();

            let status = match tasks::health_check(&scheduler.context).await {
                Ok(()) => "success",
                Err(e) => {
                    error!("Health check failed: {}", e);
                    "failure"
                }
            };
            metrics::record_background_job("health_check", status, start.elapsed().as_secs_f64());
        }
    }
}
