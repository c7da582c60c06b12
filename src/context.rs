/// Application context and dependency injection
use crate::{
    account::AccountManager,
    admin::{AdminGate, ModerationManager},
    blob_store::ImageStore,
    bookings::BookingManager,
    config::ServerConfig,
    db,
    error::{HubError, HubResult},
    hostels::HostelManager,
    mailer::Mailer,
    rate_limit::RateLimiter,
};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Application context holding all shared services
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub db: SqlitePool,
    pub account_manager: Arc<AccountManager>,
    // Admin & moderation
    pub admin_gate: Arc<AdminGate>,
    pub moderation_manager: Arc<ModerationManager>,
    // Marketplace
    pub hostel_manager: Arc<HostelManager>,
    pub booking_manager: Arc<BookingManager>,
    pub image_store: Arc<ImageStore>,
    pub rate_limiter: Arc<RateLimiter>,
    pub mailer: Arc<Mailer>,
}

impl AppContext {
    /// Create a new application context from configuration
    pub async fn new(config: ServerConfig) -> HubResult<Self> {
        config.validate()?;
        Self::ensure_directories(&config).await?;

        let pool = db::create_pool(&config.storage.database, db::DatabaseOptions::default()).await?;
        db::run_migrations(&pool).await?;
        db::test_connection(&pool).await?;

        let mailer = Mailer::new(config.email.clone())?;
        Ok(Self::assemble(config, pool, mailer))
    }

    /// Build a context around an existing, migrated pool
    ///
    /// Email stays disabled; used by tests and tooling.
    pub fn from_pool(config: ServerConfig, pool: SqlitePool) -> Self {
        Self::assemble(config, pool, Mailer::disabled())
    }

    fn assemble(config: ServerConfig, pool: SqlitePool, mailer: Mailer) -> Self {
        let account_manager = Arc::new(AccountManager::new(
            pool.clone(),
            config.authentication.clone(),
        ));
        let admin_gate = Arc::new(AdminGate::new(
            config.admin.clone(),
            &config.authentication.jwt_secret,
        ));
        let moderation_manager = Arc::new(ModerationManager::new(pool.clone()));

        let hostels = HostelManager::new(pool.clone());
        let booking_manager = Arc::new(BookingManager::new(pool.clone(), hostels.clone()));

        let image_store = Arc::new(ImageStore::on_disk(
            config.storage.image_directory.clone(),
            config.service.image_upload_limit,
        ));
        let rate_limiter = Arc::new(RateLimiter::new(&config.rate_limit));

        Self {
            config: Arc::new(config),
            db: pool,
            account_manager,
            admin_gate,
            moderation_manager,
            hostel_manager: Arc::new(hostels),
            booking_manager,
            image_store,
            rate_limiter,
            mailer: Arc::new(mailer),
        }
    }

    /// Ensure required directories exist
    async fn ensure_directories(config: &ServerConfig) -> HubResult<()> {
        for dir in [
            &config.storage.data_directory,
            &config.storage.image_directory,
        ] {
            tokio::fs::create_dir_all(dir).await.map_err(|e| {
                HubError::Internal(format!("Failed to create directory {:?}: {}", dir, e))
            })?;
        }

        Ok(())
    }
}
