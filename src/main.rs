/// Hostel Hub - student hostel booking marketplace server
use hostel_hub::{config::ServerConfig, context::AppContext, error::HubResult, jobs, server};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> HubResult<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hostel_hub=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    print_banner();

    let config = ServerConfig::from_env()?;
    let ctx = AppContext::new(config).await?;

    let scheduler = Arc::new(jobs::JobScheduler::new(ctx.clone()));
    scheduler.start();

    server::serve(ctx).await?;

    Ok(())
}

fn print_banner() {
    println!(
        r#"
    __  __           __       __   __  __      __
   / / / /___  _____/ /____  / /  / / / /_  __/ /_
  / /_/ / __ \/ ___/ __/ _ \/ /  / /_/ / / / / __ \
 / __  / /_/ (__  ) /_/  __/ /  / __  / /_/ / /_/ /
/_/ /_/\____/____/\__/\___/_/  /_/ /_/\__,_/_.___/

        Hostel Hub v{}
        "#,
        env!("CARGO_PKG_VERSION")
    );
}
