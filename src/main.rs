//! OpenSASE Supermarket - Self-hosted supermarket storefront

use anyhow::Result;
use opensase_supermarket::{api, config::Config, notify::{LogNotifier, NatsNotifier, Notifier}, state::AppState, store};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();

    let config = Config::from_env()?;
    let db = store::connect(&config).await?;

    let notifier: Arc<dyn Notifier> = match &config.nats_url {
        Some(url) => match NatsNotifier::connect(url, config.nats_subject.clone()).await {
            Ok(n) => { tracing::info!(%url, subject = %config.nats_subject, "publishing notifications to NATS"); Arc::new(n) }
            Err(e) => { tracing::warn!(error = %e, "NATS unavailable, notifications will only be logged"); Arc::new(LogNotifier) }
        },
        None => Arc::new(LogNotifier),
    };

    let state = AppState::new(db, notifier);
    if config.seed_demo_catalog {
        state.catalog.seed_demo_catalog().await?;
    }

    let auth = state.auth.clone();
    tokio::spawn(async move {
        let mut every_hour = tokio::time::interval(Duration::from_secs(3600));
        loop {
            every_hour.tick().await;
            auth.sweep_sessions().await;
        }
    });

    let addr = config.socket_addr();
    tracing::info!("🚀 OpenSASE Supermarket listening on {}", addr);
    axum::serve(tokio::net::TcpListener::bind(addr).await?, api::router(state)).await?;
    Ok(())
}
