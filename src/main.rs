use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use hr_engine::api::{AppState, create_router};
use hr_engine::clock::SystemClock;
use hr_engine::config::ConfigLoader;
use hr_engine::notify::{
    LogNotifier, NotificationQueue, NotificationWorker, Notifier, WebhookNotifier,
};
use hr_engine::store::MemoryStore;

const DEFAULT_CONFIG_DIR: &str = "./config/default";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hr_engine=info".into()),
        )
        .init();

    // First argument wins over HR_ENGINE_CONFIG
    let config_dir = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("HR_ENGINE_CONFIG").ok())
        .unwrap_or_else(|| DEFAULT_CONFIG_DIR.to_string());
    let config = ConfigLoader::load(&config_dir)?;
    info!(config_dir = %config_dir, "Configuration loaded");

    let settings = config.notification().clone();
    let notifier: Arc<dyn Notifier> = match settings.webhook_url.as_deref() {
        Some(url) => {
            let webhook = WebhookNotifier::new(url, Duration::from_secs(settings.timeout_secs))?;
            info!(url = %webhook.url(), "Leave decisions will be posted to webhook");
            Arc::new(webhook)
        }
        None => {
            warn!("No webhook configured, leave decisions will only be logged");
            Arc::new(LogNotifier)
        }
    };
    let (queue, rx) = NotificationQueue::new(settings.queue_capacity);
    tokio::spawn(NotificationWorker::new(notifier).run(rx));

    let bind_address = config.bind_address().to_string();
    let state = AppState::new(
        config,
        Arc::new(MemoryStore::new()),
        Arc::new(SystemClock),
        queue,
    );

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!(address = %bind_address, "HR engine listening");
    axum::serve(listener, create_router(state)).await?;

    Ok(())
}
