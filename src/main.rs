use anyhow::Context;
use deadline_notifier::{
    db::{create_pool, run_migrations},
    deadline::{forward_reminders, start_deadline_service, NotifierRegistry},
    notification::NotificationRepository,
    routes::create_router,
    state::{AppState, Config},
    task::TaskRepository,
};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,deadline_notifier=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Arc::new(Config::from_env()?);

    tracing::info!("Connecting to database...");
    let db = create_pool(&config.database_url)
        .await
        .context("failed to connect to database")?;

    tracing::info!("Running migrations...");
    run_migrations(&db).await.context("failed to run migrations")?;

    // Notifier sinks feed the forwarder, which stores and re-broadcasts
    let (sink_tx, sink_rx) = mpsc::unbounded_channel();
    let (reminder_tx, _) = broadcast::channel(config.reminder_channel_capacity);

    let task_repository = TaskRepository::new(db.clone());
    let notification_repository = NotificationRepository::new(db.clone());

    let state = AppState {
        config: config.clone(),
        notifiers: NotifierRegistry::new(sink_tx),
        reminder_tx: reminder_tx.clone(),
        task_repository,
    };

    tokio::spawn(forward_reminders(
        sink_rx,
        notification_repository,
        reminder_tx,
    ));

    let _scheduler = start_deadline_service(state.clone())
        .await
        .context("failed to start deadline service")?;

    // Create router
    let app = create_router(state);

    let addr = config.bind_addr();
    tracing::info!("Server starting on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
