use quizhub::reminders::{ReminderConfig, start_reminders};
use quizhub::{AppState, config::Config, create_router};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Inizializza il logging, sovrascrivibile con RUST_LOG
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quizhub=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Carica la configurazione
    let config = Config::from_env()?;
    config.print_info();

    // Pool di connessioni, il file sqlite viene creato se manca
    let connect_options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(connect_options)
        .await?;
    info!("Connected to database");

    sqlx::migrate!().run(&pool).await?;
    info!("Migrations applied");

    let state = Arc::new(AppState::new(pool, config.jwt_secret.clone()));

    start_reminders(
        state.clone(),
        ReminderConfig {
            interval_secs: config.reminder_interval_secs,
        },
    );

    let app = create_router(state).layer(CorsLayer::permissive());

    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
