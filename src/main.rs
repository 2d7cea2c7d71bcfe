use stock_ledger::{
    api::{self, AppState},
    config::{database, movement_types, settings::AppConfig},
    core::ledger::LedgerService,
    errors::Result,
};
use dotenvy::dotenv;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Runtime settings
    let app_config = AppConfig::from_env()
        .inspect_err(|e| error!("Invalid configuration: {}", e))?;
    info!(
        "Negative stock policy: {:?}, list limit: {}",
        app_config.ledger.negative_stock, app_config.ledger.max_list_limit
    );

    // 4. Database and schema
    let db = database::create_connection(&app_config.database_url)
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database schema ready."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Seed movement types
    let types = movement_types::load_or_default(&app_config.config_path)?;
    database::seed_movement_types(&db, &types)
        .await
        .inspect(|seeded| info!("Seeded {} new movement types.", seeded))
        .inspect_err(|e| error!("Failed to seed movement types: {}", e))?;

    // 6. Serve the API
    let app = api::router(AppState {
        ledger: Arc::new(LedgerService::new(db, app_config.ledger)),
    });
    let listener = tokio::net::TcpListener::bind(&app_config.bind_addr).await?;
    info!("Listening on {}", app_config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
