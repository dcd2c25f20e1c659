use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use filedrop_server::{create_router, open_database, reindex, AppState, Config, Storage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "filedrop_server=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Filedrop Server...");

    // Load configuration
    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!(
        "Environment: {}, Server: {}",
        config.environment,
        config.server_address()
    );

    // Prepare storage folders
    let storage = Storage::from_config(&config)?;
    storage.ensure_dirs().await?;
    tracing::info!(
        "Storage root: {:?}, processed folder: {:?}, categorised: {}",
        storage.root(),
        storage.processed_dir(),
        config.classify_uploads
    );

    // Open the metadata index
    let db = open_database(&config.database_path).await?;

    if config.reindex_on_start {
        tracing::info!("Reconciling metadata index with storage root...");
        reindex::reconcile(&db, &storage).await?;
    }

    let addr: SocketAddr = config.server_address().parse()?;

    // Create app state and router
    let state = AppState::new(db, storage, config);
    let app = create_router(state);

    // Start server
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
