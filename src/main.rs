use catprep_api::{app, config, database::Database, AppState};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("catprep_api=info,tower_http=info")
            }),
        )
        .init();

    let config = config::config();
    tracing::info!("starting catprep API in {:?} mode", config.environment);

    let db = match Database::connect(&config.database) {
        Ok(db) => db,
        Err(e) => {
            tracing::error!("failed to initialize database pool: {}", e);
            std::process::exit(1);
        }
    };

    // A failed migration leaves the server up but degraded; the health
    // endpoint reports it
    if let Err(e) = db.migrate().await {
        tracing::warn!("migrations not applied (database unreachable?): {}", e);
    }

    let state = AppState { db: db.clone() };
    let router = app(state);

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("failed to bind {}: {}", bind_addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("listening on http://{}", bind_addr);

    if let Err(e) = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("server error: {}", e);
    }

    db.close().await;
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("shutting down");
    }
}
