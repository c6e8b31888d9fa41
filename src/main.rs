use anyhow::Result;
use campsite_bookings::{
    AppState,
    auth::TokenAuthority,
    config::{self, Mode},
    db,
    services::capacity::CapacityTable,
};
use std::{io::ErrorKind, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // --- Parse config + run mode ---
    let (cfg, mode) = config::AppConfig::from_env_and_args()?;

    // --- Token issuance needs no database ---
    if let Mode::IssueToken { subject, role } = &mode {
        let tokens = TokenAuthority::new(cfg.require_token_secret()?)?;
        let token = tokens.issue(subject, *role, cfg.token_ttl)?;
        println!("{token}");
        return Ok(());
    }

    tracing::info!(
        "Starting campsite-bookings on {} with database {}",
        cfg.addr(),
        cfg.database_url
    );

    // --- Initialize SQLite connection ---
    let pool = Arc::new(db::connect(&cfg.database_url).await?);
    db::migrate(&pool).await?;

    // --- Handle migration mode ---
    if mode == Mode::Migrate {
        tracing::info!("Database migration complete.");
        return Ok(()); // exit after migration
    }

    // --- Initialize core services ---
    let tokens = TokenAuthority::new(cfg.require_token_secret()?)?;
    let state = AppState::new(pool, CapacityTable::default(), tokens).with_token_ttl(cfg.token_ttl);

    // --- Build router ---
    let app = campsite_bookings::app(state);

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
