use anyhow::{Context, Result};
use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn, Level};
use tracing_subscriber::fmt::format::FmtSpan;

use kudos_ledger::{
    api::security_headers_middleware,
    config::{sanitize_for_logging, LedgerConfig},
    create_router, KudosLedger, LedgerApiState, LedgerStore, MemoryStore, PgStore,
    PrincipalResolver, ProofSkillGraph, TokenResolver,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = LedgerConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {:#}", e);
        e
    })?;

    init_logging(&config)?;

    info!("Starting kudos ledger");
    config.warn_on_risky_settings();

    let store = open_store(&config).await?;

    let kudos = KudosLedger::new(store.clone()).with_breakdown_mode(config.kudos.breakdown_mode);
    let skills = ProofSkillGraph::new(store);
    info!("Kudos breakdown mode: {:?}", kudos.breakdown_mode());

    let resolver: Arc<dyn PrincipalResolver> =
        Arc::new(TokenResolver::from_pairs(&config.auth.tokens));
    info!("Loaded {} API token(s)", config.auth.tokens.len());

    let app = Router::new()
        .nest(
            "/api/v4",
            create_router(
                LedgerApiState {
                    kudos: Arc::new(kudos),
                    skills: Arc::new(skills),
                },
                resolver,
            ),
        )
        .route("/health", get(|| async { "OK" }))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(TraceLayer::new_for_http());

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;

    info!("Kudos ledger listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Pick the backing store: PostgreSQL when enabled, otherwise in-memory
async fn open_store(config: &LedgerConfig) -> Result<Arc<dyn LedgerStore>> {
    if !config.database.postgres_enabled {
        warn!("PostgreSQL disabled - using in-memory store, all data is lost on exit");
        return Ok(Arc::new(MemoryStore::new()));
    }

    info!(
        "Connecting to PostgreSQL at {}",
        sanitize_for_logging(&config.database.postgres_url)
    );
    let store = PgStore::new(&config.database.postgres_url, config.database.max_connections)
        .await
        .map_err(|e| anyhow::anyhow!(e))?;
    store
        .init_schema()
        .await
        .map_err(|e| anyhow::anyhow!(e))?;

    Ok(Arc::new(store))
}

fn init_logging(config: &LedgerConfig) -> Result<()> {
    let log_level = match config.logging.level.to_lowercase().as_str() {
        "error" => Level::ERROR,
        "warn" => Level::WARN,
        "info" => Level::INFO,
        "debug" => Level::DEBUG,
        "trace" => Level::TRACE,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_span_events(if config.logging.log_requests {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        })
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set logging subscriber: {}", e))?;

    Ok(())
}
