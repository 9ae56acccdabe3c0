use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use vibe_api::{
    api::{create_router, AppState},
    config::Config,
    db::{create_pool, create_redis_client, Cache},
    services::{
        generator::GroqGenerator,
        interpreter::GroqInterpreter,
        llm::GroqClient,
        providers::WatchmodeProvider,
        ranking::RankingEngine,
        CatalogStore, InMemoryCatalogStore, PgCatalogStore, Recommender,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("vibe_api=debug,tower_http=debug")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let weights = Config::scoring_weights()?;
    tracing::info!(?weights, max_results = config.max_results, "Configuration loaded");

    let store: Arc<dyn CatalogStore> = match &config.database_url {
        Some(database_url) => {
            let pool = create_pool(database_url)
                .await
                .context("Failed to connect to Postgres")?;
            tracing::info!("Using Postgres catalog store");
            Arc::new(PgCatalogStore::new(pool))
        }
        None => {
            tracing::info!(seed_path = %config.seed_path, "Using in-memory catalog store");
            Arc::new(InMemoryCatalogStore::from_json_file(&config.seed_path).await?)
        }
    };

    let (cache, cache_writer) = match &config.redis_url {
        Some(redis_url) => {
            let (cache, handle) = Cache::new(create_redis_client(redis_url)?).await;
            tracing::info!("Redis cache enabled");
            (Some(cache), Some(handle))
        }
        None => (None, None),
    };

    let mut recommender = Recommender::new(store)
        .with_engine(RankingEngine::new(weights, config.max_results))
        .with_display_count(config.display_count)
        .with_enrichment(config.enrichment_settings());

    match &config.groq_api_key {
        Some(api_key) => {
            let client = GroqClient::new(
                api_key.clone(),
                config.groq_api_url.clone(),
                config.groq_model.clone(),
            )?;
            recommender = recommender
                .with_interpreter(Arc::new(GroqInterpreter::new(client.clone())))
                .with_generator(Arc::new(GroqGenerator::new(client)));
            tracing::info!(model = %config.groq_model, "Groq mood interpretation enabled");
        }
        None => tracing::warn!("GROQ_API_KEY not set, using raw query keywords"),
    }

    match &config.watchmode_api_key {
        Some(api_key) => {
            recommender = recommender.with_availability(Arc::new(WatchmodeProvider::new(
                cache,
                api_key.clone(),
                config.watchmode_api_url.clone(),
            )));
            tracing::info!("Watchmode availability enrichment enabled");
        }
        None => tracing::warn!("WATCHMODE_API_KEY not set, availability enrichment disabled"),
    }

    let app = create_router(AppState::new(recommender));

    let bind_addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    tracing::info!("Server running on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // In-flight requests have drained, so every queued write is in the channel
    if let Some(handle) = cache_writer {
        handle.shutdown().await;
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Waits for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
