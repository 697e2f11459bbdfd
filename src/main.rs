mod config;
mod dto;
mod handlers;
mod models;
mod repository;
mod service;

use std::sync::Arc;

use config::{Config, StoreConfig};
use repository::{DocumentStore, MemoryStore, PostgresStore};
use service::NoteService;

#[tokio::main]
async fn main() {
    // Log setup
    tracing_subscriber::fmt::init();

    // Load config
    let cfg = config::load_config().unwrap_or_else(|e| {
        tracing::error!("Failed to load config: {e}");
        panic!("failed to locate or load config: {e}");
    });
    tracing::info!("Successfully loaded notes API config");

    // Store creation and migration
    let store = build_store(&cfg).await;

    // Service creation
    let service = Arc::new(NoteService::new(store));

    let router = handlers::router(service);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", cfg.port))
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Failed to bind port {}: {e}", cfg.port);
            panic!("failed to bind port {}: {e}", cfg.port);
        });

    match listener.local_addr() {
        Ok(addr) => tracing::info!("Notes API starting, listening on {}", addr),
        Err(e) => tracing::warn!("Notes API starting, local address unavailable: {e}"),
    }

    if let Err(e) = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("HTTP server error: {e}");
        panic!("failed to run HTTP server: {e}");
    }

    tracing::info!("Notes API stopped");
}

async fn build_store(cfg: &Config) -> Arc<dyn DocumentStore> {
    match &cfg.store {
        StoreConfig::Memory => {
            tracing::info!(
                "Using in-memory store for collection '{}'; notes are lost on restart",
                cfg.collection
            );
            Arc::new(MemoryStore::new())
        }
        StoreConfig::Postgres { dsn } => {
            let mut store = PostgresStore::new(dsn, cfg.collection.clone())
                .await
                .unwrap_or_else(|e| {
                    tracing::error!("Failed to establish database connection: {e}");
                    panic!("failed to establish database connection: {e}");
                });

            store.migrate().await.unwrap_or_else(|e| {
                tracing::error!("Failed to migrate database: {e}");
                panic!("failed to migrate database: {e}");
            });

            tracing::info!("Using Postgres store for collection '{}'", cfg.collection);
            Arc::new(store)
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }

    tracing::info!("Shutdown signal received, draining connections");
}
