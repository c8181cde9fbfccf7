//! API server for the tasks service
//!
//! Serves the `/v1/tasks` REST API over either the in-memory or the
//! PostgreSQL task repository, selected by `STORAGE_MODE`.

mod config;
mod response;
mod routes;
mod state;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::http::{header, Method};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tasks_core::task::{MemoryTaskStore, PgTaskStore, TaskRepository};

use crate::config::{AppConfig, StorageMode};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    tracing::info!(
        storage_mode = ?config.storage_mode,
        listen_addr = %config.listen_addr,
        page_size = config.page_size,
        "Configuration loaded"
    );

    match config.storage_mode {
        StorageMode::Memory => serve(&config, Arc::new(MemoryTaskStore::new())).await,
        StorageMode::Postgres => {
            let database = config
                .database
                .as_ref()
                .context("Postgres storage selected without database settings")?;
            let store = PgTaskStore::connect(&database.store)
                .await
                .context("Failed to connect to database")?;
            if database.ensure_schema {
                store
                    .ensure_schema()
                    .await
                    .context("Failed to create tasks table")?;
            }

            let store = Arc::new(store);
            let served = serve(&config, Arc::clone(&store)).await;
            store.close().await;
            tracing::info!("Database pool closed");
            served
        }
    }
}

const DEFAULT_LOG_FILTER: &str = "tasks_api=debug,tasks_core=info,tower_http=debug";

/// `RUST_LOG` wins, then `LOG_LEVEL`, then the built-in default.
fn env_filter() -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    match std::env::var("LOG_LEVEL") {
        Ok(level) if !level.trim().is_empty() => {
            EnvFilter::try_new(level).unwrap_or_else(|_| DEFAULT_LOG_FILTER.into())
        }
        _ => DEFAULT_LOG_FILTER.into(),
    }
}

fn app<R: TaskRepository + 'static>(config: &AppConfig, state: AppState<R>) -> Router {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::task::router())
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(config.cors_allow_origin.clone())
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_headers([header::ACCEPT, header::AUTHORIZATION, header::CONTENT_TYPE])
                .expose_headers([header::LINK])
                .allow_credentials(true)
                .max_age(Duration::from_secs(300)),
        )
        .layer(TraceLayer::new_for_http())
}

async fn serve<R: TaskRepository + 'static>(
    config: &AppConfig,
    repository: Arc<R>,
) -> anyhow::Result<()> {
    let backend = repository.backend_name();
    let state = AppState::new(repository, config.page_size, config.request_timeout);
    let shutdown = state.shutdown_token().clone();
    let app = app(config, state);

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, backend, "REST API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            shutdown.cancel();
        })
        .await
        .context("Server error")?;

    tracing::info!("Shutting down server...");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::{body::Body, http::Request};
    use tasks_core::task::MemoryTaskStore;
    use tower::ServiceExt;

    fn config(pairs: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let pairs: Vec<(String, String)> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Ok(AppConfig::from_lookup(|name| {
            pairs.iter().find(|(k, _)| k == name).map(|(_, v)| v.clone())
        })?)
    }

    #[tokio::test]
    async fn test_app_answers_preflight_for_configured_origin() {
        let config = config(&[("CORS_ALLOW_ORIGIN", "https://tasks.example.com")]).unwrap();
        let state = AppState::new(
            Arc::new(MemoryTaskStore::new()),
            config.page_size,
            config.request_timeout,
        );

        let request = Request::builder()
            .method("OPTIONS")
            .uri("/v1/tasks")
            .header(header::ORIGIN, "https://tasks.example.com")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();
        let response = app(&config, state).oneshot(request).await.unwrap();

        let headers = response.headers();
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://tasks.example.com"
        );
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    }

    #[test]
    fn test_wildcard_origin_fails_before_router_is_built() {
        assert!(config(&[("CORS_ALLOW_ORIGIN", "*")]).is_err());
    }
}
