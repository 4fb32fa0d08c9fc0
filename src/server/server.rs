use std::sync::Arc;
use anyhow::{Context, Result};
use axum::Router;
use tracing::info;
use crate::config::settings::SettingsConfig;
use crate::observability::metrics::{get_metrics, Metrics};
use crate::observability::routes::MetricsState;
use crate::provider::TokenProvider;
use crate::server::token_routes;

#[derive(Clone)]
pub struct AppState {
    pub metrics_state: MetricsState,
    pub provider: Arc<TokenProvider>,
}

impl AppState {
    pub fn new (
        metrics: &Metrics,
        provider: Arc<TokenProvider>,
    ) -> Self {
        Self {
            metrics_state: MetricsState::new(metrics.registry.clone()),
            provider,
        }
    }
}

/// Token and metrics routes over one shared provider.
pub fn app(settings_config: &SettingsConfig, provider: Arc<TokenProvider>) -> Router {
    let state = AppState::new(get_metrics(), provider);

    Router::new()
        .merge(token_routes::router())
        .merge(state.metrics_state.router(&settings_config.metrics))
        .with_state(state)
}

/// Start one Axum server serving tokens (and metrics when enabled).
pub async fn start(
    settings_config: &SettingsConfig,
    provider: Arc<TokenProvider>,
) -> Result<()> {
    let app = app(settings_config, provider);

    let bind_addr = format!("{}:{}", settings_config.server.host, settings_config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("cannot bind {}", bind_addr))?;
    info!("listening on {}", bind_addr);

    let metrics = get_metrics();
    metrics.up.set(1);
    let served = axum::serve(listener, app).await.context("server failed");
    metrics.up.set(0);
    served
}
