use anyhow::Context;
use axum::{http::HeaderValue, middleware::from_fn_with_state, routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::TokenAuthority;
use crate::config::AppConfig;
use crate::handlers::{self, protected, public};
use crate::middleware::{route_gate_middleware, PartitionTable, RouteGate};

/// Shared, immutable application state
#[derive(Clone)]
pub struct AppState {
    pub gate: Arc<RouteGate>,
}

/// Load the partition table named by the config, or the built-in cartuner table
pub fn load_partition_table(config: &AppConfig) -> anyhow::Result<PartitionTable> {
    match &config.partitions.table_path {
        Some(path) => {
            let table = PartitionTable::from_yaml_file(path)
                .with_context(|| format!("failed to load partition table {}", path.display()))?;
            tracing::info!(
                "loaded partition table from {} ({} protected, {} landing)",
                path.display(),
                table.protected().len(),
                table.landing().len()
            );
            Ok(table)
        }
        None => Ok(PartitionTable::cartuner()),
    }
}

/// Build the route gate from configuration, verifying tokens with the configured JWT settings
pub fn build_gate(config: &AppConfig) -> anyhow::Result<RouteGate> {
    config.validate().context("invalid configuration")?;

    let table = load_partition_table(config)?;
    let authority = TokenAuthority::from_config(&config.security)
        .context("failed to initialise token verifier")?;

    Ok(RouteGate::new(table, Arc::new(authority), config.session.cookie_name.clone()))
}

/// Assemble the HTTP application. The gate wraps every route and the fallback.
pub fn app(state: AppState, config: &AppConfig) -> Router {
    let router = Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        // Sign-in landing pages
        .route("/auth/signin", get(public::signin_page))
        .route("/auth/client/signin", get(public::signin_page))
        .route("/auth/mechanic/signin", get(public::signin_page))
        .route("/auth/admin", get(public::signin_page))
        .route("/auth/admin/signin", get(public::signin_page))
        // Role dashboards
        .route("/screens/client/dashboard", get(protected::screen))
        .route("/screens/client/orders", get(protected::screen))
        .route("/screens/mechanic/dashboard", get(protected::screen))
        .route("/screens/owner/dashboard", get(protected::screen))
        .route("/screens/admin/dashboard", get(protected::screen))
        .fallback(handlers::not_found)
        // Gate must be layered after the fallback so unknown paths are covered too
        .layer(from_fn_with_state(state.gate.clone(), route_gate_middleware))
        .with_state(state);

    let router = if config.security.enable_cors {
        router.layer(cors_layer(&config.security.cors_origins))
    } else {
        router
    };

    if config.server.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new().allow_origin(origins).allow_credentials(true)
}

/// Bind and serve until the process is stopped
pub async fn serve(config: &AppConfig) -> anyhow::Result<()> {
    let gate = Arc::new(build_gate(config)?);
    let app = app(AppState { gate }, config);

    let bind_addr = format!("{}:{}", config.server.bind_host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Cartuner API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
