use anyhow::Context;
use axum::{
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::actions::{InvoiceActions, ViewCache};
use crate::auth::SessionKeys;
use crate::config::{AppConfig, AuthConfig, Environment, SecurityConfig, StorageBackend};
use crate::database::{DatabaseManager, InvoiceStore, MemoryInvoiceStore, PgInvoiceStore};
use crate::gate::AccessGate;
use crate::handlers::{dashboard, public};
use crate::middleware::access_gate_middleware;

/// Shared per-process handles. Every field is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub actions: InvoiceActions,
    pub views: ViewCache,
    pub gate: Arc<AccessGate>,
    pub sessions: SessionKeys,
}

impl AppState {
    pub fn new(store: Arc<dyn InvoiceStore>, auth: &AuthConfig) -> Self {
        let views = ViewCache::new();
        let actions = InvoiceActions::new(store, Arc::new(views.clone()));

        Self {
            actions,
            views,
            gate: Arc::new(AccessGate::new(auth)),
            sessions: SessionKeys::new(auth),
        }
    }

    /// Build the state for the configured storage backend
    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let store: Arc<dyn InvoiceStore> = match config.database.storage {
            StorageBackend::Memory => {
                warn!("Using in-memory invoice store; data is lost on restart");
                Arc::new(MemoryInvoiceStore::new())
            }
            StorageBackend::Postgres => {
                let pool = DatabaseManager::connect(&config.database)
                    .await
                    .context("failed to connect to the invoice database")?;
                if config.database.run_migrations {
                    DatabaseManager::migrate(&pool).await.context("failed to migrate the invoice schema")?;
                }
                Arc::new(PgInvoiceStore::new(pool))
            }
        };

        if config.auth.secret.is_empty() {
            warn!("AUTH_SECRET is not set; every dashboard request will be sent to the login page");
        }

        Ok(Self::new(store, &config.auth))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .route("/login", get(public::login_page))
        .merge(dashboard_routes())
        .layer(middleware::from_fn_with_state(state.clone(), access_gate_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn dashboard_routes() -> Router<AppState> {
    use dashboard::invoices;

    Router::new()
        .route("/dashboard", get(dashboard::overview))
        .route("/dashboard/invoices", get(invoices::list).post(invoices::create))
        .route(
            "/dashboard/invoices/:id",
            get(invoices::show)
                .post(invoices::update)
                .put(invoices::update)
                .delete(invoices::delete),
        )
        // HTML forms can only POST
        .route("/dashboard/invoices/:id/delete", post(invoices::delete))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
}

/// Only development may start without a session secret, and there every
/// dashboard request ends on the login page
fn check_session_secret(config: &AppConfig) -> anyhow::Result<()> {
    if config.auth.secret.is_empty() && config.environment != Environment::Development {
        anyhow::bail!("AUTH_SECRET must be set outside development");
    }
    Ok(())
}

/// Bind and serve until the process is stopped
pub async fn serve(config: &AppConfig) -> anyhow::Result<()> {
    check_session_secret(config)?;

    let state = AppState::from_config(config).await?;
    let mut app = router(state);
    if config.security.enable_cors {
        app = app.layer(cors_layer(&config.security));
    }

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("Invoice dashboard listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server")?;
    Ok(())
}
