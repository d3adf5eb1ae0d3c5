//! HTTP server
//!
//! Exposes permission resolution for the calling identity and admin
//! management of permission records.
//!
//! | Method | Path | |
//! |--------|------|-|
//! | GET | `/health` | liveness |
//! | GET | `/api/systems` | system catalog |
//! | GET | `/api/me` | role, flags, resolved systems |
//! | GET | `/api/me/systems/{system}?level=` | system check |
//! | GET | `/api/me/branches/{branch}` | branch check |
//! | GET | `/api/admin/permissions` | all records |
//! | GET/PUT/DELETE | `/api/admin/permissions/{user_id}` | one record |

pub mod error;
pub mod handlers;

pub use error::ApiError;

use crate::access_control::PermissionResolver;
use crate::auth::{AdminGate, Identity};
use crate::config::ServerConfig;
use crate::session::PermissionSnapshot;
use crate::store::{SharedStore, load_or_bootstrap};
use axum::{Router, routing::get};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Shared state for handlers
#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub resolver: Arc<PermissionResolver>,
    pub gate: AdminGate,
}

impl AppState {
    pub fn new(store: SharedStore, resolver: Arc<PermissionResolver>, gate: AdminGate) -> Self {
        Self {
            store,
            resolver,
            gate,
        }
    }

    /// Fresh snapshot for a request. Store failures yield an empty snapshot.
    pub async fn snapshot_for(&self, identity: &Identity) -> PermissionSnapshot {
        match load_or_bootstrap(self.store.as_ref(), &self.resolver, identity).await {
            Ok(record) => PermissionSnapshot::new(record),
            Err(e) => {
                warn!(user = %identity.user_id, error = %e, "Permission lookup failed, denying");
                PermissionSnapshot::empty()
            }
        }
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/systems", get(handlers::list_systems))
        .route("/api/me", get(handlers::me))
        .route("/api/me/systems/{system}", get(handlers::me_system))
        .route("/api/me/branches/{branch}", get(handlers::me_branch))
        .route("/api/admin/permissions", get(handlers::list_records))
        .route(
            "/api/admin/permissions/{user_id}",
            get(handlers::get_record)
                .put(handlers::put_record)
                .delete(handlers::delete_record),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the server until Ctrl+C
pub async fn run_server(config: &ServerConfig, state: AppState) -> anyhow::Result<()> {
    if !state.gate.is_enabled() {
        warn!("No admin password configured, admin routes are disabled");
    }

    let listener = TcpListener::bind(config.bind_addr()).await?;
    info!(
        addr = %listener.local_addr()?,
        store = state.store.backend(),
        "Permission server listening"
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Failed to listen for shutdown signal");
            }
            info!("Received shutdown signal");
        })
        .await?;

    info!("Permission server stopped");
    Ok(())
}
