//! Fixture server implementation

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::{JoinError, JoinSet};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use credfix_common::theme::{self, ThemeStore};
use credfix_common::{FixtureDescriptor, FixtureSetConfig, VariantKind};

use crate::static_files::StaticFiles;
use crate::variant::{self, FixtureVariant};

/// Routes every fixture answers besides its own.
pub const SHARED_ROUTES: &[&str] = &["/healthz", "/theme.js", "/api/theme", "/api/theme/switch"];

/// Errors starting or running fixtures
#[derive(Error, Debug)]
pub enum ServeError {
    #[error(transparent)]
    Config(#[from] credfix_common::Error),

    #[error("failed to bind {addr} for fixture {fixture}: {source}")]
    Bind {
        fixture: String,
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("fixture {fixture} stopped: {source}")]
    Serve {
        fixture: String,
        #[source]
        source: std::io::Error,
    },

    #[error("fixture task failed: {0}")]
    Task(#[from] JoinError),
}

/// One fixture behind one listener
#[derive(Clone)]
pub struct FixtureServer {
    variant: Arc<dyn FixtureVariant>,
    theme: &'static ThemeStore,
}

struct SharedState {
    name: String,
    kind: VariantKind,
    theme: &'static ThemeStore,
}

impl FixtureServer {
    /// Create a server for one descriptor, using the process-wide theme store
    pub fn new(descriptor: FixtureDescriptor, session_ttl_secs: i64) -> credfix_common::Result<Self> {
        Ok(Self {
            variant: variant::build(descriptor, session_ttl_secs)?,
            theme: theme::global(),
        })
    }

    /// Use a specific theme store instead of the process-wide one
    pub fn with_theme_store(mut self, store: &'static ThemeStore) -> Self {
        self.theme = store;
        self
    }

    pub fn name(&self) -> &str {
        self.variant.descriptor().name()
    }

    /// Create router
    pub fn router(&self) -> Router {
        let descriptor = self.variant.descriptor();
        let shared = Arc::new(SharedState {
            name: descriptor.name().to_string(),
            kind: descriptor.variant_kind(),
            theme: self.theme,
        });

        let shared_routes = Router::new()
            .route("/healthz", get(health_handler))
            .route("/theme.js", get(theme_js_handler))
            .route("/api/theme", get(theme_get_handler))
            .route("/api/theme/switch", post(theme_switch_handler))
            .with_state(shared);

        self.variant
            .clone()
            .into_router()
            .merge(shared_routes)
            .fallback(not_found_handler)
            .layer(TraceLayer::new_for_http())
    }

    /// Serve on an already bound listener until the connection loop ends
    pub async fn serve_on(self, listener: TcpListener) -> Result<(), ServeError> {
        let fixture = self.name().to_string();
        if let Ok(addr) = listener.local_addr() {
            info!(
                "Fixture {} ({}) listening on http://{}",
                fixture,
                self.variant.descriptor().variant_kind(),
                addr
            );
        }
        axum::serve(listener, self.router())
            .await
            .map_err(|source| ServeError::Serve { fixture, source })
    }
}

/// Bind every fixture in the set, then serve them all until ctrl-c or failure.
///
/// All listeners are bound before any starts serving, so a port clash fails
/// the whole run up front.
pub async fn serve_fixture_set(config: &FixtureSetConfig) -> Result<(), ServeError> {
    let resolved = config.resolve()?;
    if resolved.is_empty() {
        warn!("No fixtures configured; nothing to serve");
        return Ok(());
    }

    let mut bound = Vec::with_capacity(resolved.len());
    for (addr, descriptor) in resolved {
        let server = FixtureServer::new(descriptor, config.session_ttl_secs)?;
        let listener = TcpListener::bind(addr).await.map_err(|source| ServeError::Bind {
            fixture: server.name().to_string(),
            addr,
            source,
        })?;
        bound.push((server, listener));
    }

    let mut tasks = JoinSet::new();
    for (server, listener) in bound {
        tasks.spawn(server.serve_on(listener));
    }

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
            tasks.abort_all();
            Ok(())
        }
        Some(joined) = tasks.join_next() => {
            tasks.abort_all();
            task_outcome(joined)
        }
    }
}

/// Outcome of the first fixture task to end; a panic is a failure too.
fn task_outcome(joined: Result<Result<(), ServeError>, JoinError>) -> Result<(), ServeError> {
    match joined {
        Ok(result) => result,
        Err(e) => {
            error!("Fixture task panicked: {}", e);
            Err(ServeError::Task(e))
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

async fn health_handler(State(state): State<Arc<SharedState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "fixture": state.name,
        "variant": state.kind,
    }))
}

async fn theme_js_handler() -> Response {
    StaticFiles::serve("/theme.js")
}

async fn theme_get_handler(State(state): State<Arc<SharedState>>) -> impl IntoResponse {
    Json(state.theme.load())
}

async fn theme_switch_handler(State(state): State<Arc<SharedState>>) -> Response {
    match state.theme.switch() {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(e) => {
            warn!("Failed to persist theme: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": e.to_string()})),
            )
                .into_response()
        }
    }
}

async fn not_found_handler() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not Found")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crashing_fixture() -> Result<(), ServeError> {
        panic!("fixture crashed")
    }

    #[tokio::test]
    async fn test_panicked_task_is_an_error() {
        let mut tasks = JoinSet::new();
        tasks.spawn(async { crashing_fixture() });
        let joined = tasks.join_next().await.unwrap();
        assert!(matches!(task_outcome(joined), Err(ServeError::Task(_))));
    }

    #[tokio::test]
    async fn test_clean_exit_passes_through() {
        let mut tasks = JoinSet::new();
        tasks.spawn(async { Ok(()) });
        let joined = tasks.join_next().await.unwrap();
        assert!(task_outcome(joined).is_ok());
    }
}
