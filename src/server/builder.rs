//! ServerBuilder for fluent API to build HTTP servers

use super::exposure::RestExposure;
use super::host::ServerHost;
use crate::config::{AppConfig, SeedConfig};
use crate::core::auth::{AuthProvider, JwtAuthProvider};
use crate::core::credentials::{Argon2Hasher, CredentialHasher};
use crate::core::service::{ItemStore, UserStore};
use crate::seed;
use crate::storage::{InMemoryItemStore, InMemoryUserStore};
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Builder for creating the HTTP server
///
/// Stores default to the in-memory implementations and the hasher to
/// Argon2id; the auth provider has no default.
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .with_auth_provider(JwtAuthProvider::new("a-long-enough-secret", 168))
///     .with_item_store(InMemoryItemStore::new())
///     .build()?;
/// ```
pub struct ServerBuilder {
    items: Option<Arc<dyn ItemStore>>,
    users: Option<Arc<dyn UserStore>>,
    auth: Option<Arc<dyn AuthProvider>>,
    hasher: Option<Arc<dyn CredentialHasher>>,
    seed: SeedConfig,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder
    pub fn new() -> Self {
        Self {
            items: None,
            users: None,
            auth: None,
            hasher: None,
            seed: SeedConfig::default(),
            custom_routes: Vec::new(),
        }
    }

    /// Builder preconfigured from the application config: JWT auth with the
    /// configured secret and lifetime, plus the seed data
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new()
            .with_auth_provider(JwtAuthProvider::from_config(&config.auth))
            .with_seed(config.seed.clone())
    }

    pub fn with_item_store(mut self, store: impl ItemStore + 'static) -> Self {
        self.items = Some(Arc::new(store));
        self
    }

    pub fn with_user_store(mut self, store: impl UserStore + 'static) -> Self {
        self.users = Some(Arc::new(store));
        self
    }

    /// Set the auth provider (required)
    pub fn with_auth_provider(mut self, provider: impl AuthProvider + 'static) -> Self {
        self.auth = Some(Arc::new(provider));
        self
    }

    pub fn with_hasher(mut self, hasher: impl CredentialHasher + 'static) -> Self {
        self.hasher = Some(Arc::new(hasher));
        self
    }

    /// Data inserted by [`serve`](Self::serve) before accepting requests
    pub fn with_seed(mut self, seed: SeedConfig) -> Self {
        self.seed = seed;
        self
    }

    /// Add custom routes to the server
    ///
    /// Use this for endpoints outside the inventory API, such as metrics or
    /// static assets. They are merged before the 404 fallback.
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Build the transport-agnostic host
    pub fn build_host(&mut self) -> Result<ServerHost> {
        let auth = self.auth.take().ok_or_else(|| {
            anyhow::anyhow!("AuthProvider is required. Call .with_auth_provider()")
        })?;
        let items = self
            .items
            .take()
            .unwrap_or_else(|| Arc::new(InMemoryItemStore::new()));
        let users = self
            .users
            .take()
            .unwrap_or_else(|| Arc::new(InMemoryUserStore::new()));
        let hasher = self
            .hasher
            .take()
            .unwrap_or_else(|| Arc::new(Argon2Hasher::new()));

        ServerHost::from_builder_components(items, users, auth, hasher)
    }

    /// Build the final REST router
    ///
    /// Does not seed; use [`serve`](Self::serve) or [`seed::run`] for that.
    pub fn build(mut self) -> Result<Router> {
        let host = Arc::new(self.build_host()?);
        RestExposure::build_router(host, std::mem::take(&mut self.custom_routes))
    }

    /// Seed, then serve the application with graceful shutdown
    ///
    /// This will:
    /// - Create the configured admin and sample items if missing
    /// - Bind to the provided address
    /// - Handle SIGTERM and SIGINT (Ctrl+C) for graceful shutdown
    pub async fn serve(mut self, addr: &str) -> Result<()> {
        let host = Arc::new(self.build_host()?);
        seed::run(&host, &self.seed).await?;

        let app = RestExposure::build_router(host, std::mem::take(&mut self.custom_routes))?;
        let listener = TcpListener::bind(addr).await?;
        tracing::info!("Server listening on {}", addr);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
