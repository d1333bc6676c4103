//! REST API exposure
//!
//! Consumes a [`ServerHost`] and produces the axum `Router` serving the
//! inventory API, with CORS and request tracing layered on top.

use super::super::host::ServerHost;
use crate::handlers::system;
use crate::server::router::{build_auth_routes, build_item_routes, build_user_routes};
use anyhow::Result;
use axum::{Router, routing::get};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// REST API exposure implementation
pub struct RestExposure;

impl RestExposure {
    /// Build the REST router from a host
    ///
    /// The returned router serves:
    /// - `/` and `/api/health`
    /// - the auth, user and item routes
    /// - any custom routes
    /// - a JSON 404 for everything else
    pub fn build_router(host: Arc<ServerHost>, custom_routes: Vec<Router>) -> Result<Router> {
        let api = Self::system_routes()
            .merge(build_auth_routes())
            .merge(build_user_routes())
            .merge(build_item_routes())
            .with_state(host);

        let mut app = api;
        for custom_router in custom_routes {
            app = app.merge(custom_router);
        }

        Ok(app.fallback(system::not_found).layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        ))
    }

    fn system_routes() -> Router<Arc<ServerHost>> {
        Router::new()
            .route("/", get(system::welcome))
            .route("/api/health", get(system::health))
    }
}
