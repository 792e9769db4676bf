//! Axum router and server entry point.

use std::sync::Arc;

use axum::routing::{delete, get, post};
use axum::Router;
use plenum_server::PlenumService;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::error::RpcError;
use crate::handlers;

/// Build the full API router.
pub fn router(service: Arc<PlenumService>) -> Router {
    Router::new()
        // Participant surface
        .route("/v1/state", get(handlers::get_state))
        .route("/v1/auth/voter", post(handlers::auth_voter))
        .route("/v1/vote", post(handlers::cast_vote))
        // Admin authentication
        .route("/v1/auth/admin", post(handlers::auth_admin))
        .route("/v1/auth/admin/logout", post(handlers::logout_admin))
        // Admin surface
        .route("/v1/admin/state", get(handlers::get_admin_state))
        .route("/v1/admin/voting/start", post(handlers::start_voting))
        .route("/v1/admin/voting/end", post(handlers::end_voting))
        .route("/v1/admin/voting/new", post(handlers::new_voting))
        .route("/v1/admin/phase", post(handlers::change_phase))
        .route(
            "/v1/admin/proposals",
            post(handlers::create_proposal).put(handlers::update_proposal),
        )
        .route("/v1/admin/proposals/:id", delete(handlers::delete_proposal))
        .route("/v1/admin/proposals/select", post(handlers::select_proposal))
        .route(
            "/v1/admin/proposals/:id/reset-votes",
            post(handlers::reset_proposal_votes),
        )
        .route("/v1/admin/classify", post(handlers::classify))
        .route("/v1/admin/import/proposals", post(handlers::import_proposals))
        .route("/v1/admin/config/roster", post(handlers::save_roster_config))
        .route("/v1/admin/config/import", post(handlers::save_import_config))
        .route("/v1/admin/accounts/voters", post(handlers::create_voter_account))
        .route("/v1/admin/accounts/admins", post(handlers::create_admin_account))
        .route("/v1/admin/rules", post(handlers::save_classification_rule))
        .route("/v1/admin/rules/:id", delete(handlers::delete_classification_rule))
        .route("/v1/admin/accounts/:id", delete(handlers::delete_account))
        // The browser client is served from wherever; keep CORS open.
        .layer(CorsLayer::permissive())
        .with_state(service)
}

/// Bind and serve the API until the process is asked to stop.
pub async fn serve(addr: &str, service: Arc<PlenumService>) -> Result<(), RpcError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| RpcError::Internal(format!("could not bind {addr}: {e}")))?;
    info!("HTTP API listening on {addr}");
    axum::serve(listener, router(service))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await
        .map_err(|e| RpcError::Internal(e.to_string()))
}
