use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handler;
use crate::state::AppState;

/// Build the axum router with all Streamify endpoints.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/health", get(handler::health_handler))
        .route("/v1/users/:user_id", get(handler::get_user))
        .route("/v1/users/:user_id/friend-request", post(handler::request_friend))
        .route("/v1/recommended", get(handler::recommended))
        .route("/v1/friends", get(handler::my_friends))
        .route("/v1/incoming-requests", get(handler::incoming_requests))
        .route(
            "/v1/incoming-requests/:request_id/accept",
            post(handler::accept_friend),
        )
        .route("/v1/outgoing-requests", get(handler::outgoing_requests))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
