// [apps/control-plane/src/routes.rs]
/*!
 * Routing topology (spec.md §4.9). Two independent routers are built here
 * rather than one: the worker duplex socket (`CONTROL_PLANE_HOST:CONTROL_PLANE_PORT`)
 * and the REST surface (`HTTP_PORT`) are bound to separate listeners by
 * [`crate::kernel`], since the worker protocol and the public HTTP API have
 * different CORS, auth, and client populations. Grounded in the teacher's
 * `create_sovereign_router`, split along that seam instead of nested under
 * one root.
 */

use axum::http::{header, Method};
use axum::routing::{get, post};
use axum::Router;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::{agents, balance, chat, deposit, feedback, monitor, payments, run, socket, status};
use crate::state::AppState;

/// Builds the router for worker connections: the single WebSocket upgrade
/// endpoint, with no CORS layer (workers are not browsers).
pub fn build_worker_router(state: AppState) -> Router {
    Router::new()
        .route("/ws", get(socket::upgrade))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Builds the public REST router (spec.md §4.9's route list, CORS allowing
/// `Content-Type, X-Wallet-Address, X-Payment-Tx`).
pub fn build_http_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::HeaderName::from_static("x-wallet-address"),
            header::HeaderName::from_static("x-payment-tx"),
        ])
        .max_age(Duration::from_secs(3600));

    let agent_routes = Router::new()
        .route("/", get(agents::list).post(agents::create))
        .route("/:id", get(agents::get).put(agents::update).delete(agents::delete));

    let monitor_routes = Router::new()
        .route("/", get(monitor::summary))
        .route("/nodes", get(monitor::nodes))
        .route("/logs", get(monitor::logs))
        .route("/history", get(monitor::history));

    let api_routes = Router::new()
        .route("/status", get(status::status))
        .route("/run", post(run::run))
        .route("/chat", post(chat::chat))
        .route("/deposit", post(deposit::deposit))
        .route("/balance", get(balance::balance))
        .route("/feedback", post(feedback::feedback))
        .nest("/agents", agent_routes)
        .route("/payments", get(payments::payments))
        .route("/transactions", get(payments::transactions))
        .nest("/monitor", monitor_routes);

    Router::new()
        .route("/health", get(status::health))
        .nest("/api", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
