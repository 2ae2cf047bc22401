//! Builds the axum `Router` for the core HTTP Facade slice (spec.md §6.1).
//! Auth/RBAC, CORS, asset serving, and the outer request logging
//! middleware are external collaborators (§1 Non-goals) layered on by
//! whatever embeds this router; this crate only wires the endpoints named
//! in §6.1 plus the `TraceLayer` span every request gets regardless.

use axum::routing::{get, post, put};
use axum::Router;
use fleetd_core::Clock;
use fleetd_driver::ContainerDriver;
use tower_http::trace::TraceLayer;

use crate::handlers::{command, config, logs, proxy, servers};
use crate::state::AppState;

pub fn router<D, C>(state: AppState<D, C>) -> Router
where
    D: ContainerDriver,
    C: Clock,
{
    Router::new()
        .route("/api/v1/servers", get(servers::list_servers).post(servers::create_server))
        .route(
            "/api/v1/servers/{id}",
            get(servers::get_server).put(servers::update_server).delete(servers::delete_server),
        )
        .route("/api/v1/servers/{id}/start", post(servers::start_server))
        .route("/api/v1/servers/{id}/stop", post(servers::stop_server))
        .route("/api/v1/servers/{id}/restart", post(servers::restart_server))
        .route("/api/v1/servers/{id}/logs", get(logs::get_logs))
        .route("/api/v1/servers/{id}/command", post(command::run_command))
        .route("/api/v1/servers/{id}/config", get(config::get_config).put(config::update_config))
        .route("/api/v1/proxy/listeners", get(proxy::list_listeners).post(proxy::create_listener))
        .route(
            "/api/v1/proxy/listeners/{id}",
            put(proxy::update_listener).delete(proxy::delete_listener),
        )
        .route("/api/v1/proxy/routes", get(proxy::list_routes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;
