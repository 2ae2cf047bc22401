//! `GET/POST /api/v1/proxy/listeners`, `PUT/DELETE
//! /api/v1/proxy/listeners/{id}`, `GET /api/v1/proxy/routes` (spec.md
//! §6.1, §4.6.2).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use fleetd_core::{Clock, Error, ProxyListener, ProxyListenerId};
use fleetd_driver::ContainerDriver;
use fleetd_wire::{
    CreateProxyListenerRequest, ProxyListenerResponse, ProxyListenersResponse, RouteView, RoutesResponse,
    UpdateProxyListenerRequest,
};

use crate::error::ApiError;
use crate::state::AppState;

pub async fn list_listeners<D, C>(
    State(state): State<AppState<D, C>>,
) -> Result<Json<ProxyListenersResponse>, ApiError>
where
    D: ContainerDriver,
    C: Clock,
{
    Ok(Json(ProxyListenersResponse { listeners: state.store.get_proxy_listeners() }))
}

pub async fn create_listener<D, C>(
    State(state): State<AppState<D, C>>,
    Json(req): Json<CreateProxyListenerRequest>,
) -> Result<(StatusCode, Json<ProxyListenerResponse>), ApiError>
where
    D: ContainerDriver,
    C: Clock,
{
    if req.name.trim().is_empty() {
        return Err(Error::Invalid("listener name must not be empty".to_string()).into());
    }
    if state.store.get_proxy_listener_by_port(req.port).is_some() {
        return Err(Error::Conflict(format!("port {} already in use by a listener", req.port)).into());
    }
    let listener = ProxyListener {
        id: ProxyListenerId::new(),
        name: req.name,
        port: req.port,
        enabled: req.enabled,
        is_default: req.is_default,
    };
    let listener = state.store.create_proxy_listener(listener).map_err(Error::from)?;
    if listener.enabled {
        let _ = state.proxy.start(std::slice::from_ref(&listener)).await;
    }
    Ok((StatusCode::CREATED, Json(ProxyListenerResponse { listener })))
}

pub async fn update_listener<D, C>(
    State(state): State<AppState<D, C>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateProxyListenerRequest>,
) -> Result<Json<ProxyListenerResponse>, ApiError>
where
    D: ContainerDriver,
    C: Clock,
{
    let id = ProxyListenerId::from_string(id);
    let mut listener = state.store.get_proxy_listener(id).map_err(Error::from)?;
    if let Some(name) = req.name {
        listener.name = name;
    }
    if let Some(port) = req.port {
        listener.port = port;
    }
    if let Some(enabled) = req.enabled {
        listener.enabled = enabled;
    }
    if let Some(is_default) = req.is_default {
        listener.is_default = is_default;
    }
    let listener = state.store.update_proxy_listener(listener).map_err(Error::from)?;
    if listener.enabled {
        let _ = state.proxy.start(std::slice::from_ref(&listener)).await;
    }
    Ok(Json(ProxyListenerResponse { listener }))
}

pub async fn delete_listener<D, C>(
    State(state): State<AppState<D, C>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError>
where
    D: ContainerDriver,
    C: Clock,
{
    state.store.delete_proxy_listener(ProxyListenerId::from_string(id)).map_err(Error::from)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_routes<D, C>(State(state): State<AppState<D, C>>) -> Result<Json<RoutesResponse>, ApiError>
where
    D: ContainerDriver,
    C: Clock,
{
    let routes = state
        .controller
        .routes()
        .snapshot()
        .into_iter()
        .map(|(hostname, route)| RouteView { hostname, route })
        .collect();
    Ok(Json(RoutesResponse { routes }))
}
