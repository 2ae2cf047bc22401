//! `GET/POST /api/v1/servers`, `GET/PUT/DELETE /api/v1/servers/{id}`, and
//! the `start|stop|restart` lifecycle commands (spec.md §6.1).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use fleetd_core::{Clock, Server, ServerId};
use fleetd_controller::{CreateRequest, UpdateRequest};
use fleetd_driver::ContainerDriver;
use fleetd_wire::{CreateServerRequest, ListServersQuery, ServersResponse, UpdateServerRequest};

use crate::error::ApiError;
use crate::state::AppState;

pub async fn list_servers<D, C>(
    State(state): State<AppState<D, C>>,
    Query(query): Query<ListServersQuery>,
) -> Result<Json<ServersResponse>, ApiError>
where
    D: ContainerDriver,
    C: Clock,
{
    let servers = state.controller.list_servers(query.full_stats).await;
    Ok(Json(ServersResponse { servers }))
}

pub async fn create_server<D, C>(
    State(state): State<AppState<D, C>>,
    Json(req): Json<CreateServerRequest>,
) -> Result<(StatusCode, Json<Server>), ApiError>
where
    D: ContainerDriver,
    C: Clock,
{
    let server = state
        .controller
        .create(CreateRequest {
            name: req.name,
            description: req.description,
            mod_loader: req.mod_loader,
            mc_version: req.mc_version,
            port: req.port,
            max_players: req.max_players,
            memory_mib: req.memory,
            docker_image: req.docker_image,
            auto_start: req.auto_start,
            start_immediately: req.start_immediately,
            modpack_id: req.modpack_id,
            proxy_hostname: req.proxy_hostname,
            proxy_listener_id: req.proxy_listener_id,
            use_base_url: req.use_base_url,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(server)))
}

pub async fn get_server<D, C>(
    State(state): State<AppState<D, C>>,
    Path(id): Path<String>,
    Query(query): Query<ListServersQuery>,
) -> Result<Json<Server>, ApiError>
where
    D: ContainerDriver,
    C: Clock,
{
    let server = state.controller.get_server(ServerId::from_string(id), query.full_stats).await?;
    Ok(Json(server))
}

pub async fn update_server<D, C>(
    State(state): State<AppState<D, C>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateServerRequest>,
) -> Result<Json<Server>, ApiError>
where
    D: ContainerDriver,
    C: Clock,
{
    let server = state
        .controller
        .update(
            ServerId::from_string(id),
            UpdateRequest {
                name: req.name,
                description: req.description,
                mod_loader: req.mod_loader,
                mc_version: req.mc_version,
                max_players: req.max_players,
                memory_mib: req.memory,
                docker_image: req.docker_image,
                auto_start: req.auto_start,
                tps_query_command: req.tps_query_command,
                config_patch: Default::default(),
            },
        )
        .await?;
    Ok(Json(server))
}

pub async fn delete_server<D, C>(
    State(state): State<AppState<D, C>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError>
where
    D: ContainerDriver,
    C: Clock,
{
    state.controller.delete(ServerId::from_string(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn start_server<D, C>(
    State(state): State<AppState<D, C>>,
    Path(id): Path<String>,
) -> Result<Json<Server>, ApiError>
where
    D: ContainerDriver,
    C: Clock,
{
    Ok(Json(state.controller.start(ServerId::from_string(id)).await?))
}

pub async fn stop_server<D, C>(
    State(state): State<AppState<D, C>>,
    Path(id): Path<String>,
) -> Result<Json<Server>, ApiError>
where
    D: ContainerDriver,
    C: Clock,
{
    Ok(Json(state.controller.stop(ServerId::from_string(id)).await?))
}

pub async fn restart_server<D, C>(
    State(state): State<AppState<D, C>>,
    Path(id): Path<String>,
) -> Result<Json<Server>, ApiError>
where
    D: ContainerDriver,
    C: Clock,
{
    Ok(Json(state.controller.restart(ServerId::from_string(id)).await?))
}
