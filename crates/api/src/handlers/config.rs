//! `GET/PUT /api/v1/servers/{id}/config` — categorized config read/write
//! (spec.md §6.1, §4.3).

use axum::extract::{Path, State};
use axum::Json;
use fleetd_controller::UpdateRequest;
use fleetd_core::{Clock, ServerId};
use fleetd_driver::ContainerDriver;
use fleetd_wire::{ConfigPatchRequest, ConfigResponse};

use crate::error::ApiError;
use crate::state::AppState;

pub async fn get_config<D, C>(
    State(state): State<AppState<D, C>>,
    Path(id): Path<String>,
) -> Result<Json<ConfigResponse>, ApiError>
where
    D: ContainerDriver,
    C: Clock,
{
    let config = state
        .store
        .get_server_config(ServerId::from_string(id))
        .map_err(fleetd_core::Error::from)?;
    Ok(Json(ConfigResponse::build(&config)))
}

pub async fn update_config<D, C>(
    State(state): State<AppState<D, C>>,
    Path(id): Path<String>,
    Json(req): Json<ConfigPatchRequest>,
) -> Result<Json<ConfigResponse>, ApiError>
where
    D: ContainerDriver,
    C: Clock,
{
    let id = ServerId::from_string(id);
    // Route through the Lifecycle Controller rather than writing the patched
    // config straight to the Store: a patch that changes the projected env
    // must Stop/Remove/Create/Start a running container (§4.4.3), which only
    // `Controller::update` knows how to drive.
    state.controller.update(id, UpdateRequest { config_patch: req.fields, ..Default::default() }).await?;
    let config = state.store.get_server_config(id).map_err(fleetd_core::Error::from)?;
    Ok(Json(ConfigResponse::build(&config)))
}
