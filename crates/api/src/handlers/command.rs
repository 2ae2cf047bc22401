//! `POST /api/v1/servers/{id}/command` — runs an operator command via
//! `Driver.Exec` and appends it to the container's log stream (spec.md
//! §6.1).

use axum::extract::{Path, State};
use axum::Json;
use fleetd_core::{Clock, ServerId};
use fleetd_driver::ContainerDriver;
use fleetd_wire::{CommandRequest, CommandResponse};

use crate::error::ApiError;
use crate::state::AppState;

pub async fn run_command<D, C>(
    State(state): State<AppState<D, C>>,
    Path(id): Path<String>,
    Json(req): Json<CommandRequest>,
) -> Result<Json<CommandResponse>, ApiError>
where
    D: ContainerDriver,
    C: Clock,
{
    let output = state.controller.run_command(ServerId::from_string(id), &req.command).await?;
    Ok(Json(CommandResponse { output }))
}
