use serde::{Deserialize, Serialize};

/// Body for `POST /api/v1/servers/{id}/command`.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandRequest {
    pub command: String,
}

/// Response carrying the command's captured exec output.
#[derive(Debug, Clone, Serialize)]
pub struct CommandResponse {
    pub output: String,
}
