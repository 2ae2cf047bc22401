//! JSON request/response DTOs for the HTTP Facade (§4.7), shared between
//! `fleetd-api` and the integration test suite.
//!
//! Unlike the daemon's length-prefixed binary IPC wire format, this is
//! plain HTTP JSON: there is no framing or encode/decode step here, only
//! the request/response shapes axum serializes directly.

mod command;
mod config;
mod error;
mod proxy;
mod servers;

pub use command::{CommandRequest, CommandResponse};
pub use config::{ConfigCategoryView, ConfigFieldView, ConfigPatchRequest, ConfigResponse};
pub use error::ErrorBody;
pub use proxy::{
    CreateProxyListenerRequest, ProxyListenerResponse, ProxyListenersResponse, RouteView, RoutesResponse,
    UpdateProxyListenerRequest,
};
pub use servers::{CreateServerRequest, ListServersQuery, ServersResponse, UpdateServerRequest};
