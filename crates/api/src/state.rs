//! `AppState`: the handle every handler pulls from `axum::extract::State`.
//!
//! Thin by design — it is just the pieces a handler needs to decode a
//! request, call into the Lifecycle Controller / Proxy Manager, and shape
//! a response. No business logic lives here.

use fleetd_controller::Controller;
use fleetd_core::Clock;
use fleetd_driver::ContainerDriver;
use fleetd_proxy::ProxyManager;
use fleetd_storage::Store;
use std::sync::Arc;

pub struct AppState<D, C> {
    pub controller: Controller<D, C>,
    pub store: Arc<Store<C>>,
    pub proxy: Arc<ProxyManager>,
}

impl<D, C> Clone for AppState<D, C>
where
    C: Clone,
{
    fn clone(&self) -> Self {
        Self { controller: self.controller.clone(), store: self.store.clone(), proxy: self.proxy.clone() }
    }
}

impl<D, C> AppState<D, C>
where
    D: ContainerDriver,
    C: Clock,
{
    pub fn new(controller: Controller<D, C>, store: Arc<Store<C>>, proxy: Arc<ProxyManager>) -> Self {
        Self { controller, store, proxy }
    }
}
