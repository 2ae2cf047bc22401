//! The Persistence Store: typed CRUD over fleetd's entities with
//! whole-state snapshot durability and per-Server lock coordination.

pub mod error;
pub mod lock;
pub mod snapshot;
pub mod state;
pub mod store;

pub use error::{Result, StoreError};
pub use lock::ServerLocks;
pub use snapshot::Snapshot;
pub use state::MaterializedState;
pub use store::Store;
