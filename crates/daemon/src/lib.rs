//! The daemon binary's library half: startup, the reconciliation sweep,
//! and graceful shutdown, grounded in the teacher's
//! `daemon/src/lifecycle/{startup,mod}.rs`. Adapted for whole-state
//! snapshot persistence (no WAL to replay) and an HTTP facade in place of
//! the teacher's Unix socket listener.

pub mod env;
pub mod shutdown;
pub mod startup;

pub use shutdown::serve_with_drain;
pub use startup::{startup, startup_with_driver, Config, ShutdownHandle, StartupError, StartupResult};
