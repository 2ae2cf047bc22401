//! The Container Driver: an abstraction over an OCI-compatible runtime,
//! with a `bollard`-backed implementation and an in-memory test double.

pub mod bollard_driver;
pub mod driver;
pub mod error;
#[cfg(any(test, feature = "test-support"))]
pub mod fake;
pub mod types;

pub use bollard_driver::BollardDriver;
pub use driver::{ContainerDriver, LogStream};
pub use error::{DriverError, Result};
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeDriver;
pub use types::{ContainerState, ContainerStats, ContainerStatus, CreateSpec, LogStreamOptions, PortMapping};
