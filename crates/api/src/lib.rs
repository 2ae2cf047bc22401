//! The HTTP Facade (§4.7): decodes requests, invokes the Lifecycle
//! Controller / Proxy Manager, and shapes JSON responses. Pagination,
//! authentication, CORS, and asset serving are external collaborators
//! (spec.md §1 Non-goals) layered on by whatever embeds this router.

pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::router;
pub use state::AppState;
