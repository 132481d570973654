//! Read-only admin HTTP surface (spec §6): exposes the vessel tracker's
//! in-memory state and the live configuration over a small `axum` router.
//! Carries no write endpoints — configuration changes happen through the
//! config file plus a restart, not through this API.

mod dto;
mod routes;
mod server;
mod state;

pub use dto::VesselView;
pub use routes::router;
pub use server::serve;
pub use state::AdminState;
