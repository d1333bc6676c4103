//! Server module for building the inventory HTTP server
//!
//! [`ServerBuilder`] assembles a [`ServerHost`] from its collaborators and
//! hands it to [`RestExposure`](exposure::RestExposure) for routing.

pub mod builder;
pub mod exposure;
pub mod host;
pub mod router;

pub use builder::ServerBuilder;
pub use host::ServerHost;
