//! HTTP surface: configuration, wire types and the axum router.

pub mod api;
pub mod config;
pub mod error;
pub mod routes;

pub use api::{DecideRequest, DecideResponse, StateResponse, SynthesizeRequest};
pub use config::{AuditConfig, ServiceConfig};
pub use error::ApiError;
pub use routes::{router, serve, serve_on, AppState};
