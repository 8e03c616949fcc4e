pub mod audit;
pub mod policy;
pub mod service;
pub mod telemetry;
pub mod vehicle;

// Re-export the main entry points for convenient access
pub use policy::{decide, Decision, PolicyEngine};
pub use vehicle::{Synthesizer, VehicleContext, VehicleState};
