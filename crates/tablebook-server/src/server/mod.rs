//! Server-side components of the reservation service.
//!
//! ## Submodules
//!
//! - [`config`] - CLI and environment configuration.
//! - [`service`] - gRPC handlers and store wiring.
//! - [`telemetry`] - Console logging and optional OpenTelemetry export.

pub mod config;
pub mod service;
pub mod telemetry;
