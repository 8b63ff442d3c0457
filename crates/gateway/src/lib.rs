//! HTTP entry point for the control tower.
//!
//! Exposes the chat pipeline as `POST /chat`, plus health and metrics.

pub mod error;
pub mod server;

pub use error::ApiError;
pub use server::{AppState, GatewayConfig, GatewayServer, HealthResponse};
