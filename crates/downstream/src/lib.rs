//! Downstream callers for the control tower.
//!
//! One reqwest-backed client talks JSON to the three backend families. The
//! callers on top of it turn every failure into a localized, error-shaped
//! `DispatchOutcome` so the pipeline never has to handle transport errors.

pub mod callers;
pub mod http;

pub use callers::{failure_outcome, AgentCaller, CallResult, Executed, GraphQueryCaller, SimulationCaller};
pub use http::HttpDownstream;
