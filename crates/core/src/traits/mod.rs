//! Core traits for the control tower.
//!
//! Each trait marks a collaborator seam of the chat pipeline:
//! - `llm`: language-model completion (classification, translation, summary)
//! - `detector`: intent detectors run by the dispatcher cascade
//! - `downstream`: HTTP backends (graph query, simulation, agent)
//! - `handler`: the whole pipeline as seen by the HTTP layer

pub mod detector;
pub mod downstream;
pub mod handler;
pub mod llm;

pub use detector::*;
pub use downstream::*;
pub use handler::*;
pub use llm::*;
