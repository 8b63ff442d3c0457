//! Core type definitions for the control tower.
//!
//! Everything here is created per request and dropped once the response
//! has been written.

pub mod intent;
pub mod outcome;
pub mod request;
pub mod slots;

pub use intent::*;
pub use outcome::*;
pub use request::*;
pub use slots::*;
