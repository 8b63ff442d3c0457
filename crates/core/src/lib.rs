//! Core types, traits, and error definitions for the control tower.
//!
//! This crate provides the building blocks shared by every stage of the chat
//! pipeline: the intent and slot schema, the dispatch outcome contract,
//! localized strings, configuration, and the collaborator traits.

pub mod config;
pub mod error;
pub mod i18n;
pub mod mocks;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use i18n::{Lang, Messages};
pub use traits::*;
pub use types::*;
