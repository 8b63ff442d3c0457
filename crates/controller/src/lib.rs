//! Chat controller for the control tower.
//!
//! This crate provides the intent cascade, the fallback query translator,
//! slot defaulting and result summarization.

pub mod builder;
pub mod classifier;
pub mod defaults;
pub mod detectors;
pub mod dispatcher;
pub mod summarization;
pub mod translator;

pub use builder::{default_detectors, DispatcherBuilder};
pub use classifier::{parse_reply, strip_code_fences, Classifier, HistoryPolicy};
pub use defaults::{AtRiskHint, SlotDefaulter, AT_RISK_LOOKUP};
pub use detectors::{ActionDetector, FamilyDetector, LocalizedPrompt, SourcingDetector, WhatIfDetector};
pub use dispatcher::{supplier_check_query, Dispatcher, CHAT_ACTOR};
pub use summarization::Summarizer;
pub use translator::{QueryTranslator, Translation};
