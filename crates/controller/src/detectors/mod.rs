//! Intent detectors.
//!
//! Each detector is a [`FamilyDetector`] specialized by an intent family and
//! a pair of localized prompts. They share one output contract:
//! `{ "isMatch": bool, "kind"?: KIND, "slots"?: { .. } }`.

mod action;
mod sourcing;
mod whatif;

pub use action::ActionDetector;
pub use sourcing::SourcingDetector;
pub use whatif::WhatIfDetector;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::marker::PhantomData;

use control_tower_core::{
    traits::IntentDetector,
    types::{ChatRequest, Intent, IntentFamily},
    Lang,
};

use crate::classifier::{parse_reply, Classifier};

/// System prompt per language.
#[derive(Debug, Clone, Copy)]
pub struct LocalizedPrompt {
    pub zh: &'static str,
    pub en: &'static str,
}

impl LocalizedPrompt {
    pub fn get(&self, lang: Lang) -> &'static str {
        match lang {
            Lang::Zh => self.zh,
            Lang::En => self.en,
        }
    }
}

#[derive(Debug, Deserialize)]
struct DetectorReply<K> {
    #[serde(rename = "isMatch", default)]
    is_match: bool,
    kind: Option<K>,
    #[serde(default)]
    slots: Value,
}

/// Interpret raw model text as a match of family `F`.
///
/// Malformed JSON, `isMatch` absent or false, a missing or unknown `kind`,
/// and slots that do not fit the kind are all `None`.
pub fn interpret<F: IntentFamily>(raw: &str) -> Option<F> {
    let reply: DetectorReply<F::Kind> = parse_reply(raw)?;
    if !reply.is_match {
        return None;
    }
    let kind = reply.kind?;

    match F::from_slots(kind, reply.slots) {
        Ok(intent) => Some(intent),
        Err(e) => {
            tracing::debug!(family = F::FAMILY, kind = ?kind, error = %e, "Slots rejected");
            None
        }
    }
}

/// LLM-backed detector for one intent family.
pub struct FamilyDetector<F> {
    classifier: Classifier,
    prompt: LocalizedPrompt,
    _family: PhantomData<fn() -> F>,
}

impl<F: IntentFamily> FamilyDetector<F> {
    pub fn with_prompt(classifier: Classifier, prompt: LocalizedPrompt) -> Self {
        Self {
            classifier,
            prompt,
            _family: PhantomData,
        }
    }
}

#[async_trait]
impl<F> IntentDetector for FamilyDetector<F>
where
    F: IntentFamily + Send + 'static,
{
    fn name(&self) -> &'static str {
        F::FAMILY
    }

    async fn detect(&self, request: &ChatRequest) -> Intent {
        let raw = match self
            .classifier
            .classify(self.prompt.get(request.lang), request)
            .await
        {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(
                    trace_id = %request.trace_id,
                    detector = F::FAMILY,
                    error = %e,
                    "Detector call failed, treating as no match"
                );
                return Intent::None;
            }
        };

        match interpret::<F>(&raw) {
            Some(intent) => {
                let intent = intent.into_intent();
                tracing::debug!(
                    trace_id = %request.trace_id,
                    detector = F::FAMILY,
                    kind = intent.kind_name(),
                    "Detector matched"
                );
                intent
            }
            None => Intent::None,
        }
    }
}
