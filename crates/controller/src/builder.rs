//! Builder for Dispatcher.

use std::sync::Arc;

use control_tower_core::{
    config::{AppConfig, ModelConfig, PipelineConfig, SlotDefaults},
    traits::{DownstreamClient, IntentDetector, LlmClient},
    Error, Result,
};
use control_tower_downstream::{AgentCaller, GraphQueryCaller, SimulationCaller};

use crate::classifier::{Classifier, HistoryPolicy};
use crate::defaults::SlotDefaulter;
use crate::detectors::{ActionDetector, SourcingDetector, WhatIfDetector};
use crate::dispatcher::Dispatcher;
use crate::summarization::Summarizer;
use crate::translator::QueryTranslator;

/// The default cascade: sourcing, then action, then what-if.
pub fn default_detectors(classifier: &Classifier) -> Vec<Arc<dyn IntentDetector>> {
    let mut detectors: Vec<Arc<dyn IntentDetector>> = Vec::with_capacity(3);
    detectors.push(Arc::new(SourcingDetector::new(classifier.clone())));
    detectors.push(Arc::new(ActionDetector::new(classifier.clone())));
    detectors.push(Arc::new(WhatIfDetector::new(classifier.clone())));
    detectors
}

/// Builder for constructing a Dispatcher.
pub struct DispatcherBuilder {
    model: ModelConfig,
    pipeline: PipelineConfig,
    defaults: SlotDefaults,
    llm: Option<Arc<dyn LlmClient>>,
    downstream: Option<Arc<dyn DownstreamClient>>,
    detectors: Option<Vec<Arc<dyn IntentDetector>>>,
}

impl DispatcherBuilder {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self {
            model: ModelConfig::default(),
            pipeline: PipelineConfig::default(),
            defaults: SlotDefaults::default(),
            llm: None,
            downstream: None,
            detectors: None,
        }
    }

    /// Take temperatures, history policy and slot defaults from `config`.
    pub fn with_config(mut self, config: &AppConfig) -> Self {
        self.model = config.model.clone();
        self.pipeline = config.pipeline.clone();
        self.defaults = config.defaults.clone();
        self
    }

    /// Set the LLM client.
    pub fn with_llm(mut self, llm: Arc<dyn LlmClient>) -> Self {
        self.llm = Some(llm);
        self
    }

    /// Set the client for the graph, simulation and agent backends.
    pub fn with_downstream(mut self, downstream: Arc<dyn DownstreamClient>) -> Self {
        self.downstream = Some(downstream);
        self
    }

    /// Replace the detector cascade. Order is priority order.
    pub fn with_detectors(mut self, detectors: Vec<Arc<dyn IntentDetector>>) -> Self {
        self.detectors = Some(detectors);
        self
    }

    /// Build the Dispatcher.
    pub fn build(self) -> Result<Dispatcher> {
        let llm = self
            .llm
            .ok_or_else(|| Error::config("Dispatcher requires an LLM client"))?;
        let downstream = self
            .downstream
            .ok_or_else(|| Error::config("Dispatcher requires a downstream client"))?;

        let history = if self.pipeline.use_history {
            HistoryPolicy::last(self.pipeline.max_history_turns)
        } else {
            HistoryPolicy::disabled()
        };
        let classifier = Classifier::new(llm.clone())
            .with_temperature(self.model.classify_temperature)
            .with_history(history);

        let detectors = self
            .detectors
            .unwrap_or_else(|| default_detectors(&classifier));
        let graph = GraphQueryCaller::new(downstream.clone());

        Ok(Dispatcher {
            detectors,
            translator: QueryTranslator::new(classifier),
            defaulter: SlotDefaulter::new(graph.clone(), self.defaults),
            summarizer: Summarizer::new(llm).with_temperature(self.model.summary_temperature),
            graph,
            simulation: SimulationCaller::new(downstream.clone()),
            agent: AgentCaller::new(downstream),
        })
    }
}

impl Default for DispatcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use control_tower_core::{
        mocks::{MockDownstream, MockLlm, MockReply},
        traits::Backend,
        types::ChatRequest,
    };
    use serde_json::json;

    #[test]
    fn test_build_requires_collaborators() {
        let missing_llm = DispatcherBuilder::new()
            .with_downstream(Arc::new(MockDownstream::new()))
            .build();
        assert!(matches!(missing_llm, Err(Error::Config(_))));

        let missing_downstream = DispatcherBuilder::new()
            .with_llm(Arc::new(MockLlm::default()))
            .build();
        assert!(matches!(missing_downstream, Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_temperatures_from_config() {
        let mut config = AppConfig::default();
        config.model.classify_temperature = 0.1;
        config.model.summary_temperature = 0.7;

        let llm = Arc::new(MockLlm::scripted(&[
            r#"{"isMatch": true, "kind": "SINGLE_SOURCE", "slots": {"threshold": 1}}"#,
            "summary",
        ]));
        let downstream = Arc::new(MockDownstream::new().on(
            Backend::Agent,
            AgentCaller::SINGLE_SOURCE_PARTS,
            MockReply::Json(json!({ "parts": [] })),
        ));
        let dispatcher = DispatcherBuilder::new()
            .with_config(&config)
            .with_llm(llm.clone())
            .with_downstream(downstream)
            .build()
            .unwrap();

        dispatcher
            .dispatch(&ChatRequest::new("单一来源零件"))
            .await
            .unwrap();

        let temps: Vec<_> = llm.options().into_iter().map(|o| o.temperature).collect();
        assert_eq!(temps, vec![Some(0.1), Some(0.7)]);
    }
}
