//! Intent cascade and dispatch.
//!
//! Detectors run in a fixed order and the first match wins. Only the branch
//! of that match calls a backend; with no match the question goes to the
//! fallback translator. Every path ends in a single `DispatchOutcome`.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;

use control_tower_core::{
    traits::{ChatHandler, IntentDetector},
    types::{
        ActionIntent, ChatRequest, DispatchOutcome, Intent, SourcingIntent, SupplierCheckSlots,
        WhatIfIntent,
    },
    Result,
};
use control_tower_downstream::{AgentCaller, CallResult, GraphQueryCaller, SimulationCaller};

use crate::defaults::SlotDefaulter;
use crate::summarization::Summarizer;
use crate::translator::{QueryTranslator, Translation};

/// Actor recorded by the agent backend for commands issued from chat.
pub const CHAT_ACTOR: &str = "control-tower-chat";

const SUPPLIER_FIELDS: &str =
    "id name supplies { id name partType } affectedBy { id type severity date }";

/// The chat pipeline.
pub struct Dispatcher {
    pub(crate) detectors: Vec<Arc<dyn IntentDetector>>,
    pub(crate) translator: QueryTranslator,
    pub(crate) defaulter: SlotDefaulter,
    pub(crate) summarizer: Summarizer,
    pub(crate) graph: GraphQueryCaller,
    pub(crate) simulation: SimulationCaller,
    pub(crate) agent: AgentCaller,
}

impl Dispatcher {
    /// Names of the cascade stages, in priority order.
    pub fn stages(&self) -> Vec<&'static str> {
        self.detectors.iter().map(|d| d.name()).collect()
    }

    /// Run the cascade and return the first match, or `Intent::None`.
    pub async fn detect(&self, request: &ChatRequest) -> Intent {
        for detector in &self.detectors {
            let intent = detector.detect(request).await;
            if intent.is_match() {
                tracing::info!(
                    trace_id = %request.trace_id,
                    intent = intent.family(),
                    kind = intent.kind_name(),
                    "Intent matched"
                );
                return intent;
            }
            tracing::debug!(trace_id = %request.trace_id, detector = detector.name(), "No match");
        }
        Intent::None
    }

    /// Answer `request`.
    ///
    /// `Err` is reserved for defects; every expected failure is an
    /// error-shaped outcome.
    pub async fn dispatch(&self, request: &ChatRequest) -> Result<DispatchOutcome> {
        let intent = self.detect(request).await;

        metrics::counter!(
            "chat_dispatch_total",
            "family" => intent.family(),
            "kind" => intent.kind_name()
        )
        .increment(1);

        match intent {
            Intent::Sourcing(intent) => self.run_sourcing(intent, request).await,
            Intent::Action(intent) => self.run_action(intent, request).await,
            Intent::WhatIf(intent) => self.run_what_if(intent, request).await,
            Intent::None => self.run_fallback(request).await,
        }
    }

    async fn run_sourcing(
        &self,
        intent: SourcingIntent,
        request: &ChatRequest,
    ) -> Result<DispatchOutcome> {
        let lang = request.lang;
        let result = match self.defaulter.fill_sourcing(intent).await {
            SourcingIntent::RfqCandidates(s) => {
                self.agent
                    .call(AgentCaller::RFQ_CANDIDATES, &serde_json::to_value(&s)?, lang)
                    .await
            }
            SourcingIntent::SingleSource(s) => {
                self.agent
                    .call(AgentCaller::SINGLE_SOURCE_PARTS, &serde_json::to_value(&s)?, lang)
                    .await
            }
            SourcingIntent::ConsolidatePo(s) => {
                self.agent
                    .call(AgentCaller::CONSOLIDATE_PO, &serde_json::to_value(&s)?, lang)
                    .await
            }
            SourcingIntent::SupplierCheck(s) => {
                let (query, variables) = supplier_check_query(&s);
                self.graph.execute(&query, &variables, lang).await
            }
        };
        Ok(self.finish(request, result).await)
    }

    async fn run_action(
        &self,
        intent: ActionIntent,
        request: &ChatRequest,
    ) -> Result<DispatchOutcome> {
        let action = intent.kind().as_str();
        let body = match &intent {
            ActionIntent::CreatePo(s) => command_body(action, s)?,
            ActionIntent::ExpediteShipment(s) => command_body(action, s)?,
        };

        let result = self
            .agent
            .call(AgentCaller::EXECUTE, &body, request.lang)
            .await;
        Ok(self.finish(request, result).await)
    }

    async fn run_what_if(
        &self,
        intent: WhatIfIntent,
        request: &ChatRequest,
    ) -> Result<DispatchOutcome> {
        let intent = self.defaulter.fill_what_if(intent).await;
        let body = intent.body()?;

        let result = self
            .simulation
            .simulate(intent.kind(), &body, request.lang)
            .await;
        Ok(self.finish(request, result).await)
    }

    async fn run_fallback(&self, request: &ChatRequest) -> Result<DispatchOutcome> {
        let m = request.lang.messages();

        let outcome = match self.translator.translate(request).await {
            Translation::Query { query, variables } => {
                tracing::debug!(trace_id = %request.trace_id, query = %query, "Translated query");
                let result = self.graph.execute(&query, &variables, request.lang).await;
                self.finish(request, result).await
            }
            Translation::DirectAnswer(answer) => DispatchOutcome::direct(answer),
            Translation::Unparseable { raw } => DispatchOutcome::failure(m.parse_failed, raw),
            Translation::Unavailable => DispatchOutcome::failure(m.model_unavailable, ""),
        };
        Ok(outcome)
    }

    /// Summarize a successful call; a failed call is already the outcome.
    async fn finish(&self, request: &ChatRequest, result: CallResult) -> DispatchOutcome {
        match result {
            Ok(executed) => {
                let answer = self.summarizer.summarize(request, &executed.data).await;
                DispatchOutcome::success(answer, executed.query, executed.data)
            }
            Err(outcome) => outcome,
        }
    }
}

/// Graph query for a supplier check.
///
/// A named supplier is looked up directly; otherwise suppliers of the named
/// part, otherwise every supplier with a risk event.
pub fn supplier_check_query(slots: &SupplierCheckSlots) -> (String, Value) {
    match (&slots.supplier_id, &slots.part_id) {
        (Some(id), _) => (
            format!(
                "query SupplierCheck($id: String!) {{ suppliers(where: {{ id: $id }}) {{ {} }} }}",
                SUPPLIER_FIELDS
            ),
            json!({ "id": id }),
        ),
        (None, Some(part)) => (
            format!(
                "query SupplierCheck($partId: String!) {{ suppliers(where: {{ supplies_SOME: {{ id: $partId }} }}) {{ {} }} }}",
                SUPPLIER_FIELDS
            ),
            json!({ "partId": part }),
        ),
        (None, None) => (
            format!(
                "{{ suppliers(where: {{ affectedBy_SOME: {{ severity_GTE: 1 }} }}) {{ {} }} }}",
                SUPPLIER_FIELDS
            ),
            json!({}),
        ),
    }
}

/// `/agent/execute` body: the slots plus `action` and `actor`.
fn command_body<T: Serialize>(action: &str, slots: &T) -> Result<Value> {
    let mut body = serde_json::to_value(slots)?;
    if let Value::Object(map) = &mut body {
        map.insert("action".into(), Value::String(action.to_string()));
        map.insert("actor".into(), Value::String(CHAT_ACTOR.to_string()));
    }
    Ok(body)
}

#[async_trait]
impl ChatHandler for Dispatcher {
    async fn handle(&self, request: ChatRequest) -> Result<DispatchOutcome> {
        let started = Instant::now();
        let outcome = self.dispatch(&request).await?;

        tracing::info!(
            trace_id = %request.trace_id,
            lang = request.lang.as_str(),
            failed = outcome.is_failure(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Chat request handled"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::DispatcherBuilder;
    use control_tower_core::{
        config::AppConfig,
        mocks::{MockDownstream, MockLlm, MockReply},
        traits::Backend,
        types::{CreatePoSlots, HistoryTurn, SwitchSupplierSlots},
        Lang,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};

    const NO_MATCH: &str = r#"{"isMatch": false}"#;
    const SHOW_ALL_ORDERS: &str =
        "{ orders { id status produces { name } requires { name } statuses { system status } } }";

    /// Detector with a fixed answer that counts its calls.
    struct FixedDetector {
        name: &'static str,
        intent: Intent,
        calls: AtomicUsize,
    }

    impl FixedDetector {
        fn new(name: &'static str, intent: Intent) -> Arc<Self> {
            Arc::new(Self {
                name,
                intent,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl IntentDetector for FixedDetector {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn detect(&self, _request: &ChatRequest) -> Intent {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.intent.clone()
        }
    }

    fn dispatcher(llm: Arc<MockLlm>, downstream: Arc<MockDownstream>) -> Dispatcher {
        DispatcherBuilder::new()
            .with_llm(llm)
            .with_downstream(downstream)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_default_stage_order() {
        let d = dispatcher(Arc::new(MockLlm::default()), Arc::new(MockDownstream::new()));
        assert_eq!(d.stages(), vec!["sourcing", "action", "what_if"]);
    }

    #[tokio::test]
    async fn test_first_match_short_circuits() {
        let sourcing = FixedDetector::new(
            "sourcing",
            Intent::Sourcing(SourcingIntent::SingleSource(Default::default())),
        );
        let action = FixedDetector::new(
            "action",
            Intent::Action(ActionIntent::CreatePo(CreatePoSlots::default())),
        );
        let what_if = FixedDetector::new(
            "what_if",
            Intent::WhatIf(WhatIfIntent::SwitchSupplier(SwitchSupplierSlots::default())),
        );
        let llm = Arc::new(MockLlm::scripted(&["3 parts are single-sourced."]));
        let downstream = Arc::new(MockDownstream::new().on(
            Backend::Agent,
            AgentCaller::SINGLE_SOURCE_PARTS,
            MockReply::Json(json!({ "parts": [] })),
        ));

        let detectors: Vec<Arc<dyn IntentDetector>> =
            vec![sourcing.clone(), action.clone(), what_if.clone()];
        let d = DispatcherBuilder::new()
            .with_llm(llm.clone())
            .with_downstream(downstream.clone())
            .with_detectors(detectors)
            .build()
            .unwrap();

        let outcome = d.dispatch(&ChatRequest::new("which parts are single source")).await.unwrap();

        assert_eq!(outcome.answer, "3 parts are single-sourced.");
        assert_eq!(outcome.data, Some(json!({ "parts": [] })));
        assert_eq!((sourcing.calls(), action.calls(), what_if.calls()), (1, 0, 0));

        let requests = downstream.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].path, AgentCaller::SINGLE_SOURCE_PARTS);
        // Only the summarizer reached the model.
        assert_eq!(llm.call_count(), 1);
    }

    #[tokio::test]
    async fn test_action_wins_over_what_if() {
        let action = FixedDetector::new(
            "action",
            Intent::Action(ActionIntent::CreatePo(CreatePoSlots {
                part_id: Some("P010".into()),
                supplier_id: Some("S2".into()),
                qty: Some(500),
                order_id: None,
            })),
        );
        let what_if = FixedDetector::new(
            "what_if",
            Intent::WhatIf(WhatIfIntent::SwitchSupplier(SwitchSupplierSlots::default())),
        );
        let downstream = Arc::new(MockDownstream::new().on(
            Backend::Agent,
            AgentCaller::EXECUTE,
            MockReply::Json(json!({ "success": true, "message": "PO created", "auditEventId": "AE-1" })),
        ));

        let detectors: Vec<Arc<dyn IntentDetector>> = vec![
            FixedDetector::new("sourcing", Intent::None),
            action.clone(),
            what_if.clone(),
        ];
        let d = DispatcherBuilder::new()
            .with_llm(Arc::new(MockLlm::scripted(&["PO created."])))
            .with_downstream(downstream.clone())
            .with_detectors(detectors)
            .build()
            .unwrap();

        let outcome = d.dispatch(&ChatRequest::new("order 500 P010 from S2")).await.unwrap();

        assert_eq!(what_if.calls(), 0);
        assert_eq!(downstream.requests_to(Backend::Simulation).len(), 0);
        let body = &downstream.requests()[0].body;
        assert_eq!(
            body,
            &json!({
                "action": "CREATE_PO",
                "actor": CHAT_ACTOR,
                "partId": "P010",
                "supplierId": "S2",
                "qty": 500
            })
        );
        assert!(outcome.query.starts_with("POST /agent/execute"));
    }

    #[tokio::test]
    async fn test_malformed_detector_output_falls_through() {
        let llm = Arc::new(MockLlm::scripted(&[
            "definitely sourcing!",
            r#"{"isMatch": true, "kind": "LAUNCH_ROCKET"}"#,
            r#"{"isMatch": true, "kind": "SWITCH_SUPPLIER", "slots": [1, 2]}"#,
            r#"{"answer": "Try asking about orders or suppliers.", "query": "", "variables": {}}"#,
        ]));
        let downstream = Arc::new(MockDownstream::new());
        let d = dispatcher(llm.clone(), downstream.clone());

        let outcome = d.dispatch(&ChatRequest::new("hello")).await.unwrap();

        assert_eq!(
            outcome,
            DispatchOutcome {
                answer: "Try asking about orders or suppliers.".into(),
                query: String::new(),
                data: None,
            }
        );
        assert_eq!(llm.call_count(), 4);
        assert!(downstream.requests().is_empty());
    }

    #[tokio::test]
    async fn test_show_all_orders_fallback() {
        let llm = Arc::new(MockLlm::scripted(&[
            NO_MATCH,
            NO_MATCH,
            NO_MATCH,
            format!("```json\n{{\"query\": \"{}\", \"variables\": {{}}}}\n```", SHOW_ALL_ORDERS).as_str(),
            "当前共有 1 个订单，状态为生产中。",
        ]));
        let downstream = Arc::new(MockDownstream::new().on_graph(json!({
            "orders": [{ "id": "SO0001", "status": "IN_PRODUCTION" }]
        })));
        let d = dispatcher(llm.clone(), downstream.clone());

        let outcome = d.dispatch(&ChatRequest::new("显示所有订单")).await.unwrap();

        assert_eq!(outcome.query, SHOW_ALL_ORDERS);
        assert_eq!(outcome.answer, "当前共有 1 个订单，状态为生产中。");
        assert_eq!(outcome.data.unwrap()["orders"][0]["id"], "SO0001");
        assert_eq!(
            downstream.requests()[0].body,
            json!({ "query": SHOW_ALL_ORDERS, "variables": {} })
        );
    }

    #[tokio::test]
    async fn test_unparseable_translation_keeps_raw() {
        let llm = Arc::new(MockLlm::scripted(&[NO_MATCH, NO_MATCH, NO_MATCH, "SELECT * FROM orders"]));
        let d = dispatcher(llm, Arc::new(MockDownstream::new()));

        let outcome = d
            .dispatch(&ChatRequest::new("orders?").with_lang(Lang::En))
            .await
            .unwrap();

        assert_eq!(
            outcome.answer,
            "Unable to parse the AI response. Please try rephrasing your question."
        );
        assert_eq!(outcome.query, "SELECT * FROM orders");
        assert_eq!(outcome.data, None);
    }

    #[tokio::test]
    async fn test_model_down_everywhere() {
        let llm = Arc::new(
            MockLlm::default()
                .then_fail("down")
                .then_fail("down")
                .then_fail("down")
                .then_fail("down"),
        );
        let d = dispatcher(llm, Arc::new(MockDownstream::new()));

        let outcome = d.dispatch(&ChatRequest::new("显示所有订单")).await.unwrap();

        assert_eq!(outcome.answer, "AI 服务暂时不可用，请稍后再试。");
        assert_eq!(outcome.query, "");
        assert_eq!(outcome.data, None);
    }

    #[tokio::test]
    async fn test_switch_supplier_gets_default_target() {
        let llm = Arc::new(MockLlm::scripted(&[
            NO_MATCH,
            NO_MATCH,
            r#"{"isMatch": true, "kind": "SWITCH_SUPPLIER", "slots": {"orderId": "SO0001", "partId": "P010", "toSupplierId": null}}"#,
            "Switching to S2 delays delivery by 3 days.",
        ]));
        let downstream = Arc::new(MockDownstream::new().on(
            Backend::Simulation,
            "/simulate/switch-supplier",
            MockReply::Json(json!({ "scenarios": [], "recommended": "B", "blastRadius": {}, "assumptions": [] })),
        ));
        let d = dispatcher(llm, downstream.clone());

        let outcome = d
            .dispatch(&ChatRequest::new("What if SO0001 switches supplier for P010?").with_lang(Lang::En))
            .await
            .unwrap();

        let sim = downstream.requests_to(Backend::Simulation);
        assert_eq!(sim.len(), 1);
        assert_eq!(sim[0].body["toSupplierId"], "S2");
        assert_eq!(sim[0].body["orderId"], "SO0001");
        // Order and part were explicit: no lookup.
        assert!(downstream.requests_to(Backend::Graph).is_empty());
        assert_eq!(outcome.answer, "Switching to S2 delays delivery by 3 days.");
        assert!(outcome.query.starts_with("POST /simulate/switch-supplier {"));
    }

    #[tokio::test]
    async fn test_configured_default_target() {
        let mut config = AppConfig::default();
        config.defaults.to_supplier_id = "S7".into();

        let llm = Arc::new(MockLlm::scripted(&[
            NO_MATCH,
            NO_MATCH,
            r#"{"isMatch": true, "kind": "SWITCH_SUPPLIER", "slots": {"orderId": "SO0001", "partId": "P010"}}"#,
        ]));
        let downstream = Arc::new(MockDownstream::new());
        let d = DispatcherBuilder::new()
            .with_config(&config)
            .with_llm(llm)
            .with_downstream(downstream.clone())
            .build()
            .unwrap();

        d.dispatch(&ChatRequest::new("如果换供应商")).await.unwrap();

        assert_eq!(downstream.requests_to(Backend::Simulation)[0].body["toSupplierId"], "S7");
    }

    #[tokio::test]
    async fn test_downstream_status_is_terminal() {
        let llm = Arc::new(MockLlm::scripted(&[
            r#"{"isMatch": true, "kind": "RFQ_CANDIDATES", "slots": {"partId": "P010", "qty": 1000}}"#,
        ]));
        let downstream = Arc::new(MockDownstream::new().on(
            Backend::Agent,
            AgentCaller::RFQ_CANDIDATES,
            MockReply::Status(503, "scoring engine warming up".into()),
        ));
        let d = dispatcher(llm.clone(), downstream);

        let outcome = d
            .dispatch(&ChatRequest::new("RFQ for P010").with_lang(Lang::En))
            .await
            .unwrap();

        assert_eq!(
            outcome.answer,
            "Backend service returned an error (HTTP 503): scoring engine warming up"
        );
        assert_eq!(outcome.data, None);
        // No summarizer call after a failed backend call.
        assert_eq!(llm.call_count(), 1);
    }

    #[tokio::test]
    async fn test_supplier_check_queries_graph() {
        let llm = Arc::new(MockLlm::scripted(&[
            r#"{"isMatch": true, "kind": "SUPPLIER_CHECK", "slots": {"supplierId": "S3"}}"#,
            "S3 is affected by a port strike.",
        ]));
        let downstream = Arc::new(MockDownstream::new().on_graph(json!({
            "suppliers": [{ "id": "S3", "affectedBy": [{ "type": "STRIKE" }] }]
        })));
        let d = dispatcher(llm, downstream.clone());

        let outcome = d.dispatch(&ChatRequest::new("S3 供应商风险")).await.unwrap();

        let body = &downstream.requests()[0].body;
        assert_eq!(body["variables"], json!({ "id": "S3" }));
        assert!(outcome.query.contains("suppliers(where: { id: $id })"));
        assert_eq!(outcome.answer, "S3 is affected by a port strike.");
    }

    #[test]
    fn test_supplier_check_query_variants() {
        let (query, vars) = supplier_check_query(&SupplierCheckSlots::default());
        assert!(query.contains("affectedBy_SOME"));
        assert_eq!(vars, json!({}));

        let (query, vars) = supplier_check_query(&SupplierCheckSlots {
            supplier_id: None,
            part_id: Some("P010".into()),
        });
        assert!(query.contains("supplies_SOME: { id: $partId }"));
        assert_eq!(vars, json!({ "partId": "P010" }));
    }

    #[tokio::test]
    async fn test_history_reaches_detectors_when_enabled() {
        let mut config = AppConfig::default();
        config.pipeline.use_history = true;

        let llm = Arc::new(MockLlm::scripted(&[
            NO_MATCH,
            NO_MATCH,
            NO_MATCH,
            r#"{"answer": "ok", "query": ""}"#,
        ]));
        let d = DispatcherBuilder::new()
            .with_config(&config)
            .with_llm(llm.clone())
            .with_downstream(Arc::new(MockDownstream::new()))
            .build()
            .unwrap();

        let request = ChatRequest::new("有什么解决方法")
            .with_history(vec![HistoryTurn::user("哪些供应商有风险"), HistoryTurn::assistant("S3")]);
        d.dispatch(&request).await.unwrap();

        for call in llm.calls() {
            assert_eq!(call.len(), 4);
            assert_eq!(call[1].content, "哪些供应商有风险");
        }
    }

    #[tokio::test]
    async fn test_handle_returns_outcome() {
        let llm = Arc::new(MockLlm::scripted(&[NO_MATCH, NO_MATCH, NO_MATCH, r#"{"answer": "hi", "query": ""}"#]));
        let d = dispatcher(llm, Arc::new(MockDownstream::new()));

        let outcome = d.handle(ChatRequest::new("你好")).await.unwrap();

        assert_eq!(outcome, DispatchOutcome::direct("hi"));
    }
}
