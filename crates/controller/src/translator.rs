//! Fallback query translator.
//!
//! Maps a question that no specialized detector claimed straight into a
//! graph query against the supply-chain schema.

use serde_json::{json, Map, Value};

use control_tower_core::{types::ChatRequest, Lang};

use crate::classifier::{parse_reply, Classifier};

const SCHEMA_DESCRIPTION: &str = r#"Available GraphQL Schema:

Types:
- Factory: id, name; relations: produces -> Product, canBackupWith -> Factory
- Supplier: id, name; relations: supplies -> Part (priority, leadTimeDays), alternativeTo -> Supplier, affectedBy <- RiskEvent
- Part: id, name, partType; relations: components -> Part, suppliedBy <- Supplier, inventoryLots <- InventoryLot, deliveredBy <- Shipment
- Product: id, name; relations: components -> Part, producedBy <- Factory, orders <- Order
- Order: id, status; relations: produces -> Product, requires -> Part, statuses -> SystemRecord
- SystemRecord: system, objectType, objectId, status, updatedAt
- RiskEvent: id, type, severity, date; relations: affects -> Supplier
- Shipment: id, mode, status, eta; relations: delivers -> Part
- InventoryLot: id, location, onHand, reserved; relations: stores -> Part

Filter syntax. Equality uses the bare field name, there is no _EQ suffix:
- Equality: field: "value" (e.g. id: "SO1001", NOT id_EQ)
- List match: field_IN: ["a","b"]
- String: field_CONTAINS, field_STARTS_WITH, field_ENDS_WITH
- Numeric comparison: field_GT, field_GTE, field_LT, field_LTE
- Relation filters: relation_SOME, relation_ALL, relation_NONE (e.g. affectedBy_SOME: { severity_GTE: 1 })

Example mappings:

1. "What is the status of SO1001" / "SO1001 的状态是什么"
   Query: { orders(where: { id: "SO1001" }) { id status statuses { system status updatedAt } } }

2. "Which suppliers have risks" / "哪些供应商有风险"
   Query: { suppliers(where: { affectedBy_SOME: { severity_GTE: 1 } }) { id name affectedBy { id type severity date } } }

3. "Show all orders" / "显示所有订单"
   Query: { orders { id status produces { name } requires { name } statuses { system status } } }

4. "What are the components of BOM-1001" / "BOM-1001 的组件有哪些"
   Query: { parts(where: { id: "BOM-1001" }) { id name partType components { id name partType } } }

5. "Inventory status" / "库存情况"
   Query: { inventoryLots { id location onHand reserved stores { id name } } }

6. "In-transit shipments" / "在途运输"
   Query: { shipments { id mode status eta delivers { id name } } }

Constraints:
- Only return JSON: { "query": "...", "variables": {} }
- The query must be valid GraphQL
- Never use the _EQ suffix for equality filters
- Do not include any explanation, only return JSON
- If the question is vague or not directly about data, infer the most relevant query. If it truly cannot be mapped to any query, return: { "answer": "<a helpful reply>", "query": "", "variables": {} }"#;

fn system_prompt(lang: Lang) -> String {
    match lang {
        Lang::Zh => format!(
            "你是供应链 Control Tower 的数据分析助手。你的任务是将用户的自然语言问题转换为 GraphQL 查询。\n\n{}",
            SCHEMA_DESCRIPTION
        ),
        Lang::En => format!(
            "You are a supply chain Control Tower data analysis assistant. Your task is to convert user natural language questions into GraphQL queries.\n\n{}",
            SCHEMA_DESCRIPTION
        ),
    }
}

/// What the translator made of a question.
#[derive(Debug, Clone, PartialEq)]
pub enum Translation {
    /// A graph query to execute.
    Query { query: String, variables: Value },
    /// The model answered directly because the question maps to no query.
    DirectAnswer(String),
    /// No usable query; `raw` is the model text for diagnostics.
    Unparseable { raw: String },
    /// The model call itself failed.
    Unavailable,
}

impl Translation {
    /// Interpret raw translator output.
    pub fn from_reply(raw: &str) -> Self {
        let parsed: Map<String, Value> = match parse_reply(raw) {
            Some(parsed) => parsed,
            None => {
                return Translation::Unparseable {
                    raw: raw.to_string(),
                }
            }
        };

        let query = parsed
            .get("query")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .trim();

        if query.is_empty() {
            return match parsed.get("answer").and_then(Value::as_str) {
                Some(answer) if !answer.trim().is_empty() => {
                    Translation::DirectAnswer(answer.to_string())
                }
                _ => Translation::Unparseable {
                    raw: raw.to_string(),
                },
            };
        }

        let variables = match parsed.get("variables") {
            Some(v @ Value::Object(_)) => v.clone(),
            _ => json!({}),
        };

        Translation::Query {
            query: query.to_string(),
            variables,
        }
    }
}

/// Natural language to graph query.
pub struct QueryTranslator {
    classifier: Classifier,
}

impl QueryTranslator {
    pub fn new(classifier: Classifier) -> Self {
        Self { classifier }
    }

    pub async fn translate(&self, request: &ChatRequest) -> Translation {
        match self
            .classifier
            .classify(&system_prompt(request.lang), request)
            .await
        {
            Ok(raw) => {
                let translation = Translation::from_reply(&raw);
                if let Translation::Unparseable { .. } = translation {
                    tracing::warn!(trace_id = %request.trace_id, raw = %raw, "Translator reply unusable");
                }
                translation
            }
            Err(e) => {
                tracing::warn!(trace_id = %request.trace_id, error = %e, "Translator call failed");
                Translation::Unavailable
            }
        }
    }
}
