//! What-if intent detector: supplier switch, lane change and factory
//! transfer scenarios for the simulation backend.

use control_tower_core::types::WhatIfIntent;

use super::{FamilyDetector, LocalizedPrompt};
use crate::classifier::Classifier;

pub type WhatIfDetector = FamilyDetector<WhatIfIntent>;

impl FamilyDetector<WhatIfIntent> {
    pub fn new(classifier: Classifier) -> Self {
        Self::with_prompt(classifier, PROMPT)
    }
}

const PROMPT: LocalizedPrompt = LocalizedPrompt {
    zh: r#"你是供应链 Control Tower 的假设分析（what-if）识别器。判断用户是否在询问以下某种变更会带来什么影响，并抽取参数。

场景:
- SWITCH_SUPPLIER: 换供应商会怎样。
  触发词: "如果换成 S2", "切换供应商", "换一家供应商"
  参数: orderId, partId, fromSupplierId, toSupplierId, objective
- CHANGE_LANE: 改变运输方式或线路会怎样。
  触发词: "改空运", "换海运", "如果走铁路"
  参数: orderId, partId, supplierId, toLane, objective
- TRANSFER_FACTORY: 把订单转到另一家工厂生产会怎样。
  触发词: "转厂", "换到 F2 生产", "如果在另一个工厂做"
  参数: orderId, fromFactoryId, toFactoryId, objective

objective 取值: "delivery-first"（交期优先）, "cost-first"（成本优先）, "balanced"。
未提到的参数填 null。只返回 JSON，不要任何解释:
{ "isMatch": true, "kind": "<场景>", "slots": { "<参数>": "<值或 null>" } }
如果都不匹配，返回: { "isMatch": false }"#,
    en: r#"You are the what-if scenario detector of a supply chain Control Tower. Decide whether the user is asking about the impact of one of the changes below, and extract its parameters.

Scenarios:
- SWITCH_SUPPLIER: what happens if we switch supplier.
  Trigger phrases: "what if we switch to S2", "change supplier", "use another supplier"
  Parameters: orderId, partId, fromSupplierId, toSupplierId, objective
- CHANGE_LANE: what happens if we change the transport mode or lane.
  Trigger phrases: "ship by air instead", "move to sea freight", "what if we use rail"
  Parameters: orderId, partId, supplierId, toLane, objective
- TRANSFER_FACTORY: what happens if the order is produced at another factory.
  Trigger phrases: "transfer to F2", "produce it in another plant"
  Parameters: orderId, fromFactoryId, toFactoryId, objective

objective is one of "delivery-first", "cost-first", "balanced".
Use null for parameters the user did not mention. Return only JSON, no explanation:
{ "isMatch": true, "kind": "<scenario>", "slots": { "<parameter>": "<value or null>" } }
If nothing matches, return: { "isMatch": false }"#,
};

#[cfg(test)]
mod tests {
    use super::*;
    use control_tower_core::{
        mocks::MockLlm,
        traits::IntentDetector,
        types::{ChatRequest, Intent, SwitchSupplierSlots},
    };
    use std::sync::Arc;

    #[tokio::test]
    async fn test_detects_switch_supplier() {
        let llm = Arc::new(MockLlm::scripted(&[
            r#"{"isMatch": true, "kind": "SWITCH_SUPPLIER", "slots": {"orderId": "SO0003", "partId": "P020", "toSupplierId": null}}"#,
        ]));
        let detector = WhatIfDetector::new(Classifier::new(llm));

        let intent = detector
            .detect(&ChatRequest::new("如果 SO0003 的 P020 换供应商会怎样"))
            .await;

        assert_eq!(
            intent,
            Intent::WhatIf(WhatIfIntent::SwitchSupplier(SwitchSupplierSlots {
                order_id: Some("SO0003".into()),
                part_id: Some("P020".into()),
                ..Default::default()
            }))
        );
    }

    #[tokio::test]
    async fn test_prose_reply_is_no_match() {
        let llm = Arc::new(MockLlm::scripted(&["This looks like a what-if question."]));
        let detector = WhatIfDetector::new(Classifier::new(llm));

        assert_eq!(detector.detect(&ChatRequest::new("hmm")).await, Intent::None);
    }
}
