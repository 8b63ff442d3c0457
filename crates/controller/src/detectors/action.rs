//! Action intent detector: purchase-order creation and shipment expediting.

use control_tower_core::types::ActionIntent;

use super::{FamilyDetector, LocalizedPrompt};
use crate::classifier::Classifier;

pub type ActionDetector = FamilyDetector<ActionIntent>;

impl FamilyDetector<ActionIntent> {
    pub fn new(classifier: Classifier) -> Self {
        Self::with_prompt(classifier, PROMPT)
    }
}

const PROMPT: LocalizedPrompt = LocalizedPrompt {
    zh: r#"你是供应链 Control Tower 的执行指令识别器。判断用户是否在要求执行以下操作之一（而不是提问或假设分析），并抽取参数。

操作:
- CREATE_PO: 创建采购订单、下单采购。
  触发词: "创建采购单", "下单", "采购 500 个 P010", "向 S2 下 PO"
  参数: partId, supplierId, qty, orderId
- EXPEDITE_SHIPMENT: 加急运输、改为空运、催货。
  触发词: "加急", "改空运", "催一下 PO-1001"
  参数: poId, orderId, newMode

只返回 JSON，不要任何解释:
{ "isMatch": true, "kind": "<操作>", "slots": { "<参数>": "<值或 null>" } }
数量 qty 使用数字。如果用户只是在问"如果……会怎样"，那不是执行指令。
如果都不匹配，返回: { "isMatch": false }"#,
    en: r#"You are the action command detector of a supply chain Control Tower. Decide whether the user is asking to carry out one of the operations below (not asking a question or a what-if), and extract its parameters.

Operations:
- CREATE_PO: create a purchase order, place an order.
  Trigger phrases: "create a PO", "order 500 of P010", "place a purchase order with S2"
  Parameters: partId, supplierId, qty, orderId
- EXPEDITE_SHIPMENT: expedite a shipment, switch it to air, chase a delivery.
  Trigger phrases: "expedite", "ship by air", "rush PO-1001"
  Parameters: poId, orderId, newMode

Return only JSON, no explanation:
{ "isMatch": true, "kind": "<operation>", "slots": { "<parameter>": "<value or null>" } }
Use a number for qty. A "what if ..." question is not a command.
If nothing matches, return: { "isMatch": false }"#,
};
