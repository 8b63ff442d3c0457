//! Slot defaulting for what-if and sourcing intents.
//!
//! Missing identifiers are filled from the first at-risk order in the graph,
//! then from the configured static defaults. Part and supplier hints are only
//! used for the order they came from. Defaulting never fails.

use serde_json::Value;

use control_tower_core::{
    config::SlotDefaults,
    types::{SourcingIntent, WhatIfIntent},
};
use control_tower_downstream::GraphQueryCaller;

/// Graph query for the at-risk order used as a defaulting hint.
pub const AT_RISK_LOOKUP: &str = "{ ordersAtRisk { id requires { id suppliedBy { id } } } }";

/// Identifiers taken from the first at-risk order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AtRiskHint {
    pub order_id: Option<String>,
    pub part_id: Option<String>,
    pub supplier_id: Option<String>,
}

impl AtRiskHint {
    /// Read the hint out of an `ordersAtRisk` response.
    pub fn from_data(data: &Value) -> Self {
        let order = data.get("ordersAtRisk").and_then(|o| o.get(0));
        let part = order.and_then(|o| o.get("requires")).and_then(|p| p.get(0));
        let supplier = part.and_then(|p| p.get("suppliedBy")).and_then(|s| s.get(0));

        Self {
            order_id: order.and_then(id_of),
            part_id: part.and_then(id_of),
            supplier_id: supplier.and_then(id_of),
        }
    }
}

fn id_of(node: &Value) -> Option<String> {
    match node.get("id")? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Issues the at-risk lookup at most once.
struct LazyHint<'a> {
    graph: &'a GraphQueryCaller,
    hint: Option<AtRiskHint>,
}

impl<'a> LazyHint<'a> {
    fn new(graph: &'a GraphQueryCaller) -> Self {
        Self { graph, hint: None }
    }

    async fn get(&mut self) -> &AtRiskHint {
        if self.hint.is_none() {
            let hint = match self.graph.lookup(AT_RISK_LOOKUP).await {
                Some(data) => AtRiskHint::from_data(&data),
                None => AtRiskHint::default(),
            };
            tracing::debug!(hint = ?hint, "At-risk lookup");
            self.hint = Some(hint);
        }
        self.hint.get_or_insert_with(AtRiskHint::default)
    }
}

/// Fill `slot` from the lookup, then from `fallback`.
async fn fill_looked_up(
    slot: &mut Option<String>,
    hint: &mut LazyHint<'_>,
    pick: fn(&AtRiskHint) -> Option<String>,
    fallback: &str,
) {
    if slot.is_none() {
        let looked_up = pick(hint.get().await);
        *slot = Some(looked_up.unwrap_or_else(|| fallback.to_string()));
    }
}

/// Fill `slot` from the lookup only when the hint describes the same order
/// (and part, if given) the intent is about; otherwise from `fallback`.
async fn fill_related(
    slot: &mut Option<String>,
    hint: &mut LazyHint<'_>,
    order_id: Option<&str>,
    part_id: Option<&str>,
    pick: fn(&AtRiskHint) -> Option<String>,
    fallback: &str,
) {
    if slot.is_none() {
        let h = hint.get().await;
        let same_order = h.order_id.is_some() && h.order_id.as_deref() == order_id;
        let same_part = part_id.is_none() || h.part_id.as_deref() == part_id;
        let looked_up = if same_order && same_part { pick(h) } else { None };
        *slot = Some(looked_up.unwrap_or_else(|| fallback.to_string()));
    }
}

fn fill_static(slot: &mut Option<String>, fallback: &str) {
    if slot.is_none() {
        *slot = Some(fallback.to_string());
    }
}

fn hint_order(h: &AtRiskHint) -> Option<String> {
    h.order_id.clone()
}

fn hint_part(h: &AtRiskHint) -> Option<String> {
    h.part_id.clone()
}

fn hint_supplier(h: &AtRiskHint) -> Option<String> {
    h.supplier_id.clone()
}

/// Fills required-but-missing slots.
#[derive(Clone)]
pub struct SlotDefaulter {
    graph: GraphQueryCaller,
    defaults: SlotDefaults,
}

impl SlotDefaulter {
    pub fn new(graph: GraphQueryCaller, defaults: SlotDefaults) -> Self {
        Self { graph, defaults }
    }

    pub async fn fill_what_if(&self, intent: WhatIfIntent) -> WhatIfIntent {
        let d = &self.defaults;
        let mut hint = LazyHint::new(&self.graph);

        match intent {
            WhatIfIntent::SwitchSupplier(mut s) => {
                fill_looked_up(&mut s.order_id, &mut hint, hint_order, &d.order_id).await;
                let order = s.order_id.clone();
                fill_related(&mut s.part_id, &mut hint, order.as_deref(), None, hint_part, &d.part_id)
                    .await;
                fill_static(&mut s.to_supplier_id, &d.to_supplier_id);
                fill_static(&mut s.objective, &d.objective);
                WhatIfIntent::SwitchSupplier(s)
            }
            WhatIfIntent::ChangeLane(mut s) => {
                fill_looked_up(&mut s.order_id, &mut hint, hint_order, &d.order_id).await;
                let order = s.order_id.clone();
                fill_related(&mut s.part_id, &mut hint, order.as_deref(), None, hint_part, &d.part_id)
                    .await;
                let part = s.part_id.clone();
                fill_related(
                    &mut s.supplier_id,
                    &mut hint,
                    order.as_deref(),
                    part.as_deref(),
                    hint_supplier,
                    &d.supplier_id,
                )
                .await;
                fill_static(&mut s.to_lane, &d.to_lane);
                fill_static(&mut s.objective, &d.objective);
                WhatIfIntent::ChangeLane(s)
            }
            WhatIfIntent::TransferFactory(mut s) => {
                fill_looked_up(&mut s.order_id, &mut hint, hint_order, &d.order_id).await;
                fill_static(&mut s.to_factory_id, &d.to_factory_id);
                fill_static(&mut s.objective, &d.objective);
                WhatIfIntent::TransferFactory(s)
            }
        }
    }

    pub async fn fill_sourcing(&self, intent: SourcingIntent) -> SourcingIntent {
        let d = &self.defaults;
        let mut hint = LazyHint::new(&self.graph);

        match intent {
            SourcingIntent::RfqCandidates(mut s) => {
                fill_looked_up(&mut s.part_id, &mut hint, hint_part, &d.part_id).await;
                fill_static(&mut s.factory_id, &d.factory_id);
                SourcingIntent::RfqCandidates(s)
            }
            SourcingIntent::ConsolidatePo(mut s) => {
                fill_looked_up(&mut s.part_id, &mut hint, hint_part, &d.part_id).await;
                SourcingIntent::ConsolidatePo(s)
            }
            other @ (SourcingIntent::SingleSource(_) | SourcingIntent::SupplierCheck(_)) => other,
        }
    }
}
