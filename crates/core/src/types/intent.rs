use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::slots::*;

// =============================================================================
// Intent Types (Detector Output)
// =============================================================================

/// Classified category of a chat message.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    Sourcing(SourcingIntent),
    Action(ActionIntent),
    WhatIf(WhatIfIntent),
    /// No specialized detector matched.
    None,
}

impl Intent {
    /// Family label used in logs and metrics.
    pub fn family(&self) -> &'static str {
        match self {
            Intent::Sourcing(_) => SourcingIntent::FAMILY,
            Intent::Action(_) => ActionIntent::FAMILY,
            Intent::WhatIf(_) => WhatIfIntent::FAMILY,
            Intent::None => "none",
        }
    }

    /// Wire name of the kind, e.g. `SWITCH_SUPPLIER`.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Intent::Sourcing(i) => i.kind().as_str(),
            Intent::Action(i) => i.kind().as_str(),
            Intent::WhatIf(i) => i.kind().as_str(),
            Intent::None => "NONE",
        }
    }

    pub fn is_match(&self) -> bool {
        !matches!(self, Intent::None)
    }
}

/// A family of intents recognized by one detector.
///
/// Ties the wire `kind` enum to the typed slot payloads so that detectors can
/// validate model output generically.
pub trait IntentFamily: Sized {
    /// Wire-level kind discriminator.
    type Kind: DeserializeOwned + Copy + std::fmt::Debug + Send;

    /// Family label used in logs and metrics.
    const FAMILY: &'static str;

    /// Build a typed intent from a kind and the raw slot object.
    ///
    /// Fails when the slots do not fit the kind's schema.
    fn from_slots(kind: Self::Kind, slots: Value) -> serde_json::Result<Self>;

    fn into_intent(self) -> Intent;
}

/// Decode a slot object. Null is an empty object; arrays and scalars are
/// rejected rather than read positionally.
fn decode<T: DeserializeOwned>(slots: Value) -> serde_json::Result<T> {
    match slots {
        Value::Null => serde_json::from_value(Value::Object(Default::default())),
        Value::Object(_) => serde_json::from_value(slots),
        other => Err(serde::de::Error::custom(format!(
            "slots must be an object, got {}",
            other
        ))),
    }
}

// =============================================================================
// Sourcing
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourcingKind {
    RfqCandidates,
    SingleSource,
    ConsolidatePo,
    SupplierCheck,
}

impl SourcingKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SourcingKind::RfqCandidates => "RFQ_CANDIDATES",
            SourcingKind::SingleSource => "SINGLE_SOURCE",
            SourcingKind::ConsolidatePo => "CONSOLIDATE_PO",
            SourcingKind::SupplierCheck => "SUPPLIER_CHECK",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SourcingIntent {
    RfqCandidates(RfqSlots),
    SingleSource(SingleSourceSlots),
    ConsolidatePo(ConsolidateSlots),
    SupplierCheck(SupplierCheckSlots),
}

impl SourcingIntent {
    pub fn kind(&self) -> SourcingKind {
        match self {
            SourcingIntent::RfqCandidates(_) => SourcingKind::RfqCandidates,
            SourcingIntent::SingleSource(_) => SourcingKind::SingleSource,
            SourcingIntent::ConsolidatePo(_) => SourcingKind::ConsolidatePo,
            SourcingIntent::SupplierCheck(_) => SourcingKind::SupplierCheck,
        }
    }
}

impl IntentFamily for SourcingIntent {
    type Kind = SourcingKind;
    const FAMILY: &'static str = "sourcing";

    fn from_slots(kind: SourcingKind, slots: Value) -> serde_json::Result<Self> {
        Ok(match kind {
            SourcingKind::RfqCandidates => SourcingIntent::RfqCandidates(decode(slots)?),
            SourcingKind::SingleSource => SourcingIntent::SingleSource(decode(slots)?),
            SourcingKind::ConsolidatePo => SourcingIntent::ConsolidatePo(decode(slots)?),
            SourcingKind::SupplierCheck => SourcingIntent::SupplierCheck(decode(slots)?),
        })
    }

    fn into_intent(self) -> Intent {
        Intent::Sourcing(self)
    }
}

// =============================================================================
// Action
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    CreatePo,
    ExpediteShipment,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::CreatePo => "CREATE_PO",
            ActionKind::ExpediteShipment => "EXPEDITE_SHIPMENT",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActionIntent {
    CreatePo(CreatePoSlots),
    ExpediteShipment(ExpediteSlots),
}

impl ActionIntent {
    pub fn kind(&self) -> ActionKind {
        match self {
            ActionIntent::CreatePo(_) => ActionKind::CreatePo,
            ActionIntent::ExpediteShipment(_) => ActionKind::ExpediteShipment,
        }
    }
}

impl IntentFamily for ActionIntent {
    type Kind = ActionKind;
    const FAMILY: &'static str = "action";

    fn from_slots(kind: ActionKind, slots: Value) -> serde_json::Result<Self> {
        Ok(match kind {
            ActionKind::CreatePo => ActionIntent::CreatePo(decode(slots)?),
            ActionKind::ExpediteShipment => ActionIntent::ExpediteShipment(decode(slots)?),
        })
    }

    fn into_intent(self) -> Intent {
        Intent::Action(self)
    }
}

// =============================================================================
// What-if
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WhatIfKind {
    SwitchSupplier,
    ChangeLane,
    TransferFactory,
}

impl WhatIfKind {
    pub fn as_str(self) -> &'static str {
        match self {
            WhatIfKind::SwitchSupplier => "SWITCH_SUPPLIER",
            WhatIfKind::ChangeLane => "CHANGE_LANE",
            WhatIfKind::TransferFactory => "TRANSFER_FACTORY",
        }
    }

    /// Simulation endpoint for this scenario.
    pub fn simulation_path(self) -> &'static str {
        match self {
            WhatIfKind::SwitchSupplier => "/simulate/switch-supplier",
            WhatIfKind::ChangeLane => "/simulate/change-lane",
            WhatIfKind::TransferFactory => "/simulate/transfer-factory",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WhatIfIntent {
    SwitchSupplier(SwitchSupplierSlots),
    ChangeLane(ChangeLaneSlots),
    TransferFactory(TransferFactorySlots),
}

impl WhatIfIntent {
    pub fn kind(&self) -> WhatIfKind {
        match self {
            WhatIfIntent::SwitchSupplier(_) => WhatIfKind::SwitchSupplier,
            WhatIfIntent::ChangeLane(_) => WhatIfKind::ChangeLane,
            WhatIfIntent::TransferFactory(_) => WhatIfKind::TransferFactory,
        }
    }

    /// Request body for the simulation backend.
    pub fn body(&self) -> serde_json::Result<Value> {
        match self {
            WhatIfIntent::SwitchSupplier(s) => serde_json::to_value(s),
            WhatIfIntent::ChangeLane(s) => serde_json::to_value(s),
            WhatIfIntent::TransferFactory(s) => serde_json::to_value(s),
        }
    }
}

impl IntentFamily for WhatIfIntent {
    type Kind = WhatIfKind;
    const FAMILY: &'static str = "what_if";

    fn from_slots(kind: WhatIfKind, slots: Value) -> serde_json::Result<Self> {
        Ok(match kind {
            WhatIfKind::SwitchSupplier => WhatIfIntent::SwitchSupplier(decode(slots)?),
            WhatIfKind::ChangeLane => WhatIfIntent::ChangeLane(decode(slots)?),
            WhatIfKind::TransferFactory => WhatIfIntent::TransferFactory(decode(slots)?),
        })
    }

    fn into_intent(self) -> Intent {
        Intent::WhatIf(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_wire_names() {
        let kind: SourcingKind = serde_json::from_str("\"RFQ_CANDIDATES\"").unwrap();
        assert_eq!(kind, SourcingKind::RfqCandidates);
        let kind: ActionKind = serde_json::from_str("\"EXPEDITE_SHIPMENT\"").unwrap();
        assert_eq!(kind.as_str(), "EXPEDITE_SHIPMENT");
        assert!(serde_json::from_str::<WhatIfKind>("\"SWITCH\"").is_err());
    }

    #[test]
    fn test_from_slots_null_is_empty() {
        let intent = SourcingIntent::from_slots(SourcingKind::SingleSource, Value::Null).unwrap();
        assert_eq!(intent, SourcingIntent::SingleSource(SingleSourceSlots::default()));
    }

    #[test]
    fn test_from_slots_rejects_non_object() {
        assert!(WhatIfIntent::from_slots(WhatIfKind::ChangeLane, json!("SO1")).is_err());
        assert!(WhatIfIntent::from_slots(WhatIfKind::SwitchSupplier, json!([1, 2])).is_err());
        assert!(ActionIntent::from_slots(ActionKind::CreatePo, json!(["P010", "S2", 5])).is_err());
        assert!(SourcingIntent::from_slots(SourcingKind::SingleSource, json!(3)).is_err());
    }

    #[test]
    fn test_family_and_kind_names() {
        let intent = WhatIfIntent::from_slots(
            WhatIfKind::TransferFactory,
            json!({ "orderId": "SO0003", "toFactoryId": "F2" }),
        )
        .unwrap()
        .into_intent();

        assert_eq!(intent.family(), "what_if");
        assert_eq!(intent.kind_name(), "TRANSFER_FACTORY");
        assert!(intent.is_match());
        assert!(!Intent::None.is_match());
    }
}
