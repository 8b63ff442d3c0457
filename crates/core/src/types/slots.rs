use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

// =============================================================================
// Slot Schemas
// =============================================================================
//
// One struct per intent kind. Every field is optional: the model may not
// extract it, and Slot Defaulting fills the ones a backend needs. Wire names
// are camelCase, matching both the classifier prompts and the backend bodies.

/// RFQ candidate scoring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RfqSlots {
    #[serde(default, deserialize_with = "opt_id", skip_serializing_if = "Option::is_none")]
    pub part_id: Option<String>,
    #[serde(default, deserialize_with = "opt_id", skip_serializing_if = "Option::is_none")]
    pub factory_id: Option<String>,
    #[serde(default, deserialize_with = "opt_u32", skip_serializing_if = "Option::is_none")]
    pub qty: Option<u32>,
    #[serde(default, deserialize_with = "opt_id", skip_serializing_if = "Option::is_none")]
    pub need_by_date: Option<String>,
    #[serde(default, deserialize_with = "opt_id", skip_serializing_if = "Option::is_none")]
    pub objective: Option<String>,
}

/// Single-source part governance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleSourceSlots {
    #[serde(default, deserialize_with = "opt_u32", skip_serializing_if = "Option::is_none")]
    pub threshold: Option<u32>,
}

/// MOQ purchase-order consolidation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidateSlots {
    #[serde(default, deserialize_with = "opt_id", skip_serializing_if = "Option::is_none")]
    pub part_id: Option<String>,
    #[serde(default, deserialize_with = "opt_u32", skip_serializing_if = "Option::is_none")]
    pub horizon_days: Option<u32>,
    #[serde(default, deserialize_with = "opt_id", skip_serializing_if = "Option::is_none")]
    pub policy: Option<String>,
}

/// Supplier status / risk check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierCheckSlots {
    #[serde(default, deserialize_with = "opt_id", skip_serializing_if = "Option::is_none")]
    pub supplier_id: Option<String>,
    #[serde(default, deserialize_with = "opt_id", skip_serializing_if = "Option::is_none")]
    pub part_id: Option<String>,
}

/// Create a purchase order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePoSlots {
    #[serde(default, deserialize_with = "opt_id", skip_serializing_if = "Option::is_none")]
    pub part_id: Option<String>,
    #[serde(default, deserialize_with = "opt_id", skip_serializing_if = "Option::is_none")]
    pub supplier_id: Option<String>,
    #[serde(default, deserialize_with = "opt_u32", skip_serializing_if = "Option::is_none")]
    pub qty: Option<u32>,
    #[serde(default, deserialize_with = "opt_id", skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
}

/// Expedite the shipment behind a purchase order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpediteSlots {
    #[serde(default, deserialize_with = "opt_id", skip_serializing_if = "Option::is_none")]
    pub po_id: Option<String>,
    #[serde(default, deserialize_with = "opt_id", skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(default, deserialize_with = "opt_id", skip_serializing_if = "Option::is_none")]
    pub new_mode: Option<String>,
}

/// What-if: move a part of an order to another supplier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchSupplierSlots {
    #[serde(default, deserialize_with = "opt_id", skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(default, deserialize_with = "opt_id", skip_serializing_if = "Option::is_none")]
    pub part_id: Option<String>,
    #[serde(default, deserialize_with = "opt_id", skip_serializing_if = "Option::is_none")]
    pub from_supplier_id: Option<String>,
    #[serde(default, deserialize_with = "opt_id", skip_serializing_if = "Option::is_none")]
    pub to_supplier_id: Option<String>,
    #[serde(default, deserialize_with = "opt_id", skip_serializing_if = "Option::is_none")]
    pub objective: Option<String>,
}

/// What-if: ship a part over a different lane (Ocean/Air).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeLaneSlots {
    #[serde(default, deserialize_with = "opt_id", skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(default, deserialize_with = "opt_id", skip_serializing_if = "Option::is_none")]
    pub part_id: Option<String>,
    #[serde(default, deserialize_with = "opt_id", skip_serializing_if = "Option::is_none")]
    pub supplier_id: Option<String>,
    #[serde(default, deserialize_with = "opt_id", skip_serializing_if = "Option::is_none")]
    pub to_lane: Option<String>,
    #[serde(default, deserialize_with = "opt_id", skip_serializing_if = "Option::is_none")]
    pub objective: Option<String>,
}

/// What-if: build an order in a different factory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferFactorySlots {
    #[serde(default, deserialize_with = "opt_id", skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(default, deserialize_with = "opt_id", skip_serializing_if = "Option::is_none")]
    pub from_factory_id: Option<String>,
    #[serde(default, deserialize_with = "opt_id", skip_serializing_if = "Option::is_none")]
    pub to_factory_id: Option<String>,
    #[serde(default, deserialize_with = "opt_id", skip_serializing_if = "Option::is_none")]
    pub objective: Option<String>,
}

// =============================================================================
// Lenient scalar decoding
// =============================================================================

/// Identifier-like slot: string or number, blank and `"null"` mean absent.
fn opt_id<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
                Ok(None)
            } else {
                Ok(Some(trimmed.to_string()))
            }
        }
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(de::Error::custom(format!(
            "expected string or number slot, got {}",
            other
        ))),
    }
}

/// Quantity-like slot: non-negative integer, possibly sent as a string.
fn opt_u32<'de, D>(deserializer: D) -> std::result::Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => {
            if let Some(v) = n.as_u64() {
                return u32::try_from(v).map(Some).map_err(de::Error::custom);
            }
            match n.as_f64() {
                Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64 => {
                    Ok(Some(f as u32))
                }
                _ => Err(de::Error::custom(format!("invalid quantity {}", n))),
            }
        }
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
                return Ok(None);
            }
            trimmed.parse::<u32>().map(Some).map_err(de::Error::custom)
        }
        Some(other) => Err(de::Error::custom(format!(
            "expected numeric slot, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ids_accept_numbers_and_blank() {
        let slots: SwitchSupplierSlots = serde_json::from_value(json!({
            "orderId": 1001,
            "partId": "  P010 ",
            "toSupplierId": "",
            "objective": null
        }))
        .unwrap();

        assert_eq!(slots.order_id.as_deref(), Some("1001"));
        assert_eq!(slots.part_id.as_deref(), Some("P010"));
        assert_eq!(slots.to_supplier_id, None);
        assert_eq!(slots.objective, None);
        assert_eq!(slots.from_supplier_id, None);
    }

    #[test]
    fn test_quantity_from_string() {
        let slots: CreatePoSlots =
            serde_json::from_value(json!({ "qty": "500", "partId": "P010" })).unwrap();
        assert_eq!(slots.qty, Some(500));

        let slots: CreatePoSlots = serde_json::from_value(json!({ "qty": 250.0 })).unwrap();
        assert_eq!(slots.qty, Some(250));
    }

    #[test]
    fn test_bad_quantity_rejected() {
        assert!(serde_json::from_value::<CreatePoSlots>(json!({ "qty": "lots" })).is_err());
        assert!(serde_json::from_value::<CreatePoSlots>(json!({ "qty": -3 })).is_err());
        assert!(serde_json::from_value::<RfqSlots>(json!({ "partId": ["P1"] })).is_err());
    }

    #[test]
    fn test_serialize_skips_absent() {
        let slots = ChangeLaneSlots {
            order_id: Some("SO0001".into()),
            to_lane: Some("Air".into()),
            ..Default::default()
        };
        let value = serde_json::to_value(&slots).unwrap();
        assert_eq!(value, json!({ "orderId": "SO0001", "toLane": "Air" }));
    }
}
