//! Folding capability responses into [`SupportObservation`]s.
//!
//! One response item describes one vehicle through a primary block and an
//! optional `minedVehicleDataOemEligibility` block. Both may carry the VIN,
//! make, model and up to four lists of capability records. Everything is
//! parsed leniently: fields of the wrong type are treated as absent, and
//! items or records that are not objects are skipped.

use serde::Deserialize;
use serde_json::Value;

use crate::{
    models::{capability::CapabilitySupport, identifier::Vin},
    providers::{SupportObservation, lenient},
};

const ELIGIBILITY_BLOCK: &str = "minedVehicleDataOemEligibility";
const ODOMETER_CODE: &str = "5";
const ENGINE_HOURS_CODE: &str = "9";

/// One capability record, e.g. `{"source": "Odometer", "code": 5, "percentageSupported": 92}`.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityRecord {
    #[serde(default, deserialize_with = "lenient::string")]
    pub source: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub percentage_supported: Option<f64>,
}

impl CapabilityRecord {
    fn normalized_source(&self) -> String {
        self.source
            .as_deref()
            .unwrap_or_default()
            .trim()
            .to_lowercase()
    }

    fn normalized_code(&self) -> &str {
        self.code.as_deref().unwrap_or_default().trim()
    }

    pub fn is_odometer(&self) -> bool {
        self.normalized_source() == "odometer" || self.normalized_code() == ODOMETER_CODE
    }

    pub fn is_engine_hours(&self) -> bool {
        self.normalized_source().contains("engine operational time")
            || self.normalized_code() == ENGINE_HOURS_CODE
    }
}

#[derive(Deserialize, Debug, Default)]
struct VehicleRef {
    #[serde(default, deserialize_with = "lenient::string")]
    vin: Option<String>,
}

/// One block of a response item.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityBlock {
    #[serde(default, deserialize_with = "lenient::string")]
    vin: Option<String>,
    #[serde(default, deserialize_with = "lenient::object")]
    vehicle: Option<VehicleRef>,
    #[serde(default, deserialize_with = "lenient::string")]
    make: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    model: Option<String>,
    #[serde(default, deserialize_with = "lenient::objects")]
    overall_engine_data_result: Vec<CapabilityRecord>,
    #[serde(default, deserialize_with = "lenient::objects")]
    top_request_features: Vec<CapabilityRecord>,
    #[serde(default, deserialize_with = "lenient::objects")]
    capabilities: Vec<CapabilityRecord>,
    #[serde(default, deserialize_with = "lenient::objects")]
    supported_data: Vec<CapabilityRecord>,
}

impl CapabilityBlock {
    fn vin(&self) -> Option<&str> {
        non_empty(self.vin.as_deref())
            .or_else(|| non_empty(self.vehicle.as_ref().and_then(|v| v.vin.as_deref())))
    }

    /// Every record of the block, in list order.
    fn records(&self) -> impl Iterator<Item = &CapabilityRecord> {
        self.overall_engine_data_result
            .iter()
            .chain(&self.top_request_features)
            .chain(&self.capabilities)
            .chain(&self.supported_data)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Extracts the item list from a payload: either a bare array or the first
/// present of `result`, `data` and `items`.
pub fn payload_items(payload: Value) -> Vec<Value> {
    match payload {
        Value::Array(items) => items,
        Value::Object(mut map) => ["result", "data", "items"]
            .into_iter()
            .find_map(|key| map.remove(key).filter(|v| !v.is_null()))
            .and_then(|v| match v {
                Value::Array(items) => Some(items),
                _ => None,
            })
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

/// Folds one response item into an observation.
///
/// VIN, make and model are first-non-empty-wins with the primary block
/// scanned first. Capability records are applied block by block, list by
/// list, later records overwriting earlier ones. Items whose VIN does not
/// normalize, or that carry nothing, yield `None`.
pub fn observe_item(item: Value) -> Option<SupportObservation> {
    let eligibility = item
        .get(ELIGIBILITY_BLOCK)
        .cloned()
        .and_then(lenient::object_from_value::<CapabilityBlock>);
    let primary = lenient::object_from_value::<CapabilityBlock>(item)?;
    let blocks: Vec<&CapabilityBlock> = std::iter::once(&primary).chain(eligibility.as_ref()).collect();

    let vin = Vin::normalize(blocks.iter().find_map(|b| b.vin()))?;
    let make = blocks.iter().find_map(|b| non_empty(b.make.as_deref()));
    let model = blocks.iter().find_map(|b| non_empty(b.model.as_deref()));

    let mut support = CapabilitySupport::default();
    if make.is_some() || model.is_some() {
        let joined = format!("{} {}", make.unwrap_or_default(), model.unwrap_or_default());
        let joined = joined.trim();
        support.brand_model = (!joined.is_empty()).then(|| joined.to_string());
    }

    for record in blocks.iter().flat_map(|b| b.records()) {
        let Some(pct) = record.percentage_supported else {
            continue;
        };
        if record.is_odometer() {
            support.odometer_support_pct = Some(pct);
        }
        if record.is_engine_hours() {
            support.engine_hours_support_pct = Some(pct);
        }
    }

    if support == CapabilitySupport::default() {
        return None;
    }
    Some(SupportObservation { vin, support })
}

/// Folds a whole payload, preserving response order.
pub fn observe_payload(payload: Value) -> Vec<SupportObservation> {
    payload_items(payload)
        .into_iter()
        .filter_map(observe_item)
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn accepts_every_payload_envelope() {
        let item = json!({"vin": "v1", "make": "Ford"});
        assert_eq!(payload_items(json!([item.clone()])).len(), 1);
        assert_eq!(payload_items(json!({"result": [item.clone()]})).len(), 1);
        assert_eq!(payload_items(json!({"data": [item.clone(), item.clone()]})).len(), 2);
        assert_eq!(payload_items(json!({"items": [item]})).len(), 1);
        assert!(payload_items(json!({"unexpected": []})).is_empty());
        assert!(payload_items(json!("nope")).is_empty());
    }

    #[test]
    fn primary_block_wins_make_and_model() {
        let obs = observe_item(json!({
            "vin": " 1ftfw1et5dfa12345 ",
            "make": "Ford",
            "minedVehicleDataOemEligibility": {"make": "FORD MOTOR CO", "model": "F-150"}
        }))
        .unwrap();

        assert_eq!(obs.vin.as_str(), "1FTFW1ET5DFA12345");
        assert_eq!(obs.support.brand_model.as_deref(), Some("Ford F-150"));
    }

    #[test]
    fn vin_may_come_from_nested_vehicle_or_eligibility() {
        let nested = observe_item(json!({"vehicle": {"vin": "abc"}, "model": "Sprinter"})).unwrap();
        assert_eq!(nested.vin.as_str(), "ABC");
        assert_eq!(nested.support.brand_model.as_deref(), Some("Sprinter"));

        let from_eligibility = observe_item(json!({
            "make": "Iveco",
            "minedVehicleDataOemEligibility": {"vin": "xyz"}
        }))
        .unwrap();
        assert_eq!(from_eligibility.vin.as_str(), "XYZ");
    }

    #[test]
    fn items_without_usable_vin_are_dropped() {
        assert!(observe_item(json!({"vin": "   ", "make": "Ford"})).is_none());
        assert!(observe_item(json!({"make": "Ford"})).is_none());
        assert!(observe_item(json!(42)).is_none());
    }

    #[test]
    fn matches_capabilities_by_source_or_code() {
        let obs = observe_item(json!({
            "vin": "v1",
            "capabilities": [
                {"source": "  ODOMETER ", "code": "1", "percentageSupported": 70},
                {"source": "Total engine operational time", "percentageSupported": "40.5"},
                {"source": "fuel", "code": 12, "percentageSupported": 99}
            ]
        }))
        .unwrap();
        assert_eq!(obs.support.odometer_support_pct, Some(70.0));
        assert_eq!(obs.support.engine_hours_support_pct, Some(40.5));

        let by_code = observe_item(json!({
            "vin": "v2",
            "supportedData": [
                {"code": 5, "percentageSupported": 11},
                {"code": " 9 ", "percentageSupported": 22}
            ]
        }))
        .unwrap();
        assert_eq!(by_code.support.odometer_support_pct, Some(11.0));
        assert_eq!(by_code.support.engine_hours_support_pct, Some(22.0));
    }

    #[test]
    fn later_records_overwrite_and_null_percentages_are_ignored() {
        let obs = observe_item(json!({
            "vin": "v1",
            "overallEngineDataResult": [{"source": "odometer", "percentageSupported": 10}],
            "topRequestFeatures": [{"source": "odometer", "percentageSupported": null}],
            "capabilities": ["junk", {"code": "5", "percentageSupported": 30}],
            "minedVehicleDataOemEligibility": {
                "supportedData": [{"source": "odometer", "percentageSupported": 50}]
            }
        }))
        .unwrap();
        assert_eq!(obs.support.odometer_support_pct, Some(50.0));
        assert_eq!(obs.support.engine_hours_support_pct, None);
    }

    #[test]
    fn item_with_nothing_to_report_yields_nothing() {
        assert!(observe_item(json!({"vin": "v1", "capabilities": "not a list"})).is_none());
    }
}
