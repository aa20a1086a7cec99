use serde::{Deserialize, Serialize};
use std::fmt;

use super::FreshnessScore;

/// Sequential apple identifier. The first apple is `apple_0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppleId(pub u64);

impl AppleId {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl From<u64> for AppleId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for AppleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "apple_{}", self.0)
    }
}

/// Harvest attributes captured when the record is created.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarvestData {
    pub soil_composition: String,
    pub humidity: Vec<u32>,
    pub chemicals: Vec<u32>,
    pub timestamp: i64,
}

/// Transit attributes. Logged at most once per apple.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportLog {
    pub start_timestamp: i64,
    pub end_timestamp: i64,
    pub gps_coordinates: Vec<String>,
    pub temperatures: Vec<u32>,
    pub ethylene_levels: Vec<u32>,
}

impl TransportLog {
    /// Journey length in whole minutes.
    pub fn duration_minutes(&self) -> i64 {
        (self.end_timestamp - self.start_timestamp) / 60
    }
}

/// One committed warehouse reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarehouseLog {
    pub temperature: u32,
    pub ethylene_level: u32,
    pub freshness_score: FreshnessScore,
    pub location: String,
    pub timestamp: i64,
}

/// Store listing and sale state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreData {
    pub ethylene_level: u32,
    pub freshness_score: FreshnessScore,
    pub timestamp: i64,
    pub sold: bool,
    #[serde(default)]
    pub buyer: Option<String>,
    #[serde(default)]
    pub sold_at: Option<i64>,
}

impl StoreData {
    /// A listing has been logged when its timestamp is set.
    pub fn is_listed(&self) -> bool {
        self.timestamp > 0
    }
}

/// The authoritative record of one apple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppleRecord {
    pub id: AppleId,
    pub harvest: HarvestData,
    #[serde(default)]
    pub transport: Option<TransportLog>,
    #[serde(default)]
    pub warehouse_logs: Vec<WarehouseLog>,
    #[serde(default)]
    pub store: StoreData,
    #[serde(default)]
    pub prices: Vec<u64>,
    #[serde(default)]
    pub freshness_history: Vec<u8>,
}

impl AppleRecord {
    pub fn new(id: AppleId, harvest: HarvestData) -> Self {
        Self {
            id,
            harvest,
            transport: None,
            warehouse_logs: Vec::new(),
            store: StoreData::default(),
            prices: Vec::new(),
            freshness_history: Vec::new(),
        }
    }

    /// Latest entry of the price history.
    pub fn current_price(&self) -> Option<u64> {
        self.prices.last().copied()
    }

    pub fn is_sold(&self) -> bool {
        self.store.sold
    }

    pub fn has_transport(&self) -> bool {
        self.transport.is_some()
    }
}

/// Payload that creates a new apple record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateApple {
    pub soil_composition: String,
    pub humidity: Vec<u32>,
    pub chemicals: Vec<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apple_id_display_and_wire_form() {
        let id = AppleId::from(7);
        assert_eq!(id.to_string(), "apple_7");
        assert_eq!(serde_json::to_string(&id).unwrap(), "7");
    }

    #[test]
    fn record_deserializes_with_missing_sections() {
        let json = r#"{
            "id": 3,
            "harvest": {"soilComposition": "Loamy", "humidity": [40], "chemicals": [20], "timestamp": 1700000000}
        }"#;
        let record: AppleRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, AppleId(3));
        assert!(!record.has_transport());
        assert!(record.warehouse_logs.is_empty());
        assert!(!record.store.is_listed());
        assert_eq!(record.current_price(), None);
    }
}
