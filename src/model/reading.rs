use serde::{Deserialize, Serialize};
use std::fmt;

/// Freshness in `[0, 100]`. Values outside the range cannot be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct FreshnessScore(u8);

/// A freshness value outside `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Freshness score {0} is outside 0..=100")]
pub struct InvalidFreshness(pub i64);

impl FreshnessScore {
    pub const MAX: u8 = 100;
    pub const PERFECT: FreshnessScore = FreshnessScore(Self::MAX);

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for FreshnessScore {
    type Error = InvalidFreshness;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if (0..=i64::from(Self::MAX)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(InvalidFreshness(value))
        }
    }
}

impl From<FreshnessScore> for u8 {
    fn from(score: FreshnessScore) -> Self {
        score.0
    }
}

impl fmt::Display for FreshnessScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/100", self.0)
    }
}

/// Price and freshness attached to a storage reading.
///
/// Produced by the price predictor or supplied by the operator. The freshness is raw and
/// only validated when the reading is submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Valuation {
    pub price: u64,
    pub freshness: i64,
}

impl Valuation {
    pub fn new(price: u64, freshness: i64) -> Self {
        Self { price, freshness }
    }
}

/// Raw warehouse sensor sample before it becomes a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WarehouseSample {
    pub temperature: u32,
    pub ethylene: u32,
}

/// A numbered warehouse reading as submitted to the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageReading {
    pub id: u32,
    pub temperature: u32,
    pub ethylene: u32,
    pub timestamp: i64,
    pub location: String,
    pub state: String,
    pub spoilage_risk: bool,
}

/// Everything needed to log one storage reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageSubmission {
    pub reading: StorageReading,
    pub price: u64,
    pub freshness_score: FreshnessScore,
}

/// Final store listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreListing {
    pub ethylene_level: u32,
    pub freshness_score: FreshnessScore,
    pub timestamp: i64,
}

/// A sale to a named buyer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sale {
    pub buyer: String,
    pub price: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freshness_bounds() {
        assert_eq!(FreshnessScore::try_from(0).unwrap().value(), 0);
        assert_eq!(FreshnessScore::try_from(100).unwrap().value(), 100);
        assert_eq!(FreshnessScore::try_from(101), Err(InvalidFreshness(101)));
        assert_eq!(FreshnessScore::try_from(-1), Err(InvalidFreshness(-1)));
    }

    #[test]
    fn freshness_rejects_out_of_range_json() {
        assert!(serde_json::from_str::<FreshnessScore>("150").is_err());
        assert_eq!(
            serde_json::from_str::<FreshnessScore>("42").unwrap(),
            FreshnessScore::try_from(42).unwrap()
        );
    }

    #[test]
    fn storage_submission_uses_camel_case() {
        let submission = StorageSubmission {
            reading: StorageReading {
                id: 1,
                temperature: 20,
                ethylene: 4,
                timestamp: 10,
                location: "Main Warehouse".into(),
                state: "WAREHOUSE".into(),
                spoilage_risk: false,
            },
            price: 120,
            freshness_score: FreshnessScore::try_from(90).unwrap(),
        };
        let value = serde_json::to_value(&submission).unwrap();
        assert_eq!(value["freshnessScore"], 90);
        assert_eq!(value["reading"]["spoilageRisk"], false);
    }
}
