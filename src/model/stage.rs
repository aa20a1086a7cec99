use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle stage. Stages advance strictly in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    Harvest,
    Transit,
    Storage,
    Done,
}

impl Stage {
    /// The only stage this one may advance to.
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Harvest => Some(Stage::Transit),
            Stage::Transit => Some(Stage::Storage),
            Stage::Storage => Some(Stage::Done),
            Stage::Done => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Harvest => "HARVEST",
            Stage::Transit => "TRANSIT",
            Stage::Storage => "STORAGE",
            Stage::Done => "DONE",
        };
        f.write_str(name)
    }
}

/// How storage ended: a remediation after spoilage, or completion of monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Charity,
    ColdChamber,
    QuickSale,
    Completed,
}

impl Route {
    /// Routes an operator may pick once spoilage has been detected.
    pub fn is_remediation(self) -> bool {
        !matches!(self, Route::Completed)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Route::Charity => "CHARITY",
            Route::ColdChamber => "COLD_CHAMBER",
            Route::QuickSale => "SALE",
            Route::Completed => "COMPLETED",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_advance_in_order() {
        assert_eq!(Stage::Harvest.next(), Some(Stage::Transit));
        assert_eq!(Stage::Transit.next(), Some(Stage::Storage));
        assert_eq!(Stage::Storage.next(), Some(Stage::Done));
        assert_eq!(Stage::Done.next(), None);
    }

    #[test]
    fn route_from_config_value() {
        let route: Route = serde_json::from_str("\"cold_chamber\"").unwrap();
        assert_eq!(route, Route::ColdChamber);
        assert!(route.is_remediation());
        assert!(!Route::Completed.is_remediation());
    }
}
