//! Text formatting helpers shared by the list and detail views.

use chrono::{DateTime, Utc};
use std::fmt;

/// Unix seconds as `YYYY-MM-DD HH:MM:SS UTC`. Out-of-range values print as the raw number.
pub fn format_timestamp(timestamp: i64) -> String {
    match DateTime::<Utc>::from_timestamp(timestamp, 0) {
        Some(at) => at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => timestamp.to_string(),
    }
}

/// Comma-separated values, or `No data` for an empty slice.
pub fn format_array<T: fmt::Display>(values: &[T]) -> String {
    if values.is_empty() {
        return "No data".to_string();
    }
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Difference between the last two prices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceChange {
    pub change: i64,
    pub percentage: f64,
}

impl PriceChange {
    /// `None` with fewer than two prices or a zero previous price.
    pub fn of(prices: &[u64]) -> Option<Self> {
        let [.., previous, current] = prices else {
            return None;
        };
        if *previous == 0 {
            return None;
        }
        let change = *current as i64 - *previous as i64;
        Some(Self {
            change,
            percentage: change as f64 / *previous as f64 * 100.0,
        })
    }
}

impl fmt::Display for PriceChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.change >= 0 { "+" } else { "" };
        write!(f, "{sign}{} ({:.1}%)", self.change, self.percentage)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreshnessGrade {
    Excellent,
    Good,
    Poor,
}

impl FreshnessGrade {
    pub fn of(score: u8) -> Self {
        match score {
            75.. => Self::Excellent,
            50..=74 => Self::Good,
            _ => Self::Poor,
        }
    }
}

impl fmt::Display for FreshnessGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Excellent => write!(f, "Excellent"),
            Self::Good => write!(f, "Good"),
            Self::Poor => write!(f, "Poor"),
        }
    }
}

/// Overall quality of a store listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quality {
    Premium,
    Standard,
    NeedsAttention,
}

impl Quality {
    pub fn assess(ethylene: u32, freshness: u8) -> Self {
        if ethylene < 50 && freshness >= 75 {
            Self::Premium
        } else if ethylene < 100 && freshness >= 50 {
            Self::Standard
        } else {
            Self::NeedsAttention
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Premium => write!(f, "Premium"),
            Self::Standard => write!(f, "Standard"),
            Self::NeedsAttention => write!(f, "Needs Attention"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_render_in_utc() {
        assert_eq!(format_timestamp(0), "1970-01-01 00:00:00 UTC");
        assert_eq!(format_timestamp(1_700_000_000), "2023-11-14 22:13:20 UTC");
    }

    #[test]
    fn empty_arrays_say_no_data() {
        assert_eq!(format_array::<u32>(&[]), "No data");
        assert_eq!(format_array(&[45, 60, 72]), "45, 60, 72");
    }

    #[test]
    fn price_change_compares_last_two_prices() {
        assert_eq!(PriceChange::of(&[]), None);
        assert_eq!(PriceChange::of(&[100]), None);

        let drop = PriceChange::of(&[100, 95, 76]).unwrap();
        assert_eq!(drop.change, -19);
        assert_eq!(drop.to_string(), "-19 (-20.0%)");

        let rise = PriceChange::of(&[80, 84]).unwrap();
        assert_eq!(rise.to_string(), "+4 (5.0%)");
    }

    #[test]
    fn grade_boundaries() {
        assert_eq!(FreshnessGrade::of(100), FreshnessGrade::Excellent);
        assert_eq!(FreshnessGrade::of(75), FreshnessGrade::Excellent);
        assert_eq!(FreshnessGrade::of(74), FreshnessGrade::Good);
        assert_eq!(FreshnessGrade::of(50), FreshnessGrade::Good);
        assert_eq!(FreshnessGrade::of(49), FreshnessGrade::Poor);
    }

    #[test]
    fn quality_needs_both_low_ethylene_and_freshness() {
        assert_eq!(Quality::assess(10, 90), Quality::Premium);
        assert_eq!(Quality::assess(50, 90), Quality::Standard);
        assert_eq!(Quality::assess(10, 60), Quality::Standard);
        assert_eq!(Quality::assess(100, 90), Quality::NeedsAttention);
        assert_eq!(Quality::assess(10, 40), Quality::NeedsAttention);
        assert_eq!(Quality::NeedsAttention.to_string(), "Needs Attention");
    }
}
