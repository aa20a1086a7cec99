//! Warehouse sensors: ambient temperature and a steadily rising ethylene level.

use crate::model::WarehouseSample;
use rand::Rng;

pub const ETHYLENE_START: u32 = 3;
pub const ETHYLENE_MAX: u32 = 10;

/// Temperature in `[18, 24)` °C, truncated to whole degrees.
pub fn temperature<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    rng.gen_range(18.0_f64..24.0).trunc() as u32
}

/// Ethylene for the n-th reading: `3 + n`, capped at 10 ppm.
pub fn ethylene(reading_number: u32) -> u32 {
    ETHYLENE_START.saturating_add(reading_number).min(ETHYLENE_MAX)
}

pub fn sample<R: Rng + ?Sized>(rng: &mut R, reading_number: u32) -> WarehouseSample {
    WarehouseSample {
        temperature: temperature(rng),
        ethylene: ethylene(reading_number),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn ethylene_climbs_then_caps() {
        let series: Vec<u32> = (1..=9).map(ethylene).collect();
        assert_eq!(series, vec![4, 5, 6, 7, 8, 9, 10, 10, 10]);
    }

    #[test]
    fn temperature_range() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..500 {
            assert!((18..=23).contains(&temperature(&mut rng)));
        }
    }
}
