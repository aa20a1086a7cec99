//! Field readings taken at harvest.

use rand::seq::SliceRandom;
use rand::Rng;
use std::ops::RangeInclusive;

pub const SOIL_TYPES: [&str; 6] = ["Loamy", "Sandy", "Clay", "Silty", "Peaty", "Chalky"];

/// Relative humidity, percent.
pub const HUMIDITY_RANGE: RangeInclusive<u32> = 30..=90;

/// Soil chemical concentration, ppm.
pub const CHEMICAL_RANGE: RangeInclusive<u32> = 10..=200;

/// One harvest tick: a humidity value and a chemical value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HarvestSample {
    pub humidity: u32,
    pub chemical: u32,
}

pub fn soil_composition<R: Rng + ?Sized>(rng: &mut R) -> String {
    SOIL_TYPES
        .choose(rng)
        .copied()
        .unwrap_or(SOIL_TYPES[0])
        .to_string()
}

pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> HarvestSample {
    HarvestSample {
        humidity: rng.gen_range(HUMIDITY_RANGE),
        chemical: rng.gen_range(CHEMICAL_RANGE),
    }
}
