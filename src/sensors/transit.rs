//! # Transit Journey Simulator
//!
//! A refrigerated truck journey in four phases. Each phase has its own temperature and
//! ethylene profile, and the journey switches phase after every third reading.
//!
//! Temperature follows the phase profile with some continuity from the previous reading.
//! Every reading above 4 °C counts as one unit of temperature exposure. Ethylene is
//! cumulative: it never decreases, and exposure accelerates it.
//!
//! The whole journey is compressed into a short simulation window; [`TransportJourney::journey_info`]
//! maps elapsed real time onto the simulated journey clock.

use chrono::{DateTime, Duration as ChronoDuration, Timelike, Utc};
use rand::Rng;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Real time over which a whole journey is simulated.
pub const SIMULATION_WINDOW: Duration = Duration::from_secs(9);

/// Readings at which each phase begins.
const PHASE_STARTS: [u32; 4] = [0, 3, 6, 9];

const CONTINUITY: f64 = 0.4;
const EXPOSURE_LIMIT: f64 = 4.0;
const TEMPERATURE_BOUNDS: (f64, f64) = (0.0, 25.0);
const ETHYLENE_BOUNDS: (f64, f64) = (0.05, 50.0);

const ORIGIN: (f64, f64) = (28.6139, 77.209);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitPhase {
    Loading,
    Highway,
    CityTraffic,
    Unloading,
}

#[derive(Debug, Clone, Copy)]
struct Profile {
    base: f64,
    variance: f64,
    trend: f64,
}

impl TransitPhase {
    const ALL: [TransitPhase; 4] = [
        TransitPhase::Loading,
        TransitPhase::Highway,
        TransitPhase::CityTraffic,
        TransitPhase::Unloading,
    ];

    fn for_reading(count: u32) -> Self {
        PHASE_STARTS
            .iter()
            .zip(Self::ALL)
            .filter(|(start, _)| count >= **start)
            .map(|(_, phase)| phase)
            .last()
            .unwrap_or(TransitPhase::Loading)
    }

    fn temperature(self) -> Profile {
        match self {
            TransitPhase::Loading => Profile { base: 8.0, variance: 2.0, trend: 0.3 },
            TransitPhase::Highway => Profile { base: 6.0, variance: 1.5, trend: 0.1 },
            TransitPhase::CityTraffic => Profile { base: 12.0, variance: 3.0, trend: 0.4 },
            TransitPhase::Unloading => Profile { base: 15.0, variance: 2.0, trend: 0.5 },
        }
    }

    fn ethylene(self) -> Profile {
        match self {
            TransitPhase::Loading => Profile { base: 0.1, variance: 0.05, trend: 0.02 },
            TransitPhase::Highway => Profile { base: 0.2, variance: 0.1, trend: 0.05 },
            TransitPhase::CityTraffic => Profile { base: 0.5, variance: 0.2, trend: 0.15 },
            TransitPhase::Unloading => Profile { base: 1.0, variance: 0.3, trend: 0.25 },
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            TransitPhase::Loading => "Loading phase - temperature rising from cold storage",
            TransitPhase::Highway => "Highway transport - steady refrigerated conditions",
            TransitPhase::CityTraffic => "City traffic - variable conditions, frequent stops",
            TransitPhase::Unloading => "Unloading phase - exposure to ambient temperature",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum SpoilageLevel {
    Fresh,
    EarlyRipening,
    AdvancedRipening,
    Overripe,
    Spoiled,
}

impl SpoilageLevel {
    fn from_score(score: f64) -> Self {
        if score < 1.0 {
            SpoilageLevel::Fresh
        } else if score < 3.0 {
            SpoilageLevel::EarlyRipening
        } else if score < 6.0 {
            SpoilageLevel::AdvancedRipening
        } else if score < 10.0 {
            SpoilageLevel::Overripe
        } else {
            SpoilageLevel::Spoiled
        }
    }
}

impl fmt::Display for SpoilageLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SpoilageLevel::Fresh => "Fresh",
            SpoilageLevel::EarlyRipening => "Early Ripening",
            SpoilageLevel::AdvancedRipening => "Advanced Ripening",
            SpoilageLevel::Overripe => "Overripe",
            SpoilageLevel::Spoiled => "Spoiled",
        })
    }
}

/// One temperature/ethylene pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TransitReading {
    pub temperature: f64,
    pub ethylene: f64,
    pub phase: TransitPhase,
}

/// Snapshot of journey progress at some point of the simulation window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JourneyInfo {
    /// Percent of the simulation window elapsed, `[0, 100]`.
    pub progress: f64,
    pub total_hours: f64,
    pub phase: TransitPhase,
    /// Journey clock mapped from progress, unix seconds.
    pub simulated_timestamp: i64,
    pub spoilage: SpoilageLevel,
    pub cumulative_ethylene: f64,
    pub temperature_exposure: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct JourneyMetrics {
    pub total_hours: f64,
    pub distance_km: f64,
    pub average_speed_kmh: f64,
    pub fuel_efficiency_kml: f64,
}

/// State of one simulated journey.
#[derive(Debug, Clone)]
pub struct TransportJourney {
    reading_count: u32,
    start: DateTime<Utc>,
    total_hours: f64,
    previous_temperature: f64,
    cumulative_ethylene: f64,
    temperature_exposure: u32,
}

impl TransportJourney {
    /// Starts a journey leaving today between 06:00 and 10:00 UTC and lasting 2.5 to 4.5 hours.
    pub fn new<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>) -> Self {
        let hour = 6 + rng.gen_range(0..4);
        let minute = rng.gen_range(0..60);
        let start = now
            .with_hour(hour)
            .and_then(|t| t.with_minute(minute))
            .and_then(|t| t.with_second(0))
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(now);

        Self {
            reading_count: 0,
            start,
            total_hours: 2.5 + rng.gen::<f64>() * 2.0,
            previous_temperature: 2.0,
            cumulative_ethylene: ETHYLENE_BOUNDS.0,
            temperature_exposure: 0,
        }
    }

    pub fn phase(&self) -> TransitPhase {
        TransitPhase::for_reading(self.reading_count)
    }

    pub fn readings_taken(&self) -> u32 {
        self.reading_count
    }

    pub fn total_hours(&self) -> f64 {
        self.total_hours
    }

    pub fn cumulative_ethylene(&self) -> f64 {
        self.cumulative_ethylene
    }

    pub fn temperature_exposure(&self) -> u32 {
        self.temperature_exposure
    }

    /// Start and end of the journey, unix seconds.
    pub fn timestamps(&self) -> (i64, i64) {
        let millis = (self.total_hours * 3_600_000.0) as i64;
        let end = self.start + ChronoDuration::milliseconds(millis);
        (self.start.timestamp(), end.timestamp())
    }

    fn temperature<R: Rng + ?Sized>(&mut self, rng: &mut R) -> f64 {
        let Profile {
            base,
            variance,
            trend,
        } = self.phase().temperature();
        let jitter = (rng.gen::<f64>() - 0.5) * variance * 2.0;
        let value = base
            + jitter
            + trend * f64::from(self.reading_count)
            + (self.previous_temperature - base) * CONTINUITY;
        let value = value.clamp(TEMPERATURE_BOUNDS.0, TEMPERATURE_BOUNDS.1);

        if value > EXPOSURE_LIMIT {
            self.temperature_exposure += 1;
        }
        self.previous_temperature = value;
        value
    }

    fn ethylene<R: Rng + ?Sized>(&mut self, rng: &mut R) -> f64 {
        let Profile {
            variance, trend, ..
        } = self.phase().ethylene();
        let increase = trend * f64::from(self.reading_count + 1)
            + f64::from(self.temperature_exposure) * 0.02
            + rng.gen::<f64>() * variance
            + self.cumulative_ethylene.powf(0.3) * 0.1;
        self.cumulative_ethylene =
            (self.cumulative_ethylene + increase).clamp(ETHYLENE_BOUNDS.0, ETHYLENE_BOUNDS.1);
        self.cumulative_ethylene
    }

    /// Takes the next temperature and ethylene reading and advances the journey.
    pub fn next_reading<R: Rng + ?Sized>(&mut self, rng: &mut R) -> TransitReading {
        let phase = self.phase();
        let temperature = self.temperature(rng);
        let ethylene = self.ethylene(rng);
        self.reading_count += 1;
        TransitReading {
            temperature,
            ethylene,
            phase,
        }
    }

    pub fn spoilage_level(&self) -> SpoilageLevel {
        let score =
            f64::from(self.temperature_exposure) * 0.1 + self.cumulative_ethylene * 0.2;
        SpoilageLevel::from_score(score)
    }

    /// Maps `elapsed` real time onto the journey.
    pub fn journey_info(&self, elapsed: Duration) -> JourneyInfo {
        let fraction = (elapsed.as_secs_f64() / SIMULATION_WINDOW.as_secs_f64()).min(1.0);
        let offset_ms = (self.total_hours * 3_600_000.0 * fraction) as i64;
        let simulated = self.start + ChronoDuration::milliseconds(offset_ms);

        JourneyInfo {
            progress: fraction * 100.0,
            total_hours: self.total_hours,
            phase: self.phase(),
            simulated_timestamp: simulated.timestamp(),
            spoilage: self.spoilage_level(),
            cumulative_ethylene: self.cumulative_ethylene,
            temperature_exposure: self.temperature_exposure,
        }
    }

    /// Speed, distance and fuel figures for the whole journey.
    pub fn metrics<R: Rng + ?Sized>(&self, rng: &mut R) -> JourneyMetrics {
        let speed = 40.0 + rng.gen::<f64>() * 30.0;
        let fuel = 5.0 + rng.gen::<f64>() * 10.0;
        JourneyMetrics {
            total_hours: round2(self.total_hours),
            distance_km: round2(speed * self.total_hours),
            average_speed_kmh: round2(speed),
            fuel_efficiency_kml: round2(fuel),
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Start and end positions as `"lat,lng"` with six decimals.
pub fn gps_coordinates<R: Rng + ?Sized>(rng: &mut R) -> Vec<String> {
    let start_lat = ORIGIN.0 + (rng.gen::<f64>() - 0.5) * 0.1;
    let start_lng = ORIGIN.1 + (rng.gen::<f64>() - 0.5) * 0.1;
    let end_lat = start_lat + (rng.gen::<f64>() - 0.5) * 0.5;
    let end_lng = start_lng + (rng.gen::<f64>() - 0.5) * 0.5;
    vec![
        format!("{start_lat:.6},{start_lng:.6}"),
        format!("{end_lat:.6},{end_lng:.6}"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn journey(seed: u64) -> (TransportJourney, StdRng) {
        let mut rng = StdRng::seed_from_u64(seed);
        let now = Utc.with_ymd_and_hms(2025, 3, 14, 15, 30, 0).unwrap();
        (TransportJourney::new(&mut rng, now), rng)
    }

    #[test]
    fn journey_starts_in_the_morning_of_the_same_day() {
        for seed in 0..50 {
            let (journey, _) = journey(seed);
            let (start, end) = journey.timestamps();
            let start = Utc.timestamp_opt(start, 0).unwrap();
            assert_eq!(start.date_naive().to_string(), "2025-03-14");
            assert!((6..10).contains(&start.hour()));
            let hours = (end - start.timestamp()) as f64 / 3600.0;
            assert!((2.5..=4.5).contains(&hours), "duration {hours}");
        }
    }

    #[test]
    fn ethylene_never_decreases_and_stays_bounded() {
        let (mut journey, mut rng) = journey(9);
        let mut last = 0.0;
        for _ in 0..40 {
            let reading = journey.next_reading(&mut rng);
            assert!(reading.ethylene >= last);
            assert!((0.05..=50.0).contains(&reading.ethylene));
            assert!((0.0..=25.0).contains(&reading.temperature));
            last = reading.ethylene;
        }
        assert_eq!(journey.cumulative_ethylene(), 50.0);
        assert_eq!(journey.spoilage_level(), SpoilageLevel::Spoiled);
    }

    #[test]
    fn phases_switch_every_third_reading() {
        let (mut journey, mut rng) = journey(1);
        let phases: Vec<TransitPhase> = (0..10).map(|_| journey.next_reading(&mut rng).phase).collect();
        assert_eq!(phases[0], TransitPhase::Loading);
        assert_eq!(phases[2], TransitPhase::Loading);
        assert_eq!(phases[3], TransitPhase::Highway);
        assert_eq!(phases[6], TransitPhase::CityTraffic);
        assert_eq!(phases[9], TransitPhase::Unloading);
    }

    #[test]
    fn fresh_journey_reports_fresh() {
        let (journey, _) = journey(5);
        assert_eq!(journey.spoilage_level(), SpoilageLevel::Fresh);
        assert_eq!(journey.temperature_exposure(), 0);
    }

    #[test]
    fn journey_info_tracks_the_simulation_window() {
        let (journey, _) = journey(2);
        let (start, end) = journey.timestamps();

        let halfway = journey.journey_info(Duration::from_millis(4_500));
        assert!((halfway.progress - 50.0).abs() < 1e-9);
        assert!(halfway.simulated_timestamp > start && halfway.simulated_timestamp < end);

        let after = journey.journey_info(Duration::from_secs(30));
        assert_eq!(after.progress, 100.0);
        assert_eq!(after.simulated_timestamp, end);
    }

    #[test]
    fn metrics_ranges() {
        let (journey, mut rng) = journey(8);
        let m = journey.metrics(&mut rng);
        assert!((40.0..=70.0).contains(&m.average_speed_kmh));
        assert!((5.0..=15.0).contains(&m.fuel_efficiency_kml));
        assert!(m.distance_km > 0.0);
    }

    #[test]
    fn gps_format() {
        let mut rng = StdRng::seed_from_u64(4);
        let coords = gps_coordinates(&mut rng);
        assert_eq!(coords.len(), 2);
        for c in coords {
            let (lat, lng) = c.split_once(',').unwrap();
            assert_eq!(lat.split('.').nth(1).unwrap().len(), 6);
            let lat: f64 = lat.parse().unwrap();
            let lng: f64 = lng.parse().unwrap();
            assert!((lat - 28.6139).abs() < 0.31);
            assert!((lng - 77.209).abs() < 0.31);
        }
    }
}
