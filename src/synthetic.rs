//! Synthetic flights for tests and benchmarking.
//!
//! Generates glider-like tracks (alternating thermal climbs and straight
//! glides) as fixes, tracks, or IGC text that round-trips through the
//! parser.
//!
//! # Example
//!
//! ```rust
//! use glidetrax::synthetic::SyntheticFlight;
//!
//! let flight = SyntheticFlight {
//!     samples: 120,
//!     sample_interval_secs: 2,
//!     ..SyntheticFlight::default()
//! };
//!
//! let track = flight.to_track("track_demo", "#3B82F6");
//! assert_eq!(track.len(), 120);
//! assert_eq!(track.duration_ms(), 238_000);
//! ```

use std::f64::consts::PI;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Timelike, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{Fix, GeoPoint, Track};

/// Meters per degree of latitude (approximately constant).
const METERS_PER_DEG_LAT: f64 = 111_320.0;

/// Airspeed while circling in a thermal (m/s).
const THERMAL_SPEED: f64 = 20.0;
/// Airspeed on a glide (m/s).
const GLIDE_SPEED: f64 = 28.0;
/// Turn rate while circling (rad/s), about one turn every 25 seconds.
const THERMAL_TURN_RATE: f64 = 2.0 * PI / 25.0;

/// Convert meters to degrees of latitude.
fn meters_to_deg_lat(meters: f64) -> f64 {
    meters / METERS_PER_DEG_LAT
}

/// Convert meters to degrees of longitude at a given latitude.
fn meters_to_deg_lng(meters: f64, latitude: f64) -> f64 {
    let meters_per_deg_lng = METERS_PER_DEG_LAT * latitude.to_radians().cos();
    if meters_per_deg_lng.abs() < 1e-10 {
        return 0.0;
    }
    meters / meters_per_deg_lng
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Thermal { climb: f64 },
    Glide { sink: f64 },
}

/// Scenario for one generated flight.
#[derive(Debug, Clone)]
pub struct SyntheticFlight {
    pub pilot: String,
    pub date: NaiveDate,
    /// UTC time of the first fix
    pub start: NaiveTime,
    /// Launch position and altitude
    pub origin: GeoPoint,
    pub sample_interval_secs: u32,
    pub samples: usize,
    /// RNG seed for deterministic reproduction.
    pub seed: u64,
}

impl Default for SyntheticFlight {
    fn default() -> Self {
        Self {
            pilot: "Jane Doe".to_string(),
            date: NaiveDate::from_ymd_opt(2023, 7, 15).unwrap_or_default(),
            start: NaiveTime::from_hms_opt(11, 0, 0).unwrap_or_default(),
            origin: GeoPoint::new(46.0207, 7.7491, 1500.0),
            sample_interval_secs: 1,
            samples: 600,
            seed: 42,
        }
    }
}

impl SyntheticFlight {
    /// Generate the flight's fixes.
    pub fn fixes(&self) -> Vec<Fix> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let start: DateTime<Utc> = self.date.and_time(self.start).and_utc();
        let dt = self.sample_interval_secs.max(1) as f64;

        let mut fixes = Vec::with_capacity(self.samples);
        let mut position = self.origin;
        let mut heading: f64 = rng.gen_range(0.0..(2.0 * PI));
        let mut phase = Phase::Glide { sink: 1.0 };
        let mut phase_left = 0.0;

        for i in 0..self.samples {
            if phase_left <= 0.0 {
                phase = match phase {
                    Phase::Glide { .. } => Phase::Thermal {
                        climb: rng.gen_range(0.8..3.0),
                    },
                    Phase::Thermal { .. } => Phase::Glide {
                        sink: rng.gen_range(0.6..1.4),
                    },
                };
                phase_left = rng.gen_range(60.0..180.0);
            }

            let timestamp = start + Duration::seconds(i as i64 * dt as i64);
            fixes.push(Fix::new(
                timestamp,
                position.latitude,
                position.longitude,
                position.altitude.round(),
            ));

            let (speed, vario) = match phase {
                Phase::Thermal { climb } => {
                    heading += THERMAL_TURN_RATE * dt;
                    (THERMAL_SPEED, climb)
                }
                Phase::Glide { sink } => {
                    heading += rng.gen_range(-0.05..0.05);
                    (GLIDE_SPEED, -sink)
                }
            };
            let distance = speed * dt;
            position.latitude += meters_to_deg_lat(distance * heading.sin());
            position.longitude += meters_to_deg_lng(distance * heading.cos(), position.latitude);
            position.altitude = (position.altitude + vario * dt).max(0.0);
            phase_left -= dt;
        }

        fixes
    }

    /// Generate the flight as a track.
    ///
    /// Panics only if `samples` is 0.
    pub fn to_track(&self, id: &str, color: &str) -> Track {
        let name = format!("{}.igc", id);
        Track::new(id, name, self.pilot.clone(), color, self.fixes())
            .expect("synthetic flight has at least one sample")
    }

    /// Render the flight as IGC text with CRLF line endings.
    pub fn to_igc(&self) -> String {
        let mut igc = String::new();
        igc.push_str("AXXXGTX\r\n");
        igc.push_str(&format!("HFDTE{}\r\n", self.date.format("%d%m%y")));
        igc.push_str(&format!("HFPLTPILOTINCHARGE:{}\r\n", self.pilot));
        igc.push_str("HFGTYGLIDERTYPE:Synthetic\r\n");
        igc.push_str("I00\r\n");

        for fix in self.fixes() {
            igc.push_str(&b_record(&fix));
        }
        igc
    }
}

/// Format a fix as `BHHMMSSDDMMmmmNDDDMMmmmEAPPPPPGGGGG`.
fn b_record(fix: &Fix) -> String {
    let t = fix.timestamp.time();
    let altitude = fix.altitude.round() as i32;
    format!(
        "B{:02}{:02}{:02}{}{}A{:05}{:05}\r\n",
        t.hour(),
        t.minute(),
        t.second(),
        format_angle(fix.latitude, 2, 'N', 'S'),
        format_angle(fix.longitude, 3, 'E', 'W'),
        altitude,
        altitude
    )
}

/// Degrees and thousandths of minutes, e.g. 54.11868 -> `5407121N`.
fn format_angle(value: f64, degree_width: usize, positive: char, negative: char) -> String {
    let milli_minutes = (value.abs() * 60_000.0).round() as u64;
    let degrees = milli_minutes / 60_000;
    let minutes = milli_minutes % 60_000;
    let hemisphere = if value >= 0.0 { positive } else { negative };
    format!(
        "{:0width$}{:05}{}",
        degrees,
        minutes,
        hemisphere,
        width = degree_width
    )
}

/// A track with fixes at the given millisecond offsets, on a straight line.
///
/// Useful when a test needs an exact timeline.
pub fn track_with_timeline(id: &str, offsets_ms: &[i64]) -> Track {
    let start = NaiveDate::from_ymd_opt(2023, 7, 15)
        .and_then(|d| d.and_hms_opt(11, 0, 0))
        .map(|dt| dt.and_utc())
        .unwrap_or_default();
    let fixes = offsets_ms.iter().enumerate().map(|(i, &ms)| {
        Fix::new(
            start + Duration::milliseconds(ms),
            46.0 + i as f64 * 0.001,
            7.5 + i as f64 * 0.001,
            1000.0 + i as f64,
        )
    });
    Track::new(id, format!("{}.igc", id), format!("Pilot {}", id), "#3B82F6", fixes)
        .expect("timeline has at least one offset")
}
