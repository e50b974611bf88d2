//! Bedside device simulator.
//!
//! Produces a bounded random walk around the healthy baseline, the way the
//! sensing device publishes readings during development.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use vitals_core::VitalsReading;

const HR_STEP: f64 = 1.0;
const SPO2_STEP: f64 = 0.25;
const TEMP_STEP: f64 = 0.05;

const HR_BOUNDS: (f64, f64) = (60.0, 100.0);
const SPO2_BOUNDS: (f64, f64) = (95.0, 100.0);
const TEMP_BOUNDS: (f64, f64) = (36.0, 37.5);

/// Status the device attaches on its own, before any model runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceStatus {
    Normal,
    Critical,
}

impl DeviceStatus {
    pub fn assess(reading: &VitalsReading) -> Self {
        if reading.heart_rate > 120.0
            || reading.heart_rate < 50.0
            || reading.spo2 < 90.0
            || reading.temperature > 38.5
        {
            DeviceStatus::Critical
        } else {
            DeviceStatus::Normal
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceSample {
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub reading: VitalsReading,
    #[serde(rename = "Status")]
    pub status: DeviceStatus,
}

pub struct DeviceSimulator {
    vitals: VitalsReading,
    rng: StdRng,
}

impl DeviceSimulator {
    /// Start from the baseline. Without a seed the walk is not reproducible.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            vitals: VitalsReading::baseline(),
            rng,
        }
    }

    pub fn tick(&mut self) -> DeviceSample {
        self.vitals.heart_rate = step(&mut self.rng, self.vitals.heart_rate, HR_STEP, HR_BOUNDS);
        self.vitals.spo2 = step(&mut self.rng, self.vitals.spo2, SPO2_STEP, SPO2_BOUNDS);
        self.vitals.temperature =
            step(&mut self.rng, self.vitals.temperature, TEMP_STEP, TEMP_BOUNDS);

        DeviceSample {
            timestamp: Utc::now(),
            reading: VitalsReading::new(
                self.vitals.heart_rate.round(),
                self.vitals.spo2.round(),
                (self.vitals.temperature * 10.0).round() / 10.0,
            ),
            status: DeviceStatus::assess(&self.vitals),
        }
    }
}

impl Iterator for DeviceSimulator {
    type Item = DeviceSample;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.tick())
    }
}

fn step(rng: &mut StdRng, value: f64, max_step: f64, (lo, hi): (f64, f64)) -> f64 {
    (value + rng.gen_range(-max_step..max_step)).clamp(lo, hi)
}
