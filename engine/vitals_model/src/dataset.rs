use serde::{Deserialize, Serialize};
use vitals_core::{FeatureVector, VitalsReading};

/// A reading with its ground-truth label
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabeledVitals {
    pub reading: VitalsReading,
    pub abnormal: bool,
}

// (HR, SpO2, Temp, abnormal)
const TRAINING_ROWS: [(f64, f64, f64, bool); 15] = [
    (78.0, 96.0, 37.2, false),
    (130.0, 88.0, 38.5, true),
    (95.0, 97.0, 36.8, false),
    (110.0, 92.0, 37.9, false),
    (140.0, 85.0, 39.0, true),
    (85.0, 98.0, 36.5, false),
    (72.0, 99.0, 36.6, false),
    (135.0, 87.0, 38.8, true),
    (88.0, 95.0, 37.0, false),
    (145.0, 84.0, 39.2, true),
    (92.0, 96.0, 36.9, false),
    (125.0, 89.0, 38.2, true),
    (68.0, 98.0, 36.4, false),
    (150.0, 82.0, 39.5, true),
    (98.0, 94.0, 37.1, false),
];

/// The fixed labelled dataset the startup classifier is fitted on.
pub fn training_set() -> Vec<LabeledVitals> {
    TRAINING_ROWS
        .iter()
        .map(|&(hr, spo2, temp, abnormal)| LabeledVitals {
            reading: VitalsReading::new(hr, spo2, temp),
            abnormal,
        })
        .collect()
}

/// Split into feature rows and labels.
pub fn to_columns(samples: &[LabeledVitals]) -> (Vec<FeatureVector>, Vec<bool>) {
    samples
        .iter()
        .map(|s| (s.reading.features(), s.abnormal))
        .unzip()
}
