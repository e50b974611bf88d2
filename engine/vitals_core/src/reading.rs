use serde::{Deserialize, Serialize};

/// Number of features the classifier consumes
pub const N_FEATURES: usize = 3;

/// Feature order shared by the classifier, the scaler and model summaries
pub const FEATURE_NAMES: [&str; N_FEATURES] = ["HR", "SpO2", "Temp"];

/// (HR, SpO2, Temp) in [`FEATURE_NAMES`] order
pub type FeatureVector = [f64; N_FEATURES];

/// Healthy baseline used when a field is missing from the input.
pub const BASELINE_HEART_RATE: f64 = 75.0;
pub const BASELINE_SPO2: f64 = 98.0;
pub const BASELINE_TEMPERATURE: f64 = 36.8;

/// One instantaneous set of vitals.
///
/// No physiological bounds are enforced; implausible values are still scored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VitalsReading {
    /// Heart rate in beats per minute
    #[serde(rename = "HR")]
    pub heart_rate: f64,
    /// Blood-oxygen saturation in percent
    #[serde(rename = "SpO2")]
    pub spo2: f64,
    /// Body temperature in °C
    #[serde(rename = "Temp")]
    pub temperature: f64,
}

impl VitalsReading {
    pub fn new(heart_rate: f64, spo2: f64, temperature: f64) -> Self {
        Self {
            heart_rate,
            spo2,
            temperature,
        }
    }

    pub fn baseline() -> Self {
        Self::new(BASELINE_HEART_RATE, BASELINE_SPO2, BASELINE_TEMPERATURE)
    }

    pub fn features(&self) -> FeatureVector {
        [self.heart_rate, self.spo2, self.temperature]
    }
}

impl Default for VitalsReading {
    fn default() -> Self {
        Self::baseline()
    }
}

impl From<FeatureVector> for VitalsReading {
    fn from([heart_rate, spo2, temperature]: FeatureVector) -> Self {
        Self::new(heart_rate, spo2, temperature)
    }
}

/// A reading as it arrives from a caller: every field may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VitalsInput {
    #[serde(rename = "HR", default, skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<f64>,
    #[serde(rename = "SpO2", default, skip_serializing_if = "Option::is_none")]
    pub spo2: Option<f64>,
    #[serde(rename = "Temp", default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

impl VitalsInput {
    /// Fill missing fields from the healthy baseline.
    pub fn resolve(&self) -> VitalsReading {
        VitalsReading {
            heart_rate: self.heart_rate.unwrap_or(BASELINE_HEART_RATE),
            spo2: self.spo2.unwrap_or(BASELINE_SPO2),
            temperature: self.temperature.unwrap_or(BASELINE_TEMPERATURE),
        }
    }
}

impl From<VitalsReading> for VitalsInput {
    fn from(reading: VitalsReading) -> Self {
        Self {
            heart_rate: Some(reading.heart_rate),
            spo2: Some(reading.spo2),
            temperature: Some(reading.temperature),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_input_resolves_to_baseline() {
        let reading = VitalsInput::default().resolve();
        assert_eq!(reading, VitalsReading::new(75.0, 98.0, 36.8));
    }

    #[test]
    fn partial_input_keeps_supplied_fields() {
        let input: VitalsInput = serde_json::from_str(r#"{"HR": 130}"#).unwrap();
        assert_eq!(input.resolve(), VitalsReading::new(130.0, 98.0, 36.8));
    }

    #[test]
    fn null_fields_count_as_missing() {
        let input: VitalsInput =
            serde_json::from_str(r#"{"HR": null, "SpO2": 91, "Temp": null}"#).unwrap();
        assert_eq!(input.resolve(), VitalsReading::new(75.0, 91.0, 36.8));
    }

    #[test]
    fn reading_uses_wire_field_names() {
        let json = serde_json::to_value(VitalsReading::new(125.0, 89.0, 38.0)).unwrap();
        assert_eq!(json, serde_json::json!({"HR": 125.0, "SpO2": 89.0, "Temp": 38.0}));
    }

    #[test]
    fn features_follow_declared_order() {
        let reading = VitalsReading::new(1.0, 2.0, 3.0);
        assert_eq!(reading.features(), [1.0, 2.0, 3.0]);
        assert_eq!(VitalsReading::from(reading.features()), reading);
    }
}
