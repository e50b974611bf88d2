use serde::{Deserialize, Serialize};

use crate::reading::{FeatureVector, VitalsReading};

/// Binary outcome of the vitals classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VitalsStatus {
    Normal,
    Abnormal,
}

impl VitalsStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            VitalsStatus::Normal => "Normal",
            VitalsStatus::Abnormal => "Abnormal",
        }
    }
}

impl std::fmt::Display for VitalsStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Posterior probabilities for the two classes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassProbabilities {
    pub normal: f64,
    pub abnormal: f64,
}

impl ClassProbabilities {
    /// Build from P(abnormal). NaN carries no evidence and maps to 0.5.
    pub fn from_abnormal(p: f64) -> Self {
        let abnormal = if p.is_nan() { 0.5 } else { p.clamp(0.0, 1.0) };
        Self {
            normal: 1.0 - abnormal,
            abnormal,
        }
    }

    /// Argmax over the classes; ties go to Normal.
    pub fn predicted(&self) -> VitalsStatus {
        if self.abnormal > self.normal {
            VitalsStatus::Abnormal
        } else {
            VitalsStatus::Normal
        }
    }

    pub fn max(&self) -> f64 {
        self.normal.max(self.abnormal)
    }
}

/// A trained binary classifier over (HR, SpO2, Temp).
///
/// Implementations are immutable once constructed and shared across
/// requests, so they must be `Send + Sync`.
pub trait VitalsClassifier: Send + Sync {
    /// Identifier reported in health checks and logs
    fn name(&self) -> &str;

    /// Class posteriors for one feature vector
    fn predict_proba(&self, features: &FeatureVector) -> ClassProbabilities;

    /// Predicted label for one feature vector
    fn predict(&self, features: &FeatureVector) -> VitalsStatus {
        self.predict_proba(features).predicted()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub label: VitalsStatus,
    /// Maximum class probability, rounded to 2 decimals
    pub confidence: f64,
}

/// Run the classifier on a reading. Values are passed through unvalidated.
pub fn classify(model: &dyn VitalsClassifier, reading: &VitalsReading) -> ClassificationResult {
    let features = reading.features();
    let label = model.predict(&features);
    let probabilities = model.predict_proba(&features);
    ClassificationResult {
        label,
        confidence: round_confidence(probabilities.max()),
    }
}

/// Half-way cases go to the even hundredth.
fn round_confidence(p: f64) -> f64 {
    (p.clamp(0.0, 1.0) * 100.0).round_ties_even() / 100.0
}
