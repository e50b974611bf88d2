//! Vitals risk assessment engine.
//!
//! Turns raw vitals (single readings or short heart-rate histories) into a
//! normal/abnormal classification, a heart-rate trend forecast and a
//! rule-based clinical risk score. The classifier is consumed through the
//! [`VitalsClassifier`] trait so any trained model can be plugged in.

pub mod classifier;
pub mod coordinator;
pub mod error;
pub mod forecast;
pub mod history;
pub mod reading;
pub mod risk;

pub use classifier::{
    classify, ClassProbabilities, ClassificationResult, VitalsClassifier, VitalsStatus,
};
pub use coordinator::{AnalysisResult, AssessmentCoordinator, StatusPrediction};
pub use error::AssessmentError;
pub use forecast::{forecast, ForecastResult, Trend, TrendLine, MIN_HISTORY};
pub use history::{HrHistoryBuffer, DEFAULT_HISTORY_CAPACITY};
pub use reading::{FeatureVector, VitalsInput, VitalsReading, FEATURE_NAMES, N_FEATURES};
pub use risk::{score_risk, RiskAssessment, RiskFactor, RiskLevel, RiskRule, RiskScorer};
