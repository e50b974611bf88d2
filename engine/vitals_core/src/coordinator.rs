use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::classifier::{classify, VitalsClassifier, VitalsStatus};
use crate::error::AssessmentError;
use crate::forecast::{forecast, ForecastResult};
use crate::reading::{VitalsInput, VitalsReading};
use crate::risk::{RiskFactor, RiskLevel, RiskScorer};

/// Result of a status prediction, echoing the resolved input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusPrediction {
    pub prediction: VitalsStatus,
    pub confidence: f64,
    pub input: VitalsReading,
}

/// Classification and rule-based risk for one reading.
///
/// `status` and `risk_level` come from independent components and may
/// disagree; both are reported as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub status: VitalsStatus,
    pub confidence: f64,
    pub risk_score: u8,
    pub risk_level: RiskLevel,
    pub risk_factors: Vec<RiskFactor>,
}

/// Composes the classifier, the trend forecaster and the risk scorer.
///
/// Holds the trained classifier behind an `Arc`; every operation is a pure
/// function of its input plus that read-only model.
#[derive(Clone)]
pub struct AssessmentCoordinator {
    classifier: Arc<dyn VitalsClassifier>,
    scorer: RiskScorer,
}

impl AssessmentCoordinator {
    pub fn new(classifier: Arc<dyn VitalsClassifier>) -> Self {
        Self {
            classifier,
            scorer: RiskScorer::default(),
        }
    }

    pub fn with_scorer(mut self, scorer: RiskScorer) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn classifier_name(&self) -> &str {
        self.classifier.name()
    }

    pub fn predict_status(&self, input: &VitalsInput) -> StatusPrediction {
        let reading = input.resolve();
        let result = classify(self.classifier.as_ref(), &reading);
        log::debug!(
            "status for {:?}: {} ({:.2})",
            reading,
            result.label,
            result.confidence
        );
        StatusPrediction {
            prediction: result.label,
            confidence: result.confidence,
            input: reading,
        }
    }

    pub fn predict_hr(&self, history: &[f64]) -> Result<ForecastResult, AssessmentError> {
        let result = forecast(history)?;
        log::debug!(
            "forecast from {} samples: {:?}",
            history.len(),
            result.trend
        );
        Ok(result)
    }

    pub fn analyze(&self, input: &VitalsInput) -> AnalysisResult {
        let reading = input.resolve();
        let classification = classify(self.classifier.as_ref(), &reading);
        let risk = self.scorer.score(&reading);
        log::debug!(
            "analysis for {:?}: {} ({:.2}), risk {} {:?}",
            reading,
            classification.label,
            classification.confidence,
            risk.risk_score,
            risk.risk_level
        );
        AnalysisResult {
            status: classification.label,
            confidence: classification.confidence,
            risk_score: risk.risk_score,
            risk_level: risk.risk_level,
            risk_factors: risk.risk_factors,
        }
    }
}

impl std::fmt::Debug for AssessmentCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssessmentCoordinator")
            .field("classifier", &self.classifier.name())
            .field("rules", &self.scorer.rules().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ClassProbabilities;
    use crate::forecast::Trend;
    use crate::reading::FeatureVector;
    use crate::risk::{RiskRule, Threshold, Vital};
    use pretty_assertions::assert_eq;

    /// Flags anything with HR above a cutoff; ignores the other vitals.
    struct HeartRateCutoff(f64);

    impl VitalsClassifier for HeartRateCutoff {
        fn name(&self) -> &str {
            "hr_cutoff"
        }

        fn predict_proba(&self, features: &FeatureVector) -> ClassProbabilities {
            let p = if features[0] > self.0 { 0.9 } else { 0.2 };
            ClassProbabilities::from_abnormal(p)
        }
    }

    fn coordinator() -> AssessmentCoordinator {
        let _ = env_logger::builder().is_test(true).try_init();
        AssessmentCoordinator::new(Arc::new(HeartRateCutoff(120.0)))
    }

    #[test]
    fn custom_scorer_replaces_the_standard_rules() {
        let scorer = RiskScorer::with_rules(vec![RiskRule::new(
            Vital::Temperature,
            Threshold::Above(36.0),
            40,
            RiskFactor::Fever,
        )]);
        let coordinator = coordinator().with_scorer(scorer);
        let result = coordinator.analyze(&VitalsInput::default());
        assert_eq!(result.risk_score, 40);
        assert_eq!(result.risk_level, RiskLevel::Medium);
        assert_eq!(result.risk_factors, vec![RiskFactor::Fever]);
        assert!(format!("{coordinator:?}").contains("rules: 1"));
    }

    #[test]
    fn predict_status_echoes_resolved_input() {
        let prediction = coordinator().predict_status(&VitalsInput::default());
        assert_eq!(
            prediction,
            StatusPrediction {
                prediction: VitalsStatus::Normal,
                confidence: 0.8,
                input: VitalsReading::baseline(),
            }
        );
    }

    #[test]
    fn analyze_merges_classifier_and_rules() {
        let input = VitalsInput::from(VitalsReading::new(125.0, 96.0, 36.8));
        let result = coordinator().analyze(&input);
        assert_eq!(result.status, VitalsStatus::Abnormal);
        assert_eq!(result.confidence, 0.9);
        assert_eq!(result.risk_score, 50);
        assert_eq!(result.risk_level, RiskLevel::Medium);
        assert_eq!(
            result.risk_factors,
            vec![RiskFactor::ElevatedHeartRate, RiskFactor::Tachycardia]
        );
    }

    #[test]
    fn normal_label_with_high_risk_is_reported_unreconciled() {
        let input = VitalsInput::from(VitalsReading::new(80.0, 85.0, 39.0));
        let result = coordinator().analyze(&input);
        assert_eq!(result.status, VitalsStatus::Normal);
        assert_eq!(result.risk_level, RiskLevel::High);
    }

    #[test]
    fn predict_hr_delegates_to_forecaster() {
        let coordinator = coordinator();
        assert_eq!(
            coordinator.predict_hr(&[70.0; 4]),
            Err(AssessmentError::InsufficientHistory { len: 4 })
        );
        let result = coordinator.predict_hr(&[70.0; 5]).unwrap();
        assert_eq!(result.trend, Trend::Stable);
    }

    #[test]
    fn debug_output_names_the_classifier() {
        let rendered = format!("{:?}", coordinator());
        assert!(rendered.contains("hr_cutoff"));
    }
}
