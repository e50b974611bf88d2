use serde::{Deserialize, Serialize};
use vitals_core::{ClassProbabilities, FeatureVector, VitalsClassifier, FEATURE_NAMES};

use crate::dataset::{to_columns, training_set, LabeledVitals};
use crate::error::ModelError;
use crate::logistic::{FitParams, LogisticRegression};

pub const MODEL_NAME: &str = "logistic_regression";

/// Learned weight for one named input, per unit of the raw reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureWeight {
    pub feature: String,
    pub weight: f64,
}

/// What was fitted at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSummary {
    pub model: String,
    pub samples: usize,
    pub coefficients: Vec<FeatureWeight>,
    pub intercept: f64,
    pub training_accuracy: f64,
}

/// L2-regularised logistic regression over raw (HR, SpO2, Temp).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticVitalsModel {
    regression: LogisticRegression,
    summary: ModelSummary,
}

impl LogisticVitalsModel {
    pub fn train(samples: &[LabeledVitals], params: &FitParams) -> Result<Self, ModelError> {
        let (xs, ys) = to_columns(samples);
        let regression = LogisticRegression::fit(&xs, &ys, params)?;

        let correct = xs
            .iter()
            .zip(&ys)
            .filter(|&(x, &y)| regression.predict(x) == y)
            .count();
        let summary = ModelSummary {
            model: MODEL_NAME.to_string(),
            samples: xs.len(),
            coefficients: FEATURE_NAMES
                .iter()
                .zip(regression.weights)
                .map(|(name, weight)| FeatureWeight {
                    feature: (*name).to_string(),
                    weight,
                })
                .collect(),
            intercept: regression.intercept,
            training_accuracy: correct as f64 / xs.len() as f64,
        };

        log::info!(
            "{} trained on {} samples, training accuracy {:.2}",
            MODEL_NAME,
            summary.samples,
            summary.training_accuracy
        );

        Ok(Self {
            regression,
            summary,
        })
    }

    pub fn summary(&self) -> &ModelSummary {
        &self.summary
    }

    /// P(abnormal) for a raw feature vector
    pub fn abnormal_probability(&self, features: &FeatureVector) -> f64 {
        self.regression.predict_proba(features)
    }
}

impl VitalsClassifier for LogisticVitalsModel {
    fn name(&self) -> &str {
        MODEL_NAME
    }

    fn predict_proba(&self, features: &FeatureVector) -> ClassProbabilities {
        ClassProbabilities::from_abnormal(self.abnormal_probability(features))
    }
}

/// Fit the classifier on the built-in dataset with default parameters.
pub fn train_default() -> Result<LogisticVitalsModel, ModelError> {
    LogisticVitalsModel::train(&training_set(), &FitParams::default())
}
