//! Trained classifier for the vitals engine.
//!
//! Fits an L2-regularised logistic regression over raw (HR, SpO2, Temp) on a
//! small fixed labelled dataset and exposes the result through
//! [`vitals_core::VitalsClassifier`]. Columns are standardized only to
//! condition the solver.

pub mod dataset;
pub mod error;
pub mod logistic;
pub mod model;
pub mod scaler;

pub use dataset::{training_set, LabeledVitals};
pub use error::ModelError;
pub use logistic::{FitParams, LogisticRegression};
pub use model::{train_default, FeatureWeight, LogisticVitalsModel, ModelSummary};
pub use scaler::StandardScaler;
