use thiserror::Error;
use vitals_core::AssessmentError;

/// Errors that can occur while fitting the classifier
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("Training set is empty")]
    EmptyDataset,
    #[error("Feature rows ({rows}) and labels ({labels}) differ in length")]
    LengthMismatch { rows: usize, labels: usize },
    #[error("Non-finite feature value in training row {row}")]
    NonFiniteFeature { row: usize },
    #[error("Training labels contain a single class")]
    SingleClass,
    #[error("Newton step failed on a singular Hessian")]
    SingularHessian,
    #[error("Invalid fit parameter: {0}")]
    InvalidParameter(String),
}

impl From<ModelError> for AssessmentError {
    fn from(err: ModelError) -> Self {
        AssessmentError::ModelUninitialized(err.to_string())
    }
}
