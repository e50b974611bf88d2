use thiserror::Error;

use crate::forecast::MIN_HISTORY;

/// Errors surfaced by the assessment engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssessmentError {
    /// The heart-rate history is too short to extrapolate from.
    #[error("Need at least {} HR values", MIN_HISTORY)]
    InsufficientHistory { len: usize },
    /// No trained classifier is available. Fatal at startup.
    #[error("Classifier not initialized: {0}")]
    ModelUninitialized(String),
}

impl AssessmentError {
    /// Whether the caller can fix this by sending different input.
    pub fn is_client_error(&self) -> bool {
        matches!(self, AssessmentError::InsufficientHistory { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_history_message_is_client_facing() {
        let err = AssessmentError::InsufficientHistory { len: 3 };
        assert_eq!(err.to_string(), "Need at least 5 HR values");
        assert!(err.is_client_error());
    }

    #[test]
    fn uninitialized_model_is_not_a_client_error() {
        let err = AssessmentError::ModelUninitialized("empty dataset".into());
        assert!(!err.is_client_error());
        assert!(err.to_string().contains("empty dataset"));
    }
}
