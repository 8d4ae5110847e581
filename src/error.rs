use thiserror::Error;

use crate::models::{CaptureMode, DraftField};
use crate::services::workflow::Phase;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Merchant and date are required.")]
    MissingRequiredField(Vec<DraftField>),
    #[error("Amount must be a positive number.")]
    InvalidAmount(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Cannot {action} while {phase}")]
    InvalidTransition { action: &'static str, phase: Phase },
    #[error("{action} is only available in {required} mode")]
    ModeMismatch {
        action: &'static str,
        required: CaptureMode,
    },
    #[error("Unknown field: {0}")]
    UnknownField(String),
    #[error("Unknown capture mode: {0}")]
    UnknownMode(String),
    #[error("Unknown error scenario: {0}")]
    UnknownScenario(String),
}

pub type CaptureResult<T> = Result<T, CaptureError>;
