//! Request-level failures surfaced to the user.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DiagnosisError {
    #[error("Model not loaded.")]
    NotLoaded,

    #[error("missing form field '{0}'")]
    MissingField(&'static str),

    #[error("could not convert string to float: '{value}' (field '{field}')")]
    InvalidNumber { field: &'static str, value: String },

    #[error("input contains NaN or infinity (field '{0}')")]
    NonFinite(&'static str),

    /// The request body could not be decoded at all.
    #[error("{0}")]
    MalformedRequest(String),

    #[error("{component} expects {expected} features as input, got {actual}")]
    DimensionMismatch {
        component: &'static str,
        expected: usize,
        actual: usize,
    },
}
