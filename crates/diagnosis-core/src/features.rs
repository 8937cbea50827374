//! Feature vector construction from submitted measurements.
//!
//! Every sample is a fixed vector of five tumor measurements, in this order:
//! - radius_mean
//! - texture_mean
//! - perimeter_mean
//! - area_mean
//! - smoothness_mean
//!
//! The order matches the column order the scaler and classifier were fitted on.

use std::collections::HashMap;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::DiagnosisError;

pub const NUM_FEATURES: usize = 5;

pub const FEATURE_NAMES: [&str; NUM_FEATURES] = [
    "radius_mean",
    "texture_mean",
    "perimeter_mean",
    "area_mean",
    "smoothness_mean",
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    values: [f64; NUM_FEATURES],
}

/// JSON body of a prediction request. Fields are optional so that a missing
/// one is reported the same way as a missing form field.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Measurements {
    pub radius_mean: Option<f64>,
    pub texture_mean: Option<f64>,
    pub perimeter_mean: Option<f64>,
    pub area_mean: Option<f64>,
    pub smoothness_mean: Option<f64>,
}

impl Measurements {
    fn as_array(&self) -> [Option<f64>; NUM_FEATURES] {
        [
            self.radius_mean,
            self.texture_mean,
            self.perimeter_mean,
            self.area_mean,
            self.smoothness_mean,
        ]
    }
}

impl FeatureVector {
    /// Build from already-numeric values, rejecting NaN and infinities.
    pub fn new(values: [f64; NUM_FEATURES]) -> Result<Self, DiagnosisError> {
        for (&name, v) in FEATURE_NAMES.iter().zip(values.iter()) {
            if !v.is_finite() {
                return Err(DiagnosisError::NonFinite(name));
            }
        }
        Ok(Self { values })
    }

    /// Build from form-encoded fields. Every field is required.
    pub fn from_form(form: &HashMap<String, String>) -> Result<Self, DiagnosisError> {
        let mut values = [0.0f64; NUM_FEATURES];
        for (i, &name) in FEATURE_NAMES.iter().enumerate() {
            let raw = form.get(name).ok_or(DiagnosisError::MissingField(name))?;
            values[i] = parse_float(name, raw)?;
        }
        Self::new(values)
    }

    pub fn from_measurements(m: &Measurements) -> Result<Self, DiagnosisError> {
        let mut values = [0.0f64; NUM_FEATURES];
        for (i, (&name, v)) in FEATURE_NAMES.iter().zip(m.as_array()).enumerate() {
            values[i] = v.ok_or(DiagnosisError::MissingField(name))?;
        }
        Self::new(values)
    }

    pub fn values(&self) -> &[f64; NUM_FEATURES] {
        &self.values
    }

    pub fn to_array(&self) -> Array1<f64> {
        Array1::from(self.values.to_vec())
    }
}

/// Parse one field, tolerating surrounding whitespace.
fn parse_float(field: &'static str, raw: &str) -> Result<f64, DiagnosisError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| DiagnosisError::InvalidNumber {
            field,
            value: raw.to_string(),
        })
}
