//! Pre-fitted feature scalers.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use ndarray::{Array1, ArrayView1};
use serde::Deserialize;

use crate::error::DiagnosisError;
use crate::features::FeatureVector;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scaler {
    /// `(x - mean) / scale`
    Standard { mean: Vec<f64>, scale: Vec<f64> },
    /// `x * scale + min`
    MinMax { min: Vec<f64>, scale: Vec<f64> },
}

impl Scaler {
    pub fn n_features(&self) -> usize {
        match self {
            Scaler::Standard { mean, .. } => mean.len(),
            Scaler::MinMax { min, .. } => min.len(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Scaler::Standard { .. } => "standard",
            Scaler::MinMax { .. } => "min_max",
        }
    }

    /// Check parameter shapes and replace zero standard-deviations with 1
    /// so constant features pass through centered but unscaled.
    fn validate(mut self) -> Result<Self> {
        match &mut self {
            Scaler::Standard { mean, scale } => {
                if mean.len() != scale.len() {
                    bail!(
                        "standard scaler has {} means but {} scales",
                        mean.len(),
                        scale.len()
                    );
                }
                for s in scale.iter_mut() {
                    if *s == 0.0 {
                        *s = 1.0;
                    }
                }
            }
            Scaler::MinMax { min, scale } => {
                if min.len() != scale.len() {
                    bail!(
                        "min-max scaler has {} offsets but {} scales",
                        min.len(),
                        scale.len()
                    );
                }
            }
        }
        if self.n_features() == 0 {
            bail!("scaler has no features");
        }
        Ok(self)
    }

    pub fn transform(&self, features: &FeatureVector) -> Result<Array1<f64>, DiagnosisError> {
        let x = features.to_array();
        if x.len() != self.n_features() {
            return Err(DiagnosisError::DimensionMismatch {
                component: "scaler",
                expected: self.n_features(),
                actual: x.len(),
            });
        }

        let scaled = match self {
            Scaler::Standard { mean, scale } => {
                (&x - &ArrayView1::from(mean.as_slice())) / &ArrayView1::from(scale.as_slice())
            }
            Scaler::MinMax { min, scale } => {
                &x * &ArrayView1::from(scale.as_slice()) + &ArrayView1::from(min.as_slice())
            }
        };
        Ok(scaled)
    }
}

pub fn load_scaler(path: &Path) -> Result<Scaler> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Cannot read scaler {}", path.display()))?;
    let scaler: Scaler = serde_json::from_str(&data)
        .with_context(|| format!("Invalid scaler artifact {}", path.display()))?;
    scaler
        .validate()
        .with_context(|| format!("Invalid scaler artifact {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample() -> FeatureVector {
        FeatureVector::new([14.0, 20.0, 90.0, 600.0, 0.1]).unwrap()
    }

    fn write_tmp(json: &str) -> tempfile::NamedTempFile {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(json.as_bytes()).unwrap();
        tmp.flush().unwrap();
        tmp
    }

    #[test]
    fn standard_transform() {
        let scaler = Scaler::Standard {
            mean: vec![10.0, 20.0, 100.0, 500.0, 0.1],
            scale: vec![2.0, 4.0, 10.0, 100.0, 0.05],
        };
        let out = scaler.transform(&sample()).unwrap();
        let expected = [2.0, 0.0, -1.0, 1.0, 0.0];
        for (a, b) in out.iter().zip(expected) {
            assert!((a - b).abs() < 1e-9, "{a} != {b}");
        }
    }

    #[test]
    fn min_max_transform() {
        let scaler = Scaler::MinMax {
            min: vec![0.0, -1.0, 0.0, 0.0, 0.0],
            scale: vec![0.1, 0.05, 0.01, 0.001, 10.0],
        };
        let out = scaler.transform(&sample()).unwrap();
        let expected = [1.4, 0.0, 0.9, 0.6, 1.0];
        for (a, b) in out.iter().zip(expected) {
            assert!((a - b).abs() < 1e-9, "{a} != {b}");
        }
    }

    #[test]
    fn dimension_mismatch_is_reported() {
        let scaler = Scaler::Standard {
            mean: vec![0.0; 30],
            scale: vec![1.0; 30],
        };
        let err = scaler.transform(&sample()).unwrap_err();
        assert_eq!(
            err,
            DiagnosisError::DimensionMismatch {
                component: "scaler",
                expected: 30,
                actual: 5
            }
        );
        assert!(err.to_string().contains("expects 30 features"));
    }

    #[test]
    fn load_standard_replaces_zero_scale() {
        let tmp = write_tmp(
            r#"{"kind":"standard","mean":[1,2,3,4,5],"scale":[1,0,1,1,1]}"#,
        );
        let scaler = load_scaler(tmp.path()).unwrap();
        assert_eq!(scaler.kind(), "standard");
        match scaler {
            Scaler::Standard { scale, .. } => assert_eq!(scale[1], 1.0),
            other => panic!("unexpected scaler {other:?}"),
        }
    }

    #[test]
    fn load_rejects_mismatched_lengths() {
        let tmp = write_tmp(r#"{"kind":"standard","mean":[1,2,3],"scale":[1,1]}"#);
        let err = load_scaler(tmp.path()).unwrap_err();
        assert!(format!("{err:#}").contains("3 means but 2 scales"));
    }

    #[test]
    fn load_rejects_unknown_kind() {
        let tmp = write_tmp(r#"{"kind":"robust","center":[1],"scale":[1]}"#);
        assert!(load_scaler(tmp.path()).is_err());
    }

    #[test]
    fn load_missing_file() {
        assert!(load_scaler(Path::new("/nonexistent/scaler.json")).is_err());
    }
}
