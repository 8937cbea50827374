//! Artifact loading and request-level diagnosis shared by the web and CLI frontends.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::classifier::{load_classifier, Classifier, Prediction};
use crate::error::DiagnosisError;
use crate::features::{FeatureVector, Measurements};
use crate::fingerprint::sha256_file;
use crate::report::Diagnosis;
use crate::scaler::{load_scaler, Scaler};

pub const DEFAULT_MODEL_PATH: &str = "./model/breast_cancer_model.json";
pub const DEFAULT_SCALER_PATH: &str = "./model/scaler.json";

/// Anything that turns a raw feature vector into a class prediction.
pub trait Predictor: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> Result<Prediction, DiagnosisError>;
}

/// The fitted scaler and classifier pair, read-only once loaded.
#[derive(Debug, Clone)]
pub struct Artifacts {
    pub scaler: Scaler,
    pub classifier: Classifier,
}

impl Predictor for Artifacts {
    fn predict(&self, features: &FeatureVector) -> Result<Prediction, DiagnosisError> {
        let scaled = self.scaler.transform(features)?;
        self.classifier.predict(&scaled)
    }
}

#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub model_path: PathBuf,
    pub scaler_path: PathBuf,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            scaler_path: PathBuf::from(DEFAULT_SCALER_PATH),
        }
    }
}

/// Load both artifacts.
///
/// Returns `Ok(None)` when either file is absent: the caller keeps running and
/// every diagnosis reports the model as not loaded. A file that exists but
/// cannot be read or parsed is an error.
pub fn load_artifacts(paths: &ArtifactPaths) -> Result<Option<Artifacts>> {
    for path in [&paths.model_path, &paths.scaler_path] {
        if !path.exists() {
            warn!(
                path = %path.display(),
                "model or scaler file not found; predictions are disabled until restart"
            );
            return Ok(None);
        }
    }

    let classifier = load_classifier(&paths.model_path)?;
    let scaler = load_scaler(&paths.scaler_path)?;
    let model_sha256 = sha256_file(&paths.model_path)?;
    let scaler_sha256 = sha256_file(&paths.scaler_path)?;

    info!(
        model = %paths.model_path.display(),
        %model_sha256,
        classifier = classifier.kind(),
        "classifier loaded"
    );
    info!(
        scaler = %paths.scaler_path.display(),
        %scaler_sha256,
        kind = scaler.kind(),
        n_features = scaler.n_features(),
        "scaler loaded"
    );

    Ok(Some(Artifacts { scaler, classifier }))
}

/// Process-wide diagnosis state: either a loaded predictor or nothing.
/// Built once at startup and cloned cheaply into every request.
#[derive(Clone, Default)]
pub struct DiagnosisService {
    predictor: Option<Arc<dyn Predictor>>,
}

impl DiagnosisService {
    pub fn new(predictor: Option<Arc<dyn Predictor>>) -> Self {
        Self { predictor }
    }

    /// Load artifacts from disk, falling back to an unloaded service when absent.
    pub fn from_paths(paths: &ArtifactPaths) -> Result<Self> {
        let predictor = load_artifacts(paths)?.map(|a| Arc::new(a) as Arc<dyn Predictor>);
        Ok(Self::new(predictor))
    }

    pub fn is_loaded(&self) -> bool {
        self.predictor.is_some()
    }

    pub fn diagnose(&self, features: &FeatureVector) -> Result<Diagnosis, DiagnosisError> {
        let predictor = self.predictor.as_ref().ok_or(DiagnosisError::NotLoaded)?;
        let prediction = predictor.predict(features)?;
        debug!(class = prediction.class, "prediction complete");
        Ok(Diagnosis::from_prediction(prediction))
    }

    /// The loaded check comes before field parsing, so an unloaded service
    /// answers the same way whatever was submitted.
    pub fn diagnose_form(
        &self,
        form: &HashMap<String, String>,
    ) -> Result<Diagnosis, DiagnosisError> {
        if !self.is_loaded() {
            return Err(DiagnosisError::NotLoaded);
        }
        self.diagnose(&FeatureVector::from_form(form)?)
    }

    pub fn diagnose_measurements(&self, m: &Measurements) -> Result<Diagnosis, DiagnosisError> {
        if !self.is_loaded() {
            return Err(DiagnosisError::NotLoaded);
        }
        self.diagnose(&FeatureVector::from_measurements(m)?)
    }
}

impl std::fmt::Debug for DiagnosisService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagnosisService")
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Label;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fixture artifacts for tests: a standard scaler and a logistic model where
    /// larger measurements push towards malignant.
    fn write_fixture_artifacts(dir: &Path) -> Result<ArtifactPaths> {
        let model_path = dir.join("breast_cancer_model.json");
        let scaler_path = dir.join("scaler.json");

        std::fs::write(
            &model_path,
            r#"{
      "kind": "logistic_regression",
      "coef": [-1.2, -0.9, -1.1, -1.3, -0.8],
      "intercept": 0.4,
      "classes": [0, 1]
    }"#,
        )?;
        std::fs::write(
            &scaler_path,
            r#"{
      "kind": "standard",
      "mean": [14.13, 19.29, 91.97, 654.89, 0.0964],
      "scale": [3.52, 4.30, 24.28, 351.6, 0.0141]
    }"#,
        )?;

        Ok(ArtifactPaths {
            model_path,
            scaler_path,
        })
    }

    fn form(values: [&str; 5]) -> HashMap<String, String> {
        crate::features::FEATURE_NAMES
            .iter()
            .zip(values)
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn loaded(dir: &Path) -> DiagnosisService {
        let paths = write_fixture_artifacts(dir).unwrap();
        DiagnosisService::from_paths(&paths).unwrap()
    }

    struct CountingPredictor(AtomicUsize);

    impl Predictor for CountingPredictor {
        fn predict(&self, _: &FeatureVector) -> Result<Prediction, DiagnosisError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(Prediction {
                class: 0,
                probability: None,
            })
        }
    }

    #[test]
    fn fixture_sample_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let service = loaded(dir.path());
        assert!(service.is_loaded());

        // Near the training mean the decision is dominated by the intercept.
        let d = service
            .diagnose_form(&form(["14.0", "20.0", "90.0", "600.0", "0.1"]))
            .unwrap();
        assert_eq!(d.label, Label::Benign);
        assert_eq!(d.css_class, "benign");

        let again = service
            .diagnose_form(&form(["14.0", "20.0", "90.0", "600.0", "0.1"]))
            .unwrap();
        assert_eq!(again.label, d.label);
    }

    #[test]
    fn large_tumor_is_malignant() {
        let dir = tempfile::tempdir().unwrap();
        let service = loaded(dir.path());

        let d = service
            .diagnose_form(&form(["20.6", "29.3", "140.1", "1265", "0.118"]))
            .unwrap();
        assert_eq!(d.label, Label::Malignant);
        assert_eq!(d.message(), "Prediction: Tumor is Malignant");
    }

    #[test]
    fn missing_artifacts_load_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths {
            model_path: dir.path().join("absent_model.json"),
            scaler_path: dir.path().join("absent_scaler.json"),
        };
        assert!(load_artifacts(&paths).unwrap().is_none());

        let service = DiagnosisService::from_paths(&paths).unwrap();
        assert!(!service.is_loaded());
    }

    #[test]
    fn one_missing_artifact_disables_both() {
        let dir = tempfile::tempdir().unwrap();
        let mut paths = write_fixture_artifacts(dir.path()).unwrap();
        paths.scaler_path = dir.path().join("gone.json");
        assert!(load_artifacts(&paths).unwrap().is_none());
    }

    #[test]
    fn malformed_artifact_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_fixture_artifacts(dir.path()).unwrap();
        std::fs::write(&paths.model_path, "{ truncated").unwrap();
        assert!(load_artifacts(&paths).is_err());
    }

    #[test]
    fn unloaded_service_ignores_input() {
        let service = DiagnosisService::default();
        for values in [
            ["14.0", "20.0", "90.0", "600.0", "0.1"],
            ["abc", "", "x", "1", "2"],
        ] {
            assert_eq!(
                service.diagnose_form(&form(values)).unwrap_err(),
                DiagnosisError::NotLoaded
            );
        }
        assert_eq!(
            service
                .diagnose_measurements(&Measurements::default())
                .unwrap_err(),
            DiagnosisError::NotLoaded
        );
    }

    #[test]
    fn bad_input_never_reaches_predictor() {
        let counter = Arc::new(CountingPredictor(AtomicUsize::new(0)));
        let service = DiagnosisService::new(Some(counter.clone() as Arc<dyn Predictor>));

        let err = service
            .diagnose_form(&form(["14.0", "oops", "90.0", "600.0", "0.1"]))
            .unwrap_err();
        assert!(matches!(err, DiagnosisError::InvalidNumber { .. }));
        assert_eq!(counter.0.load(Ordering::SeqCst), 0);

        service
            .diagnose_form(&form(["14.0", "20.0", "90.0", "600.0", "0.1"]))
            .unwrap();
        assert_eq!(counter.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dimension_mismatch_surfaces_per_request() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_fixture_artifacts(dir.path()).unwrap();
        std::fs::write(
            &paths.scaler_path,
            r#"{"kind":"standard","mean":[0,0,0],"scale":[1,1,1]}"#,
        )
        .unwrap();

        let service = DiagnosisService::from_paths(&paths).unwrap();
        assert!(service.is_loaded());
        let err = service
            .diagnose_form(&form(["14.0", "20.0", "90.0", "600.0", "0.1"]))
            .unwrap_err();
        assert!(matches!(err, DiagnosisError::DimensionMismatch { .. }));
    }
}
