//! Pre-fitted binary classifiers over scaled feature vectors.
//!
//! Artifacts are tagged JSON documents:
//! - `logistic_regression`: `coef`, `intercept`, probability via sigmoid
//! - `linear_svc`: same decision function, no probability
//! - `decision_tree`: flattened node arrays, leaves marked by `children_left == -1`
//!
//! Every kind may carry `classes` (default `[0, 1]`); the prediction is one of them.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use ndarray::{ArrayView1, ArrayBase, Data, Ix1};
use serde::Deserialize;

use crate::error::DiagnosisError;

const LEAF: i64 = -1;

fn default_classes() -> [i64; 2] {
    [0, 1]
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LinearModel {
    pub coef: Vec<f64>,
    pub intercept: f64,
    #[serde(default = "default_classes")]
    pub classes: [i64; 2],
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    /// Per-node class counts (or weights), two entries per node.
    pub value: Vec<[f64; 2]>,
    #[serde(default = "default_classes")]
    pub classes: [i64; 2],
    /// Input width the split nodes require, fixed at load.
    #[serde(skip)]
    n_features: usize,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Classifier {
    LogisticRegression(LinearModel),
    LinearSvc(LinearModel),
    DecisionTree(DecisionTree),
}

/// Outcome of a single prediction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub class: i64,
    /// Probability of the second class, when the model provides one.
    pub probability: Option<f64>,
}

impl LinearModel {
    fn decision<S: Data<Elem = f64>>(&self, x: &ArrayBase<S, Ix1>) -> Result<f64, DiagnosisError> {
        if x.len() != self.coef.len() {
            return Err(DiagnosisError::DimensionMismatch {
                component: "classifier",
                expected: self.coef.len(),
                actual: x.len(),
            });
        }
        Ok(ArrayView1::from(self.coef.as_slice()).dot(x) + self.intercept)
    }

    fn pick(&self, decision: f64) -> i64 {
        if decision > 0.0 {
            self.classes[1]
        } else {
            self.classes[0]
        }
    }
}

impl DecisionTree {
    fn n_nodes(&self) -> usize {
        self.children_left.len()
    }

    /// Number of input features the split nodes reference.
    fn required_features(&self) -> usize {
        (0..self.n_nodes())
            .filter(|&i| self.children_left[i] != LEAF)
            .map(|i| self.feature[i] as usize + 1)
            .max()
            .unwrap_or(0)
    }

    fn validate(&mut self) -> Result<()> {
        let n = self.n_nodes();
        if n == 0 {
            bail!("decision tree has no nodes");
        }
        if self.children_right.len() != n
            || self.feature.len() != n
            || self.threshold.len() != n
            || self.value.len() != n
        {
            bail!("decision tree node arrays differ in length");
        }
        for i in 0..n {
            let (left, right) = (self.children_left[i], self.children_right[i]);
            if left == LEAF {
                if right != LEAF {
                    bail!("node {i} has a right child but no left child");
                }
                continue;
            }
            // Children always come after their parent, so traversal terminates.
            for child in [left, right] {
                if child <= i as i64 || child >= n as i64 {
                    bail!("node {i} has out-of-range child {child}");
                }
            }
            if self.feature[i] < 0 {
                bail!("split node {i} has negative feature index");
            }
        }
        self.n_features = self.required_features();
        Ok(())
    }

    fn leaf_for<S: Data<Elem = f64>>(&self, x: &ArrayBase<S, Ix1>) -> Result<usize, DiagnosisError> {
        let needed = self.n_features;
        if x.len() < needed {
            return Err(DiagnosisError::DimensionMismatch {
                component: "classifier",
                expected: needed,
                actual: x.len(),
            });
        }

        let mut node = 0usize;
        while self.children_left[node] != LEAF {
            let f = self.feature[node] as usize;
            node = if x[f] <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }
        Ok(node)
    }
}

impl Classifier {
    pub fn kind(&self) -> &'static str {
        match self {
            Classifier::LogisticRegression(_) => "logistic_regression",
            Classifier::LinearSvc(_) => "linear_svc",
            Classifier::DecisionTree(_) => "decision_tree",
        }
    }

    pub fn classes(&self) -> [i64; 2] {
        match self {
            Classifier::LogisticRegression(m) | Classifier::LinearSvc(m) => m.classes,
            Classifier::DecisionTree(t) => t.classes,
        }
    }

    fn validate(mut self) -> Result<Self> {
        match &mut self {
            Classifier::LogisticRegression(m) | Classifier::LinearSvc(m) => {
                if m.coef.is_empty() {
                    bail!("linear model has no coefficients");
                }
            }
            Classifier::DecisionTree(t) => t.validate()?,
        }
        let [a, b] = self.classes();
        if a == b {
            bail!("classifier classes must be distinct, got [{a}, {b}]");
        }
        Ok(self)
    }

    /// Predict the class of an already-scaled feature vector.
    pub fn predict<S: Data<Elem = f64>>(
        &self,
        x: &ArrayBase<S, Ix1>,
    ) -> Result<Prediction, DiagnosisError> {
        match self {
            Classifier::LogisticRegression(m) => {
                let d = m.decision(x)?;
                Ok(Prediction {
                    class: m.pick(d),
                    probability: Some(sigmoid(d)),
                })
            }
            Classifier::LinearSvc(m) => {
                let d = m.decision(x)?;
                Ok(Prediction {
                    class: m.pick(d),
                    probability: None,
                })
            }
            Classifier::DecisionTree(t) => {
                let leaf = t.leaf_for(x)?;
                let [c0, c1] = t.value[leaf];
                let total = c0 + c1;
                Ok(Prediction {
                    // Ties go to the first class.
                    class: if c1 > c0 { t.classes[1] } else { t.classes[0] },
                    probability: (total > 0.0).then(|| c1 / total),
                })
            }
        }
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

pub fn load_classifier(path: &Path) -> Result<Classifier> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Cannot read classifier {}", path.display()))?;
    let classifier: Classifier = serde_json::from_str(&data)
        .with_context(|| format!("Invalid classifier artifact {}", path.display()))?;
    classifier
        .validate()
        .with_context(|| format!("Invalid classifier artifact {}", path.display()))
}
