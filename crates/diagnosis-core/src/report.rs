//! Diagnosis labels and output formatting.

use serde::Serialize;

use crate::classifier::Prediction;
use crate::error::DiagnosisError;

pub const NOT_LOADED_MESSAGE: &str = "Error: Model not loaded.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Label {
    Malignant,
    Benign,
}

impl Label {
    /// Class 0 is malignant in the training data; every other class is benign.
    pub fn from_class(class: i64) -> Self {
        if class == 0 {
            Label::Malignant
        } else {
            Label::Benign
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Malignant => "Malignant",
            Label::Benign => "Benign",
        }
    }

    /// Style tag used by the rendered page.
    pub fn css_class(&self) -> &'static str {
        match self {
            Label::Malignant => "malignant",
            Label::Benign => "benign",
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Diagnosis {
    pub label: Label,
    #[serde(rename = "class")]
    pub css_class: &'static str,
    pub prediction: i64,
    pub probability: Option<f64>,
}

impl Diagnosis {
    pub fn from_prediction(p: Prediction) -> Self {
        let label = Label::from_class(p.class);
        Self {
            label,
            css_class: label.css_class(),
            prediction: p.class,
            probability: p.probability,
        }
    }

    pub fn message(&self) -> String {
        format!("Prediction: Tumor is {}", self.label)
    }
}

/// Text shown to the user for a failed request.
pub fn error_message(err: &DiagnosisError) -> String {
    match err {
        DiagnosisError::NotLoaded => NOT_LOADED_MESSAGE.to_string(),
        other => format!("Error occurred: {other}"),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {s}. Use 'text' or 'json'.")),
        }
    }
}

pub fn render(outcome: &Result<Diagnosis, DiagnosisError>, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => render_text(outcome),
        OutputFormat::Json => render_json(outcome),
    }
}

fn render_text(outcome: &Result<Diagnosis, DiagnosisError>) -> String {
    match outcome {
        Ok(d) => {
            let mut out = d.message();
            if let Some(p) = d.probability {
                out.push_str(&format!(" (score {p:.4})"));
            }
            out
        }
        Err(e) => error_message(e),
    }
}

fn render_json(outcome: &Result<Diagnosis, DiagnosisError>) -> String {
    let value = match outcome {
        Ok(d) => serde_json::to_value(d).unwrap_or_default(),
        Err(e) => serde_json::json!({ "error": error_message(e) }),
    };
    serde_json::to_string_pretty(&value).unwrap_or_default()
}
