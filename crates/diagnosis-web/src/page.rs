//! HTML rendering of the input form and result panel.

use std::collections::HashMap;

use diagnosis_core::features::FEATURE_NAMES;

use crate::theme;

const FIELD_LABELS: [(&str, &str); 5] = [
    ("Radius Mean", "e.g. 14.1"),
    ("Texture Mean", "e.g. 19.3"),
    ("Perimeter Mean", "e.g. 92.0"),
    ("Area Mean", "e.g. 654.9"),
    ("Smoothness Mean", "e.g. 0.096"),
];

/// Everything the page template needs. The default is the empty form.
#[derive(Debug, Default, Clone)]
pub struct PageView {
    pub prediction_text: String,
    /// `malignant` / `benign`; `None` for errors and the empty form.
    pub result_class: Option<&'static str>,
    /// Submitted values, echoed back into the inputs.
    pub values: HashMap<String, String>,
}

pub fn render(view: &PageView) -> String {
    let mut fields = String::new();
    for (name, (label, placeholder)) in FEATURE_NAMES.iter().zip(FIELD_LABELS) {
        let value = view.values.get(*name).map(String::as_str).unwrap_or("");
        fields.push_str(&format!(
            r#"
      <label for="{name}">{label}</label>
      <input type="text" id="{name}" name="{name}" placeholder="{placeholder}" value="{value}" required>"#,
            value = escape(value),
        ));
    }

    let result = if view.prediction_text.is_empty() {
        String::new()
    } else {
        let class = view.result_class.unwrap_or("error");
        format!(
            r#"
    <div class="result {class}">{}</div>"#,
            escape(&view.prediction_text)
        )
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Breast Cancer Prediction</title>
  <style>{css}</style>
</head>
<body>
  <div class="container">
    <h1>Breast Cancer Prediction</h1>
    <form method="post" action="/">{fields}
      <button type="submit">Predict</button>
    </form>{result}
  </div>
</body>
</html>
"#,
        css = theme::stylesheet(),
    )
}

/// Escape text for use in element content and quoted attribute values.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
