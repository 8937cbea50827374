//! Page stylesheet: dark panel with red/green/yellow result accents.

pub const COLOR_MALIGNANT: &str = "rgb(230, 70, 70)";
pub const COLOR_BENIGN: &str = "rgb(70, 200, 100)";
pub const COLOR_ERROR: &str = "rgb(230, 180, 50)";

pub fn stylesheet() -> String {
    format!(
        r#"
body {{ background: #1b1b1b; color: rgb(220, 220, 220); font-family: sans-serif; }}
.container {{ max-width: 480px; margin: 40px auto; padding: 24px; background: #262626; border-radius: 8px; }}
h1 {{ font-size: 1.4em; margin-top: 0; }}
label {{ display: block; margin-top: 10px; font-size: 0.9em; }}
input[type=text] {{ width: 100%; padding: 6px; margin-top: 4px; box-sizing: border-box; }}
button {{ margin-top: 16px; width: 100%; padding: 10px; font-weight: bold; }}
.result {{ margin-top: 20px; padding: 12px; border-radius: 6px; border: 1px solid {COLOR_ERROR}; color: {COLOR_ERROR}; }}
.result.malignant {{ border-color: {COLOR_MALIGNANT}; color: {COLOR_MALIGNANT}; }}
.result.benign {{ border-color: {COLOR_BENIGN}; color: {COLOR_BENIGN}; }}
"#
    )
}
