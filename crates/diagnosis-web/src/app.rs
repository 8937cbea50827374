//! Router, shared state and request handlers.

use std::collections::HashMap;

use axum::extract::rejection::{FormRejection, JsonRejection};
use axum::extract::{Form, Json, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::debug;

use diagnosis_core::features::Measurements;
use diagnosis_core::report::error_message;
use diagnosis_core::{DiagnosisError, DiagnosisService};

use crate::page::{self, PageView};

/// State handed to every handler. Read-only after startup.
#[derive(Debug, Clone)]
pub struct AppState {
    pub service: DiagnosisService,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index).post(submit))
        .route("/api/predict", post(api_predict))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index() -> Html<String> {
    Html(page::render(&PageView::default()))
}

async fn submit(
    State(state): State<AppState>,
    form: Result<Form<HashMap<String, String>>, FormRejection>,
) -> Html<String> {
    // An undecodable body still answers "not loaded" when there is no model.
    let (outcome, values) = match form {
        Ok(Form(values)) => (state.service.diagnose_form(&values), values),
        Err(_) if !state.service.is_loaded() => (Err(DiagnosisError::NotLoaded), HashMap::new()),
        Err(rejection) => (
            Err(DiagnosisError::MalformedRequest(rejection.body_text())),
            HashMap::new(),
        ),
    };

    let view = match outcome {
        Ok(diagnosis) => PageView {
            prediction_text: diagnosis.message(),
            result_class: Some(diagnosis.css_class),
            values,
        },
        Err(e) => {
            debug!(error = %e, "form diagnosis failed");
            PageView {
                prediction_text: error_message(&e),
                result_class: None,
                values,
            }
        }
    };
    Html(page::render(&view))
}

async fn api_predict(
    State(state): State<AppState>,
    body: Result<Json<Measurements>, JsonRejection>,
) -> Response {
    let outcome = match body {
        _ if !state.service.is_loaded() => Err(DiagnosisError::NotLoaded),
        Ok(Json(measurements)) => state.service.diagnose_measurements(&measurements),
        Err(rejection) => Err(DiagnosisError::MalformedRequest(rejection.body_text())),
    };

    match outcome {
        Ok(diagnosis) => Json(diagnosis).into_response(),
        Err(e) => {
            debug!(error = %e, "api diagnosis failed");
            let status = match e {
                DiagnosisError::NotLoaded => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::UNPROCESSABLE_ENTITY,
            };
            (status, Json(json!({ "error": e.to_string() }))).into_response()
        }
    }
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "model_loaded": state.service.is_loaded(),
    }))
}
