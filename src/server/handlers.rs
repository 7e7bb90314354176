//! HTTP request handlers

use std::sync::Arc;
use axum::{
    extract::{
        rejection::{FormRejection, JsonRejection},
        Form, State,
    },
    response::Html,
    Json,
};
use tracing::info;

use crate::inference::Prediction;
use crate::schema::RawApplicant;

use super::error::{Result, ServerError};
use super::state::AppState;

/// Score on the blocking pool; artifact loading and encoding are synchronous
async fn run_prediction(state: &Arc<AppState>, raw: RawApplicant) -> Result<Prediction> {
    let pipeline = state.pipeline.clone();
    let prediction = tokio::task::spawn_blocking(move || pipeline.predict_raw(&raw))
        .await
        .map_err(|e| ServerError::Internal(format!("prediction task failed: {}", e)))??;

    info!(
        label = %prediction.label,
        probability = prediction.probability,
        "Prediction served"
    );
    Ok(prediction)
}

// ============================================================================
// Prediction Handlers
// ============================================================================

/// Form submission; responds with the verdict sentence only
pub async fn predict_form(
    State(state): State<Arc<AppState>>,
    form: std::result::Result<Form<RawApplicant>, FormRejection>,
) -> Result<String> {
    let Form(raw) = form?;
    let prediction = run_prediction(&state, raw).await?;
    Ok(prediction.verdict().to_string())
}

pub async fn predict_json(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<RawApplicant>, JsonRejection>,
) -> Result<Json<serde_json::Value>> {
    let Json(raw) = body?;
    let prediction = run_prediction(&state, raw).await?;
    Ok(Json(serde_json::json!({
        "label": prediction.label,
        "probability": prediction.probability,
        "verdict": prediction.verdict(),
    })))
}

// ============================================================================
// System Handlers
// ============================================================================

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let uptime = chrono::Utc::now().signed_duration_since(state.started_at);
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "artifacts_present": state.config.artifacts.exist(),
        "started_at": state.started_at.to_rfc3339(),
        "uptime_secs": uptime.num_seconds(),
    }))
}

// ============================================================================
// UI Handlers
// ============================================================================

pub async fn serve_index() -> Html<&'static str> {
    Html(EMBEDDED_INDEX_HTML)
}

pub async fn serve_form() -> Html<&'static str> {
    Html(EMBEDDED_FORM_HTML)
}

const EMBEDDED_INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Credit Risk</title>
    <style>
        body { font-family: system-ui, sans-serif; max-width: 40rem; margin: 4rem auto; padding: 0 1rem; color: #222; }
        a.button { display: inline-block; padding: 0.6rem 1.2rem; background: #1f4e79; color: #fff; text-decoration: none; border-radius: 4px; }
    </style>
</head>
<body>
    <h1>Customer Credit Risk</h1>
    <p>Estimate whether a loan applicant presents good or bad credit risk from a few attributes of the applicant and the requested credit.</p>
    <p><a class="button" href="/predictdata">Assess an applicant</a></p>
</body>
</html>
"#;

const EMBEDDED_FORM_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Credit Risk - Assess applicant</title>
    <style>
        body { font-family: system-ui, sans-serif; max-width: 32rem; margin: 3rem auto; padding: 0 1rem; color: #222; }
        label { display: block; margin-top: 0.8rem; font-weight: 600; }
        input, select { width: 100%; padding: 0.4rem; margin-top: 0.2rem; }
        button { margin-top: 1.2rem; padding: 0.6rem 1.2rem; background: #1f4e79; color: #fff; border: 0; border-radius: 4px; }
    </style>
</head>
<body>
    <h1>Assess applicant</h1>
    <form action="/predictdata" method="post">
        <label for="age">Age</label>
        <input id="age" name="age" type="number" min="0" required>

        <label for="sex">Sex</label>
        <select id="sex" name="sex" required>
            <option value="male">Male</option>
            <option value="female">Female</option>
        </select>

        <label for="job">Job</label>
        <select id="job" name="job" required>
            <option value="0">0 - unskilled and non-resident</option>
            <option value="1">1 - unskilled and resident</option>
            <option value="2">2 - skilled</option>
            <option value="3">3 - highly skilled</option>
        </select>

        <label for="housing">Housing</label>
        <select id="housing" name="housing" required>
            <option value="own">Own</option>
            <option value="rent">Rent</option>
            <option value="free">Free</option>
        </select>

        <label for="saving_accounts">Saving accounts</label>
        <select id="saving_accounts" name="saving_accounts">
            <option value="">Unknown</option>
            <option value="little">Little</option>
            <option value="moderate">Moderate</option>
            <option value="quite rich">Quite rich</option>
            <option value="rich">Rich</option>
        </select>

        <label for="checking_account">Checking account</label>
        <select id="checking_account" name="checking_account">
            <option value="">Unknown</option>
            <option value="little">Little</option>
            <option value="moderate">Moderate</option>
            <option value="rich">Rich</option>
        </select>

        <label for="credit_amount">Credit amount</label>
        <input id="credit_amount" name="credit_amount" type="number" min="1" required>

        <label for="duration">Duration (months)</label>
        <input id="duration" name="duration" type="number" min="1" required>

        <label for="purpose">Purpose</label>
        <select id="purpose" name="purpose" required>
            <option value="car">Car</option>
            <option value="radio/TV">Radio/TV</option>
            <option value="furniture/equipment">Furniture/equipment</option>
            <option value="business">Business</option>
            <option value="education">Education</option>
            <option value="repairs">Repairs</option>
            <option value="domestic appliances">Domestic appliances</option>
            <option value="vacation/others">Vacation/others</option>
        </select>

        <button type="submit">Predict</button>
    </form>
</body>
</html>
"#;
