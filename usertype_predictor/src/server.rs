use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::dictionary::{ColumnDoc, DATA_DICTIONARY};
use crate::error::PredictorError;
use crate::pipeline::Pipeline;
use crate::report;
use crate::sample::SampleDatasetRow;
use crate::schema::{self, FEATURE_COUNT, FEATURE_NAMES};
use crate::types::{OutcomeRow, TripInput};

type ApiError = (StatusCode, Json<Value>);

// ---------- Server state ----------

#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<Pipeline>,
    sample: Arc<Vec<SampleDatasetRow>>, // picked once at startup
    log_pred: bool,
}

impl AppState {
    pub fn new(pipeline: Pipeline, sample: Vec<SampleDatasetRow>) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            sample: Arc::new(sample),
            log_pred: false,
        }
    }

    /// Log a summary of every feature vector sent to the classifier.
    pub fn with_prediction_logging(mut self, on: bool) -> Self {
        self.log_pred = on;
        self
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/dictionary", get(dictionary))
        .route("/sample", get(sample))
        .route("/predict", post(predict))
        .with_state(state)
}

fn api_error(err: PredictorError) -> ApiError {
    let status = match err {
        PredictorError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": err.to_string() })))
}

// ---------- Handlers ----------

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "features": FEATURE_COUNT,
        "threshold": state.pipeline.threshold(),
    }))
}

async fn dictionary() -> Json<&'static [ColumnDoc]> {
    Json(DATA_DICTIONARY)
}

async fn sample(State(state): State<AppState>) -> Json<Vec<SampleDatasetRow>> {
    Json(state.sample.as_ref().clone())
}

async fn predict(
    State(state): State<AppState>,
    Json(input): Json<TripInput>,
) -> Result<Json<OutcomeRow>, ApiError> {
    let record = input.to_record().map_err(api_error)?;

    if state.log_pred {
        let vec = schema::to_vector(&record, state.pipeline.feature_source());
        let nz = vec.iter().filter(|x| **x != 0.0).count();
        let sample: Vec<String> = FEATURE_NAMES
            .iter()
            .zip(vec.iter())
            .map(|(name, v)| format!("{}={}", name, v))
            .collect();
        tracing::info!(
            "recv name={:?} in_dim={} nonzero={} vector=[{}]",
            input.name,
            vec.len(),
            nz,
            sample.join(", ")
        );
    }

    let result = state.pipeline.predict(&record).map_err(|e| {
        tracing::error!("inference failed: {}", e);
        api_error(e)
    })?;
    tracing::debug!(probability = result.probability, label = %result.label, "prediction");

    Ok(Json(report::outcome_row_now(&input, &record, &result)))
}
