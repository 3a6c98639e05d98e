use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shuttle_axum::axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;
use tracing::error;

use crate::classifier::TweetClassifier;
use crate::decision::ClassificationResult;

#[derive(Clone)]
pub struct AppState {
    pub classifier: Arc<TweetClassifier>,
}

impl AppState {
    pub fn new(classifier: TweetClassifier) -> Self {
        Self {
            classifier: Arc::new(classifier),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/classify", post(classify))
        .route("/preprocess", post(preprocess))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Alias kept for callers that build the router as `api::router(state)`.
pub fn router(state: AppState) -> Router {
    create_router(state)
}

// `text` may be any JSON value; non-strings classify as empty text
#[derive(Deserialize)]
struct TextReq {
    #[serde(default)]
    text: serde_json::Value,
}

#[derive(Serialize)]
struct PreprocessResp {
    text_final: String,
}

async fn classify(
    State(state): State<AppState>,
    Json(body): Json<TextReq>,
) -> Result<Json<ClassificationResult>, (StatusCode, String)> {
    state.classifier.classify_value(&body.text).map(Json).map_err(|e| {
        error!(error = %e, "classification failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })
}

async fn preprocess(
    State(state): State<AppState>,
    Json(body): Json<TextReq>,
) -> Json<PreprocessResp> {
    let text = crate::normalize::coerce_text(&body.text);
    Json(PreprocessResp {
        text_final: state.classifier.preprocess(text).into_string(),
    })
}
