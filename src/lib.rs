// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod classifier;
pub mod config;
pub mod decision;
pub mod lexicon;
pub mod metrics;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod stemmer;
pub mod tokenize;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::classifier::TweetClassifier;
pub use crate::config::ClassifierConfig;
pub use crate::decision::{ClassificationResult, Confidence, Label};
pub use crate::pipeline::PipelineResult;

use shuttle_axum::axum::Router;

/// Full application router: API routes plus `/metrics`.
///
/// Loads `ClassifierConfig::from_toml()` (env overrides applied), so paths in
/// the config resolve against the working directory.
pub async fn app() -> anyhow::Result<Router> {
    let metrics = crate::metrics::Metrics::global()?;
    let cfg = ClassifierConfig::from_toml()?;
    let classifier = TweetClassifier::from_config(&cfg)?;
    let state = api::AppState::new(classifier);
    Ok(api::create_router(state).merge(metrics.router()))
}
