// src/classifier.rs
//! End-to-end facade: preprocess → score → decide.
//!
//! Built once at startup and shared read-only behind an `Arc`.

use crate::config::ClassifierConfig;
use crate::decision::{ClassificationResult, Thresholds};
use crate::model::{ModelArtifact, Scorer};
use crate::normalize::coerce_text;
use crate::pipeline::{PipelineResult, Preprocessor};
use metrics::{counter, describe_counter, describe_histogram, histogram};
use once_cell::sync::OnceCell;
use std::time::Instant;
use tracing::info;

// Dev logging gate: CLASSIFIER_DEV_LOG=1 AND dev env (debug or SHUTTLE_ENV in {local,development,dev})
pub(crate) fn dev_logging_enabled() -> bool {
    let on = std::env::var("CLASSIFIER_DEV_LOG").ok().as_deref() == Some("1");
    if !on {
        return false;
    }
    if cfg!(debug_assertions) {
        return true;
    }
    matches!(
        std::env::var("SHUTTLE_ENV")
            .unwrap_or_default()
            .to_ascii_lowercase()
            .as_str(),
        "local" | "development" | "dev"
    )
}

/// First 6 bytes of SHA-256 as hex; stands in for the tweet in logs.
pub(crate) fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

fn dev_log_classification(text: &str, tokens: usize, result: &ClassificationResult) {
    if !dev_logging_enabled() {
        return;
    }
    let id = anon_hash(text);
    // Never log raw text. Only hashed id + outcome.
    info!(
        target: "classifier",
        %id, tokens,
        label = %result.label,
        factual = %result.confidence.factual,
        relevant = %result.confidence.relevant,
        noise = %result.confidence.noise,
    );
}

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "classify_requests_total",
            "Classified tweets, labelled by decided class."
        );
        describe_histogram!(
            "classify_duration_ms",
            "Preprocess + score + decide time in milliseconds."
        );
    });
}

pub struct TweetClassifier {
    preprocessor: Preprocessor,
    scorer: Box<dyn Scorer>,
    thresholds: Thresholds,
}

impl TweetClassifier {
    pub fn new(preprocessor: Preprocessor, scorer: Box<dyn Scorer>, thresholds: Thresholds) -> Self {
        ensure_metrics_described();
        Self {
            preprocessor,
            scorer,
            thresholds,
        }
    }

    /// Load lexicons and the model artifact named by the config.
    pub fn from_config(cfg: &ClassifierConfig) -> anyhow::Result<Self> {
        let preprocessor = Preprocessor::from_resources(&cfg.resources)?;
        let (scorer, thresholds) = ModelArtifact::from_path(&cfg.model.artifact)?.into_parts();

        info!(
            emoji = preprocessor.normalizer().emoji().len(),
            slang = preprocessor.normalizer().slang().len(),
            stem_terms = preprocessor.stem_exceptions().len(),
            lenient_stemmer = preprocessor.stemmer().is_lenient(),
            threshold_factual = thresholds.factual,
            threshold_relevant = thresholds.relevant,
            "tweet classifier ready"
        );

        Ok(Self::new(preprocessor, Box::new(scorer), thresholds))
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    pub fn preprocess(&self, raw: &str) -> PipelineResult {
        self.preprocessor.preprocess(raw)
    }

    pub fn classify(&self, raw: &str) -> anyhow::Result<ClassificationResult> {
        let started = Instant::now();

        let doc = self.preprocess(raw);
        let tokens = doc.tokens().count();
        let probs = self.scorer.predict_proba(&[doc.into_string()])?;
        let result = ClassificationResult::from_probabilities(
            &probs.class_probabilities(0)?,
            &self.thresholds,
        );

        counter!("classify_requests_total", "label" => result.label.as_str()).increment(1);
        histogram!("classify_duration_ms").record(started.elapsed().as_secs_f64() * 1000.0);
        dev_log_classification(raw, tokens, &result);

        Ok(result)
    }

    /// Non-string input classifies as the empty document.
    pub fn classify_value(&self, raw: &serde_json::Value) -> anyhow::Result<ClassificationResult> {
        self.classify(coerce_text(raw))
    }

    /// Score several tweets with one scorer call.
    pub fn classify_batch(&self, raws: &[&str]) -> anyhow::Result<Vec<ClassificationResult>> {
        let docs: Vec<String> = raws
            .iter()
            .map(|r| self.preprocess(r).into_string())
            .collect();
        let probs = self.scorer.predict_proba(&docs)?;
        (0..probs.len())
            .map(|i| -> anyhow::Result<ClassificationResult> {
                let result = ClassificationResult::from_probabilities(
                    &probs.class_probabilities(i)?,
                    &self.thresholds,
                );
                counter!("classify_requests_total", "label" => result.label.as_str()).increment(1);
                Ok(result)
            })
            .collect()
    }
}
