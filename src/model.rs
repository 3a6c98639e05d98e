// src/model.rs
//! Inference side of the trained model: TF-IDF vectorizer + linear classifier,
//! exported as one JSON artifact together with the decision thresholds.
//!
//! The artifact is loaded and validated once at startup; any inconsistency is
//! a fatal configuration error.

use crate::decision::{ClassProbabilities, Label, Thresholds};
use regex::Regex;
use serde::{Deserialize, Deserializer};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use tracing::info;

pub const DEFAULT_TOKEN_PATTERN: &str = r"(?u)\b\w\w+\b";

/// Probability source for preprocessed documents.
pub trait Scorer: Send + Sync {
    fn predict_proba(&self, docs: &[String]) -> anyhow::Result<ProbabilityMatrix>;
}

/// N rows of C probabilities plus the ordered class labels.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityMatrix {
    rows: Vec<Vec<f64>>,
    classes: Vec<String>,
}

impl ProbabilityMatrix {
    pub fn new(rows: Vec<Vec<f64>>, classes: Vec<String>) -> anyhow::Result<Self> {
        if let Some(bad) = rows.iter().position(|r| r.len() != classes.len()) {
            anyhow::bail!(
                "probability row {} has {} values for {} classes",
                bad,
                rows[bad].len(),
                classes.len()
            );
        }
        Ok(Self { rows, classes })
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Resolve row `i` by class name.
    pub fn class_probabilities(&self, i: usize) -> anyhow::Result<ClassProbabilities> {
        let row = self
            .rows
            .get(i)
            .ok_or_else(|| anyhow::anyhow!("no probability row {} (have {})", i, self.rows.len()))?;
        ClassProbabilities::from_row(row, &self.classes)
    }
}

// ---------- vectorizer ----------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    L1,
    L2,
    None,
}

fn default_norm() -> Norm {
    Norm::L2
}

// `null` is how an unnormalized vectorizer gets exported
fn norm_or_null<'de, D: Deserializer<'de>>(d: D) -> Result<Norm, D::Error> {
    Ok(Option::<Norm>::deserialize(d)?.unwrap_or(Norm::None))
}

fn default_ngram_range() -> [usize; 2] {
    [1, 1]
}

fn default_true() -> bool {
    true
}

fn default_token_pattern() -> String {
    DEFAULT_TOKEN_PATTERN.to_string()
}

#[derive(Debug, Clone, Deserialize)]
struct TfidfParams {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    #[serde(default = "default_ngram_range")]
    ngram_range: [usize; 2],
    #[serde(default)]
    sublinear_tf: bool,
    #[serde(default = "default_norm", deserialize_with = "norm_or_null")]
    norm: Norm,
    #[serde(default = "default_true")]
    lowercase: bool,
    #[serde(default = "default_token_pattern")]
    token_pattern: String,
}

/// Sparse feature vector: (feature index, value), sorted by index.
pub type SparseVec = Vec<(usize, f64)>;

#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    ngram_range: (usize, usize),
    sublinear_tf: bool,
    norm: Norm,
    lowercase: bool,
    token_re: Regex,
}

impl TfidfVectorizer {
    fn from_params(p: TfidfParams) -> anyhow::Result<Self> {
        if p.idf.len() != p.vocabulary.len() {
            anyhow::bail!(
                "tfidf: idf has {} entries but vocabulary has {}",
                p.idf.len(),
                p.vocabulary.len()
            );
        }
        if let Some((term, idx)) = p.vocabulary.iter().find(|&(_, &i)| i >= p.idf.len()) {
            anyhow::bail!(
                "tfidf: vocabulary index {} for `{}` out of range ({} features)",
                idx,
                term,
                p.idf.len()
            );
        }
        if p.idf.iter().any(|v| !v.is_finite()) {
            anyhow::bail!("tfidf: idf contains non-finite values");
        }
        let [min_n, max_n] = p.ngram_range;
        if min_n == 0 || min_n > max_n {
            anyhow::bail!("tfidf: invalid ngram_range [{}, {}]", min_n, max_n);
        }
        let token_re = Regex::new(&p.token_pattern)
            .map_err(|e| anyhow::anyhow!("tfidf: invalid token_pattern: {}", e))?;
        if token_re.captures_len() > 2 {
            anyhow::bail!("tfidf: token_pattern may have at most one capturing group");
        }

        Ok(Self {
            vocabulary: p.vocabulary,
            idf: p.idf,
            ngram_range: (min_n, max_n),
            sublinear_tf: p.sublinear_tf,
            norm: p.norm,
            lowercase: p.lowercase,
            token_re,
        })
    }

    pub fn n_features(&self) -> usize {
        self.idf.len()
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    /// Terms (n-grams included) the vocabulary is matched against.
    pub fn analyze(&self, doc: &str) -> Vec<String> {
        let doc = if self.lowercase {
            doc.to_lowercase()
        } else {
            doc.to_string()
        };
        // with one capturing group the group is the token
        let tokens: Vec<&str> = if self.token_re.captures_len() == 2 {
            self.token_re
                .captures_iter(&doc)
                .filter_map(|c| c.get(1).map(|m| m.as_str()))
                .collect()
        } else {
            self.token_re.find_iter(&doc).map(|m| m.as_str()).collect()
        };

        let (min_n, max_n) = self.ngram_range;
        let mut terms = Vec::new();
        for n in min_n..=max_n.min(tokens.len()) {
            for window in tokens.windows(n) {
                terms.push(window.join(" "));
            }
        }
        terms
    }

    pub fn transform(&self, doc: &str) -> SparseVec {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for term in self.analyze(doc) {
            if let Some(&idx) = self.vocabulary.get(&term) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }

        let mut v: SparseVec = counts
            .into_iter()
            .map(|(idx, tf)| {
                let tf = if self.sublinear_tf { 1.0 + tf.ln() } else { tf };
                (idx, tf * self.idf[idx])
            })
            .collect();

        let denom = match self.norm {
            Norm::L1 => v.iter().map(|(_, x)| x.abs()).sum::<f64>(),
            Norm::L2 => v.iter().map(|(_, x)| x * x).sum::<f64>().sqrt(),
            Norm::None => 1.0,
        };
        if denom > 0.0 && denom != 1.0 {
            for (_, x) in v.iter_mut() {
                *x /= denom;
            }
        }
        v
    }
}

// ---------- classifiers ----------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MultiClass {
    #[default]
    #[serde(alias = "auto")]
    Multinomial,
    Ovr,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LinearClassifier {
    LogisticRegression {
        #[serde(default)]
        multi_class: MultiClass,
        classes: Vec<String>,
        coef: Vec<Vec<f64>>,
        intercept: Vec<f64>,
    },
    MultinomialNb {
        classes: Vec<String>,
        feature_log_prob: Vec<Vec<f64>>,
        class_log_prior: Vec<f64>,
    },
}

fn dot(weights: &[f64], x: &[(usize, f64)]) -> f64 {
    x.iter().map(|&(i, v)| weights[i] * v).sum()
}

fn softmax(scores: &mut [f64]) {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mut sum = 0.0;
    for s in scores.iter_mut() {
        *s = (*s - max).exp();
        sum += *s;
    }
    for s in scores.iter_mut() {
        *s /= sum;
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl LinearClassifier {
    pub fn classes(&self) -> &[String] {
        match self {
            LinearClassifier::LogisticRegression { classes, .. }
            | LinearClassifier::MultinomialNb { classes, .. } => classes,
        }
    }

    fn weights(&self) -> (&[Vec<f64>], &[f64], &'static str, &'static str) {
        match self {
            LinearClassifier::LogisticRegression {
                coef, intercept, ..
            } => (coef.as_slice(), intercept.as_slice(), "coef", "intercept"),
            LinearClassifier::MultinomialNb {
                feature_log_prob,
                class_log_prior,
                ..
            } => (
                feature_log_prob.as_slice(),
                class_log_prior.as_slice(),
                "feature_log_prob",
                "class_log_prior",
            ),
        }
    }

    fn validate(&self, n_features: usize) -> anyhow::Result<()> {
        let classes = self.classes();
        for label in Label::ALL {
            if !classes.iter().any(|c| c == label.as_str()) {
                anyhow::bail!("clf: class `{}` missing from classes {:?}", label, classes);
            }
        }
        for (i, c) in classes.iter().enumerate() {
            if classes[..i].contains(c) {
                anyhow::bail!("clf: duplicate class `{}`", c);
            }
        }

        let (matrix, bias, matrix_name, bias_name) = self.weights();
        if matrix.len() != classes.len() {
            anyhow::bail!(
                "clf: {} has {} rows for {} classes",
                matrix_name,
                matrix.len(),
                classes.len()
            );
        }
        if let Some(bad) = matrix.iter().position(|r| r.len() != n_features) {
            anyhow::bail!(
                "clf: {} row {} has {} columns, vectorizer has {} features",
                matrix_name,
                bad,
                matrix[bad].len(),
                n_features
            );
        }
        if bias.len() != classes.len() {
            anyhow::bail!(
                "clf: {} has {} entries for {} classes",
                bias_name,
                bias.len(),
                classes.len()
            );
        }
        let finite = matrix.iter().flatten().chain(bias).all(|v| v.is_finite());
        if !finite {
            anyhow::bail!("clf: {} / {} contain non-finite values", matrix_name, bias_name);
        }
        Ok(())
    }

    /// One probability per class, in `classes()` order.
    pub fn predict_row(&self, x: &[(usize, f64)]) -> Vec<f64> {
        let (matrix, bias, _, _) = self.weights();
        let mut scores: Vec<f64> = matrix
            .iter()
            .zip(bias)
            .map(|(w, b)| dot(w, x) + b)
            .collect();

        match self {
            LinearClassifier::LogisticRegression {
                multi_class: MultiClass::Ovr,
                ..
            } => {
                for s in scores.iter_mut() {
                    *s = sigmoid(*s);
                }
                let sum: f64 = scores.iter().sum();
                for s in scores.iter_mut() {
                    *s /= sum;
                }
            }
            // multinomial logistic regression and NB joint log likelihood
            _ => softmax(&mut scores),
        }
        scores
    }
}

/// Vectorizer + classifier pair behind the `Scorer` seam.
#[derive(Debug, Clone)]
pub struct LinearScorer {
    vectorizer: TfidfVectorizer,
    classifier: LinearClassifier,
}

impl LinearScorer {
    pub fn vectorizer(&self) -> &TfidfVectorizer {
        &self.vectorizer
    }

    pub fn classifier(&self) -> &LinearClassifier {
        &self.classifier
    }
}

impl Scorer for LinearScorer {
    fn predict_proba(&self, docs: &[String]) -> anyhow::Result<ProbabilityMatrix> {
        let rows = docs
            .iter()
            .map(|d| self.classifier.predict_row(&self.vectorizer.transform(d)))
            .collect();
        ProbabilityMatrix::new(rows, self.classifier.classes().to_vec())
    }
}

// ---------- artifact ----------

#[derive(Debug, Deserialize)]
struct RawArtifact {
    tfidf: TfidfParams,
    clf: LinearClassifier,
    threshold_factual: f64,
    threshold_relevant: f64,
}

/// Validated model artifact.
#[derive(Debug, Clone)]
pub struct ModelArtifact {
    scorer: LinearScorer,
    thresholds: Thresholds,
}

impl ModelArtifact {
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("Failed to read model artifact at {}: {}", path.display(), e)
        })?;
        let artifact = Self::from_json_str(&content)
            .map_err(|e| anyhow::anyhow!("invalid model artifact at {}: {}", path.display(), e))?;
        info!(
            path = %path.display(),
            features = artifact.scorer.vectorizer.n_features(),
            classes = ?artifact.scorer.classifier.classes(),
            "model artifact loaded"
        );
        Ok(artifact)
    }

    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let raw: RawArtifact = serde_json::from_str(json)?;
        let thresholds = Thresholds::new(raw.threshold_factual, raw.threshold_relevant)?;
        let vectorizer = TfidfVectorizer::from_params(raw.tfidf)?;
        raw.clf.validate(vectorizer.n_features())?;
        Ok(Self {
            scorer: LinearScorer {
                vectorizer,
                classifier: raw.clf,
            },
            thresholds,
        })
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    pub fn scorer(&self) -> &LinearScorer {
        &self.scorer
    }

    pub fn into_parts(self) -> (LinearScorer, Thresholds) {
        (self.scorer, self.thresholds)
    }
}
