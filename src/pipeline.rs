// src/pipeline.rs
//! Preprocessing pipeline: normalizer → tokenizer → filters → stemming.
//! The output string is the exact document the vectorizer sees.

use crate::config::ResourcesSection;
use crate::lexicon::{EmojiLexicon, RootWords, SlangLexicon, StemExceptionDict, StopwordSet};
use crate::normalize::{coerce_text, Normalizer};
use crate::stemmer::IndonesianStemmer;
use crate::tokenize::tokenize;
use serde::Serialize;
use std::fmt;

/// Tokens of this many chars or fewer are dropped (also hits some valid short words).
pub const MAX_DROPPED_TOKEN_CHARS: usize = 2;

/// Final token stream, joined with single spaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PipelineResult(String);

impl PipelineResult {
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out = String::new();
        for t in tokens {
            let t = t.as_ref();
            if t.is_empty() {
                continue;
            }
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(t);
        }
        Self(out)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.0.split(' ').filter(|t| !t.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for PipelineResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
pub struct Preprocessor {
    normalizer: Normalizer,
    stopwords: StopwordSet,
    stem_exceptions: StemExceptionDict,
    stemmer: IndonesianStemmer,
}

impl Preprocessor {
    pub fn new(
        normalizer: Normalizer,
        stopwords: StopwordSet,
        stem_exceptions: StemExceptionDict,
        stemmer: IndonesianStemmer,
    ) -> Self {
        Self {
            normalizer,
            stopwords,
            stem_exceptions,
            stemmer,
        }
    }

    /// Load every lexicon named in the `[resources]` section.
    /// Emoji and slang tables are required; the rest may be absent.
    pub fn from_resources(res: &ResourcesSection) -> anyhow::Result<Self> {
        let emoji = EmojiLexicon::from_path(&res.emoji)?;
        let slang = SlangLexicon::from_path(&res.slang)?;
        let stopwords = StopwordSet::from_optional_path(res.stopwords.as_deref())?;
        let stem_exceptions = StemExceptionDict::from_optional_path(res.stem_terms.as_deref())?;
        let roots = RootWords::from_optional_path(res.root_words.as_deref())?;

        Ok(Self::new(
            Normalizer::new(emoji, slang),
            stopwords,
            stem_exceptions,
            IndonesianStemmer::new(roots),
        ))
    }

    pub fn preprocess(&self, raw: &str) -> PipelineResult {
        let normalized = self.normalizer.normalize(raw);
        let tokens = self.filter_tokens(tokenize(&normalized));
        PipelineResult::from_tokens(tokens.iter().map(|t| self.stem_token(t)))
    }

    /// Non-string values preprocess as the empty string.
    pub fn preprocess_value(&self, raw: &serde_json::Value) -> PipelineResult {
        self.preprocess(coerce_text(raw))
    }

    /// Drop empty, short and stopword tokens.
    pub fn filter_tokens(&self, tokens: Vec<String>) -> Vec<String> {
        tokens
            .into_iter()
            .filter(|t| !t.is_empty())
            .filter(|t| t.chars().count() > MAX_DROPPED_TOKEN_CHARS)
            .filter(|t| !self.stopwords.contains(t))
            .collect()
    }

    /// Exception dictionary first, rule-based stemmer otherwise.
    pub fn stem_token(&self, token: &str) -> String {
        self.stem_exceptions
            .get(token)
            .map(str::to_string)
            .unwrap_or_else(|| self.stemmer.stem(token))
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn stopwords(&self) -> &StopwordSet {
        &self.stopwords
    }

    pub fn stem_exceptions(&self) -> &StemExceptionDict {
        &self.stem_exceptions
    }

    pub fn stemmer(&self) -> &IndonesianStemmer {
        &self.stemmer
    }
}
