// src/config.rs
//! Service configuration (TOML) with env overrides.
//!
//! ```toml
//! [resources]
//! emoji = "data/emoji_to_text.csv"
//! slang = "data/slang_dict.json"
//! stem_terms = "data/term_dict.json"   # optional
//! stopwords = "data/stopwords_id.txt"  # optional, embedded list otherwise
//! root_words = "data/root_words.txt"   # optional, embedded list otherwise
//!
//! [model]
//! artifact = "model/classifier.json"
//! ```

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

// --- env defaults & names ---
pub const DEFAULT_CLASSIFIER_CONFIG_PATH: &str = "config/classifier.toml";

pub const ENV_CLASSIFIER_CONFIG_PATH: &str = "CLASSIFIER_CONFIG_PATH";
pub const ENV_CLASSIFIER_ARTIFACT_PATH: &str = "CLASSIFIER_ARTIFACT_PATH";

#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierConfig {
    pub resources: ResourcesSection,
    pub model: ModelSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResourcesSection {
    pub emoji: PathBuf,
    pub slang: PathBuf,
    #[serde(default)]
    pub stem_terms: Option<PathBuf>,
    #[serde(default)]
    pub stopwords: Option<PathBuf>,
    #[serde(default)]
    pub root_words: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelSection {
    pub artifact: PathBuf,
}

/// Empty env values count as unset.
fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
}

impl ClassifierConfig {
    /// Load from CLASSIFIER_CONFIG_PATH or "config/classifier.toml", then apply env overrides.
    pub fn from_toml() -> anyhow::Result<Self> {
        let path = env_path(ENV_CLASSIFIER_CONFIG_PATH)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CLASSIFIER_CONFIG_PATH));
        let mut cfg = Self::from_path(&path)?;
        cfg.apply_env_overrides();
        Ok(cfg)
    }

    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!(
                "Failed to read classifier config at {}: {}",
                path.display(),
                e
            )
        })?;
        Self::from_toml_str(&content)
            .map_err(|e| anyhow::anyhow!("invalid classifier config at {}: {}", path.display(), e))
    }

    pub fn from_toml_str(toml_str: &str) -> anyhow::Result<Self> {
        let cfg: ClassifierConfig = toml::from_str(toml_str)?;
        Ok(cfg)
    }

    /// CLASSIFIER_ARTIFACT_PATH replaces `[model].artifact`.
    pub fn apply_env_overrides(&mut self) {
        if let Some(p) = env_path(ENV_CLASSIFIER_ARTIFACT_PATH) {
            self.model.artifact = p;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_resources_default_to_none() {
        let cfg = ClassifierConfig::from_toml_str(
            r#"
[resources]
emoji = "e.csv"
slang = "s.json"

[model]
artifact = "m.json"
"#,
        )
        .unwrap();
        assert_eq!(cfg.resources.emoji, PathBuf::from("e.csv"));
        assert!(cfg.resources.stem_terms.is_none());
        assert!(cfg.resources.stopwords.is_none());
        assert!(cfg.resources.root_words.is_none());
        assert_eq!(cfg.model.artifact, PathBuf::from("m.json"));
    }

    #[test]
    fn missing_model_section_is_an_error() {
        let err = ClassifierConfig::from_toml_str(
            r#"
[resources]
emoji = "e.csv"
slang = "s.json"
"#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = ClassifierConfig::from_path(Path::new("nope/classifier.toml")).unwrap_err();
        assert!(err.to_string().contains("nope/classifier.toml"), "{err}");
    }
}
