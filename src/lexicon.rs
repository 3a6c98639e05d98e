// src/lexicon.rs
//! Static reference data for the preprocessing pipeline: emoji meanings, slang
//! expansions, stem exceptions, stopwords and stemmer root words.
//!
//! Everything here is loaded once at startup and never mutated afterwards.

use aho_corasick::{AhoCorasick, MatchKind};
use anyhow::Context;
use regex::{Regex, RegexBuilder};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::warn;

/// Embedded Indonesian stopword list (used when no stopword file is configured).
const EMBEDDED_STOPWORDS: &str = include_str!("../data/stopwords_id.txt");
const EMBEDDED_ROOT_WORDS: &str = include_str!("../data/root_words.txt");

// Large slang tables compile into a big alternation; the default 10 MiB is not enough.
const SLANG_REGEX_SIZE_LIMIT: usize = 256 * 1024 * 1024;

/* ----------------------------
Emoji
---------------------------- */

/// Emoji literal → meaning phrase, matched leftmost-longest.
#[derive(Debug, Clone)]
pub struct EmojiLexicon {
    /// Sorted by literal length (code points) descending.
    entries: Vec<(String, String)>,
    matcher: Option<AhoCorasick>,
}

impl EmojiLexicon {
    /// Build from (literal, meaning) pairs. Later duplicates win; empty literals are ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut map: HashMap<String, String> = HashMap::new();
        for (k, v) in pairs {
            let k = k.into();
            if k.is_empty() {
                continue;
            }
            map.insert(k, v.into());
        }

        let mut entries: Vec<(String, String)> = map.into_iter().collect();
        entries.sort_by(|a, b| {
            b.0.chars()
                .count()
                .cmp(&a.0.chars().count())
                .then_with(|| a.0.cmp(&b.0))
        });

        let matcher = if entries.is_empty() {
            None
        } else {
            let ac = AhoCorasick::builder()
                .match_kind(MatchKind::LeftmostLongest)
                .build(entries.iter().map(|(k, _)| k.as_str()))
                .map_err(|e| anyhow::anyhow!("failed to build emoji matcher: {e}"))?;
            Some(ac)
        };

        Ok(Self { entries, matcher })
    }

    /// Parse a CSV table with an `emoji` column and a `makna` (or `meaning`) column.
    pub fn from_csv_reader<R: Read>(reader: R) -> anyhow::Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers = rdr.headers().context("emoji table has no header row")?.clone();

        let col = |names: &[&str]| {
            headers
                .iter()
                .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
        };
        let emoji_col = col(&["emoji"])
            .ok_or_else(|| anyhow::anyhow!("emoji table is missing the `emoji` column"))?;
        let meaning_col = col(&["makna", "meaning"])
            .ok_or_else(|| anyhow::anyhow!("emoji table is missing the `makna` column"))?;

        let mut pairs = Vec::new();
        for (line, record) in rdr.records().enumerate() {
            let record = record.with_context(|| format!("emoji table row {}", line + 2))?;
            let (Some(emoji), Some(meaning)) = (record.get(emoji_col), record.get(meaning_col))
            else {
                continue;
            };
            pairs.push((emoji.to_string(), meaning.to_string()));
        }

        Self::from_pairs(pairs)
    }

    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let file = fs::File::open(path)
            .map_err(|e| anyhow::anyhow!("Failed to read emoji table at {}: {}", path.display(), e))?;
        Self::from_csv_reader(file)
            .with_context(|| format!("invalid emoji table at {}", path.display()))
    }

    /// Replace every longest non-overlapping emoji with `" " + meaning + " "`.
    pub fn apply(&self, text: &str) -> String {
        let Some(ac) = &self.matcher else {
            return text.to_string();
        };

        let mut out = String::with_capacity(text.len() + 16);
        let mut last = 0;
        for m in ac.find_iter(text) {
            out.push_str(&text[last..m.start()]);
            out.push(' ');
            out.push_str(&self.entries[m.pattern().as_usize()].1);
            out.push(' ');
            last = m.end();
        }
        out.push_str(&text[last..]);
        out
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in matching priority order (longest literal first).
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/* ----------------------------
Slang
---------------------------- */

/// Slang token → canonical phrase, matched as whole words, longest key first.
#[derive(Debug, Clone)]
pub struct SlangLexicon {
    map: HashMap<String, String>,
    pattern: Option<Regex>,
}

impl SlangLexicon {
    pub fn from_map(map: HashMap<String, String>) -> anyhow::Result<Self> {
        let mut keys: Vec<&str> = map.keys().map(String::as_str).filter(|k| !k.is_empty()).collect();
        keys.sort_by(|a, b| {
            b.chars()
                .count()
                .cmp(&a.chars().count())
                .then_with(|| a.cmp(b))
        });

        let pattern = if keys.is_empty() {
            None
        } else {
            let alternation = keys
                .iter()
                .map(|k| regex::escape(k))
                .collect::<Vec<_>>()
                .join("|");
            let re = RegexBuilder::new(&format!(r"\b(?:{alternation})\b"))
                .size_limit(SLANG_REGEX_SIZE_LIMIT)
                .dfa_size_limit(SLANG_REGEX_SIZE_LIMIT)
                .build()
                .map_err(|e| anyhow::anyhow!("slang pattern compile error: {}", e))?;
            Some(re)
        };

        Ok(Self { map, pattern })
    }

    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let map: HashMap<String, String> =
            serde_json::from_str(json).context("slang table must be a JSON object of strings")?;
        Self::from_map(map)
    }

    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("Failed to read slang table at {}: {}", path.display(), e)
        })?;
        Self::from_json_str(&content)
            .with_context(|| format!("invalid slang table at {}", path.display()))
    }

    /// Whole-word substitution of every recognised slang token.
    pub fn apply(&self, text: &str) -> String {
        let Some(re) = &self.pattern else {
            return text.to_string();
        };
        re.replace_all(text, |caps: &regex::Captures<'_>| {
            let hit = &caps[0];
            self.map.get(hit).cloned().unwrap_or_else(|| hit.to_string())
        })
        .into_owned()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/* ----------------------------
Stem exceptions
---------------------------- */

/// Precomputed token → stem pairs that bypass the rule-based stemmer.
#[derive(Debug, Clone, Default)]
pub struct StemExceptionDict {
    map: HashMap<String, String>,
}

impl StemExceptionDict {
    pub fn from_map(map: HashMap<String, String>) -> Self {
        Self { map }
    }

    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let map: HashMap<String, String> = serde_json::from_str(json)
            .context("stem exception table must be a JSON object of strings")?;
        Ok(Self { map })
    }

    /// Missing file (or no path at all) yields an empty dictionary.
    pub fn from_optional_path(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !path.exists() {
            warn!(path = %path.display(), "stem exception table not found; using empty dictionary");
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("Failed to read stem exceptions at {}: {}", path.display(), e)
        })?;
        Self::from_json_str(&content)
            .with_context(|| format!("invalid stem exception table at {}", path.display()))
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.map.get(token).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/* ----------------------------
Word lists (stopwords, root words)
---------------------------- */

/// One word per line; blank lines and `#` comments are skipped.
fn parse_word_list(raw: &str) -> HashSet<String> {
    raw.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct StopwordSet {
    words: HashSet<String>,
}

impl StopwordSet {
    /// The built-in Indonesian list.
    pub fn embedded() -> Self {
        Self::from_list(EMBEDDED_STOPWORDS)
    }

    pub fn from_list(raw: &str) -> Self {
        Self {
            words: parse_word_list(raw),
        }
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
        }
    }

    /// Configured file replaces the embedded list; `None` keeps the embedded one.
    pub fn from_optional_path(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            None => Ok(Self::embedded()),
            Some(p) => {
                let raw = fs::read_to_string(p).map_err(|e| {
                    anyhow::anyhow!("Failed to read stopwords at {}: {}", p.display(), e)
                })?;
                Ok(Self::from_list(&raw))
            }
        }
    }

    #[inline]
    pub fn contains(&self, token: &str) -> bool {
        self.words.contains(token)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Known Indonesian root words used by the stemmer to validate candidates.
#[derive(Debug, Clone, Default)]
pub struct RootWords {
    words: HashSet<String>,
}

impl RootWords {
    pub fn embedded() -> Self {
        Self::from_list(EMBEDDED_ROOT_WORDS)
    }

    pub fn from_list(raw: &str) -> Self {
        Self::from_words(parse_word_list(raw))
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    /// Configured file replaces the embedded list. `None`, or a configured file
    /// that does not exist, keeps the embedded one.
    pub fn from_optional_path(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::embedded());
        };
        if !path.exists() {
            warn!(path = %path.display(), "root word list not found; using embedded list");
            return Ok(Self::embedded());
        }
        let raw = fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("Failed to read root words at {}: {}", path.display(), e)
        })?;
        Ok(Self::from_list(&raw))
    }

    #[inline]
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
