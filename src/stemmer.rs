// src/stemmer.rs
//! Indonesian confix-stripping stemmer.
//!
//! Affix model (outer to inner):
//!   [prefix [prefix [prefix]]] root [derivational suffix] [possessive] [particle]
//!
//! With a root-word dictionary every candidate is validated and the first known
//! root wins; an unknown word is returned unchanged. Without a dictionary the
//! stemmer runs in lenient mode: it strips greedily, taking the most frequent
//! recoding of each prefix, and refuses strips that leave fewer than
//! `LENIENT_MIN_REMAINDER` chars or no vowel.

use crate::lexicon::RootWords;
use once_cell::sync::Lazy;
use regex::Regex;

const PARTICLES: [&str; 4] = ["lah", "kah", "tah", "pun"];
const POSSESSIVES: [&str; 3] = ["nya", "ku", "mu"];
// "kan" before "an": the longer suffix wins.
const DERIVATIONAL_SUFFIXES: [&str; 3] = ["kan", "an", "i"];
const MAX_PREFIXES: usize = 3;
const LENIENT_MIN_REMAINDER: usize = 4;

/// Prefix class (first two letters) paired with a suffix it never combines with.
const DISALLOWED_CONFIXES: [(&str, &str); 8] = [
    ("be", "i"),
    ("di", "an"),
    ("ke", "i"),
    ("ke", "kan"),
    ("me", "an"),
    ("se", "i"),
    ("se", "kan"),
    ("te", "an"),
];

static RE_NON_STEMMABLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9 \-]").expect("stemmer filter regex"));
static RE_SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("stemmer space regex"));
// Confixes where the prefix has to go first.
static RE_PREFIX_FIRST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:be.*lah|be.*an|me.*i|di.*i|pe.*i|ter.*i)$").expect("precedence regex")
});
static RE_HYPHEN_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.*)-(?:ku|mu|nya|lah|kah|tah|pun)$").expect("plural regex"));

#[inline]
fn is_vowel(b: u8) -> bool {
    matches!(b, b'a' | b'e' | b'i' | b'o' | b'u')
}

#[inline]
fn is_consonant(b: u8) -> bool {
    b.is_ascii_lowercase() && !is_vowel(b)
}

/// Lower-case, keep `[a-z0-9 -]`, collapse spaces.
fn normalize_for_stemming(text: &str) -> String {
    let lower = text.to_lowercase();
    let kept = RE_NON_STEMMABLE.replace_all(&lower, " ");
    RE_SPACES.replace_all(&kept, " ").trim().to_string()
}

/// Candidate roots after removing one derivational prefix, most frequent recoding first.
/// Returns the prefix class (`di`, `ke`, `se`, `be`, `te`, `me`, `pe`).
fn prefix_candidates(w: &str) -> Option<(&'static str, Vec<String>)> {
    let b = w.as_bytes();
    let at = |i: usize| b.get(i).copied().unwrap_or(0);
    let tail = |i: usize| w.get(i..).unwrap_or("").to_string();
    let recode = |head: &str, i: usize| format!("{head}{}", w.get(i..).unwrap_or(""));

    for plain in ["di", "ke", "se"] {
        if w.starts_with(plain) {
            return Some((plain, vec![tail(2)]));
        }
    }

    if w == "belajar" {
        return Some(("be", vec!["ajar".to_string()]));
    }
    if w.starts_with("ber") {
        if is_vowel(at(3)) {
            return Some(("be", vec![tail(3), recode("r", 3)]));
        }
        return Some(("be", vec![tail(3)]));
    }
    if w.starts_with("be") && is_consonant(at(2)) && w.get(3..).is_some_and(|t| t.starts_with("er"))
    {
        return Some(("be", vec![tail(2)]));
    }

    if w.starts_with("ter") {
        if is_vowel(at(3)) {
            return Some(("te", vec![tail(3), recode("r", 3)]));
        }
        if at(3) != b'r' && at(3) != 0 {
            return Some(("te", vec![tail(3)]));
        }
    }
    if w.starts_with("te") && is_consonant(at(2)) && w.get(3..).is_some_and(|t| t.starts_with("er"))
    {
        return Some(("te", vec![tail(2)]));
    }

    if w.starts_with("me") {
        if w.starts_with("meng") {
            if matches!(at(4), b'g' | b'h' | b'q' | b'k') {
                return Some(("me", vec![tail(4)]));
            }
            if is_vowel(at(4)) {
                return Some(("me", vec![tail(4), recode("k", 4)]));
            }
        }
        if w.starts_with("meny") && is_vowel(at(4)) {
            return Some(("me", vec![recode("s", 4), recode("ny", 4)]));
        }
        if w.starts_with("mem") {
            if matches!(at(3), b'b' | b'f' | b'v' | b'p') {
                return Some(("me", vec![tail(3)]));
            }
            if is_vowel(at(3)) {
                return Some(("me", vec![recode("p", 3), recode("m", 3)]));
            }
        }
        if w.starts_with("men") {
            if matches!(at(3), b'c' | b'd' | b'j' | b's' | b'z') {
                return Some(("me", vec![tail(3)]));
            }
            if is_vowel(at(3)) {
                return Some(("me", vec![recode("t", 3), recode("n", 3)]));
            }
        }
        if matches!(at(2), b'l' | b'r' | b'w' | b'y') && is_vowel(at(3)) {
            return Some(("me", vec![tail(2)]));
        }
        return None;
    }

    if w.starts_with("pe") {
        if w == "pelajar" {
            return Some(("pe", vec!["ajar".to_string()]));
        }
        if w.starts_with("peng") {
            if matches!(at(4), b'g' | b'h' | b'q' | b'k') {
                return Some(("pe", vec![tail(4)]));
            }
            if is_vowel(at(4)) {
                return Some(("pe", vec![tail(4), recode("k", 4)]));
            }
        }
        if w.starts_with("peny") && is_vowel(at(4)) {
            return Some(("pe", vec![recode("s", 4), recode("ny", 4)]));
        }
        if w.starts_with("pem") {
            if matches!(at(3), b'b' | b'f' | b'v') {
                return Some(("pe", vec![tail(3)]));
            }
            if is_vowel(at(3)) {
                return Some(("pe", vec![recode("p", 3), recode("m", 3)]));
            }
        }
        if w.starts_with("pen") {
            if matches!(at(3), b'c' | b'd' | b'j' | b'z') {
                return Some(("pe", vec![tail(3)]));
            }
            if is_vowel(at(3)) {
                return Some(("pe", vec![recode("t", 3), recode("n", 3)]));
            }
        }
        if w.starts_with("per") {
            if is_vowel(at(3)) {
                return Some(("pe", vec![tail(3), recode("r", 3)]));
            }
            if at(3) != 0 {
                return Some(("pe", vec![tail(3)]));
            }
        }
        if matches!(at(2), b'w' | b'y' | b'l') && is_vowel(at(3)) {
            return Some(("pe", vec![tail(2)]));
        }
        if is_consonant(at(2)) && !matches!(at(2), b'r' | b'w' | b'y' | b'l' | b'm' | b'n') {
            return Some(("pe", vec![tail(2)]));
        }
    }

    None
}

fn strip_suffix<'a>(w: &str, suffixes: &[&'a str]) -> Option<(String, &'a str)> {
    suffixes.iter().find_map(|s| {
        w.strip_suffix(s)
            .map(|rest| (rest.trim_end_matches('-').to_string(), *s))
    })
}

fn disallowed(prefix: &str, suffix: Option<&str>) -> bool {
    suffix.is_some_and(|s| {
        DISALLOWED_CONFIXES
            .iter()
            .any(|&(p, x)| p == prefix && x == s)
    })
}

/// One word after each suffix removal, outermost first.
#[derive(Debug, Clone)]
struct SuffixStage {
    word: String,
    derivational: Option<&'static str>,
}

#[derive(Debug, Clone, Default)]
pub struct IndonesianStemmer {
    roots: RootWords,
}

impl IndonesianStemmer {
    pub fn new(roots: RootWords) -> Self {
        Self { roots }
    }

    /// No root dictionary: greedy stripping with length guards.
    pub fn lenient() -> Self {
        Self::default()
    }

    pub fn is_lenient(&self) -> bool {
        self.roots.is_empty()
    }

    /// Stem free text; each word is stemmed and the roots are joined with spaces.
    pub fn stem(&self, text: &str) -> String {
        normalize_for_stemming(text)
            .split(' ')
            .filter(|w| !w.is_empty())
            .map(|w| self.stem_word(w))
            .filter(|r| !r.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn stem_word(&self, word: &str) -> String {
        if is_plural(word) {
            self.stem_plural(word)
        } else {
            self.stem_singular(word)
        }
    }

    fn stem_plural(&self, word: &str) -> String {
        let Some((first, second)) = word.rsplit_once('-') else {
            return self.stem_singular(word);
        };

        let (mut w1, mut w2) = (first.to_string(), second.to_string());
        let hyphen_suffix = PARTICLES.iter().chain(POSSESSIVES.iter()).any(|s| *s == second);
        if hyphen_suffix {
            if let Some((a, b)) = first.rsplit_once('-') {
                w1 = a.to_string();
                w2 = format!("{b}-{second}");
            }
        }

        let r1 = self.stem_singular(&w1);
        let mut r2 = self.stem_singular(&w2);
        // second half may be a me- verb missing its prefix
        if !self.is_lenient() && !self.roots.contains(&w2) && r2 == w2 {
            r2 = self.stem_singular(&format!("me{w2}"));
        }

        if r1 == r2 {
            r1
        } else {
            word.to_string()
        }
    }

    fn stem_singular(&self, word: &str) -> String {
        if word.len() <= 3 || self.roots.contains(word) {
            return word.to_string();
        }
        if self.is_lenient() {
            self.lenient_stem(word)
        } else {
            self.dictionary_stem(word)
                .unwrap_or_else(|| word.to_string())
        }
    }

    /* -------- suffix handling -------- */

    fn keeps(&self, rest: &str) -> bool {
        if self.is_lenient() {
            rest.len() >= LENIENT_MIN_REMAINDER && rest.bytes().any(is_vowel)
        } else {
            !rest.is_empty()
        }
    }

    /// Particle → possessive → derivational suffix, each only if the remainder is kept.
    fn suffix_stages(&self, word: &str) -> Vec<SuffixStage> {
        let mut stages = vec![SuffixStage {
            word: word.to_string(),
            derivational: None,
        }];
        let mut current = word.to_string();

        for group in [&PARTICLES[..], &POSSESSIVES[..]] {
            if let Some((rest, _)) = strip_suffix(&current, group) {
                if self.keeps(&rest) {
                    current = rest;
                    stages.push(SuffixStage {
                        word: current.clone(),
                        derivational: None,
                    });
                }
            }
        }
        if let Some((rest, s)) = strip_suffix(&current, &DERIVATIONAL_SUFFIXES) {
            if self.keeps(&rest) {
                // "-kan" may really be a root ending in k plus "-an" (perbaikan → baik)
                let k_variant = (s == "kan" && !self.is_lenient()).then(|| SuffixStage {
                    word: format!("{rest}k"),
                    derivational: Some("an"),
                });
                stages.push(SuffixStage {
                    word: rest,
                    derivational: Some(s),
                });
                stages.extend(k_variant);
            }
        }
        stages
    }

    /* -------- lenient mode -------- */

    fn lenient_stem(&self, word: &str) -> String {
        if RE_PREFIX_FIRST.is_match(word) {
            let stripped = self.lenient_prefixes(word, None);
            return self
                .suffix_stages(&stripped)
                .pop()
                .map(|s| s.word)
                .unwrap_or(stripped);
        }

        let last = self.suffix_stages(word).pop();
        match last {
            Some(stage) => self.lenient_prefixes(&stage.word, stage.derivational),
            None => word.to_string(),
        }
    }

    fn lenient_prefixes(&self, word: &str, suffix: Option<&str>) -> String {
        let mut current = word.to_string();
        let mut last_kind: Option<&str> = None;

        for depth in 0..MAX_PREFIXES {
            let Some((kind, candidates)) = prefix_candidates(&current) else {
                break;
            };
            if last_kind == Some(kind) || (depth == 0 && disallowed(kind, suffix)) {
                break;
            }
            match candidates.into_iter().next() {
                Some(c) if self.keeps(&c) => {
                    current = c;
                    last_kind = Some(kind);
                }
                _ => break,
            }
        }
        current
    }

    /* -------- dictionary mode -------- */

    fn dictionary_stem(&self, word: &str) -> Option<String> {
        if RE_PREFIX_FIRST.is_match(word) {
            if let Some(root) = self.search_prefixes(word, None, 0, None, true) {
                return Some(root);
            }
        }

        let stages = self.suffix_stages(word);
        if let Some(root) = stages.iter().find(|s| self.roots.contains(&s.word)) {
            return Some(root.word.clone());
        }

        // most stripped first, then restore suffixes one by one
        stages
            .iter()
            .rev()
            .find_map(|s| self.search_prefixes(&s.word, s.derivational, 0, None, false))
    }

    fn search_prefixes(
        &self,
        word: &str,
        suffix: Option<&str>,
        depth: usize,
        last_kind: Option<&str>,
        then_suffixes: bool,
    ) -> Option<String> {
        if depth == MAX_PREFIXES {
            return None;
        }
        let (kind, candidates) = prefix_candidates(word)?;
        if last_kind == Some(kind) || (depth == 0 && disallowed(kind, suffix)) {
            return None;
        }

        for cand in candidates.iter().filter(|c| !c.is_empty()) {
            if self.roots.contains(cand) {
                return Some(cand.clone());
            }
            if then_suffixes {
                if let Some(stage) = self
                    .suffix_stages(cand)
                    .into_iter()
                    .skip(1)
                    .find(|s| self.roots.contains(&s.word))
                {
                    return Some(stage.word);
                }
            }
            if let Some(root) = self.search_prefixes(cand, suffix, depth + 1, Some(kind), then_suffixes)
            {
                return Some(root);
            }
        }
        None
    }
}

/// `a-b` is a reduplication; `a-nya` is a hyphenated suffix on a singular word.
fn is_plural(word: &str) -> bool {
    if let Some(caps) = RE_HYPHEN_SUFFIX.captures(word) {
        return caps.get(1).is_some_and(|m| m.as_str().contains('-'));
    }
    word.contains('-')
}
