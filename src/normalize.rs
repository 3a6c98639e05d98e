// src/normalize.rs
//! Text normalizer: the order-sensitive chain that turns a raw tweet into clean,
//! tokenizable text.
//!
//! Order: NFKC → emoji → case fold → noise stripping → slang.
//! Every step assumes the previous step's output, so the chain is never reordered.

use crate::lexicon::{EmojiLexicon, SlangLexicon};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use unicode_normalization::UnicodeNormalization;

// Scheme is letters only, so a word glued in front of the URL survives.
static RE_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[[:alpha:]]+://\S*|http\S+").expect("url regex"));
static RE_MENTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"@\w+").expect("mention regex"));
static RE_HASHTAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"#(\w+)").expect("hashtag regex"));
static RE_RETWEET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*rt\s+").expect("retweet regex"));
static RE_NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").expect("non-word regex"));
static RE_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("digit regex"));
static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// Text view of an arbitrary JSON value: strings pass through, anything else is empty.
pub fn coerce_text(value: &Value) -> &str {
    value.as_str().unwrap_or("")
}

/// Compatibility composition (NFKC).
pub fn normalize_unicode(text: &str) -> String {
    text.nfkc().collect()
}

/// Full Unicode default case folding (ß → ss, ς → σ, ...).
pub fn case_fold(text: &str) -> String {
    caseless::default_case_fold_str(text)
}

/// Noise stripping: entities, newlines, URLs, mentions, hashtag markers,
/// leading retweet marker, punctuation, digits, whitespace.
pub fn clean_text(text: &str) -> String {
    let mut out = html_escape::decode_html_entities(text).into_owned();

    out = out
        .replace("\\n", " ")
        .replace("\\r", " ")
        .replace(['\n', '\r'], " ");

    out = RE_URL.replace_all(&out, "").into_owned();
    out = RE_MENTION.replace_all(&out, "").into_owned();
    out = RE_HASHTAG.replace_all(&out, "${1}").into_owned();
    out = RE_RETWEET.replace(&out, "").into_owned();
    out = RE_NON_WORD.replace_all(&out, " ").into_owned();
    out = RE_DIGITS.replace_all(&out, "").into_owned();
    out = RE_WS.replace_all(&out, " ").into_owned();

    out.trim().to_string()
}

/// Full normalization chain over the loaded lexicons.
#[derive(Debug, Clone)]
pub struct Normalizer {
    emoji: EmojiLexicon,
    slang: SlangLexicon,
}

impl Normalizer {
    pub fn new(emoji: EmojiLexicon, slang: SlangLexicon) -> Self {
        Self { emoji, slang }
    }

    pub fn normalize(&self, raw: &str) -> String {
        let s = normalize_unicode(raw);
        let s = self.emoji.apply(&s);
        let s = case_fold(&s);
        let s = clean_text(&s);
        self.slang.apply(&s)
    }

    /// Same as [`Normalizer::normalize`], but non-string values normalize to "".
    pub fn normalize_value(&self, raw: &Value) -> String {
        self.normalize(coerce_text(raw))
    }

    pub fn emoji(&self) -> &EmojiLexicon {
        &self.emoji
    }

    pub fn slang(&self) -> &SlangLexicon {
        &self.slang
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn normalizer() -> Normalizer {
        let emoji = EmojiLexicon::from_pairs([("😂", "tertawa"), ("🔥", "api")]).unwrap();
        let slang =
            SlangLexicon::from_json_str(r#"{"yg":"yang","gk":"tidak","bgt":"banget"}"#).unwrap();
        Normalizer::new(emoji, slang)
    }

    #[test]
    fn nfkc_folds_compatibility_forms() {
        assert_eq!(normalize_unicode("ﬁ"), "fi");
        assert_eq!(normalize_unicode("Ｈｅｌｌｏ"), "Hello");
        assert_eq!(normalize_unicode("①"), "1");
    }

    #[test]
    fn case_fold_is_full_folding() {
        assert_eq!(case_fold("Straße"), "strasse");
        assert_eq!(case_fold("ΣΟΦΟΣ ς"), "σοφοσ σ");
        assert_eq!(case_fold("BANJIR"), "banjir");
    }

    #[test]
    fn case_fold_is_idempotent() {
        for s in ["Straße", "İstanbul", "ǅemal", "MAKAN siang", "ﬀ", ""] {
            let once = case_fold(s);
            assert_eq!(case_fold(&once), once, "not idempotent for {s:?}");
        }
    }

    #[test]
    fn clean_text_strips_noise_in_order() {
        let out = clean_text("rt @bmkg: gempa &amp; banjir!!\\nlihat https://t.co/x #siaga 2024");
        assert_eq!(out, "gempa banjir lihat siaga");
    }

    #[test]
    fn clean_text_only_strips_leading_retweet_marker() {
        assert_eq!(clean_text("  rt   info banjir"), "info banjir");
        assert_eq!(clean_text("info rt banjir"), "info rt banjir");
        assert_eq!(clean_text("rtx banjir"), "rtx banjir");
    }

    #[test]
    fn clean_text_handles_real_newlines_and_entities() {
        assert_eq!(clean_text("a\r\nb&lt;c&gt;"), "a b c");
    }

    #[test]
    fn clean_text_strips_non_http_schemes() {
        assert_eq!(clean_text("cek ftp://files.example/a ya"), "cek ya");
        assert_eq!(clean_text("cek httpbin ya"), "cek ya");
    }

    #[test]
    fn clean_text_keeps_word_glued_to_url() {
        assert_eq!(clean_text("baca.https://t.co/x sekarang"), "baca sekarang");
        assert_eq!(clean_text("info-http://x.co banjir"), "info banjir");
    }

    #[test]
    fn clean_text_drops_unicode_digits() {
        assert_eq!(clean_text("jam ٣ sore 12"), "jam sore");
    }

    #[test]
    fn full_chain_replaces_emoji_and_slang() {
        let n = normalizer();
        let out = n.normalize("Panas BGT🔥🔥 yg ini 😂");
        assert_eq!(out, "panas banget api api yang ini tertawa");
    }

    #[test]
    fn emoji_meaning_is_padded_not_glued() {
        let n = normalizer();
        assert_eq!(n.normalize("lucu😂banget"), "lucu tertawa banget");
    }

    #[test]
    fn non_string_input_degrades_to_empty() {
        let n = normalizer();
        assert_eq!(n.normalize_value(&json!(42)), "");
        assert_eq!(n.normalize_value(&Value::Null), "");
        assert_eq!(n.normalize_value(&json!(["yg"])), "");
        assert_eq!(n.normalize_value(&json!("yg")), "yang");
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(normalizer().normalize(""), "");
    }

    // Slang must run after noise stripping: an entity like `&gt;` contains the
    // slang key `gt` that only exists before entities are decoded.
    #[test]
    fn slang_before_cleaning_changes_output() {
        let emoji = EmojiLexicon::from_pairs(Vec::<(String, String)>::new()).unwrap();
        let slang = SlangLexicon::from_json_str(r#"{"gt":"gitu","dll":"dan lain-lain"}"#).unwrap();

        let input = "harga naik &gt; turun dll.";
        let fixed = slang.apply(&clean_text(&case_fold(&emoji.apply(&normalize_unicode(input)))));
        let swapped = clean_text(&slang.apply(&case_fold(&emoji.apply(&normalize_unicode(input)))));

        assert_eq!(fixed, "harga naik turun dan lain-lain");
        assert_eq!(swapped, "harga naik gitu turun dan lain lain");
        assert_ne!(fixed, swapped);
    }
}
