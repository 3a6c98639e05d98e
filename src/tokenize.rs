// src/tokenize.rs
//! Tweet-aware tokenizer.
//!
//! One ordered alternation, tried left to right at every position (first
//! alternative that matches wins): URLs, emoticons, @mentions, #hashtags,
//! e-mail addresses, words with inner `'`/`-`/`_`, numbers, other word runs,
//! ellipses, and finally any single non-space character.

use once_cell::sync::Lazy;
use regex::Regex;

const URL: &str = r"https?://\S+|www\.\S+";
const EMOTICON: &str = r"[<>]?[:;=8][\-o*']?[)\](\[dDpP/:}{@|\\]|[)\](\[dDpP/:}{@|\\][\-o*']?[:;=8][<>]?|<3";
const MENTION: &str = r"@\w+";
const HASHTAG: &str = r"\#\w+";
const EMAIL: &str = r"[\w.+\-]+@[\w\-]+\.(?:[\w\-]\.?)+[\w\-]";
const WORD: &str = r"[^\W\d_](?:[^\W\d_]|['\-_])+[^\W\d_]";
const NUMBER: &str = r"[+\-]?\d+(?:[,/.:\-]\d+[+\-]?)?";
const WORDLIKE: &str = r"\w+";
const ELLIPSIS: &str = r"\.(?:\s*\.)+";
const OTHER: &str = r"\S";

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    let alternation = [
        URL, EMOTICON, MENTION, HASHTAG, EMAIL, WORD, NUMBER, WORDLIKE, ELLIPSIS, OTHER,
    ]
    .iter()
    .map(|p| format!("(?:{p})"))
    .collect::<Vec<_>>()
    .join("|");
    Regex::new(&alternation).expect("tweet tokenizer regex")
});

/// Split text into tweet tokens, preserving case.
pub fn tokenize(text: &str) -> Vec<String> {
    TOKEN_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_whitespace_for_clean_text() {
        assert_eq!(
            tokenize("gempa  guncang kota"),
            vec!["gempa", "guncang", "kota"]
        );
    }

    #[test]
    fn keeps_inner_hyphen_and_apostrophe() {
        assert_eq!(
            tokenize("anak-anak don't pergi"),
            vec!["anak-anak", "don't", "pergi"]
        );
    }

    #[test]
    fn recognises_social_media_units() {
        let toks = tokenize("@bmkg cek https://t.co/abc #gempa :) <3 info@bmkg.go.id");
        assert_eq!(
            toks,
            vec![
                "@bmkg",
                "cek",
                "https://t.co/abc",
                "#gempa",
                ":)",
                "<3",
                "info@bmkg.go.id"
            ]
        );
    }

    #[test]
    fn splits_trailing_punctuation_and_numbers() {
        assert_eq!(
            tokenize("jam 10:30, wow!!"),
            vec!["jam", "10:30", ",", "wow", "!", "!"]
        );
        assert_eq!(tokenize("tunggu..."), vec!["tunggu", "..."]);
    }

    #[test]
    fn underscore_words_stay_whole() {
        assert_eq!(tokenize("_foo bar_baz"), vec!["_foo", "bar_baz"]);
    }

    #[test]
    fn empty_text_has_no_tokens() {
        assert!(tokenize("   ").is_empty());
    }
}
