// tests/pipeline_e2e.rs
//
// Preprocessing with the shipped resources (config/classifier.toml).

use std::path::Path;

use tweet_trend_classifier::config::ClassifierConfig;
use tweet_trend_classifier::lexicon::{EmojiLexicon, SlangLexicon};
use tweet_trend_classifier::normalize::{case_fold, clean_text, Normalizer};
use tweet_trend_classifier::pipeline::Preprocessor;

fn shipped() -> Preprocessor {
    let cfg = ClassifierConfig::from_path(Path::new("config/classifier.toml"))
        .expect("shipped config parses");
    Preprocessor::from_resources(&cfg.resources).expect("shipped resources load")
}

#[test]
fn retweet_mention_url_hashtag_emoji() {
    let out = shipped().preprocess("RT @someone: Check this out!!! 😂 http://x.co #breaking");
    let toks: Vec<&str> = out.tokens().collect();

    assert!(toks.contains(&"breaking"), "{toks:?}");
    assert!(toks.contains(&"tawa"), "emoji meaning should survive: {toks:?}");
    for gone in ["rt", "someone", "@someone", "http", "x.co", "#breaking"] {
        assert!(!toks.contains(&gone), "{gone} leaked into {toks:?}");
    }
    assert!(!out.as_str().contains("  "));
    assert!(!out.as_str().starts_with(' ') && !out.as_str().ends_with(' '));
}

#[test]
fn two_letter_tokens_dropped() {
    assert_eq!(shipped().preprocess("ok gempa").as_str(), "gempa");
}

#[test]
fn slang_then_stopwords() {
    // "yg" expands to the stopword "yang"; "bgt" to "banget"
    let out = shipped().preprocess("banjir yg parah bgt");
    assert_eq!(out.as_str(), "banjir parah banget");
}

#[test]
fn shipped_config_stems_against_root_words() {
    let p = shipped();
    assert!(!p.stemmer().is_lenient());
    for w in ["menang", "sekolah", "selamat", "kemarin", "pesawat", "pemilu"] {
        assert_eq!(p.preprocess(w).as_str(), w, "root word {w} was stripped");
    }
}

#[test]
fn affixed_words_reduce_to_shipped_roots() {
    let p = shipped();
    assert_eq!(p.preprocess("kemenangan").as_str(), "menang");
    assert_eq!(p.preprocess("bersekolah").as_str(), "sekolah");
}

#[test]
fn stem_exception_wins_over_rules() {
    let p = shipped();
    assert_ne!(p.stemmer().stem("pemerintah"), "pemerintah");
    assert_eq!(p.stem_exceptions().get("pemerintah"), Some("pemerintah"));
    assert_eq!(p.preprocess("pemerintah").as_str(), "pemerintah");
}

#[test]
fn zwj_emoji_sequence_matches_whole() {
    let p = shipped();
    let out = p.normalizer().normalize("👨‍👩‍👧 mengungsi");
    assert!(out.contains("keluarga"), "{out}");
    assert!(!out.contains("pria"), "{out}");
}

#[test]
fn case_fold_then_fold_again_is_stable() {
    for s in ["GEMPA Bumi", "Straße", "İstanbul", "ǅemal"] {
        let once = case_fold(s);
        assert_eq!(case_fold(&once), once);
    }
}

#[test]
fn slang_after_cleaning_not_before() {
    let slang = SlangLexicon::from_json_str(r#"{"gt":"gitu","dll":"dan lain-lain"}"#).unwrap();
    let emoji = EmojiLexicon::from_pairs(Vec::<(String, String)>::new()).unwrap();
    let n = Normalizer::new(emoji, slang.clone());

    let raw = "harga naik &gt; turun dll.";
    let fixed = n.normalize(raw);
    let swapped = clean_text(&slang.apply(&case_fold(raw)));

    assert_eq!(fixed, "harga naik turun dan lain-lain");
    assert_ne!(fixed, swapped);
}
